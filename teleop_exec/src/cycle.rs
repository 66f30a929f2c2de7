//! Fixed-rate cycle management

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Paces a control loop at a fixed period.
///
/// Call [`CycleTimer::start`] at the top of each cycle and [`CycleTimer::end`] at the bottom. The
/// end call sleeps for whatever remains of the period, or warns if the cycle overran.
#[derive(Debug)]
pub struct CycleTimer {
    period: Duration,

    cycle_start: Option<Instant>,

    /// Number of completed cycles.
    pub num_cycles: u64,

    /// Number of overruns since the last cycle that finished on time.
    pub num_consec_overruns: u64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleError {
    #[error("Cycle period must be a positive number of seconds, got {0}")]
    InvalidPeriod(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CycleTimer {
    pub fn new(period_s: f64) -> Result<Self, CycleError> {
        let period = match Duration::try_from_secs_f64(period_s) {
            Ok(p) if !p.is_zero() => p,
            _ => return Err(CycleError::InvalidPeriod(period_s)),
        };

        Ok(Self {
            period,
            cycle_start: None,
            num_cycles: 0,
            num_consec_overruns: 0,
        })
    }

    pub fn period_s(&self) -> f64 {
        self.period.as_secs_f64()
    }

    pub fn start(&mut self) {
        self.cycle_start = Some(Instant::now());
    }

    /// Finish the cycle, sleeping out the remainder of the period.
    ///
    /// Returns the time slept.
    pub fn end(&mut self) -> Duration {
        let cycle_dur = match self.cycle_start.take() {
            Some(s) => s.elapsed(),
            None => Duration::ZERO,
        };

        self.num_cycles += 1;

        match self.period.checked_sub(cycle_dur) {
            Some(d) => {
                self.num_consec_overruns = 0;
                thread::sleep(d);
                d
            }
            None => {
                self.num_consec_overruns += 1;
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - self.period.as_secs_f64()
                );
                Duration::ZERO
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sleeps_remainder() {
        let mut timer = CycleTimer::new(0.02).unwrap();

        let start = Instant::now();
        timer.start();
        let slept = timer.end();

        assert!(slept > Duration::ZERO);
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(timer.num_cycles, 1);
        assert_eq!(timer.num_consec_overruns, 0);
    }

    #[test]
    fn test_overrun_counted() {
        let mut timer = CycleTimer::new(0.001).unwrap();

        timer.start();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(timer.end(), Duration::ZERO);
        assert_eq!(timer.num_consec_overruns, 1);
    }

    #[test]
    fn test_invalid_period_rejected() {
        for period_s in [-0.01, 0.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                CycleTimer::new(period_s),
                Err(CycleError::InvalidPeriod(_))
            ));
        }
    }
}
