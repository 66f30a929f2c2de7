//! Continuous joint angle mapping
//!
//! Leader joints may report angles wrapped into `(-pi, pi]`. The map follows each joint across the
//! wrap so a joint turned past pi keeps increasing, then adds a per-joint offset which moves the
//! leader's zero to the follower's.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::DVector;

use super::LeaderFollowerError;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ContinuousAngleMap {
    offsets_rad: DVector<f64>,

    /// Last raw reading and its unwrapped value, `None` until the first reading.
    last: Option<(DVector<f64>, DVector<f64>)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ContinuousAngleMap {
    pub fn new(offsets_rad: DVector<f64>) -> Self {
        Self {
            offsets_rad,
            last: None,
        }
    }

    pub fn num_joints(&self) -> usize {
        self.offsets_rad.len()
    }

    /// Map a raw leader reading into follower joint space.
    pub fn update(&mut self, raw_rad: &DVector<f64>) -> Result<DVector<f64>, LeaderFollowerError> {
        if raw_rad.len() != self.offsets_rad.len() {
            return Err(LeaderFollowerError::LeaderJointCount {
                expected: self.offsets_rad.len(),
                found: raw_rad.len(),
            });
        }

        let unwrapped = match &self.last {
            Some((last_raw, last_unwrapped)) => {
                let step = (raw_rad - last_raw).map(wrap_pi);
                last_unwrapped + step
            }
            None => raw_rad.clone(),
        };

        let mapped = &unwrapped + &self.offsets_rad;
        self.last = Some((raw_rad.clone(), unwrapped));

        Ok(mapped)
    }

    /// Forget the reading history, the next reading is taken as-is.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_offsets_applied() {
        let mut map = ContinuousAngleMap::new(DVector::from_vec(vec![0.0, PI / 2.0]));
        let mapped = map.update(&DVector::from_vec(vec![0.3, -0.2])).unwrap();

        assert!((mapped - DVector::from_vec(vec![0.3, PI / 2.0 - 0.2])).norm() < 1e-12);
    }

    #[test]
    fn test_unwraps_across_pi() {
        let mut map = ContinuousAngleMap::new(DVector::zeros(1));

        map.update(&DVector::from_vec(vec![PI - 0.1])).unwrap();

        // The raw reading wraps to near -pi, the mapped angle carries on past pi
        let mapped = map.update(&DVector::from_vec(vec![-PI + 0.1])).unwrap();
        assert!((mapped[0] - (PI + 0.1)).abs() < 1e-9);

        let mapped = map.update(&DVector::from_vec(vec![-PI + 0.3])).unwrap();
        assert!((mapped[0] - (PI + 0.3)).abs() < 1e-9);

        // And back again
        let mapped = map.update(&DVector::from_vec(vec![PI - 0.1])).unwrap();
        assert!((mapped[0] - (PI - 0.1)).abs() < 1e-9);

        map.reset();
        let mapped = map.update(&DVector::from_vec(vec![-PI + 0.1])).unwrap();
        assert!((mapped[0] - (-PI + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn test_joint_count_checked() {
        let mut map = ContinuousAngleMap::new(DVector::zeros(7));
        assert!(matches!(
            map.update(&DVector::zeros(6)),
            Err(LeaderFollowerError::LeaderJointCount { expected: 7, found: 6 })
        ));
    }
}
