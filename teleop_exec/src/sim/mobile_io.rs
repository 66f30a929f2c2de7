//! Scripted mobile IO device

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use std::path::Path;
use std::time::Instant;

use super::SimError;
use teleop_if::eqpt::{InputDevice, MobileIoState};
use util::script_interpreter::{Pending, ScriptInterpreter};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mobile IO device replaying a script.
///
/// Each script entry is either a [`MobileIoState`] in JSON or `null`. The device reports the most
/// recent entry until the next becomes due. A `null` entry makes the device silent, as a dropped
/// connection would.
#[derive(Debug)]
pub struct ScriptedMobileIo {
    script: ScriptInterpreter<Option<MobileIoState>>,

    /// Time of the first read, script time is measured from here.
    start: Option<Instant>,

    current: Option<MobileIoState>,

    finished: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptedMobileIo {
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, SimError> {
        let script = ScriptInterpreter::new(script_path)?;

        info!(
            "Loaded mobile IO script lasting {:.02} s with {} entries",
            script.get_duration(),
            script.get_num_entries()
        );

        Ok(Self::from_interpreter(script))
    }

    pub fn from_script(script: &str) -> Result<Self, SimError> {
        Ok(Self::from_interpreter(ScriptInterpreter::from_script(script)?))
    }

    fn from_interpreter(script: ScriptInterpreter<Option<MobileIoState>>) -> Self {
        Self {
            script,
            start: None,
            current: None,
            finished: false,
        }
    }

    /// True once every entry in the script has been replayed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Read the device state at the given script time.
    pub fn read_at(&mut self, t_s: f64) -> Option<MobileIoState> {
        match self.script.get_pending(t_s) {
            Pending::Some(mut entries) => {
                if let Some(latest) = entries.pop() {
                    if latest.is_none() && self.current.is_some() {
                        warn!("Scripted mobile IO going silent at {:.02} s", t_s);
                    }
                    self.current = latest;
                }
            }
            Pending::None => (),
            Pending::EndOfScript => {
                if !self.finished {
                    info!("Mobile IO script finished at {:.02} s", t_s);
                }
                self.finished = true;
            }
        }

        self.current
    }
}

impl InputDevice for ScriptedMobileIo {
    fn read(&mut self) -> Option<MobileIoState> {
        let t_s = self.start.get_or_insert_with(Instant::now).elapsed().as_secs_f64();
        self.read_at(t_s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = "\
        0.0: {\"buttons\": [false, false, false, false, true, false, false, false]};\n\
        0.5: {\"axes\": [0, 0, 0, 0, 1.0, 0, 0, 0]};\n\
        1.0: null;\n\
        1.5: {};\n";

    #[test]
    fn test_replay() {
        let mut io = ScriptedMobileIo::from_script(SCRIPT).unwrap();

        let s = io.read_at(0.1).unwrap();
        assert!(s.button(5));

        // Holds the latest entry between timestamps
        let s = io.read_at(0.7).unwrap();
        assert!(!s.button(5));
        assert_eq!(s.axis(5), 1.0);
        assert_eq!(io.read_at(0.9), Some(s));

        assert_eq!(io.read_at(1.2), None);
        assert!(!io.is_finished());

        assert_eq!(io.read_at(1.6), Some(MobileIoState::default()));
        assert_eq!(io.read_at(1.7), Some(MobileIoState::default()));
        assert!(io.is_finished());
    }

    #[test]
    fn test_silent_before_first_entry() {
        let mut io = ScriptedMobileIo::from_script("1.0: {};").unwrap();
        assert_eq!(io.read_at(0.5), None);
        assert!(io.read_at(1.0).is_some());
    }
}
