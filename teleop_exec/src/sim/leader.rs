//! Scripted leader arm

use log::{info, warn};
use nalgebra::DVector;
use std::path::Path;
use std::time::Instant;

use super::SimError;
use teleop_if::eqpt::LeaderArm;
use util::script_interpreter::{Pending, ScriptInterpreter};

/// Leader arm whose joint positions are replayed from a script.
///
/// Script entries are JSON arrays of joint positions in the leader's own zero convention, or
/// `null` for no feedback.
#[derive(Debug)]
pub struct SimLeader {
    num_joints: usize,
    script: ScriptInterpreter<Option<Vec<f64>>>,
    start: Option<Instant>,
    current: Option<DVector<f64>>,
}

impl SimLeader {
    pub fn new<P: AsRef<Path>>(script_path: P, num_joints: usize) -> Result<Self, SimError> {
        let script = ScriptInterpreter::new(script_path)?;
        info!(
            "Loaded leader script lasting {:.02} s with {} entries",
            script.get_duration(),
            script.get_num_entries()
        );
        Ok(Self::from_interpreter(script, num_joints))
    }

    pub fn from_script(script: &str, num_joints: usize) -> Result<Self, SimError> {
        Ok(Self::from_interpreter(
            ScriptInterpreter::from_script(script)?,
            num_joints,
        ))
    }

    fn from_interpreter(script: ScriptInterpreter<Option<Vec<f64>>>, num_joints: usize) -> Self {
        Self {
            num_joints,
            script,
            start: None,
            current: None,
        }
    }

    pub fn read_at(&mut self, t_s: f64) -> Option<DVector<f64>> {
        if let Pending::Some(mut entries) = self.script.get_pending(t_s) {
            match entries.pop().flatten() {
                Some(p) if p.len() != self.num_joints => {
                    warn!(
                        "Leader script entry at {:.02} s has {} joints, expected {}, ignoring",
                        t_s,
                        p.len(),
                        self.num_joints
                    );
                }
                Some(p) => self.current = Some(DVector::from_vec(p)),
                None => self.current = None,
            }
        }

        self.current.clone()
    }
}

impl LeaderArm for SimLeader {
    fn num_joints(&self) -> usize {
        self.num_joints
    }

    fn read_position(&mut self) -> Option<DVector<f64>> {
        let t_s = self.start.get_or_insert_with(Instant::now).elapsed().as_secs_f64();
        self.read_at(t_s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replay() {
        let mut leader = SimLeader::from_script(
            "0.0: [0.1, 0.2, 0.3];\n\
             1.0: [1.0];\n\
             2.0: null;\n",
            3,
        )
        .unwrap();

        let expected = DVector::from_vec(vec![0.1, 0.2, 0.3]);
        assert_eq!(leader.read_at(0.5), Some(expected.clone()));

        // Wrong length entries are ignored
        assert_eq!(leader.read_at(1.5), Some(expected));

        assert_eq!(leader.read_at(2.5), None);
    }
}
