//! Simulated gripper

use log::trace;

use teleop_if::eqpt::{EqptError, Gripper};

/// Gripper which reaches its commanded closed fraction instantly.
#[derive(Debug, Default, Clone)]
pub struct SimGripper {
    closed_fraction: f64,
}

impl Gripper for SimGripper {
    fn closed_fraction(&self) -> f64 {
        self.closed_fraction
    }

    fn set_closed_fraction(&mut self, fraction: f64) {
        self.closed_fraction = util::maths::clamp(fraction, 0.0, 1.0);
    }

    fn send(&mut self) -> Result<(), EqptError> {
        trace!("SimGripper closed fraction: {:.3}", self.closed_fraction);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use teleop_if::eqpt::GripperState;

    #[test]
    fn test_state_from_fraction() {
        let mut g = SimGripper::default();
        assert_eq!(g.state(), GripperState::Open);

        g.set_closed_fraction(0.99);
        assert_eq!(g.state(), GripperState::Open);

        g.set_closed_fraction(1.7);
        assert_eq!(g.closed_fraction(), 1.0);
        assert_eq!(g.state(), GripperState::Closed);

        g.toggle();
        assert_eq!(g.closed_fraction(), 0.0);
    }
}
