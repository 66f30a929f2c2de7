//! # Gripper equipment interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::EqptError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Binary gripper state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GripperState {
    Open,
    Closed,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A gripper whose closure can be commanded between fully open (0.0) and fully closed (1.0).
pub trait Gripper {
    /// Currently commanded closure.
    fn closed_fraction(&self) -> f64;

    /// Command a closure, clamped into `[0, 1]` by the implementation.
    fn set_closed_fraction(&mut self, fraction: f64);

    /// Flush the command. Grippers mounted on an arm are flushed by [`super::Arm::send`].
    fn send(&mut self) -> Result<(), EqptError> {
        Ok(())
    }

    /// The gripper only counts as closed when fully closed.
    fn state(&self) -> GripperState {
        if self.closed_fraction() >= 1.0 {
            GripperState::Closed
        } else {
            GripperState::Open
        }
    }

    fn open(&mut self) {
        self.set_closed_fraction(0.0)
    }

    fn close(&mut self) {
        self.set_closed_fraction(1.0)
    }

    fn set_state(&mut self, state: GripperState) {
        match state {
            GripperState::Open => self.open(),
            GripperState::Closed => self.close(),
        }
    }

    fn toggle(&mut self) {
        match self.state() {
            GripperState::Open => self.close(),
            GripperState::Closed => self.open(),
        }
    }
}
