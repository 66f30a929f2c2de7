//! Arm control module
//!
//! Supervises the teleoperated arm: homes it on startup, turns each [`InputSample`] into a goal
//! while teleoperating, and handles loss of the input device.
//!
//! [`InputSample`]: crate::input::InputSample

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod goal;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use goal::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of the arm control state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlState {
    /// Initial state, left on the first update.
    Startup,

    /// Moving to the home position, no operator motion is accepted.
    Homing,

    /// Following operator input.
    Teleop,

    /// Input lost for longer than the disconnect timeout. The arm holds its last goal.
    Disconnected,

    /// Terminal state.
    Exit,
}

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Could not load the arm control parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Invalid arm control parameters: {0}")]
    InvalidParams(String),

    #[error("Arm equipment error: {0}")]
    Eqpt(#[from] teleop_if::eqpt::EqptError),

    #[error("Could not compute a goal: {0}")]
    Goal(GoalError),
}

impl Default for ControlState {
    fn default() -> Self {
        ControlState::Startup
    }
}

impl ControlState {
    /// True for every state except [`ControlState::Exit`].
    pub fn is_running(&self) -> bool {
        *self != ControlState::Exit
    }
}
