//! Leader-follower control module
//!
//! Drives a follower arm to mirror a leader arm moved by hand. After homing, the follower waits
//! for the operator to bring the leader close to its pose before following begins, and again
//! after any loss of the input device.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod angle_map;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use angle_map::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// States of the leader-follower state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeaderFollowerState {
    Startup,
    Homing,

    /// Waiting for the leader to be brought within tolerance of the follower.
    Aligning,

    /// The follower tracks the leader.
    Following,

    /// Input lost for longer than the disconnect timeout, the follower holds position.
    Disconnected,

    Exit,
}

/// Possible errors that can occur during leader-follower control.
#[derive(Debug, thiserror::Error)]
pub enum LeaderFollowerError {
    #[error("Could not load the leader-follower parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Invalid leader-follower parameters: {0}")]
    InvalidParams(String),

    #[error("Leader reading has {found} joints, expected {expected}")]
    LeaderJointCount { expected: usize, found: usize },

    #[error("Follower equipment error: {0}")]
    Eqpt(#[from] teleop_if::eqpt::EqptError),
}

impl LeaderFollowerState {
    pub fn is_running(&self) -> bool {
        *self != LeaderFollowerState::Exit
    }
}
