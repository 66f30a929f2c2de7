//! Teach and repeat module
//!
//! The operator moves the arm by hand and records waypoints, then plays them back in a loop. The
//! control thread owns the arm and the waypoints. Commands arrive from the user interface thread
//! over a channel and status snapshots go back over another.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod worker;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DVector;
use serde::Serialize;

// Internal
pub use params::*;
pub use state::*;
pub use worker::*;
use teleop_if::eqpt::GripperState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A recorded waypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    /// Units: radians
    pub position_rad: DVector<f64>,

    /// Time to reach this waypoint from the previous one.
    ///
    /// Units: seconds
    pub duration_s: f64,

    /// Gripper state at this waypoint, `None` for arms without a gripper.
    pub gripper: Option<GripperState>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during teach and repeat.
#[derive(Debug, thiserror::Error)]
pub enum TeachRepeatError {
    #[error("Could not load the teach and repeat parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Arm equipment error: {0}")]
    Eqpt(#[from] teleop_if::eqpt::EqptError),

    #[error("Invalid control cycle: {0}")]
    Cycle(#[from] crate::cycle::CycleError),

    #[error("The teach and repeat control thread panicked")]
    WorkerPanic,
}
