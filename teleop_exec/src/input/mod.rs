//! Input sampling module
//!
//! Turns each mobile IO readout into an [`InputSample`]: raw joint and Cartesian velocity demands,
//! their exponentially smoothed values, and the motion mode arbitrated from the smoothed values.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod filter;
mod params;
mod sample;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use filter::*;
pub use params::*;
pub use sample::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of leading joints which are not driven by joint buttons. Their buttons are used for
/// the Cartesian, gripper and lock controls instead.
pub const NUM_RESERVED_JOINTS: usize = 2;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Motion mode selected for a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionMode {
    /// No significant input, nothing should be commanded.
    None,
    /// Move individual joints.
    Joint,
    /// Move the end effector in a straight line.
    Cartesian,
}

/// Possible errors that can occur during input sampling.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Could not load the input parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Invalid input parameters: {0}")]
    InvalidParams(String),
}

impl Default for MotionMode {
    fn default() -> Self {
        MotionMode::None
    }
}
