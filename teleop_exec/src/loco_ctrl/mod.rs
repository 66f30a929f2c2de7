//! Locomotion control module
//!
//! Differential drive control from a phone: one axis steers, another sets speed, and a button
//! aborts.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_diff_drive;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Could not load the locomotion parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Invalid locomotion parameters: {0}")]
    InvalidParams(String),
}
