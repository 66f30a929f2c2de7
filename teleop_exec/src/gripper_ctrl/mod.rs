//! Gripper control module
//!
//! Drives a standalone gripper from the mobile IO: one button closes it, another opens it, and a
//! slider sets any position in between.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;
