//! # Telecommand module
//!
//! Commands sent from a user interface thread to a control thread. The control thread owns all
//! equipment handles, so the user interface only ever talks to it through these messages.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod teach_repeat;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use teach_repeat::{RunMode, TeachRepeatCmd, TeachRepeatStatus};
