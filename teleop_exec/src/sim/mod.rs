//! Simulated equipment
//!
//! Stand-ins for the arm, gripper, leader arm, wheels and mobile IO so the executables can run
//! without hardware. Operator input and leader motion are replayed from timestamped scripts.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arm;
mod gripper;
mod leader;
mod mobile_io;
mod wheels;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use arm::*;
pub use gripper::*;
pub use leader::*;
pub use mobile_io::*;
pub use wheels::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("Could not load the simulation parameters: {0}")]
    ParamLoad(util::params::LoadError),

    #[error("Invalid simulation parameters: {0}")]
    InvalidParams(String),

    #[error("Could not load the script: {0}")]
    Script(#[from] util::script_interpreter::ScriptError),
}
