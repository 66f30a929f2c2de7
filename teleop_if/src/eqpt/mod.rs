//! # Equipment interfaces

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod arm;
pub mod gripper;
pub mod leader;
pub mod mobile_io;
pub mod wheels;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use arm::{Arm, Goal, Kinematics, KinematicsError, Pose};
pub use gripper::{Gripper, GripperState};
pub use leader::LeaderArm;
pub use mobile_io::{ButtonDiff, InputDevice, MobileIoState};
pub use wheels::WheelGroup;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by the equipment layer.
///
/// These are not handled by the control modules, they propagate up to the executable which must
/// cancel any pending goal before terminating.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Lost feedback from the equipment")]
    FeedbackLost,

    #[error("Could not send the command to the equipment: {0}")]
    SendFailed(String),

    #[error("Goal has {found} joints but the arm has {expected}")]
    InvalidGoal { expected: usize, found: usize },
}
