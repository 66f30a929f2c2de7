//! # Teleoperation library.
//!
//! Control modules for teleoperating arms and mobile robots, and the simulation backend used to
//! run them without hardware. The executables in this crate wire these modules to equipment.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Input sampling - converts mobile IO readouts into smoothed motion demands
pub mod input;

/// Arm control - the teleoperation state machine and goal computation
pub mod arm_ctrl;

/// Teleoperation core - ties the input device, sampler and arm control together
pub mod teleop;

/// Leader-follower control - drives a follower arm from a hand-moved leader arm
pub mod leader_follower;

/// Gripper control - drives a standalone gripper from mobile IO input
pub mod gripper_ctrl;

/// Teach and repeat - records waypoints and plays them back
pub mod teach_repeat;

/// Locomotion control - differential drive wheel demands from phone input
pub mod loco_ctrl;

/// Cycle management for the fixed-rate control loops
pub mod cycle;

/// Simulated equipment
pub mod sim;

#[cfg(test)]
pub(crate) mod mock;
