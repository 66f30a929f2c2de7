//! # Arm equipment interface
//!
//! The arm is driven through goals handed to its trajectory executor. The executor, feedback and
//! command transport, kinematics and gravity compensation all sit behind [`Arm`] and
//! [`Kinematics`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{DVector, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use super::{EqptError, Gripper};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single waypoint goal for the arm's trajectory executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Target joint positions.
    ///
    /// Units: radians
    pub position_rad: DVector<f64>,

    /// Time to reach the waypoint. `None` lets the trajectory executor pick its default timing.
    ///
    /// Units: seconds
    pub duration_s: Option<f64>,
}

/// End effector pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position of the end effector in the arm base frame.
    ///
    /// Units: meters
    pub position_m: Vector3<f64>,

    /// Orientation of the end effector in the arm base frame.
    pub orientation: Rotation3<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by a kinematics solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KinematicsError {
    #[error("No inverse kinematics solution near the seed for target {0:?}")]
    NoSolution(Vector3<f64>),

    #[error("Expected {expected} joint positions, found {found}")]
    JointCountMismatch { expected: usize, found: usize },
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Forward and inverse kinematics of an arm.
pub trait Kinematics {
    /// Compute the end effector pose for the given joint positions.
    fn forward_kinematics(&self, positions_rad: &DVector<f64>) -> Pose;

    /// Compute joint positions placing the end effector at the target, starting the search from
    /// `seed_rad` so the solution closest to the seed is returned.
    fn inverse_kinematics(
        &self,
        seed_rad: &DVector<f64>,
        target_position_m: &Vector3<f64>,
        target_orientation: &Rotation3<f64>,
    ) -> Result<DVector<f64>, KinematicsError>;
}

/// An arm driven by goals.
pub trait Arm: Kinematics {
    /// Number of joints in the arm.
    fn num_joints(&self) -> usize;

    /// Refresh feedback and the pending command from the trajectory executor.
    ///
    /// Hardware implementations block until the next feedback packet.
    fn update(&mut self) -> Result<(), EqptError>;

    /// Flush the pending command to the arm.
    fn send(&mut self) -> Result<(), EqptError>;

    /// Joint positions from the latest feedback.
    fn position(&self) -> DVector<f64>;

    /// Joint positions of the latest command. Commanded positions are continuous, unlike
    /// feedback, so new goals should be built from them.
    fn commanded_position(&self) -> DVector<f64>;

    /// True once the current goal has been reached, or if there is no goal.
    fn at_goal(&self) -> bool;

    /// Replace the current goal.
    fn set_goal(&mut self, goal: Goal) -> Result<(), EqptError>;

    /// Drop the current goal. The arm holds its last command.
    fn cancel_goal(&mut self);

    /// The gripper mounted on the arm, if there is one.
    fn end_effector(&mut self) -> Option<&mut dyn Gripper>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Goal {
    /// Goal with default timing.
    pub fn new(position_rad: DVector<f64>) -> Self {
        Self {
            position_rad,
            duration_s: None,
        }
    }

    /// Goal reached in `duration_s` seconds.
    pub fn with_duration(position_rad: DVector<f64>, duration_s: f64) -> Self {
        Self {
            position_rad,
            duration_s: Some(duration_s),
        }
    }
}
