//! Input sample data

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{DVector, Vector3};

use super::MotionMode;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One cycle's worth of processed operator input.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSample {
    /// Time at which the sample was taken, `None` before the first sample.
    ///
    /// Units: seconds
    pub t_s: Option<f64>,

    /// Time since the previous sample, after clamping.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// True if the device returned a readout this cycle.
    pub connected: bool,

    /// Raw joint velocity demand.
    ///
    /// Units: radians/second
    pub joint_velocity_rads: DVector<f64>,

    /// Raw Cartesian velocity demand of the end effector.
    ///
    /// Units: meters/second
    pub cartesian_velocity_ms: Vector3<f64>,

    pub smoothed_joint_velocity_rads: DVector<f64>,
    pub smoothed_cartesian_velocity_ms: Vector3<f64>,

    /// `smoothed_joint_velocity_rads * dt_s`, or zero unless in joint mode.
    ///
    /// Units: radians
    pub joint_displacement_rad: DVector<f64>,

    /// `smoothed_cartesian_velocity_ms * dt_s`, or zero unless in Cartesian mode.
    ///
    /// Units: meters
    pub cartesian_displacement_m: Vector3<f64>,

    pub mode: MotionMode,

    /// Operator has requested the arm return home.
    pub locked: bool,

    /// Operator has requested teleoperation be active.
    pub active: bool,

    /// Operator demands the gripper be closed.
    pub gripper_closed: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputSample {
    /// An all-zero sample used to seed the sampler before any input has been seen.
    pub fn new(num_joints: usize) -> Self {
        Self {
            t_s: None,
            dt_s: 0.0,
            connected: false,
            joint_velocity_rads: DVector::zeros(num_joints),
            cartesian_velocity_ms: Vector3::zeros(),
            smoothed_joint_velocity_rads: DVector::zeros(num_joints),
            smoothed_cartesian_velocity_ms: Vector3::zeros(),
            joint_displacement_rad: DVector::zeros(num_joints),
            cartesian_displacement_m: Vector3::zeros(),
            mode: MotionMode::None,
            locked: false,
            active: false,
            gripper_closed: false,
        }
    }

    pub fn num_joints(&self) -> usize {
        self.joint_velocity_rads.len()
    }
}
