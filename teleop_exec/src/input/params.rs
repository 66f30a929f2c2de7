//! Parameters structure for input sampling

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::ops::Range;

use super::{InputError, NUM_RESERVED_JOINTS};
use teleop_if::eqpt::mobile_io::{NUM_AXES, NUM_BUTTONS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for input sampling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputParams {
    /// Number of joints on the controlled arm.
    pub num_joints: usize,

    // ---- DEMAND SCALING ----

    /// Joint velocity demanded while a joint button is held.
    ///
    /// Units: radians/second
    pub joint_velocity_max_rads: f64,

    /// Cartesian velocity demanded at full axis deflection.
    ///
    /// Units: meters/second
    pub cartesian_velocity_max_ms: f64,

    // ---- SMOOTHING ----

    pub joint_alpha: f64,
    pub cartesian_alpha: f64,

    /// Smoothed joint velocity norm above which joint motion is active.
    ///
    /// Units: radians/second
    pub joint_activity_threshold: f64,

    /// Smoothed Cartesian velocity norm above which Cartesian motion is active.
    ///
    /// Units: meters/second
    pub cartesian_activity_threshold: f64,

    // ---- TIMING ----

    /// Cycle time assumed for the first sample, before any elapsed time is known.
    ///
    /// Units: seconds
    pub default_dt_s: f64,

    /// Limits on the measured cycle time. Measured values outside are clamped.
    ///
    /// Units: seconds
    pub min_dt_s: f64,
    pub max_dt_s: f64,

    /// Mapping of device controls onto demands.
    pub mapping: ControlMapping,
}

/// Which mobile IO controls drive which demands. All numbers are 1-based.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlMapping {
    /// Button driving the first non-reserved joint. Subsequent joints use subsequent buttons.
    pub first_joint_button: usize,

    /// Button which, when held, reverses the direction of joint demands.
    pub direction_button: usize,

    /// Axes driving the X, Y and Z Cartesian demands.
    pub cartesian_axes: [usize; 3],

    /// Sign applied to each Cartesian axis.
    pub cartesian_signs: [f64; 3],

    pub lock_button: usize,
    pub active_button: usize,
    pub gripper_button: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for InputParams {
    fn default() -> Self {
        Self {
            num_joints: 6,
            joint_velocity_max_rads: std::f64::consts::PI,
            cartesian_velocity_max_ms: 1.0,
            joint_alpha: 0.1,
            cartesian_alpha: 0.1,
            joint_activity_threshold: 1e-2,
            cartesian_activity_threshold: 1e-3,
            default_dt_s: 0.01,
            min_dt_s: 1e-4,
            max_dt_s: 0.2,
            mapping: ControlMapping::default(),
        }
    }
}

impl Default for ControlMapping {
    fn default() -> Self {
        Self {
            first_joint_button: 1,
            direction_button: 7,
            cartesian_axes: [8, 7, 5],
            cartesian_signs: [1.0, -1.0, 1.0],
            lock_button: 6,
            active_button: 5,
            gripper_button: 8,
        }
    }
}

impl InputParams {
    /// Check the parameters are self consistent.
    pub fn validate(&self) -> Result<(), InputError> {
        let invalid = |msg: String| Err(InputError::InvalidParams(msg));

        if self.num_joints < NUM_RESERVED_JOINTS {
            return invalid(format!(
                "num_joints must be at least {}, got {}",
                NUM_RESERVED_JOINTS, self.num_joints
            ));
        }
        for (name, alpha) in [("joint_alpha", self.joint_alpha), ("cartesian_alpha", self.cartesian_alpha)] {
            if !(0.0..=1.0).contains(&alpha) {
                return invalid(format!("{} must be in [0, 1], got {}", name, alpha));
            }
        }
        if self.joint_activity_threshold < 0.0 || self.cartesian_activity_threshold < 0.0 {
            return invalid("activity thresholds must not be negative".into());
        }
        if !(self.min_dt_s > 0.0 && self.min_dt_s <= self.default_dt_s && self.default_dt_s <= self.max_dt_s) {
            return invalid(format!(
                "expected 0 < min_dt_s <= default_dt_s <= max_dt_s, got {} / {} / {}",
                self.min_dt_s, self.default_dt_s, self.max_dt_s
            ));
        }

        self.mapping.validate(self.num_joints)
    }
}

impl ControlMapping {
    /// Buttons driving joints, in joint order from the first driven joint.
    pub fn joint_buttons(&self, num_joints: usize) -> Range<usize> {
        let num_driven = num_joints.saturating_sub(NUM_RESERVED_JOINTS);
        self.first_joint_button..self.first_joint_button + num_driven
    }

    /// Check every control is on the device and no button has two uses.
    fn validate(&self, num_joints: usize) -> Result<(), InputError> {
        let controls = [
            ("direction_button", self.direction_button),
            ("lock_button", self.lock_button),
            ("active_button", self.active_button),
            ("gripper_button", self.gripper_button),
        ];

        let joint_buttons = self.joint_buttons(num_joints);
        if self.first_joint_button < 1 || joint_buttons.end > NUM_BUTTONS + 1 {
            return Err(InputError::InvalidParams(format!(
                "joint buttons b{}..b{} do not fit on a device with {} buttons",
                joint_buttons.start,
                joint_buttons.end.saturating_sub(1),
                NUM_BUTTONS
            )));
        }

        for (i, (name, button)) in controls.iter().enumerate() {
            if !(1..=NUM_BUTTONS).contains(button) {
                return Err(InputError::InvalidParams(format!(
                    "{} must be in 1..={}, got {}",
                    name, NUM_BUTTONS, button
                )));
            }
            if joint_buttons.contains(button) {
                return Err(InputError::InvalidParams(format!(
                    "{} (b{}) is also a joint button",
                    name, button
                )));
            }
            if let Some((other, _)) = controls[..i].iter().find(|(_, b)| b == button) {
                return Err(InputError::InvalidParams(format!(
                    "{} and {} are both b{}",
                    other, name, button
                )));
            }
        }

        if let Some(axis) = self.cartesian_axes.iter().find(|a| !(1..=NUM_AXES).contains(*a)) {
            return Err(InputError::InvalidParams(format!(
                "cartesian axes must be in 1..={}, got {}",
                NUM_AXES, axis
            )));
        }

        Ok(())
    }
}
