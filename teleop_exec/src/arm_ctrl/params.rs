//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Deserialize;

use super::ArmCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for arm control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Joint positions the arm is sent to on startup and when locked.
    ///
    /// Units: radians
    pub home_position_rad: Vec<f64>,

    /// Time allowed for the homing move. `None` leaves it to the arm.
    ///
    /// Units: seconds
    #[serde(default)]
    pub home_duration_s: Option<f64>,

    /// Time without input after which teleoperation is suspended.
    ///
    /// Units: seconds
    #[serde(default = "default_disconnect_timeout_s")]
    pub disconnect_timeout_s: f64,

    /// Box the end effector target is kept within in Cartesian mode.
    pub workspace: WorkspaceLimits,
}

/// Axis aligned box bounding Cartesian targets, in the arm base frame.
///
/// Units: meters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorkspaceLimits {
    pub max_abs_x_m: f64,
    pub max_abs_y_m: f64,
    pub min_z_m: f64,
    pub max_z_m: f64,
}

/// Per-axis record of which limits were applied.
pub type AxesClamped = [bool; 3];

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

fn default_disconnect_timeout_s() -> f64 {
    1.0
}

impl Params {
    /// Check the parameters against the arm they will drive.
    pub fn validate(&self, num_joints: usize) -> Result<(), ArmCtrlError> {
        if self.home_position_rad.len() != num_joints {
            return Err(ArmCtrlError::InvalidParams(format!(
                "home position has {} joints but the arm has {}",
                self.home_position_rad.len(),
                num_joints
            )));
        }
        if let Some(d) = self.home_duration_s {
            if d <= 0.0 {
                return Err(ArmCtrlError::InvalidParams(format!(
                    "home_duration_s must be positive, got {}",
                    d
                )));
            }
        }
        if self.disconnect_timeout_s < 0.0 {
            return Err(ArmCtrlError::InvalidParams(format!(
                "disconnect_timeout_s must not be negative, got {}",
                self.disconnect_timeout_s
            )));
        }

        self.workspace.validate()
    }
}

impl WorkspaceLimits {
    pub fn validate(&self) -> Result<(), ArmCtrlError> {
        if self.max_abs_x_m < 0.0 || self.max_abs_y_m < 0.0 || self.min_z_m > self.max_z_m {
            return Err(ArmCtrlError::InvalidParams(format!(
                "workspace limits are empty: {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Clamp a point into the box, returning the clamped point and which axes were limited.
    pub fn clamp(&self, point_m: &Vector3<f64>) -> (Vector3<f64>, AxesClamped) {
        let lims = [
            (-self.max_abs_x_m, self.max_abs_x_m),
            (-self.max_abs_y_m, self.max_abs_y_m),
            (self.min_z_m, self.max_z_m),
        ];

        let mut clamped = *point_m;
        let mut limited = [false; 3];

        for i in 0..3 {
            clamped[i] = util::maths::clamp(point_m[i], lims[i].0, lims[i].1);
            limited[i] = clamped[i] != point_m[i];
        }

        (clamped, limited)
    }
}
