//! Parameters structure for gripper control

use serde::Deserialize;

/// Mobile IO controls for the gripper. All numbers are 1-based.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    pub close_button: usize,
    pub open_button: usize,

    /// Axis mapped from `[-1, 1]` onto the closed fraction `[0, 1]`.
    pub grip_axis: usize,

    /// Change in the grip axis which overrides a position set by a button.
    pub axis_deadband: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            close_button: 2,
            open_button: 4,
            grip_axis: 3,
            axis_deadband: 1e-3,
        }
    }
}
