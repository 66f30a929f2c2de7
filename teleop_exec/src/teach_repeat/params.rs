//! Parameters structure for teach and repeat

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Duration given to an ordinary waypoint.
    ///
    /// Units: seconds
    pub waypoint_duration_s: f64,

    /// Duration given to the second waypoint of a gripper toggle, during which the gripper
    /// actuates.
    ///
    /// Units: seconds
    pub toggle_duration_s: f64,

    /// Control loop period.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            waypoint_duration_s: 5.0,
            toggle_duration_s: 2.0,
            cycle_period_s: 0.01,
        }
    }
}
