//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- SCALING ----

    /// Wheel rate at full speed demand.
    ///
    /// Units: radians/second
    pub speed_scale: f64,

    /// Speed demand below which turning blends towards a turn on the spot.
    pub turn_limit: f64,

    // ---- CONTROLS ----

    /// Axis giving the turn demand, 1-based.
    pub turn_axis: usize,

    /// Axis giving the speed demand, 1-based.
    pub speed_axis: usize,

    /// Button which stops the robot and ends the session, 1-based.
    pub abort_button: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            speed_scale: 5.0,
            turn_limit: 0.5,
            turn_axis: 7,
            speed_axis: 8,
            abort_button: 1,
        }
    }
}
