//! # Mobile IO device readout
//!
//! A mobile IO device is a phone app presenting 8 buttons and 8 analog axes. Buttons and axes are
//! numbered from 1, matching the labels shown on the device.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of buttons on the device.
pub const NUM_BUTTONS: usize = 8;

/// Number of analog axes on the device.
pub const NUM_AXES: usize = 8;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One readout of the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MobileIoState {
    /// Button states, `true` while held (or while toggled on for toggle buttons).
    #[serde(default)]
    pub buttons: [bool; NUM_BUTTONS],

    /// Axis values in `[-1, 1]`.
    #[serde(default)]
    pub axes: [f64; NUM_AXES],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Change in a button's state between two readouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonDiff {
    Pressed,
    Released,
    Unchanged,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A streaming operator input device.
pub trait InputDevice {
    /// Read the latest state of the device.
    ///
    /// Hardware implementations block until the next feedback packet arrives, which sets the rate
    /// of the control loop. Returns `None` if the device did not respond this cycle.
    fn read(&mut self) -> Option<MobileIoState>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MobileIoState {
    /// State of button `num` (1-based). Buttons that don't exist read as released.
    pub fn button(&self, num: usize) -> bool {
        match num.checked_sub(1) {
            Some(i) if i < NUM_BUTTONS => self.buttons[i],
            _ => false,
        }
    }

    /// Value of axis `num` (1-based), clamped into `[-1, 1]`. Axes that don't exist read as 0.
    pub fn axis(&self, num: usize) -> f64 {
        match num.checked_sub(1) {
            Some(i) if i < NUM_AXES => self.axes[i].max(-1.0).min(1.0),
            _ => 0.0,
        }
    }

    /// How button `num` changed since the `prev` readout.
    pub fn button_diff(&self, prev: &MobileIoState, num: usize) -> ButtonDiff {
        match (prev.button(num), self.button(num)) {
            (false, true) => ButtonDiff::Pressed,
            (true, false) => ButtonDiff::Released,
            _ => ButtonDiff::Unchanged,
        }
    }

    /// Return a copy with button `num` set.
    pub fn with_button(mut self, num: usize, held: bool) -> Self {
        if let Some(i) = num.checked_sub(1) {
            if i < NUM_BUTTONS {
                self.buttons[i] = held;
            }
        }
        self
    }

    /// Return a copy with axis `num` set.
    pub fn with_axis(mut self, num: usize, value: f64) -> Self {
        if let Some(i) = num.checked_sub(1) {
            if i < NUM_AXES {
                self.axes[i] = value;
            }
        }
        self
    }
}
