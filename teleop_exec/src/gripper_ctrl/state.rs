//! Implementations for gripper control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use super::Params;
use teleop_if::eqpt::{ButtonDiff, EqptError, Gripper, MobileIoState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Operator demand for the gripper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GripperInputs {
    /// Units: fraction of fully closed, `[0, 1]`
    pub target_closed_fraction: f64,
}

/// Parses gripper demands from the mobile IO.
#[derive(Debug, Clone, Default)]
pub struct GripperInputParser {
    params: Params,

    prev: MobileIoState,

    /// Target set by a button press, with the grip axis value at the time. Held until the axis
    /// is moved.
    latched: Option<(f64, f64)>,
}

/// Gripper controller.
pub struct GripperCtrl<G: Gripper> {
    gripper: G,
    running: bool,
    exit_requested: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GripperInputParser {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Parse one readout. Returns `None` if the device did not respond.
    pub fn parse(&mut self, raw: Option<&MobileIoState>) -> Option<GripperInputs> {
        let state = raw?;
        let axis = state.axis(self.params.grip_axis);

        let target = if state.button_diff(&self.prev, self.params.close_button) == ButtonDiff::Pressed {
            self.latched = Some((1.0, axis));
            1.0
        } else if state.button_diff(&self.prev, self.params.open_button) == ButtonDiff::Pressed {
            self.latched = Some((0.0, axis));
            0.0
        } else {
            match self.latched {
                Some((target, latched_axis))
                    if (axis - latched_axis).abs() <= self.params.axis_deadband =>
                {
                    target
                }
                _ => {
                    self.latched = None;
                    (axis + 1.0) / 2.0
                }
            }
        };

        self.prev = *state;

        Some(GripperInputs {
            target_closed_fraction: target,
        })
    }
}

impl<G: Gripper> GripperCtrl<G> {
    pub fn new(gripper: G) -> Self {
        Self {
            gripper,
            running: true,
            exit_requested: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn gripper(&self) -> &G {
        &self.gripper
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Command the gripper from this cycle's inputs. Returns false once exited.
    pub fn update(&mut self, _t_now_s: f64, inputs: Option<GripperInputs>) -> bool {
        if !self.running {
            return false;
        }

        if self.exit_requested {
            info!("GripperCtrl exiting");
            self.running = false;
            return false;
        }

        if let Some(inputs) = inputs {
            if (inputs.target_closed_fraction - self.gripper.closed_fraction()).abs() > f64::EPSILON {
                debug!("Gripper target {:.3}", inputs.target_closed_fraction);
            }
            self.gripper.set_closed_fraction(inputs.target_closed_fraction);
        }

        true
    }

    pub fn send(&mut self) -> Result<(), EqptError> {
        self.gripper.send()
    }
}
