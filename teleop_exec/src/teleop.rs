//! # Teleoperation core
//!
//! [`Teleop`] owns the input device, the input sampler and the arm control state machine, and
//! steps them together once per cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};

use crate::{
    arm_ctrl::{ArmCtrl, ArmCtrlError, ControlState},
    input::{self, InputError, InputSample, InputSampler},
};
use teleop_if::eqpt::{Arm, InputDevice};
use util::module::State;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Teleop<D: InputDevice, A: Arm> {
    device: D,
    sampler: InputSampler,
    arm_ctrl: ArmCtrl<A>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TeleopError {
    #[error("Input sampling failed: {0}")]
    Input(#[from] InputError),

    #[error("Arm control failed: {0}")]
    ArmCtrl(#[from] ArmCtrlError),

    #[error("The input sampler drives {sampler} joints but the arm has {arm}")]
    JointCountMismatch { sampler: usize, arm: usize },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D: InputDevice, A: Arm> Teleop<D, A> {
    pub fn new(device: D, sampler: InputSampler, arm_ctrl: ArmCtrl<A>) -> Result<Self, TeleopError> {
        let sampler_joints = sampler.params().num_joints;
        let arm_joints = arm_ctrl.arm().num_joints();

        if sampler_joints != arm_joints {
            return Err(TeleopError::JointCountMismatch {
                sampler: sampler_joints,
                arm: arm_joints,
            });
        }

        Ok(Self {
            device,
            sampler,
            arm_ctrl,
        })
    }

    /// Run one control cycle: read the device, sample it and update the arm.
    ///
    /// Returns `Ok(false)` once the arm control has exited.
    pub fn tick(&mut self, t_now_s: f64) -> Result<bool, TeleopError> {
        let raw = self.device.read();
        if raw.is_none() {
            trace!("No input device readout this cycle");
        }

        let (sample, _) = self.sampler.proc(&input::InputData { raw, t_now_s })?;

        Ok(self.arm_ctrl.update(t_now_s, &sample)?)
    }

    /// Ask the state machine to exit on the next tick.
    pub fn request_exit(&mut self) {
        self.arm_ctrl.request_exit();
    }

    /// Stop the arm immediately, outside of the normal cycle.
    ///
    /// Used when the loop is being torn down after an error.
    pub fn abort(&mut self) {
        let arm = self.arm_ctrl.arm_mut();
        arm.cancel_goal();
        if let Err(e) = arm.send() {
            warn!("Could not send the goal cancellation to the arm: {}", e);
        }
    }

    pub fn state(&self) -> ControlState {
        self.arm_ctrl.state()
    }

    pub fn arm_ctrl(&self) -> &ArmCtrl<A> {
        &self.arm_ctrl
    }

    pub fn last_sample(&self) -> &InputSample {
        self.sampler.last_sample()
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}
