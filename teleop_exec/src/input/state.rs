//! Implementations for the input sampler

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::{DVector, Vector3};
use serde::Serialize;

// Internal
use super::{InputError, InputParams, InputSample, LowPassFilter, MotionMode, NUM_RESERVED_JOINTS};
use teleop_if::eqpt::MobileIoState;
use util::{maths::clamp, module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Input sampler.
///
/// [`InputSampler::sample`] is a pure function of the raw readout and the previous sample. The
/// [`State`] implementation wraps it, holding the previous sample between cycles.
#[derive(Debug, Clone)]
pub struct InputSampler {
    params: InputParams,

    joint_filter: LowPassFilter,
    cartesian_filter: LowPassFilter,

    last_sample: InputSample,
}

/// Input data to the sampler.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// The device readout, or `None` if the device did not respond this cycle.
    pub raw: Option<MobileIoState>,

    /// Current time.
    ///
    /// Units: seconds
    pub t_now_s: f64,
}

/// Status report for input sampling.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub connected: bool,

    /// True if the measured cycle time was outside the allowed range.
    pub dt_clamped: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for InputSampler {
    fn default() -> Self {
        let params = InputParams::default();
        Self {
            joint_filter: LowPassFilter::new(params.joint_alpha),
            cartesian_filter: LowPassFilter::new(params.cartesian_alpha),
            last_sample: InputSample::new(params.num_joints),
            params,
        }
    }
}

impl InputSampler {
    /// Create a sampler from already loaded parameters.
    pub fn new(params: InputParams) -> Result<Self, InputError> {
        params.validate()?;

        Ok(Self {
            joint_filter: LowPassFilter::new(params.joint_alpha),
            cartesian_filter: LowPassFilter::new(params.cartesian_alpha),
            last_sample: InputSample::new(params.num_joints),
            params,
        })
    }

    pub fn params(&self) -> &InputParams {
        &self.params
    }

    /// The most recent sample produced by [`State::proc`].
    pub fn last_sample(&self) -> &InputSample {
        &self.last_sample
    }

    /// Produce the next sample from a device readout.
    ///
    /// With no readout the raw demands are zero and the flags hold their previous values, so the
    /// smoothed demands decay towards zero.
    pub fn sample(
        &self,
        raw: Option<&MobileIoState>,
        prev: &InputSample,
        t_now_s: f64,
    ) -> InputSample {
        let num_joints = self.params.num_joints;
        let mapping = &self.params.mapping;

        let dt_s = self.calc_dt(prev.t_s, t_now_s);

        // ---- RAW DEMANDS ----

        let mut joint_velocity_rads = DVector::zeros(num_joints);
        let mut cartesian_velocity_ms = Vector3::zeros();
        let (mut locked, mut active, mut gripper_closed) =
            (prev.locked, prev.active, prev.gripper_closed);

        if let Some(state) = raw {
            let direction = if state.button(mapping.direction_button) {
                -1.0
            } else {
                1.0
            };

            for joint in NUM_RESERVED_JOINTS..num_joints {
                let button = mapping.first_joint_button + joint - NUM_RESERVED_JOINTS;
                if state.button(button) {
                    joint_velocity_rads[joint] = self.params.joint_velocity_max_rads * direction;
                }
            }

            for i in 0..3 {
                cartesian_velocity_ms[i] = state.axis(mapping.cartesian_axes[i])
                    * mapping.cartesian_signs[i]
                    * self.params.cartesian_velocity_max_ms;
            }

            locked = state.button(mapping.lock_button);
            active = state.button(mapping.active_button);
            gripper_closed = state.button(mapping.gripper_button);
        }

        // ---- SMOOTHING ----

        // A previous sample of the wrong size can only come from a different sampler, treat it as
        // having no history
        let prev_joint = if prev.smoothed_joint_velocity_rads.len() == num_joints {
            prev.smoothed_joint_velocity_rads.clone()
        } else {
            DVector::zeros(num_joints)
        };

        let smoothed_joint_velocity_rads = self.joint_filter.update(&joint_velocity_rads, &prev_joint);
        let smoothed_cartesian_velocity_ms = self
            .cartesian_filter
            .update(&cartesian_velocity_ms, &prev.smoothed_cartesian_velocity_ms);

        // ---- ARBITRATION ----

        // Cartesian motion takes priority when both are active
        let mode = if smoothed_cartesian_velocity_ms.norm() > self.params.cartesian_activity_threshold
        {
            MotionMode::Cartesian
        } else if smoothed_joint_velocity_rads.norm() > self.params.joint_activity_threshold {
            MotionMode::Joint
        } else {
            MotionMode::None
        };

        let joint_displacement_rad = match mode {
            MotionMode::Joint => &smoothed_joint_velocity_rads * dt_s,
            _ => DVector::zeros(num_joints),
        };
        let cartesian_displacement_m = match mode {
            MotionMode::Cartesian => smoothed_cartesian_velocity_ms * dt_s,
            _ => Vector3::zeros(),
        };

        InputSample {
            t_s: Some(t_now_s),
            dt_s,
            connected: raw.is_some(),
            joint_velocity_rads,
            cartesian_velocity_ms,
            smoothed_joint_velocity_rads,
            smoothed_cartesian_velocity_ms,
            joint_displacement_rad,
            cartesian_displacement_m,
            mode,
            locked,
            active,
            gripper_closed,
        }
    }

    /// Elapsed time since the previous sample, clamped into the allowed range.
    fn calc_dt(&self, prev_t_s: Option<f64>, t_now_s: f64) -> f64 {
        match prev_t_s {
            Some(prev_t_s) => {
                let dt_s = t_now_s - prev_t_s;
                if dt_s.is_finite() {
                    clamp(dt_s, self.params.min_dt_s, self.params.max_dt_s)
                } else {
                    self.params.default_dt_s
                }
            }
            None => self.params.default_dt_s,
        }
    }
}

impl State for InputSampler {
    type InitData = &'static str;
    type InitError = InputError;

    type InputData = InputData;
    type OutputData = InputSample;
    type StatusReport = StatusReport;
    type ProcError = InputError;

    /// Initialise the sampler.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: InputParams = params::load(init_data).map_err(InputError::ParamLoad)?;

        *self = Self::new(params)?;

        debug!("InputSampler initialised for {} joints", self.params.num_joints);

        Ok(())
    }

    /// Sample the device readout, keeping the result as the history for the next cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let sample = self.sample(input_data.raw.as_ref(), &self.last_sample, input_data.t_now_s);

        let report = StatusReport {
            connected: sample.connected,
            dt_clamped: match self.last_sample.t_s {
                Some(prev_t_s) => (input_data.t_now_s - prev_t_s - sample.dt_s).abs() > 1e-12,
                None => false,
            },
        };

        if report.dt_clamped {
            trace!("Cycle time clamped to {:.4} s", sample.dt_s);
        }

        self.last_sample = sample.clone();

        Ok((sample, report))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn sampler() -> InputSampler {
        InputSampler::new(InputParams::default()).unwrap()
    }

    /// Run the sampler for `n` cycles of 10 ms with the same readout.
    fn run(s: &InputSampler, raw: Option<&MobileIoState>, prev: InputSample, n: usize) -> InputSample {
        let mut sample = prev;
        for _ in 0..n {
            let t = sample.t_s.map(|t| t + 0.01).unwrap_or(0.0);
            sample = s.sample(raw, &sample, t);
        }
        sample
    }

    #[test]
    fn test_no_input_gives_none_mode() {
        let s = sampler();
        let raw = MobileIoState::default();

        let sample = run(&s, Some(&raw), InputSample::new(6), 50);

        assert_eq!(sample.mode, MotionMode::None);
        assert_eq!(sample.joint_displacement_rad, DVector::zeros(6));
        assert_eq!(sample.cartesian_displacement_m, Vector3::zeros());
        assert!(sample.connected);
    }

    #[test]
    fn test_joint_button_mapping() {
        let s = sampler();

        // Button 1 drives joint index 2, button 4 drives joint index 5
        let raw = MobileIoState::default().with_button(1, true).with_button(4, true);
        let sample = s.sample(Some(&raw), &InputSample::new(6), 0.0);

        let vmax = std::f64::consts::PI;
        assert_eq!(
            sample.joint_velocity_rads,
            DVector::from_vec(vec![0.0, 0.0, vmax, 0.0, 0.0, vmax])
        );

        // Direction button reverses all joint demands
        let raw = raw.with_button(7, true);
        let sample = s.sample(Some(&raw), &InputSample::new(6), 0.0);
        assert_eq!(sample.joint_velocity_rads[2], -vmax);
        assert_eq!(sample.joint_velocity_rads[5], -vmax);
    }

    #[test]
    fn test_cartesian_axis_mapping() {
        let s = sampler();
        let raw = MobileIoState::default()
            .with_axis(8, 0.5)
            .with_axis(7, 0.25)
            .with_axis(5, -1.0);

        let sample = s.sample(Some(&raw), &InputSample::new(6), 0.0);

        assert_eq!(sample.cartesian_velocity_ms, Vector3::new(0.5, -0.25, -1.0));
    }

    #[test]
    fn test_cartesian_priority() {
        let s = sampler();
        let raw = MobileIoState::default()
            .with_button(2, true)
            .with_axis(8, 1.0);

        let sample = run(&s, Some(&raw), InputSample::new(6), 5);

        assert!(sample.smoothed_joint_velocity_rads.norm() > 1e-2);
        assert_eq!(sample.mode, MotionMode::Cartesian);
        assert_eq!(sample.joint_displacement_rad, DVector::zeros(6));
        assert!(
            (sample.cartesian_displacement_m - sample.smoothed_cartesian_velocity_ms * 0.01).norm()
                < 1e-12
        );
    }

    #[test]
    fn test_joint_mode_displacement() {
        let s = sampler();
        let raw = MobileIoState::default().with_button(3, true);

        let sample = run(&s, Some(&raw), InputSample::new(6), 3);

        assert_eq!(sample.mode, MotionMode::Joint);
        assert!((sample.dt_s - 0.01).abs() < 1e-12);
        assert!(
            (sample.joint_displacement_rad.clone() - &sample.smoothed_joint_velocity_rads * 0.01)
                .norm()
                < 1e-12
        );
        assert_eq!(sample.joint_displacement_rad[0], 0.0);
        assert!(sample.joint_displacement_rad[4] > 0.0);
    }

    #[test]
    fn test_disconnect_decays_and_holds_flags() {
        let s = sampler();
        let raw = MobileIoState::default()
            .with_axis(8, 1.0)
            .with_button(5, true)
            .with_button(8, true);

        let held = run(&s, Some(&raw), InputSample::new(6), 10);
        let lost = run(&s, None, held.clone(), 1);

        assert!(!lost.connected);
        assert_eq!(lost.cartesian_velocity_ms, Vector3::zeros());
        assert!(
            (lost.smoothed_cartesian_velocity_ms - held.smoothed_cartesian_velocity_ms * 0.9).norm()
                < 1e-12
        );
        assert!(lost.active);
        assert!(lost.gripper_closed);
    }

    #[test]
    fn test_dt_seeded_and_clamped() {
        let s = sampler();
        let raw = MobileIoState::default();

        let first = s.sample(Some(&raw), &InputSample::new(6), 5.0);
        assert_eq!(first.dt_s, 0.01);

        let stalled = s.sample(Some(&raw), &first, 10.0);
        assert_eq!(stalled.dt_s, 0.2);

        let repeated = s.sample(Some(&raw), &stalled, 10.0);
        assert_eq!(repeated.dt_s, 1e-4);
    }

    #[test]
    fn test_proc_keeps_history() {
        let mut s = sampler();
        let raw = MobileIoState::default().with_axis(8, 1.0);

        let (first, _) = s
            .proc(&InputData { raw: Some(raw), t_now_s: 0.0 })
            .unwrap();
        let (second, report) = s
            .proc(&InputData { raw: Some(raw), t_now_s: 0.01 })
            .unwrap();

        assert!(second.smoothed_cartesian_velocity_ms.norm() > first.smoothed_cartesian_velocity_ms.norm());
        assert!(!report.dt_clamped);
        assert_eq!(s.last_sample(), &second);
    }
}
