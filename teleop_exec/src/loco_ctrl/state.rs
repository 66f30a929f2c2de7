//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;

// Internal
use super::{LocoCtrlError, Params};
use teleop_if::eqpt::{
    wheels::{LEFT_WHEEL, RIGHT_WHEEL},
    MobileIoState,
};
use util::{module::State, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state
#[derive(Debug, Default)]
pub struct LocoCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to Locomotion Control.
#[derive(Debug, Default)]
pub struct InputData {
    /// The phone readout, or `None` if the phone did not respond this cycle.
    pub raw: Option<MobileIoState>,
}

/// Output demand from LocoCtrl that the wheels must execute.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct OutputData {
    /// Wheel velocity demand indexed by `LEFT_WHEEL` and `RIGHT_WHEEL`, in each wheel's own
    /// frame. The right wheel is mounted mirrored so its demand is negated.
    ///
    /// Units: radians/second
    pub wheel_velocity_rads: [f64; 2],

    /// Abort requested, the demand is zero and the session should end.
    pub abort: bool,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub connection_lost: bool,
    pub turn_scale: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    pub fn new(params: Params) -> Result<Self, LocoCtrlError> {
        if params.turn_limit <= 0.0 {
            return Err(LocoCtrlError::InvalidParams(format!(
                "turn_limit must be positive, got {}",
                params.turn_limit
            )));
        }

        Ok(Self {
            params,
            report: StatusReport::default(),
        })
    }
}

impl State for LocoCtrl {
    type InitData = &'static str;
    type InitError = LocoCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LocoCtrlError;

    /// Initialise the LocoCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(LocoCtrlError::ParamLoad)?;

        *self = Self::new(params)?;

        Ok(())
    }

    /// Perform cyclic processing of Locomotion Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let (x, y) = match &input_data.raw {
            Some(raw) => {
                if raw.button(self.params.abort_button) {
                    info!("Abort pressed, stopping");
                    return Ok((
                        OutputData {
                            wheel_velocity_rads: [0.0; 2],
                            abort: true,
                        },
                        self.report,
                    ));
                }

                (raw.axis(self.params.turn_axis), raw.axis(self.params.speed_axis))
            }
            None => {
                warn!("Phone connection lost!");
                self.report.connection_lost = true;
                (0.0, 0.0)
            }
        };

        let (rates, turn_scale) = self.calc_diff_drive(x, y);
        self.report.turn_scale = turn_scale;

        let mut output = OutputData::default();
        output.wheel_velocity_rads[LEFT_WHEEL] = rates[LEFT_WHEEL];
        output.wheel_velocity_rads[RIGHT_WHEEL] = -rates[RIGHT_WHEEL];

        trace!("LocoCtrl output: {:?}", output.wheel_velocity_rads);

        Ok((output, self.report))
    }
}
