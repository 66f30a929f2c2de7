//! Implementations for the ArmCtrl state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use nalgebra::DVector;
use serde::Serialize;

// Internal
use super::{ArmCtrlError, ControlState, GoalComputer, GoalError, Params};
use crate::input::InputSample;
use teleop_if::eqpt::{Arm, Goal, GripperState};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control state machine.
///
/// Owns the arm for the duration of the session. All arm commands are issued from
/// [`ArmCtrl::update`], which is called once per control cycle.
pub struct ArmCtrl<A: Arm> {
    params: Params,

    arm: A,

    goal_computer: GoalComputer,

    state: ControlState,

    /// Time the last connected sample was seen, seeded on the first update.
    last_input_time_s: Option<f64>,

    /// The last gripper state commanded, used to issue each change exactly once.
    last_gripper_cmd: Option<GripperState>,

    exit_requested: bool,

    report: StatusReport,
}

/// Status report for one ArmCtrl update.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// State at the end of the update.
    pub state: ControlState,

    /// True if a teleoperation goal was sent to the arm.
    pub goal_issued: bool,

    /// True if the goal for this cycle was skipped because inverse kinematics failed.
    pub ik_failed: bool,

    /// Gripper command issued this cycle, if any.
    pub gripper_cmd: Option<GripperState>,

    /// Total inverse kinematics failures since startup.
    pub num_ik_failures: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            state: ControlState::Startup,
            goal_issued: false,
            ik_failed: false,
            gripper_cmd: None,
            num_ik_failures: 0,
        }
    }
}

impl<A: Arm> ArmCtrl<A> {
    /// Create a new state machine in [`ControlState::Startup`].
    pub fn new(params: Params, arm: A) -> Result<Self, ArmCtrlError> {
        params.validate(arm.num_joints())?;

        Ok(Self {
            goal_computer: GoalComputer::new(params.workspace),
            params,
            arm,
            state: ControlState::Startup,
            last_input_time_s: None,
            last_gripper_cmd: None,
            exit_requested: false,
            report: StatusReport::default(),
        })
    }

    /// Create a new state machine, loading the parameters from the given file in the params
    /// directory.
    pub fn from_param_file(param_file: &str, arm: A) -> Result<Self, ArmCtrlError> {
        let params: Params = params::load(param_file).map_err(ArmCtrlError::ParamLoad)?;
        Self::new(params, arm)
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    pub fn arm(&self) -> &A {
        &self.arm
    }

    pub fn arm_mut(&mut self) -> &mut A {
        &mut self.arm
    }

    /// Request that the state machine exit. Takes effect on the next update.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Advance the state machine by one cycle.
    ///
    /// Returns `Ok(true)` while the machine is running, and `Ok(false)` once it has reached
    /// [`ControlState::Exit`].
    pub fn update(&mut self, t_now_s: f64, input: &InputSample) -> Result<bool, ArmCtrlError> {
        self.report.goal_issued = false;
        self.report.ik_failed = false;
        self.report.gripper_cmd = None;

        self.arm.update()?;

        if self.state == ControlState::Exit {
            self.arm.send()?;
            return Ok(false);
        }

        if self.exit_requested {
            self.transition_to(ControlState::Exit)?;
            self.arm.send()?;
            self.report.state = self.state;
            return Ok(false);
        }

        let last_input_time_s = *self.last_input_time_s.get_or_insert(t_now_s);

        match self.state {
            ControlState::Startup => self.transition_to(ControlState::Homing)?,
            ControlState::Homing => {
                if self.arm.at_goal() {
                    self.transition_to(ControlState::Teleop)?;
                }
            }
            ControlState::Teleop => {
                if !input.connected {
                    if t_now_s - last_input_time_s > self.params.disconnect_timeout_s {
                        warn!(
                            "No input for {:.2} s, suspending teleoperation",
                            t_now_s - last_input_time_s
                        );
                        self.transition_to(ControlState::Disconnected)?;
                    }
                } else if input.locked {
                    self.transition_to(ControlState::Homing)?;
                } else {
                    self.teleop_step(input)?;
                }
            }
            ControlState::Disconnected => {
                if input.connected {
                    info!("Input restored, resuming teleoperation");
                    self.transition_to(ControlState::Teleop)?;
                }
            }
            ControlState::Exit => (),
        }

        if input.connected {
            self.last_input_time_s = Some(t_now_s);
        }

        self.arm.send()?;

        self.report.state = self.state;

        Ok(true)
    }

    /// Move to a new state, running its entry action. Transitions to the current state do nothing.
    fn transition_to(&mut self, new_state: ControlState) -> Result<(), ArmCtrlError> {
        if new_state == self.state {
            return Ok(());
        }

        match new_state {
            ControlState::Homing => {
                let home = DVector::from_column_slice(&self.params.home_position_rad);
                let goal = match self.params.home_duration_s {
                    Some(d) => Goal::with_duration(home, d),
                    None => Goal::new(home),
                };
                self.arm.set_goal(goal)?;
            }
            ControlState::Exit => self.arm.cancel_goal(),
            _ => (),
        }

        info!("ArmCtrl: {:?} -> {:?}", self.state, new_state);
        self.state = new_state;

        Ok(())
    }

    /// Issue the goal and gripper command for one teleoperation cycle.
    fn teleop_step(&mut self, input: &InputSample) -> Result<(), ArmCtrlError> {
        let current_rad = self.arm.commanded_position();

        match self.goal_computer.compute(&self.arm, &current_rad, input) {
            Ok(Some(goal)) => {
                self.arm.set_goal(goal)?;
                self.report.goal_issued = true;
            }
            Ok(None) => (),
            Err(GoalError::Kinematics(e)) => {
                warn!("Skipping this cycle's goal: {}", e);
                self.report.ik_failed = true;
                self.report.num_ik_failures += 1;
            }
            Err(e) => return Err(ArmCtrlError::Goal(e)),
        }

        self.update_gripper(input);

        Ok(())
    }

    /// Command the gripper on a change in the demanded state.
    fn update_gripper(&mut self, input: &InputSample) {
        let demanded = if input.gripper_closed {
            GripperState::Closed
        } else {
            GripperState::Open
        };

        if let Some(gripper) = self.arm.end_effector() {
            if gripper.state() != demanded && self.last_gripper_cmd != Some(demanded) {
                debug!("Gripper -> {:?}", demanded);
                gripper.set_state(demanded);
                self.last_gripper_cmd = Some(demanded);
                self.report.gripper_cmd = Some(demanded);
            }
        }
    }
}
