//! Implementations for the leader-follower state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use nalgebra::DVector;
use serde::Serialize;

// Internal
use super::{ContinuousAngleMap, LeaderFollowerError, LeaderFollowerState, Params};
use teleop_if::eqpt::{Arm, Goal, LeaderArm};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct LeaderFollowerCtrl<L: LeaderArm, A: Arm> {
    params: Params,

    leader: L,
    follower: A,

    angle_map: ContinuousAngleMap,

    state: LeaderFollowerState,

    last_input_time_s: Option<f64>,

    /// Time the current alignment began.
    aligning_since_s: f64,

    last_alignment_warning_s: Option<f64>,

    exit_requested: bool,

    report: AlignmentReport,
}

/// A joint outside its alignment tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointMisalignment {
    pub joint: usize,

    /// Units: degrees
    pub diff_deg: f64,

    /// Units: degrees
    pub allowed_deg: f64,
}

/// Result of the most recent alignment check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignmentReport {
    pub out_of_tolerance: Vec<JointMisalignment>,

    /// True once alignment has taken longer than the alignment timeout.
    pub timed_out: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<L: LeaderArm, A: Arm> LeaderFollowerCtrl<L, A> {
    pub fn new(params: Params, leader: L, follower: A) -> Result<Self, LeaderFollowerError> {
        let num_joints = follower.num_joints();

        if leader.num_joints() != num_joints {
            return Err(LeaderFollowerError::InvalidParams(format!(
                "leader has {} joints but the follower has {}",
                leader.num_joints(),
                num_joints
            )));
        }
        params.validate(num_joints)?;

        Ok(Self {
            angle_map: ContinuousAngleMap::new(DVector::from_column_slice(&params.angle_offsets_rad)),
            params,
            leader,
            follower,
            state: LeaderFollowerState::Startup,
            last_input_time_s: None,
            aligning_since_s: 0.0,
            last_alignment_warning_s: None,
            exit_requested: false,
            report: AlignmentReport::default(),
        })
    }

    pub fn from_param_file(
        param_file: &str,
        leader: L,
        follower: A,
    ) -> Result<Self, LeaderFollowerError> {
        let params: Params = params::load(param_file).map_err(LeaderFollowerError::ParamLoad)?;
        Self::new(params, leader, follower)
    }

    pub fn state(&self) -> LeaderFollowerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn alignment_report(&self) -> &AlignmentReport {
        &self.report
    }

    pub fn follower(&self) -> &A {
        &self.follower
    }

    pub fn follower_mut(&mut self) -> &mut A {
        &mut self.follower
    }

    pub fn leader_mut(&mut self) -> &mut L {
        &mut self.leader
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Stop the follower immediately, outside of the normal cycle.
    pub fn abort(&mut self) {
        self.follower.cancel_goal();
        if let Err(e) = self.follower.send() {
            warn!("Could not send the goal cancellation to the follower: {}", e);
        }
    }

    /// Advance the state machine by one cycle.
    ///
    /// `input_connected` is false when the operator's input device did not respond this cycle.
    /// Returns `Ok(false)` once the machine has exited.
    pub fn update(&mut self, t_now_s: f64, input_connected: bool) -> Result<bool, LeaderFollowerError> {
        self.follower.update()?;

        if self.state == LeaderFollowerState::Exit {
            self.follower.send()?;
            return Ok(false);
        }

        if self.exit_requested {
            self.transition_to(t_now_s, LeaderFollowerState::Exit)?;
            self.follower.send()?;
            return Ok(false);
        }

        let leader_rad = match self.leader.read_position() {
            Some(raw) => Some(self.angle_map.update(&raw)?),
            None => None,
        };

        let last_input_time_s = *self.last_input_time_s.get_or_insert(t_now_s);
        let input_lost =
            !input_connected && t_now_s - last_input_time_s > self.params.disconnect_timeout_s;

        match self.state {
            LeaderFollowerState::Startup => {
                self.transition_to(t_now_s, LeaderFollowerState::Homing)?
            }
            LeaderFollowerState::Homing => {
                if self.follower.at_goal() {
                    self.transition_to(t_now_s, LeaderFollowerState::Aligning)?;
                }
            }
            LeaderFollowerState::Aligning => {
                if input_lost {
                    self.transition_to(t_now_s, LeaderFollowerState::Disconnected)?;
                } else if let Some(leader_rad) = leader_rad {
                    if self.check_alignment(t_now_s, &leader_rad) {
                        self.transition_to(t_now_s, LeaderFollowerState::Following)?;
                    }
                }
            }
            LeaderFollowerState::Following => {
                if input_lost {
                    self.transition_to(t_now_s, LeaderFollowerState::Disconnected)?;
                } else if let Some(leader_rad) = leader_rad {
                    let goal = match self.params.follow_duration_s {
                        Some(d) => Goal::with_duration(leader_rad, d),
                        None => Goal::new(leader_rad),
                    };
                    self.follower.set_goal(goal)?;
                }
            }
            LeaderFollowerState::Disconnected => {
                if input_connected {
                    info!("Input restored, realigning before following");
                    self.transition_to(t_now_s, LeaderFollowerState::Aligning)?;
                }
            }
            LeaderFollowerState::Exit => (),
        }

        if input_connected {
            self.last_input_time_s = Some(t_now_s);
        }

        self.follower.send()?;

        Ok(true)
    }

    /// Compare the leader with the follower's feedback, updating the alignment report.
    ///
    /// Returns true if every joint is within tolerance.
    fn check_alignment(&mut self, t_now_s: f64, leader_rad: &DVector<f64>) -> bool {
        let follower_rad = self.follower.position();

        self.report.out_of_tolerance = (leader_rad - &follower_rad)
            .iter()
            .zip(self.params.allowed_diff_deg.iter())
            .enumerate()
            .filter_map(|(joint, (diff_rad, allowed_deg))| {
                let diff_deg = diff_rad.abs().to_degrees();
                (diff_deg > *allowed_deg).then(|| JointMisalignment {
                    joint,
                    diff_deg,
                    allowed_deg: *allowed_deg,
                })
            })
            .collect();

        if self.report.out_of_tolerance.is_empty() {
            return true;
        }

        if t_now_s - self.aligning_since_s > self.params.alignment_timeout_s {
            self.report.timed_out = true;

            let warn_due = match self.last_alignment_warning_s {
                Some(t) => t_now_s - t >= self.params.alignment_warning_period_s,
                None => true,
            };

            if warn_due {
                let joints: Vec<String> = self
                    .report
                    .out_of_tolerance
                    .iter()
                    .map(|m| format!("J{} ({:.1} > {:.1} deg)", m.joint, m.diff_deg, m.allowed_deg))
                    .collect();
                warn!(
                    "Leader not aligned after {:.1} s: {}",
                    t_now_s - self.aligning_since_s,
                    joints.join(", ")
                );
                self.last_alignment_warning_s = Some(t_now_s);
            }
        }

        false
    }

    fn transition_to(
        &mut self,
        t_now_s: f64,
        new_state: LeaderFollowerState,
    ) -> Result<(), LeaderFollowerError> {
        if new_state == self.state {
            return Ok(());
        }

        match new_state {
            LeaderFollowerState::Homing => {
                let home = DVector::from_column_slice(&self.params.home_position_rad);
                let goal = match self.params.home_duration_s {
                    Some(d) => Goal::with_duration(home, d),
                    None => Goal::new(home),
                };
                self.follower.set_goal(goal)?;
            }
            LeaderFollowerState::Aligning => {
                // The leader may have been carried across a wrap while input was lost
                if self.state == LeaderFollowerState::Disconnected {
                    self.angle_map.reset();
                }
                self.aligning_since_s = t_now_s;
                self.last_alignment_warning_s = None;
                self.report = AlignmentReport::default();
            }
            LeaderFollowerState::Exit => self.follower.cancel_goal(),
            _ => (),
        }

        info!("LeaderFollowerCtrl: {:?} -> {:?}", self.state, new_state);
        self.state = new_state;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::{MockArm, MockLeader};

    fn params() -> Params {
        Params {
            angle_offsets_rad: vec![0.0, 0.5, 0.0],
            home_position_rad: vec![0.0, -1.0, 0.0],
            home_duration_s: Some(2.0),
            allowed_diff_deg: vec![30.0, 20.0, 30.0],
            alignment_timeout_s: 10.0,
            alignment_warning_period_s: 2.0,
            disconnect_timeout_s: 1.0,
            follow_duration_s: None,
        }
    }

    fn leader_at(raw: &[f64]) -> MockLeader {
        MockLeader {
            num_joints: 3,
            position_rad: Some(DVector::from_column_slice(raw)),
        }
    }

    /// Build a controller and run it through homing, leaving it aligning at t = 0.01 s.
    fn aligning(leader: MockLeader) -> LeaderFollowerCtrl<MockLeader, MockArm> {
        let follower = MockArm::new(3).at(&[0.0, -1.0, 0.0]);
        let mut ctrl = LeaderFollowerCtrl::new(params(), leader, follower).unwrap();

        ctrl.update(0.0, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Homing);
        assert_eq!(ctrl.follower().goals[0].duration_s, Some(2.0));

        ctrl.follower_mut().at_goal = true;
        ctrl.update(0.01, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Aligning);

        ctrl
    }

    #[test]
    fn test_aligned_leader_starts_following() {
        // Mapped leader is [0.1, -1.0, 0.0], within tolerance of the follower at home
        let mut ctrl = aligning(leader_at(&[0.1, -1.5, 0.0]));

        ctrl.update(0.02, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);

        ctrl.update(0.03, true).unwrap();
        let goal = ctrl.follower().goals.last().unwrap();
        assert!((goal.position_rad.clone() - DVector::from_vec(vec![0.1, -1.0, 0.0])).norm() < 1e-12);
        assert_eq!(goal.duration_s, None);
    }

    #[test]
    fn test_misaligned_joint_waits() {
        let leader = leader_at(&[31f64.to_radians(), -1.5, 0.0]);
        let mut ctrl = aligning(leader);

        for i in 0..5 {
            ctrl.update(0.02 + i as f64 * 0.01, true).unwrap();
        }

        assert_eq!(ctrl.state(), LeaderFollowerState::Aligning);
        let report = ctrl.alignment_report();
        assert_eq!(report.out_of_tolerance.len(), 1);
        assert_eq!(report.out_of_tolerance[0].joint, 0);
        assert!((report.out_of_tolerance[0].diff_deg - 31.0).abs() < 1e-9);
        assert_eq!(report.out_of_tolerance[0].allowed_deg, 30.0);
        assert!(!report.timed_out);

        // Timing out is reported but never fatal
        assert!(ctrl.update(11.0, true).unwrap());
        assert!(ctrl.alignment_report().timed_out);
        assert_eq!(ctrl.state(), LeaderFollowerState::Aligning);

        // Bringing the leader into tolerance starts following
        ctrl.leader_mut().position_rad = Some(DVector::from_vec(vec![0.0, -1.5, 0.0]));
        ctrl.update(11.01, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);
    }

    #[test]
    fn test_missing_leader_skips_command() {
        let mut ctrl = aligning(leader_at(&[0.0, -1.5, 0.0]));
        ctrl.update(0.02, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);
        let num_goals = ctrl.follower().goals.len();

        ctrl.leader_mut().position_rad = None;
        ctrl.update(0.03, true).unwrap();

        assert_eq!(ctrl.follower().goals.len(), num_goals);
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);
    }

    #[test]
    fn test_disconnect_requires_realignment() {
        let mut ctrl = aligning(leader_at(&[0.0, -1.5, 0.0]));
        ctrl.update(0.02, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);

        ctrl.update(1.0, false).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);

        ctrl.update(1.5, false).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Disconnected);
        let num_goals = ctrl.follower().goals.len();

        ctrl.update(1.6, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Aligning);
        assert_eq!(ctrl.follower().goals.len(), num_goals);

        ctrl.update(1.7, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);
    }

    #[test]
    fn test_reconnect_reseeds_angle_map() {
        let mut ctrl = aligning(leader_at(&[0.0, -1.5, 0.0]));
        ctrl.update(0.02, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Following);

        // Carry the first joint across the wrap, unwrapped it is now past pi
        ctrl.leader_mut().position_rad = Some(DVector::from_vec(vec![3.0, -1.5, 0.0]));
        ctrl.update(0.03, true).unwrap();
        ctrl.leader_mut().position_rad = Some(DVector::from_vec(vec![-3.0, -1.5, 0.0]));
        ctrl.update(0.04, true).unwrap();
        let goal = ctrl.follower().goals.last().unwrap();
        assert!((goal.position_rad[0] - (2.0 * std::f64::consts::PI - 3.0)).abs() < 1e-9);

        ctrl.update(1.5, false).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Disconnected);
        ctrl.update(1.6, true).unwrap();
        assert_eq!(ctrl.state(), LeaderFollowerState::Aligning);

        // After realigning starts the raw reading is taken as-is
        ctrl.update(1.7, true).unwrap();
        let report = ctrl.alignment_report();
        assert_eq!(report.out_of_tolerance.len(), 1);
        assert!((report.out_of_tolerance[0].diff_deg - 3f64.to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_exit_cancels() {
        let mut ctrl = aligning(leader_at(&[0.0, -1.5, 0.0]));
        ctrl.request_exit();

        assert!(!ctrl.update(0.02, true).unwrap());
        assert!(!ctrl.update(0.03, true).unwrap());
        assert_eq!(ctrl.state(), LeaderFollowerState::Exit);
        assert_eq!(ctrl.follower().num_cancels, 1);
    }

    #[test]
    fn test_joint_counts_checked() {
        let leader = MockLeader {
            num_joints: 2,
            position_rad: None,
        };
        assert!(matches!(
            LeaderFollowerCtrl::new(params(), leader, MockArm::new(3)),
            Err(LeaderFollowerError::InvalidParams(_))
        ));

        let p = Params {
            allowed_diff_deg: vec![30.0],
            ..params()
        };
        assert!(matches!(
            LeaderFollowerCtrl::new(p, leader_at(&[0.0; 3]), MockArm::new(3)),
            Err(LeaderFollowerError::InvalidParams(_))
        ));
    }
}
