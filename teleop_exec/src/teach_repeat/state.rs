//! Implementations for the teach and repeat controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use super::{Params, TeachRepeatError, Waypoint};
use teleop_if::{
    eqpt::{Arm, Goal, Gripper},
    tc::{RunMode, TeachRepeatCmd, TeachRepeatStatus},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TeachRepeatCtrl<A: Arm> {
    params: Params,

    arm: A,

    waypoints: Vec<Waypoint>,

    mode: RunMode,

    /// Next waypoint to command during playback.
    playback_index: usize,

    quit: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A: Arm> TeachRepeatCtrl<A> {
    pub fn new(params: Params, arm: A) -> Self {
        Self {
            params,
            arm,
            waypoints: Vec::new(),
            mode: RunMode::Training,
            playback_index: 0,
            quit: false,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn arm(&self) -> &A {
        &self.arm
    }

    pub fn arm_mut(&mut self) -> &mut A {
        &mut self.arm
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn status(&self, last_cmd_accepted: bool) -> TeachRepeatStatus {
        TeachRepeatStatus {
            mode: self.mode,
            num_waypoints: self.waypoints.len(),
            playback_index: self.playback_index,
            last_cmd_accepted,
        }
    }

    /// Handle one command, returning the status afterwards.
    pub fn handle_cmd(&mut self, cmd: TeachRepeatCmd) -> Result<TeachRepeatStatus, TeachRepeatError> {
        let accepted = match (cmd, self.mode) {
            (TeachRepeatCmd::Quit, _) => {
                info!("Quit requested");
                self.arm.cancel_goal();
                self.quit = true;
                true
            }
            (TeachRepeatCmd::AddWaypoint, RunMode::Training) => {
                self.record(self.params.waypoint_duration_s);
                info!("Added waypoint {}", self.waypoints.len());
                true
            }
            (TeachRepeatCmd::AddWaypointToggle, RunMode::Training) => {
                self.record(self.params.waypoint_duration_s);

                match self.arm.end_effector() {
                    Some(g) => g.toggle(),
                    None => warn!("No gripper to toggle"),
                }

                self.record(self.params.toggle_duration_s);
                info!("Added gripper toggle, now {} waypoints", self.waypoints.len());
                true
            }
            (TeachRepeatCmd::ClearWaypoints, RunMode::Training) => {
                self.waypoints.clear();
                info!("Cleared waypoints");
                true
            }
            (TeachRepeatCmd::StartPlayback, RunMode::Training) => {
                if self.waypoints.len() > 1 {
                    info!("Starting playback of {} waypoints", self.waypoints.len());
                    self.mode = RunMode::Playback;
                    self.playback_index = 0;
                    if let Some(g) = self.arm.end_effector() {
                        g.open();
                    }
                    self.arm.send()?;
                    true
                } else {
                    warn!("At least two waypoints are needed for playback");
                    false
                }
            }
            (TeachRepeatCmd::ReturnToTraining, RunMode::Playback) => {
                info!("Returning to training");
                self.mode = RunMode::Training;
                self.arm.cancel_goal();
                true
            }
            (cmd, mode) => {
                warn!("Ignoring {:?}, not allowed in {:?} mode", cmd, mode);
                false
            }
        };

        Ok(self.status(accepted))
    }

    /// Run one control cycle. Returns false once quit has been handled.
    pub fn update(&mut self) -> Result<bool, TeachRepeatError> {
        self.arm.update()?;

        if self.mode == RunMode::Playback && self.arm.at_goal() {
            if self.playback_index >= self.waypoints.len() {
                self.playback_index = 0;
            }

            if let Some(waypoint) = self.waypoints.get(self.playback_index) {
                info!("Heading to waypoint {}", self.playback_index);

                self.arm.set_goal(Goal::with_duration(
                    waypoint.position_rad.clone(),
                    waypoint.duration_s,
                ))?;

                if let (Some(state), Some(g)) = (waypoint.gripper, self.arm.end_effector()) {
                    g.set_state(state);
                }

                self.playback_index += 1;
            }
        }

        self.arm.send()?;

        Ok(!self.quit)
    }

    fn record(&mut self, duration_s: f64) {
        let gripper = self.arm.end_effector().map(|g| g.state());

        self.waypoints.push(Waypoint {
            position_rad: self.arm.position(),
            duration_s,
            gripper,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockArm;
    use teleop_if::eqpt::GripperState;

    fn ctrl() -> TeachRepeatCtrl<MockArm> {
        TeachRepeatCtrl::new(Params::default(), MockArm::new(3).with_gripper())
    }

    #[test]
    fn test_record_waypoints() {
        let mut c = ctrl();
        c.arm_mut().position_rad[0] = 0.5;

        let status = c.handle_cmd(TeachRepeatCmd::AddWaypoint).unwrap();
        assert!(status.last_cmd_accepted);
        assert_eq!(status.num_waypoints, 1);
        assert_eq!(c.waypoints()[0].position_rad[0], 0.5);
        assert_eq!(c.waypoints()[0].duration_s, 5.0);
        assert_eq!(c.waypoints()[0].gripper, Some(GripperState::Open));

        c.handle_cmd(TeachRepeatCmd::AddWaypointToggle).unwrap();
        assert_eq!(c.waypoints().len(), 3);
        assert_eq!(c.waypoints()[1].gripper, Some(GripperState::Open));
        assert_eq!(c.waypoints()[2].gripper, Some(GripperState::Closed));
        assert_eq!(c.waypoints()[2].duration_s, 2.0);

        c.handle_cmd(TeachRepeatCmd::ClearWaypoints).unwrap();
        assert!(c.waypoints().is_empty());
    }

    #[test]
    fn test_playback_needs_two_waypoints() {
        let mut c = ctrl();
        c.handle_cmd(TeachRepeatCmd::AddWaypoint).unwrap();

        let status = c.handle_cmd(TeachRepeatCmd::StartPlayback).unwrap();
        assert!(!status.last_cmd_accepted);
        assert_eq!(status.mode, RunMode::Training);
    }

    #[test]
    fn test_playback_loops() {
        let mut c = ctrl();
        for i in 0..3 {
            c.arm_mut().position_rad[1] = i as f64;
            c.handle_cmd(TeachRepeatCmd::AddWaypoint).unwrap();
        }

        let status = c.handle_cmd(TeachRepeatCmd::StartPlayback).unwrap();
        assert!(status.last_cmd_accepted);
        assert_eq!(status.mode, RunMode::Playback);

        // Not at goal, nothing commanded
        c.update().unwrap();
        assert!(c.arm().goals.is_empty());

        c.arm_mut().at_goal = true;
        for _ in 0..4 {
            c.update().unwrap();
        }

        let targets: Vec<f64> = c.arm().goals.iter().map(|g| g.position_rad[1]).collect();
        assert_eq!(targets, vec![0.0, 1.0, 2.0, 0.0]);
        assert!(c.arm().goals.iter().all(|g| g.duration_s == Some(5.0)));
    }

    #[test]
    fn test_mode_rules() {
        let mut c = ctrl();
        assert!(!c.handle_cmd(TeachRepeatCmd::ReturnToTraining).unwrap().last_cmd_accepted);

        c.handle_cmd(TeachRepeatCmd::AddWaypoint).unwrap();
        c.handle_cmd(TeachRepeatCmd::AddWaypoint).unwrap();
        c.handle_cmd(TeachRepeatCmd::StartPlayback).unwrap();

        for cmd in [
            TeachRepeatCmd::AddWaypoint,
            TeachRepeatCmd::AddWaypointToggle,
            TeachRepeatCmd::ClearWaypoints,
            TeachRepeatCmd::StartPlayback,
        ] {
            assert!(!c.handle_cmd(cmd).unwrap().last_cmd_accepted);
        }
        assert_eq!(c.waypoints().len(), 2);

        let status = c.handle_cmd(TeachRepeatCmd::ReturnToTraining).unwrap();
        assert!(status.last_cmd_accepted);
        assert_eq!(status.mode, RunMode::Training);
        assert_eq!(c.arm().num_cancels, 1);
    }

    #[test]
    fn test_quit() {
        let mut c = ctrl();
        assert!(c.update().unwrap());
        assert!(c.handle_cmd(TeachRepeatCmd::Quit).unwrap().last_cmd_accepted);
        assert!(!c.update().unwrap());
    }
}
