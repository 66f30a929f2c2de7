//! Simulated arm
//!
//! A base yaw joint followed by a shoulder/elbow pair working in the vertical plane, then wrist
//! joints. Joints move towards the current goal at a limited rate with ideal tracking.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::{DVector, Rotation3, Vector3};
use serde::Deserialize;

// Internal
use super::{SimError, SimGripper};
use teleop_if::eqpt::{Arm, EqptError, Goal, Gripper, Kinematics, KinematicsError, Pose};
use util::{maths::wrap_pi, params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Joints the kinematic model needs: base yaw, shoulder and elbow.
pub const MIN_SIM_JOINTS: usize = 3;

const BASE: usize = 0;
const SHOULDER: usize = 1;
const ELBOW: usize = 2;
const WRIST_PITCH: usize = 3;
const WRIST_ROLL: usize = 4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated arm.
#[derive(Debug, Clone, Deserialize)]
pub struct SimArmParams {
    pub num_joints: usize,

    // ---- GEOMETRY ----

    /// Height of the shoulder joint above the base frame origin.
    ///
    /// Units: meters
    pub base_height_m: f64,

    /// Units: meters
    pub shoulder_length_m: f64,

    /// Units: meters
    pub elbow_length_m: f64,

    // ---- MOTION ----

    /// Maximum rate of any joint.
    ///
    /// Units: radians/second
    pub max_joint_rate_rads: f64,

    /// Time simulated by each call to `update`. Should match the control loop period.
    ///
    /// Units: seconds
    pub step_s: f64,

    /// Units: radians
    #[serde(default = "default_at_goal_tolerance_rad")]
    pub at_goal_tolerance_rad: f64,

    /// Starting joint positions, zero if not given.
    ///
    /// Units: radians
    #[serde(default)]
    pub initial_position_rad: Option<Vec<f64>>,

    #[serde(default)]
    pub has_gripper: bool,
}

/// Simulated arm.
#[derive(Debug, Clone)]
pub struct SimArm {
    params: SimArmParams,

    position_rad: DVector<f64>,

    goal: Option<Goal>,

    /// Rate each joint moves at towards the current goal.
    rates_rads: DVector<f64>,

    gripper: Option<SimGripper>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

fn default_at_goal_tolerance_rad() -> f64 {
    1e-3
}

impl SimArm {
    pub fn new(params: SimArmParams) -> Result<Self, SimError> {
        if params.num_joints < MIN_SIM_JOINTS {
            return Err(SimError::InvalidParams(format!(
                "the simulated arm needs at least {} joints, got {}",
                MIN_SIM_JOINTS, params.num_joints
            )));
        }
        if params.shoulder_length_m <= 0.0 || params.elbow_length_m <= 0.0 {
            return Err(SimError::InvalidParams("link lengths must be positive".into()));
        }
        if params.max_joint_rate_rads <= 0.0 || params.step_s <= 0.0 {
            return Err(SimError::InvalidParams(
                "max_joint_rate_rads and step_s must be positive".into(),
            ));
        }

        let position_rad = match &params.initial_position_rad {
            Some(p) if p.len() == params.num_joints => DVector::from_column_slice(p),
            Some(p) => {
                return Err(SimError::InvalidParams(format!(
                    "initial position has {} joints but the arm has {}",
                    p.len(),
                    params.num_joints
                )))
            }
            None => DVector::zeros(params.num_joints),
        };

        Ok(Self {
            rates_rads: DVector::zeros(params.num_joints),
            gripper: params.has_gripper.then(SimGripper::default),
            position_rad,
            goal: None,
            params,
        })
    }

    /// Create a new arm, loading the parameters from the given file in the params directory.
    pub fn from_param_file(param_file: &str) -> Result<Self, SimError> {
        let params: SimArmParams = params::load(param_file).map_err(SimError::ParamLoad)?;
        Self::new(params)
    }

    pub fn params(&self) -> &SimArmParams {
        &self.params
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    /// Shoulder and elbow angles placing the elbow-end at `(r, h)` in the arm plane, one for each
    /// elbow configuration.
    fn planar_solutions(&self, r_m: f64, h_m: f64) -> Option<[(f64, f64); 2]> {
        let l1 = self.params.shoulder_length_m;
        let l2 = self.params.elbow_length_m;

        let dist_sq = r_m.powi(2) + h_m.powi(2);
        let dist = dist_sq.sqrt();

        // Target must lie in the annulus the two links can reach
        if dist > l1 + l2 + 1e-9 || dist < (l1 - l2).abs() - 1e-9 {
            return None;
        }

        let cos_elbow = ((dist_sq - l1.powi(2) - l2.powi(2)) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
        let elbow = cos_elbow.acos();

        let solve = |elbow_rad: f64| {
            let shoulder_rad = h_m.atan2(r_m)
                - (l2 * elbow_rad.sin()).atan2(l1 + l2 * elbow_rad.cos());
            (shoulder_rad, elbow_rad)
        };

        Some([solve(elbow), solve(-elbow)])
    }
}

impl Kinematics for SimArm {
    fn forward_kinematics(&self, positions_rad: &DVector<f64>) -> Pose {
        let joint = |i: usize| positions_rad.get(i).copied().unwrap_or(0.0);

        let l1 = self.params.shoulder_length_m;
        let l2 = self.params.elbow_length_m;

        let shoulder = joint(SHOULDER);
        let elbow = joint(ELBOW);

        let r_m = l1 * shoulder.cos() + l2 * (shoulder + elbow).cos();
        let h_m = l1 * shoulder.sin() + l2 * (shoulder + elbow).sin();

        let yaw = joint(BASE);
        let pitch = shoulder + elbow + joint(WRIST_PITCH);

        Pose {
            position_m: Vector3::new(
                r_m * yaw.cos(),
                r_m * yaw.sin(),
                self.params.base_height_m + h_m,
            ),
            orientation: Rotation3::from_axis_angle(&Vector3::z_axis(), yaw)
                * Rotation3::from_axis_angle(&Vector3::y_axis(), -pitch)
                * Rotation3::from_axis_angle(&Vector3::x_axis(), joint(WRIST_ROLL)),
        }
    }

    /// Solve for the base, shoulder and elbow, keeping the end effector pitch of the seed.
    ///
    /// Of the two elbow configurations the one whose shoulder angle is closest to the seed's is
    /// chosen, so the arm does not flip between configurations. Wrist roll and any further joints
    /// are copied from the seed.
    fn inverse_kinematics(
        &self,
        seed_rad: &DVector<f64>,
        target_position_m: &Vector3<f64>,
        _target_orientation: &Rotation3<f64>,
    ) -> Result<DVector<f64>, KinematicsError> {
        if seed_rad.len() != self.params.num_joints {
            return Err(KinematicsError::JointCountMismatch {
                expected: self.params.num_joints,
                found: seed_rad.len(),
            });
        }

        let r_m = target_position_m.xy().norm();
        let h_m = target_position_m.z - self.params.base_height_m;

        // Directly above the base the yaw is free, keep the seed's
        let yaw = if r_m < 1e-9 {
            seed_rad[BASE]
        } else {
            seed_rad[BASE] + wrap_pi(target_position_m.y.atan2(target_position_m.x) - seed_rad[BASE])
        };

        let solutions = self
            .planar_solutions(r_m, h_m)
            .ok_or(KinematicsError::NoSolution(*target_position_m))?;

        let (shoulder, elbow) = if (solutions[0].0 - seed_rad[SHOULDER]).abs()
            <= (solutions[1].0 - seed_rad[SHOULDER]).abs()
        {
            solutions[0]
        } else {
            solutions[1]
        };

        let mut solution = seed_rad.clone();
        solution[BASE] = yaw;
        solution[SHOULDER] = shoulder;
        solution[ELBOW] = elbow;

        if self.params.num_joints > WRIST_PITCH {
            let seed_pitch = seed_rad[SHOULDER] + seed_rad[ELBOW] + seed_rad[WRIST_PITCH];
            solution[WRIST_PITCH] = seed_pitch - shoulder - elbow;
        }

        Ok(solution)
    }
}

impl Arm for SimArm {
    fn num_joints(&self) -> usize {
        self.params.num_joints
    }

    /// Advance the simulation by one step.
    fn update(&mut self) -> Result<(), EqptError> {
        let goal = match &self.goal {
            Some(g) => g,
            None => return Ok(()),
        };

        for i in 0..self.params.num_joints {
            let max_step = self.rates_rads[i] * self.params.step_s;
            let error = goal.position_rad[i] - self.position_rad[i];
            self.position_rad[i] += util::maths::clamp(error, -max_step, max_step);
        }

        Ok(())
    }

    fn send(&mut self) -> Result<(), EqptError> {
        trace!("SimArm position: {:?}", self.position_rad.as_slice());

        if let Some(g) = self.gripper.as_mut() {
            g.send()?;
        }

        Ok(())
    }

    fn position(&self) -> DVector<f64> {
        self.position_rad.clone()
    }

    fn commanded_position(&self) -> DVector<f64> {
        match &self.goal {
            Some(g) => g.position_rad.clone(),
            None => self.position_rad.clone(),
        }
    }

    fn at_goal(&self) -> bool {
        match &self.goal {
            Some(g) => (&g.position_rad - &self.position_rad).amax() <= self.params.at_goal_tolerance_rad,
            None => true,
        }
    }

    fn set_goal(&mut self, goal: Goal) -> Result<(), EqptError> {
        if goal.position_rad.len() != self.params.num_joints {
            return Err(EqptError::InvalidGoal {
                expected: self.params.num_joints,
                found: goal.position_rad.len(),
            });
        }

        let max_rate = self.params.max_joint_rate_rads;

        // With a duration every joint arrives together, limited by the fastest allowed joint
        self.rates_rads = match goal.duration_s {
            Some(d) if d > 0.0 => (&goal.position_rad - &self.position_rad)
                .map(|e| (e.abs() / d).min(max_rate)),
            _ => DVector::from_element(self.params.num_joints, max_rate),
        };

        if let Some(d) = goal.duration_s {
            debug!("SimArm goal over {:.2} s: {:?}", d, goal.position_rad.as_slice());
        }

        self.goal = Some(goal);

        Ok(())
    }

    fn cancel_goal(&mut self) {
        self.goal = None;
    }

    fn end_effector(&mut self) -> Option<&mut dyn Gripper> {
        self.gripper.as_mut().map(|g| g as &mut dyn Gripper)
    }
}
