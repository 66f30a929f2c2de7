//! Mock equipment for unit tests

use std::cell::RefCell;

use nalgebra::{DVector, Rotation3, Vector3};

use teleop_if::eqpt::{
    Arm, EqptError, Goal, Gripper, Kinematics, KinematicsError, LeaderArm, Pose,
};

/// Gripper recording every command it is given.
#[derive(Debug, Default)]
pub struct MockGripper {
    pub closed_fraction: f64,
    pub commands: Vec<f64>,
}

/// Arm recording goals, cancels and sends.
///
/// Forward kinematics places the end effector at the first three joint positions with identity
/// orientation. Inverse kinematics overwrites the first three joints of the seed with the target.
#[derive(Debug)]
pub struct MockArm {
    pub position_rad: DVector<f64>,
    pub commanded_rad: DVector<f64>,
    pub at_goal: bool,
    pub goals: Vec<Goal>,
    pub num_cancels: usize,
    pub num_sends: usize,
    pub ik_fails: bool,
    pub last_ik_target: RefCell<Option<Vector3<f64>>>,
    pub gripper: Option<MockGripper>,
}

/// Leader arm returning a fixed position, or nothing when `position_rad` is `None`.
#[derive(Debug)]
pub struct MockLeader {
    pub num_joints: usize,
    pub position_rad: Option<DVector<f64>>,
}

impl Gripper for MockGripper {
    fn closed_fraction(&self) -> f64 {
        self.closed_fraction
    }

    fn set_closed_fraction(&mut self, fraction: f64) {
        self.closed_fraction = fraction;
        self.commands.push(fraction);
    }
}

impl MockArm {
    pub fn new(num_joints: usize) -> Self {
        Self {
            position_rad: DVector::zeros(num_joints),
            commanded_rad: DVector::zeros(num_joints),
            at_goal: false,
            goals: Vec::new(),
            num_cancels: 0,
            num_sends: 0,
            ik_fails: false,
            last_ik_target: RefCell::new(None),
            gripper: None,
        }
    }

    pub fn with_gripper(mut self) -> Self {
        self.gripper = Some(MockGripper::default());
        self
    }

    pub fn at(mut self, position_rad: &[f64]) -> Self {
        self.position_rad = DVector::from_column_slice(position_rad);
        self.commanded_rad = self.position_rad.clone();
        self
    }

    pub fn gripper_commands(&self) -> Vec<f64> {
        self.gripper
            .as_ref()
            .map(|g| g.commands.clone())
            .unwrap_or_default()
    }
}

impl Kinematics for MockArm {
    fn forward_kinematics(&self, positions_rad: &DVector<f64>) -> Pose {
        Pose {
            position_m: Vector3::new(positions_rad[0], positions_rad[1], positions_rad[2]),
            orientation: Rotation3::identity(),
        }
    }

    fn inverse_kinematics(
        &self,
        seed_rad: &DVector<f64>,
        target_position_m: &Vector3<f64>,
        _target_orientation: &Rotation3<f64>,
    ) -> Result<DVector<f64>, KinematicsError> {
        *self.last_ik_target.borrow_mut() = Some(*target_position_m);

        if self.ik_fails {
            return Err(KinematicsError::NoSolution(*target_position_m));
        }

        let mut solution = seed_rad.clone();
        solution.fixed_rows_mut::<3>(0).copy_from(target_position_m);
        Ok(solution)
    }
}

impl Arm for MockArm {
    fn num_joints(&self) -> usize {
        self.position_rad.len()
    }

    fn update(&mut self) -> Result<(), EqptError> {
        Ok(())
    }

    fn send(&mut self) -> Result<(), EqptError> {
        self.num_sends += 1;
        Ok(())
    }

    fn position(&self) -> DVector<f64> {
        self.position_rad.clone()
    }

    fn commanded_position(&self) -> DVector<f64> {
        self.commanded_rad.clone()
    }

    fn at_goal(&self) -> bool {
        self.at_goal
    }

    fn set_goal(&mut self, goal: Goal) -> Result<(), EqptError> {
        self.commanded_rad = goal.position_rad.clone();
        self.goals.push(goal);
        Ok(())
    }

    fn cancel_goal(&mut self) {
        self.num_cancels += 1;
    }

    fn end_effector(&mut self) -> Option<&mut dyn Gripper> {
        self.gripper.as_mut().map(|g| g as &mut dyn Gripper)
    }
}

impl LeaderArm for MockLeader {
    fn num_joints(&self) -> usize {
        self.num_joints
    }

    fn read_position(&mut self) -> Option<DVector<f64>> {
        self.position_rad.clone()
    }
}
