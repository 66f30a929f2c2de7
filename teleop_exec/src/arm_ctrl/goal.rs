//! Goal computation
//!
//! Converts the displacement carried by an [`InputSample`] into a joint-space goal for the arm.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use nalgebra::DVector;

// Internal
use super::WorkspaceLimits;
use crate::input::{InputSample, MotionMode};
use teleop_if::eqpt::{Goal, Kinematics, KinematicsError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Computes teleoperation goals.
#[derive(Debug, Clone, Copy)]
pub struct GoalComputer {
    workspace: WorkspaceLimits,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GoalError {
    #[error("Inverse kinematics failed: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("Sample has {found} joints but the arm has {expected}")]
    JointCountMismatch { expected: usize, found: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalComputer {
    pub fn new(workspace: WorkspaceLimits) -> Self {
        Self { workspace }
    }

    /// Compute the goal for one sample.
    ///
    /// `current_rad` should be the arm's last commanded position, so that successive goals build on
    /// each other rather than lagging behind the measured position.
    ///
    /// Returns `Ok(None)` when the sample carries no motion or the operator has not enabled
    /// teleoperation.
    pub fn compute<K>(
        &self,
        kinematics: &K,
        current_rad: &DVector<f64>,
        sample: &InputSample,
    ) -> Result<Option<Goal>, GoalError>
    where
        K: Kinematics + ?Sized,
    {
        if !sample.active {
            return Ok(None);
        }

        match sample.mode {
            MotionMode::None => Ok(None),
            MotionMode::Joint => {
                if sample.joint_displacement_rad.len() != current_rad.len() {
                    return Err(GoalError::JointCountMismatch {
                        expected: current_rad.len(),
                        found: sample.joint_displacement_rad.len(),
                    });
                }

                Ok(Some(Goal::new(current_rad + &sample.joint_displacement_rad)))
            }
            MotionMode::Cartesian => {
                let pose = kinematics.forward_kinematics(current_rad);
                let target_m = pose.position_m + sample.cartesian_displacement_m;

                let (target_m, limited) = self.workspace.clamp(&target_m);
                if limited.iter().any(|l| *l) {
                    debug!("Cartesian target limited on axes {:?}", limited);
                }

                // Orientation is held at the current value
                let position_rad =
                    kinematics.inverse_kinematics(current_rad, &target_m, &pose.orientation)?;

                Ok(Some(Goal::new(position_rad)))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockArm;
    use nalgebra::Vector3;

    fn computer() -> GoalComputer {
        GoalComputer::new(WorkspaceLimits {
            max_abs_x_m: 0.5,
            max_abs_y_m: 0.5,
            min_z_m: 0.0,
            max_z_m: 1.0,
        })
    }

    #[test]
    fn test_none_mode() {
        let arm = MockArm::new(6);
        let sample = InputSample::new(6);

        assert_eq!(computer().compute(&arm, &DVector::zeros(6), &sample), Ok(None));
    }

    #[test]
    fn test_joint_mode() {
        let arm = MockArm::new(4);
        let current = DVector::from_vec(vec![0.1, 0.2, 0.3, 0.4]);
        let mut sample = InputSample::new(4);
        sample.active = true;
        sample.mode = MotionMode::Joint;
        sample.joint_displacement_rad = DVector::from_vec(vec![0.0, 0.0, 0.01, -0.02]);

        let goal = computer().compute(&arm, &current, &sample).unwrap().unwrap();

        assert!((goal.position_rad - DVector::from_vec(vec![0.1, 0.2, 0.31, 0.38])).norm() < 1e-12);
        assert_eq!(goal.duration_s, None);

        sample.joint_displacement_rad = DVector::zeros(6);
        assert!(matches!(
            computer().compute(&arm, &current, &sample),
            Err(GoalError::JointCountMismatch { expected: 4, found: 6 })
        ));
    }

    #[test]
    fn test_cartesian_target_clamped() {
        let arm = MockArm::new(6);
        let current = DVector::from_vec(vec![0.45, 0.0, 0.5, 0.0, 0.0, 0.0]);
        let mut sample = InputSample::new(6);
        sample.active = true;
        sample.mode = MotionMode::Cartesian;
        sample.cartesian_displacement_m = Vector3::new(0.15, 0.0, 0.0);

        let goal = computer().compute(&arm, &current, &sample).unwrap().unwrap();

        assert_eq!(*arm.last_ik_target.borrow(), Some(Vector3::new(0.5, 0.0, 0.5)));
        assert_eq!(goal.position_rad[0], 0.5);
    }

    #[test]
    fn test_ik_failure() {
        let mut arm = MockArm::new(6);
        arm.ik_fails = true;
        let mut sample = InputSample::new(6);
        sample.active = true;
        sample.mode = MotionMode::Cartesian;
        sample.cartesian_displacement_m = Vector3::new(0.0, 0.0, 0.01);

        assert!(matches!(
            computer().compute(&arm, &DVector::zeros(6), &sample),
            Err(GoalError::Kinematics(KinematicsError::NoSolution(_)))
        ));
    }

    #[test]
    fn test_inactive_gives_no_goal() {
        let arm = MockArm::new(4);
        let current = DVector::zeros(4);

        let mut joint = InputSample::new(4);
        joint.mode = MotionMode::Joint;
        joint.joint_displacement_rad = DVector::from_vec(vec![0.0, 0.0, 0.01, 0.0]);

        let mut cartesian = InputSample::new(4);
        cartesian.mode = MotionMode::Cartesian;
        cartesian.cartesian_displacement_m = Vector3::new(0.0, 0.0, 0.01);

        for sample in [joint, cartesian] {
            assert_eq!(computer().compute(&arm, &current, &sample), Ok(None));
        }

        // No kinematics are evaluated for an inactive sample
        assert_eq!(*arm.last_ik_target.borrow(), None);
    }
}
