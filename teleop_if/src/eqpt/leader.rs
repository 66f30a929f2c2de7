//! # Leader arm interface
//!
//! A leader arm is an unpowered input arm (for example a MAPS arm) moved by hand. Only its joint
//! positions are read.

use nalgebra::DVector;

/// An input arm whose joint positions drive a follower.
pub trait LeaderArm {
    /// Number of joints reported by the leader.
    fn num_joints(&self) -> usize;

    /// Raw joint positions in the leader's own zero convention, or `None` if no feedback
    /// arrived this cycle.
    ///
    /// Units: radians
    fn read_position(&mut self) -> Option<DVector<f64>>;
}
