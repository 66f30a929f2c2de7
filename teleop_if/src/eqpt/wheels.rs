//! # Wheel group interface

use super::EqptError;

/// Index of the left wheel in a wheel velocity demand.
pub const LEFT_WHEEL: usize = 0;

/// Index of the right wheel in a wheel velocity demand.
pub const RIGHT_WHEEL: usize = 1;

/// The two drive wheels of a differential drive robot.
pub trait WheelGroup {
    /// Send a velocity demand to the wheels, indexed by [`LEFT_WHEEL`] and [`RIGHT_WHEEL`].
    ///
    /// Units: radians/second
    fn send_velocity(&mut self, velocity_rads: [f64; 2]) -> Result<(), EqptError>;
}
