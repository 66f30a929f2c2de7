//! Simulated wheels

use log::trace;

use teleop_if::eqpt::{wheels::{LEFT_WHEEL, RIGHT_WHEEL}, EqptError, WheelGroup};

/// Wheel pair which records and logs the last demand.
#[derive(Debug, Default, Clone)]
pub struct SimWheels {
    pub last_velocity_rads: [f64; 2],
    pub num_demands: u64,
}

impl WheelGroup for SimWheels {
    fn send_velocity(&mut self, velocity_rads: [f64; 2]) -> Result<(), EqptError> {
        trace!(
            "SimWheels demand: left {:.3} rad/s, right {:.3} rad/s",
            velocity_rads[LEFT_WHEEL],
            velocity_rads[RIGHT_WHEEL]
        );
        self.last_velocity_rads = velocity_rads;
        self.num_demands += 1;
        Ok(())
    }
}
