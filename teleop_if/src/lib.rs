//! # Teleoperation interface crate.
//!
//! Provides the data types and traits shared between the control software and
//! the equipment it drives. The equipment itself (actuator groups, mobile IO
//! devices, trajectory generation, kinematics) lives behind the traits in
//! [`eqpt`] and is provided either by a hardware backend or by the simulation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Commands sent to the control thread
pub mod tc;

/// Data types and traits for equipment (arms, grippers, input devices)
pub mod eqpt;
