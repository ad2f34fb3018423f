//! embedded-hal drivers for the robot's motors and switches.

pub mod bumpers;
pub mod motor;
