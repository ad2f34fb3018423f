//! Application core: pure domain orchestration, zero I/O.
//!
//! This module wires the behaviour hierarchy to the event bus, the timer
//! bank and the sensor checkers.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
