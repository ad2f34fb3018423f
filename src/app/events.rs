//! Outbound application events.
//!
//! The [`RobotService`](super::service::RobotService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, record them in a test, or
//! forward them to a telemetry link.

use crate::events::Event;
use crate::fsm::context::DriveCommands;
use crate::fsm::robot::TopState;
use crate::timers::{MachineId, TimerId};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The hierarchy was (re)started and entered this top state.
    Started(TopState),

    /// A machine in the hierarchy transitioned between states.
    StateChanged {
        machine: MachineId,
        from: &'static str,
        to: &'static str,
    },

    /// A timeout reached a machine that did not arm it and was dropped.
    TimeoutRejected {
        timer: TimerId,
        owner: Option<MachineId>,
    },

    /// The event bus was full.
    EventDropped(Event),

    /// Point-in-time status, emitted on request.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryData {
    pub uptime_ms: u64,
    pub state: TopState,
    pub substate: &'static str,
    pub commands: DriveCommands,
    pub dispatched: u64,
    pub pending: usize,
}
