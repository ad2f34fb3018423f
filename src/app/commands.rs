//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator
//! console, test harness, simulator script) that the
//! [`RobotService`](super::service::RobotService) interprets and acts upon.

use crate::config::RobotConfig;
use crate::events::Event;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Dispatch an event immediately, bypassing the queue (debug / testing).
    Inject(Event),

    /// Stop everything and restart the hierarchy from Lookout.
    Restart,

    /// Hot-reload configuration.  Durations apply to timers armed after
    /// the update; sensor thresholds apply from the next poll.
    UpdateConfig(RobotConfig),
}
