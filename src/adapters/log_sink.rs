//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (env_logger on the host, the board logger on target).
//! A telemetry radio adapter would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::timers::MachineId;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | t={}ms | {:?}/{} | drive L={} R={} C={} | dispatched={} pending={}",
                    t.uptime_ms,
                    t.state,
                    t.substate,
                    t.commands.left,
                    t.commands.right,
                    t.commands.cannon,
                    t.dispatched,
                    t.pending,
                );
            }
            AppEvent::StateChanged {
                machine: MachineId::Robot,
                from,
                to,
            } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::StateChanged { machine, from, to } => {
                debug!("STATE | {:?}: {} -> {}", machine, from, to);
            }
            AppEvent::TimeoutRejected { timer, owner } => {
                warn!("TIMER | rejected {:?} owned by {:?}", timer, owner);
            }
            AppEvent::EventDropped(ev) => {
                warn!("BUS   | dropped {:?}", ev);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
