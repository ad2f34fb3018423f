//! Application service: the hexagonal core.
//!
//! [`RobotService`] owns the behaviour hierarchy, the event bus and the
//! sensor checkers.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         RobotService          │
//!   DrivePort ◀── │  timers · bus · checkers · HSM │
//!                 └──────────────────────────────┘
//! ```
//!
//! One [`step`](RobotService::step) is one pass of the cooperative loop:
//! expired timers become `Timeout` events, the sensors are polled when the
//! poll interval has elapsed, every queued event is dispatched in FIFO
//! order (signals re-posted by a dispatch included), and finally the drive
//! commands asserted by the active states are written to the motors.

use heapless::Vec;
use log::{debug, info};

use crate::config::RobotConfig;
use crate::error::Result;
use crate::events::{EVENT_QUEUE_CAP, Event, EventQueue};
use crate::fsm::context::{DriveCommands, Notice};
use crate::fsm::destroy::DestroyState;
use crate::fsm::escape::EscapeState;
use crate::fsm::pursue::PursueState;
use crate::fsm::robot::{RobotHsm, TopState};
use crate::sensors::SensorCheckers;
use crate::timers::TimerId;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{DrivePort, EventSink, SensorPort};

/// Upper bound on dispatches per step.  Anything left stays queued for the
/// next step so a chatty producer cannot stall the loop.
const MAX_DISPATCH_PER_STEP: usize = EVENT_QUEUE_CAP * 2;

// ───────────────────────────────────────────────────────────────
// RobotService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct RobotService {
    hsm: RobotHsm,
    queue: EventQueue,
    checkers: SensorCheckers,
    /// Milliseconds accumulated since the last sensor poll.
    since_poll_ms: u32,
    uptime_ms: u64,
    dispatch_count: u64,
}

impl RobotService {
    /// Construct the service from a validated configuration.
    ///
    /// Does **not** start the hierarchy; call [`start`](Self::start) next.
    pub fn new(config: RobotConfig) -> Result<Self> {
        config.validate()?;
        let checkers = SensorCheckers::new(&config);
        Ok(Self {
            hsm: RobotHsm::new(config),
            queue: EventQueue::new(),
            checkers,
            since_poll_ms: 0,
            uptime_ms: 0,
            dispatch_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Initialise every machine and enter Lookout.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.queue.clear();
        self.since_poll_ms = 0;
        self.hsm.init();
        self.collect(sink);
        sink.emit(&AppEvent::Started(self.hsm.current_state()));
        info!("RobotService started in {:?}", self.hsm.current_state());
    }

    /// Queue an event for the next step.  Returns `false` if the bus is full.
    pub fn post(&mut self, event: Event) -> bool {
        self.queue.post(event)
    }

    // ── Per-step orchestration ────────────────────────────────

    /// Run one pass of the loop: timers → sensors → dispatch → drive.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`DrivePort`]; this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn step(
        &mut self,
        hw: &mut (impl SensorPort + DrivePort),
        sink: &mut impl EventSink,
        elapsed_ms: u32,
    ) {
        self.uptime_ms = self.uptime_ms.saturating_add(u64::from(elapsed_ms));

        // 1. Timers
        let mut expired: Vec<TimerId, { TimerId::COUNT }> = Vec::new();
        self.hsm
            .context_mut()
            .timers
            .advance(elapsed_ms, |timer| {
                let _ = expired.push(timer);
            });
        for timer in expired {
            self.enqueue(Event::timeout(timer), sink);
        }

        // 2. Sensors
        self.since_poll_ms = self.since_poll_ms.saturating_add(elapsed_ms);
        if self.since_poll_ms >= self.hsm.context().config.sensor_poll_interval_ms {
            self.since_poll_ms = 0;
            let snapshot = hw.read_all();
            for ev in self.checkers.poll(&snapshot) {
                self.enqueue(ev, sink);
            }
        }

        // 3. Dispatch
        for _ in 0..MAX_DISPATCH_PER_STEP {
            let Some(ev) = self.queue.pop() else {
                break;
            };
            self.run_one(ev, sink);
        }
        if !self.queue.is_empty() {
            debug!("{} events carried over to the next step", self.queue.len());
        }

        // 4. Drive
        self.apply_drive(hw);
    }

    /// Dispatch one event right now, bypassing the queue, and apply the
    /// resulting drive commands.  Signals it re-posts are queued for the
    /// next step.  Returns the event if nothing consumed it.
    pub fn dispatch(
        &mut self,
        event: Event,
        hw: &mut impl DrivePort,
        sink: &mut impl EventSink,
    ) -> Event {
        let out = self.run_one(event, sink);
        self.apply_drive(hw);
        out
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (operator console, test harness, etc.).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl DrivePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::Inject(event) => {
                self.dispatch(event, hw, sink);
            }
            AppCommand::Restart => {
                hw.all_off();
                self.checkers = SensorCheckers::new(&self.hsm.context().config);
                self.start(sink);
                self.apply_drive(hw);
            }
            AppCommand::UpdateConfig(new_config) => {
                new_config.validate()?;
                self.checkers.reconfigure(&new_config);
                self.hsm.context_mut().config = new_config;
                info!("Configuration updated at runtime");
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            uptime_ms: self.uptime_ms,
            state: self.hsm.current_state(),
            substate: self.hsm.active_substate(),
            commands: self.hsm.context().commands,
            dispatched: self.dispatch_count,
            pending: self.queue.len(),
        }
    }

    /// Emit a telemetry snapshot through the sink.
    pub fn report(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    /// Current top-level state.
    pub fn state(&self) -> TopState {
        self.hsm.current_state()
    }

    pub fn pursue_state(&self) -> PursueState {
        self.hsm.pursue_state()
    }

    pub fn destroy_state(&self) -> DestroyState {
        self.hsm.destroy_state()
    }

    pub fn escape_state(&self) -> EscapeState {
        self.hsm.escape_state()
    }

    /// Drive commands asserted by the active states.
    pub fn commands(&self) -> DriveCommands {
        self.hsm.context().commands
    }

    /// Events dispatched through the hierarchy since construction.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count
    }

    /// Events waiting on the bus.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    pub fn config(&self) -> &RobotConfig {
        &self.hsm.context().config
    }

    /// Read-only view of the hierarchy.
    pub fn hsm(&self) -> &RobotHsm {
        &self.hsm
    }

    // ── Internal ──────────────────────────────────────────────

    fn enqueue(&mut self, event: Event, sink: &mut impl EventSink) {
        if !self.queue.post(event) {
            sink.emit(&AppEvent::EventDropped(event));
        }
    }

    /// One event through the hierarchy, then forward whatever it produced.
    fn run_one(&mut self, event: Event, sink: &mut impl EventSink) -> Event {
        self.dispatch_count += 1;
        let out = self.hsm.run(event);
        if !out.is_none() {
            debug!("unhandled {:?} in {:?}", out, self.hsm.current_state());
        }
        self.collect(sink);
        out
    }

    /// Re-post queued signals and translate notices into app events.
    fn collect(&mut self, sink: &mut impl EventSink) {
        let outbox = self.hsm.context_mut().take_outbox();
        for signal in outbox {
            self.enqueue(signal, sink);
        }
        for notice in self.hsm.context_mut().take_notices() {
            let event = match notice {
                Notice::StateChanged { machine, from, to } => {
                    AppEvent::StateChanged { machine, from, to }
                }
                Notice::TimeoutRejected { timer, owner } => {
                    AppEvent::TimeoutRejected { timer, owner }
                }
            };
            sink.emit(&event);
        }
    }

    /// Translate the asserted drive commands into port calls.
    fn apply_drive(&self, hw: &mut impl DrivePort) {
        let cmds = self.hsm.context().commands;
        hw.set_left(cmds.left);
        hw.set_right(cmds.right);
        hw.set_cannon(cmds.cannon);
    }
}
