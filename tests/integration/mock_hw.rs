//! Mock hardware adapter for integration tests.
//!
//! Records every drive call so tests can assert on the full command
//! history without touching real GPIO/PWM registers, and serves a sensor
//! snapshot the test edits directly.

use std::cell::RefCell;

use towerbot::app::events::AppEvent;
use towerbot::app::ports::{ConfigError, ConfigPort, DrivePort, EventSink, SensorPort};
use towerbot::config::RobotConfig;
use towerbot::fsm::context::DriveCommands;
use towerbot::sensors::SensorSnapshot;
use towerbot::timers::MachineId;

// ── Drive call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCall {
    Left(i8),
    Right(i8),
    Cannon(i8),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<DriveCall>,
    pub snapshot: SensorSnapshot,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            snapshot: SensorSnapshot::default(),
            reads: 0,
        }
    }

    /// Drive state implied by the call history.
    pub fn drive(&self) -> DriveCommands {
        let mut d = DriveCommands::STOPPED;
        for call in &self.calls {
            match *call {
                DriveCall::Left(s) => d.left = s,
                DriveCall::Right(s) => d.right = s,
                DriveCall::Cannon(s) => d.cannon = s,
            }
        }
        d
    }

    pub fn cannon_ever_spun(&self) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, DriveCall::Cannon(s) if *s > 0))
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl DrivePort for MockHardware {
    fn set_left(&mut self, speed: i8) {
        self.calls.push(DriveCall::Left(speed));
    }

    fn set_right(&mut self, speed: i8) {
        self.calls.push(DriveCall::Right(speed));
    }

    fn set_cannon(&mut self, speed: i8) {
        self.calls.push(DriveCall::Cannon(speed));
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> SensorSnapshot {
        self.reads += 1;
        self.snapshot
    }
}

// ── MockConfigStore ───────────────────────────────────────────

pub struct MockConfigStore {
    stored: RefCell<Option<RobotConfig>>,
}

#[allow(dead_code)]
impl MockConfigStore {
    pub fn new() -> Self {
        Self {
            stored: RefCell::new(None),
        }
    }
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<RobotConfig, ConfigError> {
        self.stored.borrow().clone().ok_or(ConfigError::NotFound)
    }

    fn save(&self, config: &RobotConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.stored.borrow_mut() = Some(config.clone());
        Ok(())
    }
}

// ── LogSink ───────────────────────────────────────────────────

/// Collects every emitted [`AppEvent`].
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Top-level transitions as `(from, to)` pairs, in order.
    pub fn top_transitions(&self) -> Vec<(&'static str, &'static str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged {
                    machine: MachineId::Robot,
                    from,
                    to,
                } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// States entered by one machine, in order.
    pub fn entered(&self, machine: MachineId) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { machine: m, to, .. } if *m == machine => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
