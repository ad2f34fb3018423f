//! Shared mutable context threaded through every state handler.
//!
//! `RobotContext` is the single struct that every machine in the
//! hierarchy reads from and writes to: configuration, the drive commands
//! the active state asserts, the timer bank, mirrored bumper levels, and
//! the outbox of signals to re-post after the current dispatch.  Think of
//! it as the "blackboard" in a blackboard architecture.

use heapless::Vec;
use log::{debug, warn};

use super::{MachineContext, TraceEntry, TraceStep};
use crate::config::RobotConfig;
use crate::events::{Event, EventKind};
use crate::timers::{MachineId, TimerBank, TimerId};

/// Signals a dispatch may queue for the next cycle.
pub const OUTBOX_CAP: usize = 4;

/// Notices a dispatch may raise for the application layer.
pub const NOTICE_CAP: usize = 16;

// ---------------------------------------------------------------------------
// Actuator commands (written by state output laws; applied by the service)
// ---------------------------------------------------------------------------

/// Signed percent speeds, -100..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveCommands {
    pub left: i8,
    pub right: i8,
    pub cannon: i8,
}

impl DriveCommands {
    /// Everything off.
    pub const STOPPED: Self = Self {
        left: 0,
        right: 0,
        cannon: 0,
    };
}

// ---------------------------------------------------------------------------
// Mirrored contact levels
// ---------------------------------------------------------------------------

/// Last reported level of each bumper, tracked from the edge events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactLevels {
    pub front_left: bool,
    pub front_right: bool,
    pub side: bool,
}

impl ContactLevels {
    pub fn observe(&mut self, event: Event) {
        match event.kind {
            EventKind::FrontLeftBump => self.front_left = true,
            EventKind::NoFrontLeftBump => self.front_left = false,
            EventKind::FrontRightBump => self.front_right = true,
            EventKind::NoFrontRightBump => self.front_right = false,
            EventKind::SideBump => self.side = true,
            EventKind::NoSideBump => self.side = false,
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Notices for the application layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    StateChanged {
        machine: MachineId,
        from: &'static str,
        to: &'static str,
    },
    TimeoutRejected {
        timer: TimerId,
        owner: Option<MachineId>,
    },
}

// ---------------------------------------------------------------------------
// RobotContext
// ---------------------------------------------------------------------------

/// The shared context passed to every sub-machine handler.
pub struct RobotContext {
    // -- Configuration --
    pub config: RobotConfig,

    // -- Actuator outputs --
    /// Commands to be applied to the motors after the dispatch.
    pub commands: DriveCommands,

    // -- Timing --
    pub timers: TimerBank,

    // -- Sensor mirror --
    pub levels: ContactLevels,

    // -- Pursue bookkeeping --
    /// Side contacts counted while wall following.
    pub wall_contacts: u8,
    /// Set once `BallDeposit` has been queued for the current fire cycle.
    pub deposit_posted: bool,

    outbox: Vec<Event, OUTBOX_CAP>,
    notices: Vec<Notice, NOTICE_CAP>,
    trace: Option<std::vec::Vec<TraceEntry>>,
}

impl RobotContext {
    pub fn new(config: RobotConfig) -> Self {
        Self {
            config,
            commands: DriveCommands::STOPPED,
            timers: TimerBank::new(),
            levels: ContactLevels::default(),
            wall_contacts: 0,
            deposit_posted: false,
            outbox: Vec::new(),
            notices: Vec::new(),
            trace: None,
        }
    }

    /// Set both drive wheels, leaving the cannon as it is.
    pub fn drive(&mut self, left: i8, right: i8) {
        self.commands.left = left;
        self.commands.right = right;
    }

    pub fn stop_all(&mut self) {
        self.commands = DriveCommands::STOPPED;
    }

    /// Queue a signal for delivery on a later dispatch.
    pub fn post(&mut self, event: Event) {
        if self.outbox.push(event).is_err() {
            warn!("outbox full, dropping {:?}", event);
        }
    }

    pub fn take_outbox(&mut self) -> Vec<Event, OUTBOX_CAP> {
        core::mem::take(&mut self.outbox)
    }

    /// Raise a notice for the application layer.  Without a service
    /// draining them, notices past [`NOTICE_CAP`] are dropped.
    pub fn notify(&mut self, notice: Notice) {
        if self.notices.push(notice).is_err() {
            debug!("notice buffer full, dropping {:?}", notice);
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice, NOTICE_CAP> {
        core::mem::take(&mut self.notices)
    }

    /// Start collecting every transition phase.
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(std::vec::Vec::new);
    }

    pub fn trace(&self) -> &[TraceEntry] {
        self.trace.as_deref().unwrap_or(&[])
    }
}

impl MachineContext for RobotContext {
    fn record(&mut self, entry: TraceEntry) {
        if let TraceStep::Transition { from, to } = entry.step {
            self.notify(Notice::StateChanged {
                machine: entry.machine,
                from,
                to,
            });
        }
        if let Some(t) = self.trace.as_mut() {
            t.push(entry);
        }
    }
}
