//! Events and the FIFO event bus.
//!
//! Events are produced by:
//! - the sensor checkers (bump, tape and beacon edges)
//! - the timer bank (one `Timeout` per armed slot)
//! - the state machines themselves (signals re-posted for the next cycle)
//! - external commands (injected events, restart)
//!
//! Events are consumed by the service, which hands them to the top-level
//! HSM one at a time in FIFO order.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Checkers     │────▶│              │     │              │
//! │ TimerBank    │────▶│  EventQueue  │────▶│  RobotHsm    │
//! │ HSM outbox   │────▶│  (FIFO)      │     │  (consumer)  │
//! │ Commands     │────▶│              │     │              │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::fmt;

use heapless::Deque;

use crate::timers::TimerId;

/// Capacity of the event bus.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Every event kind the robot understands.
///
/// Framework kinds occupy the lowest discriminants, domain kinds follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EventKind {
    // ── Framework ─────────────────────────────────────────
    NoEvent = 0,
    Init = 1,
    Entry = 2,
    Exit = 3,
    Timeout = 4,
    TimerActive = 5,
    TimerStopped = 6,

    // ── Bumpers ───────────────────────────────────────────
    FrontLeftBump = 10,
    NoFrontLeftBump = 11,
    FrontRightBump = 12,
    NoFrontRightBump = 13,
    SideBump = 14,
    NoSideBump = 15,

    // ── Tape sensors ──────────────────────────────────────
    FrontLeftTape = 20,
    NoFrontLeftTape = 21,
    FrontRightTape = 22,
    NoFrontRightTape = 23,
    CannonTape = 24,
    NoCannonTape = 25,

    // ── Beacon detector ───────────────────────────────────
    BeaconFound = 30,
    NoBeaconFound = 31,

    // ── Maneuver completion signals ───────────────────────
    WallFound = 40,
    GoSeeking = 41,
    BallDeposit = 42,
}

impl EventKind {
    /// Framework-reserved kinds are never produced by sensors.
    pub fn is_framework(self) -> bool {
        (self as u16) < 10
    }

    /// `Entry` and `Exit` are run by the engine, never matched by a table.
    pub fn is_entry_or_exit(self) -> bool {
        matches!(self, Self::Entry | Self::Exit)
    }
}

/// A single event: kind plus auxiliary parameter.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    pub kind: EventKind,
    pub param: u16,
}

impl Event {
    pub const NONE: Self = Self::new(EventKind::NoEvent, 0);
    pub const INIT: Self = Self::new(EventKind::Init, 0);
    pub const ENTRY: Self = Self::new(EventKind::Entry, 0);
    pub const EXIT: Self = Self::new(EventKind::Exit, 0);

    pub const fn new(kind: EventKind, param: u16) -> Self {
        Self { kind, param }
    }

    /// A signal whose parameter is its own kind re-encoded as an integer.
    pub const fn signal(kind: EventKind) -> Self {
        Self::new(kind, kind as u16)
    }

    pub const fn timeout(timer: TimerId) -> Self {
        Self::new(EventKind::Timeout, timer as u16)
    }

    pub fn is_none(&self) -> bool {
        self.kind == EventKind::NoEvent
    }

    pub fn is(&self, kind: EventKind) -> bool {
        self.kind == kind
    }

    /// True only for a `Timeout` raised by `timer`.
    pub fn is_timeout_for(&self, timer: TimerId) -> bool {
        self.kind == EventKind::Timeout && self.param == timer as u16
    }

    /// The timer slot a `Timeout` refers to, if any.
    pub fn timer(&self) -> Option<TimerId> {
        if self.kind == EventKind::Timeout {
            TimerId::from_param(self.param)
        } else {
            None
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timer() {
            Some(timer) => write!(f, "Timeout({:?})", timer),
            None => write!(f, "{:?}({})", self.kind, self.param),
        }
    }
}

// ── Bounded FIFO bus ──────────────────────────────────────────

/// The event bus: a bounded FIFO owned by the service.
///
/// Single producer side per dispatch cycle, single consumer; no locking
/// because the whole robot runs on one cooperative loop.
pub struct EventQueue {
    queue: Deque<Event, EVENT_QUEUE_CAP>,
    dropped: u32,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Push an event to the back of the queue.
    /// Returns `false` if the queue is full (event dropped).
    pub fn post(&mut self, event: Event) -> bool {
        if self.queue.push_back(event).is_err() {
            self.dropped = self.dropped.saturating_add(1);
            log::warn!("event queue full, dropping {:?}", event);
            return false;
        }
        true
    }

    /// Pop the oldest pending event.
    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Discard everything pending (used on restart).
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Events dropped because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
