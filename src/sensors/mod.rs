//! Sensor event checkers and the aggregating [`SensorCheckers`].
//!
//! The service reads a [`SensorSnapshot`] through the sensor port every
//! poll interval and hands it to the checkers.  Each checker compares the
//! new reading against the level it last reported and produces an event
//! only on a debounced crossing, so a reading that stays on one side of a
//! threshold is silent no matter how many polls it spans.

pub mod beacon;
pub mod bumper;
pub mod tape;

use heapless::Vec;

use crate::config::{Polarity, RobotConfig, Threshold};
use crate::events::Event;
use beacon::BeaconChecker;
use bumper::BumperChecker;
use tape::TapeChecker;

/// Upper bound of events one poll can produce: three bumpers, three tape
/// channels, one beacon.
pub const MAX_EVENTS_PER_POLL: usize = 7;

/// A point-in-time snapshot of every robot sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSnapshot {
    /// Bumper bits, see [`bumper::FRONT_LEFT`] and friends.  1 = pressed.
    pub bumpers: u8,
    /// Raw 10-bit reflectance readings.
    pub tape_left: u16,
    pub tape_right: u16,
    pub tape_cannon: u16,
    /// Raw beacon detector envelope.
    pub beacon: u16,
}

impl Default for SensorSnapshot {
    /// Open floor: nothing pressed, no tape under any sensor, no beacon.
    fn default() -> Self {
        Self {
            bumpers: 0,
            tape_left: 1023,
            tape_right: 0,
            tape_cannon: 1023,
            beacon: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Hysteresis channel shared by the analog checkers
// ---------------------------------------------------------------------------

/// One analog input with a hysteresis band.
#[derive(Debug, Clone, Copy)]
pub struct Hysteresis {
    threshold: Threshold,
    active: bool,
}

impl Hysteresis {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            active: false,
        }
    }

    /// Feed one raw reading.  Returns the new level on a crossing.
    pub fn update(&mut self, raw: u16) -> Option<bool> {
        let t = self.threshold;
        let next = match (t.polarity, self.active) {
            (Polarity::ActiveLow, false) => raw < t.enter,
            (Polarity::ActiveLow, true) => raw <= t.exit,
            (Polarity::ActiveHigh, false) => raw > t.enter,
            (Polarity::ActiveHigh, true) => raw >= t.exit,
        };
        if next == self.active {
            return None;
        }
        self.active = next;
        Some(next)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Swap the band, keeping the reported level.
    pub fn set_threshold(&mut self, threshold: Threshold) {
        self.threshold = threshold;
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Every checker the robot runs, polled together.
pub struct SensorCheckers {
    pub bumpers: BumperChecker,
    pub tape: TapeChecker,
    pub beacon: BeaconChecker,
}

impl SensorCheckers {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            bumpers: BumperChecker::new(config.front_bump_samples, config.side_bump_samples),
            tape: TapeChecker::new(config.left_tape, config.right_tape, config.cannon_tape),
            beacon: BeaconChecker::new(config.beacon),
        }
    }

    /// Compare one snapshot against the last reported levels.
    ///
    /// Events come out bumpers first, then tape, then beacon.
    pub fn poll(&mut self, snapshot: &SensorSnapshot) -> Vec<Event, MAX_EVENTS_PER_POLL> {
        let mut out = Vec::new();
        let mut emit = |ev: Event| {
            // Capacity matches the channel count, so this cannot overflow.
            let _ = out.push(ev);
        };
        self.bumpers.check(snapshot.bumpers, &mut emit);
        self.tape.check(snapshot, &mut emit);
        self.beacon.check(snapshot.beacon, &mut emit);
        out
    }

    /// Apply new thresholds and sample counts.
    ///
    /// Reported levels survive, so a reading held across the change is not
    /// reported again and a later release still produces its edge.
    pub fn reconfigure(&mut self, config: &RobotConfig) {
        self.bumpers
            .reconfigure(config.front_bump_samples, config.side_bump_samples);
        self.tape
            .reconfigure(config.left_tape, config.right_tape, config.cannon_tape);
        self.beacon.reconfigure(config.beacon);
    }
}
