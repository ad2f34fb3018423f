//! Tape event checker: two front reflectance sensors and the cannon sensor.
//!
//! Each channel reports entering and leaving tape once, with the raw
//! reading as the event parameter.

use super::{Hysteresis, SensorSnapshot};
use crate::config::Threshold;
use crate::events::{Event, EventKind};

pub struct TapeChecker {
    left: Hysteresis,
    right: Hysteresis,
    cannon: Hysteresis,
}

impl TapeChecker {
    pub fn new(left: Threshold, right: Threshold, cannon: Threshold) -> Self {
        Self {
            left: Hysteresis::new(left),
            right: Hysteresis::new(right),
            cannon: Hysteresis::new(cannon),
        }
    }

    pub fn check(&mut self, snapshot: &SensorSnapshot, emit: &mut impl FnMut(Event)) {
        let channels = [
            (&mut self.left, snapshot.tape_left, EventKind::FrontLeftTape, EventKind::NoFrontLeftTape),
            (&mut self.right, snapshot.tape_right, EventKind::FrontRightTape, EventKind::NoFrontRightTape),
            (&mut self.cannon, snapshot.tape_cannon, EventKind::CannonTape, EventKind::NoCannonTape),
        ];
        for (ch, raw, on, off) in channels {
            if let Some(active) = ch.update(raw) {
                emit(Event::new(if active { on } else { off }, raw));
            }
        }
    }

    pub fn reconfigure(&mut self, left: Threshold, right: Threshold, cannon: Threshold) {
        self.left.set_threshold(left);
        self.right.set_threshold(right);
        self.cannon.set_threshold(cannon);
    }

    pub fn cannon_on_tape(&self) -> bool {
        self.cannon.is_active()
    }
}
