//! Beacon detector checker.

use super::Hysteresis;
use crate::config::Threshold;
use crate::events::{Event, EventKind};

pub struct BeaconChecker {
    channel: Hysteresis,
}

impl BeaconChecker {
    pub fn new(threshold: Threshold) -> Self {
        Self {
            channel: Hysteresis::new(threshold),
        }
    }

    pub fn check(&mut self, raw: u16, emit: &mut impl FnMut(Event)) {
        match self.channel.update(raw) {
            Some(true) => emit(Event::new(EventKind::BeaconFound, raw)),
            Some(false) => emit(Event::new(EventKind::NoBeaconFound, raw)),
            None => {}
        }
    }

    pub fn reconfigure(&mut self, threshold: Threshold) {
        self.channel.set_threshold(threshold);
    }

    pub fn in_view(&self) -> bool {
        self.channel.is_active()
    }
}
