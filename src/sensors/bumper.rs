//! Bumper event checker.
//!
//! Three microswitches share one mask.  A press is only reported after the
//! switch has read pressed for a number of consecutive polls (motor
//! vibration chatters the side switch more, so it needs more); a release
//! is reported on the first released poll after a reported press.
//!
//! | Bit  | Switch      | Press event      | Release event      |
//! |------|-------------|------------------|--------------------|
//! | 0x01 | front left  | `FrontLeftBump`  | `NoFrontLeftBump`  |
//! | 0x02 | front right | `FrontRightBump` | `NoFrontRightBump` |
//! | 0x04 | side        | `SideBump`       | `NoSideBump`       |

use crate::events::{Event, EventKind};

pub const FRONT_LEFT: u8 = 0x01;
pub const FRONT_RIGHT: u8 = 0x02;
pub const SIDE: u8 = 0x04;

/// Consecutive-sample debouncer for one switch.
#[derive(Debug, Clone, Copy)]
struct Debouncer {
    required: u8,
    streak: u8,
    reported: bool,
}

impl Debouncer {
    fn new(required: u8) -> Self {
        Self {
            required: required.max(1),
            streak: 0,
            reported: false,
        }
    }

    fn set_required(&mut self, required: u8) {
        self.required = required.max(1);
    }

    fn update(&mut self, pressed: bool) -> Option<bool> {
        if !pressed {
            self.streak = 0;
            if self.reported {
                self.reported = false;
                return Some(false);
            }
            return None;
        }

        if self.reported {
            return None;
        }
        self.streak = self.streak.saturating_add(1);
        if self.streak >= self.required {
            self.reported = true;
            return Some(true);
        }
        None
    }
}

struct Channel {
    mask: u8,
    press: EventKind,
    release: EventKind,
    debouncer: Debouncer,
}

pub struct BumperChecker {
    channels: [Channel; 3],
}

impl BumperChecker {
    pub fn new(front_samples: u8, side_samples: u8) -> Self {
        Self {
            channels: [
                Channel {
                    mask: FRONT_LEFT,
                    press: EventKind::FrontLeftBump,
                    release: EventKind::NoFrontLeftBump,
                    debouncer: Debouncer::new(front_samples),
                },
                Channel {
                    mask: FRONT_RIGHT,
                    press: EventKind::FrontRightBump,
                    release: EventKind::NoFrontRightBump,
                    debouncer: Debouncer::new(front_samples),
                },
                Channel {
                    mask: SIDE,
                    press: EventKind::SideBump,
                    release: EventKind::NoSideBump,
                    debouncer: Debouncer::new(side_samples),
                },
            ],
        }
    }

    /// Feed one mask reading; `emit` is called once per reported edge.
    pub fn check(&mut self, mask: u8, emit: &mut impl FnMut(Event)) {
        for ch in &mut self.channels {
            if let Some(pressed) = ch.debouncer.update(mask & ch.mask != 0) {
                let kind = if pressed { ch.press } else { ch.release };
                emit(Event::signal(kind));
            }
        }
    }

    /// Change the press sample counts without forgetting reported levels.
    pub fn reconfigure(&mut self, front_samples: u8, side_samples: u8) {
        for ch in &mut self.channels {
            let required = if ch.mask == SIDE { side_samples } else { front_samples };
            ch.debouncer.set_required(required);
        }
    }

    /// Levels currently reported, as a mask.
    pub fn reported(&self) -> u8 {
        self.channels
            .iter()
            .filter(|ch| ch.debouncer.reported)
            .fold(0, |acc, ch| acc | ch.mask)
    }
}
