//! Bumper micro-switch reader.
//!
//! ## Hardware
//!
//! Three active-low momentary switches with pull-ups: front-left,
//! front-right, and the side whisker that runs along the tower wall.
//! The switches are sampled, not interrupt driven; debouncing happens in
//! [`BumperChecker`](crate::sensors::bumper::BumperChecker) one layer up,
//! so this driver only turns pin levels into a contact mask.

use embedded_hal::digital::InputPin;

use crate::error::SensorError;
use crate::sensors::bumper::{FRONT_LEFT, FRONT_RIGHT, SIDE};

pub struct BumperSwitches<P> {
    front_left: P,
    front_right: P,
    side: P,
}

impl<P: InputPin> BumperSwitches<P> {
    pub fn new(front_left: P, front_right: P, side: P) -> Self {
        Self {
            front_left,
            front_right,
            side,
        }
    }

    /// Sample all three switches.  Bit set = switch closed.
    pub fn read_mask(&mut self) -> Result<u8, SensorError> {
        let mut mask = 0;
        for (pin, bit) in [
            (&mut self.front_left, FRONT_LEFT),
            (&mut self.front_right, FRONT_RIGHT),
            (&mut self.side, SIDE),
        ] {
            if pin.is_low().map_err(|_| SensorError::GpioReadFailed)? {
                mask |= bit;
            }
        }
        Ok(mask)
    }
}
