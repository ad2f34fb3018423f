//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the bumper switches, the analog front end and the three motors,
//! exposing them through [`SensorPort`] and [`DrivePort`].  This is the
//! only module in the system that touches actual hardware, and it only
//! does so through embedded-hal traits, so any HAL with pins, PWM and an
//! ADC can host the robot.
//!
//! Peripheral failures are logged and absorbed here.  A failed read keeps
//! the previous value for that channel; a failed write leaves the motor
//! where it was.  Neither ever reaches the behaviour core.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::{DrivePort, SensorPort};
use crate::drivers::bumpers::BumperSwitches;
use crate::drivers::motor::SpeedControl;
use crate::error::SensorError;
use crate::sensors::SensorSnapshot;

/// Analog inputs the robot samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogChannel {
    LeftTape,
    RightTape,
    CannonTape,
    Beacon,
}

/// Raw ADC access, one channel at a time.
///
/// embedded-hal 1.0 has no ADC trait; board crates implement this over
/// whatever their HAL offers.
pub trait AnalogReader {
    fn read(&mut self, channel: AnalogChannel) -> Result<u16, SensorError>;
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P, A, M> {
    bumpers: BumperSwitches<P>,
    adc: A,
    left: M,
    right: M,
    cannon: M,
    last: SensorSnapshot,
}

impl<P: InputPin, A: AnalogReader, M: SpeedControl> HardwareAdapter<P, A, M> {
    pub fn new(bumpers: BumperSwitches<P>, adc: A, left: M, right: M, cannon: M) -> Self {
        Self {
            bumpers,
            adc,
            left,
            right,
            cannon,
            last: SensorSnapshot::default(),
        }
    }

    fn sample(&mut self, channel: AnalogChannel, previous: u16) -> u16 {
        match self.adc.read(channel) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("{:?}: {}, keeping {}", channel, e, previous);
                previous
            }
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: InputPin, A: AnalogReader, M: SpeedControl> SensorPort for HardwareAdapter<P, A, M> {
    fn read_all(&mut self) -> SensorSnapshot {
        let prev = self.last;
        let bumpers = match self.bumpers.read_mask() {
            Ok(mask) => mask,
            Err(e) => {
                warn!("bumpers: {}, keeping 0b{:03b}", e, prev.bumpers);
                prev.bumpers
            }
        };
        self.last = SensorSnapshot {
            bumpers,
            tape_left: self.sample(AnalogChannel::LeftTape, prev.tape_left),
            tape_right: self.sample(AnalogChannel::RightTape, prev.tape_right),
            tape_cannon: self.sample(AnalogChannel::CannonTape, prev.tape_cannon),
            beacon: self.sample(AnalogChannel::Beacon, prev.beacon),
        };
        self.last
    }
}

// ── DrivePort implementation ──────────────────────────────────

impl<P: InputPin, A: AnalogReader, M: SpeedControl> DrivePort for HardwareAdapter<P, A, M> {
    fn set_left(&mut self, speed: i8) {
        if let Err(e) = self.left.set_speed(speed) {
            warn!("left motor: {}", e);
        }
    }

    fn set_right(&mut self, speed: i8) {
        if let Err(e) = self.right.set_speed(speed) {
            warn!("right motor: {}", e);
        }
    }

    fn set_cannon(&mut self, speed: i8) {
        if let Err(e) = self.cannon.set_speed(speed) {
            warn!("cannon motor: {}", e);
        }
    }
}
