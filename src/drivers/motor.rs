//! DC motor driver for an H-bridge with one PWM input and one direction pin.
//!
//! Used for both drive wheels and the cannon flywheel.  Speed is a signed
//! percentage: the sign selects the direction pin level, the magnitude the
//! PWM duty.
//!
//! ## Contract
//!
//! This driver is a dumb actuator.  It never decides *whether* a motor
//! should run; the behaviour core owns that.  It only guarantees that the
//! direction pin is settled before duty is applied, and that `stop` drops
//! duty before touching the direction pin.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

/// Anything that takes a signed percent speed.
pub trait SpeedControl {
    fn set_speed(&mut self, speed: i8) -> Result<(), ActuatorError>;
}

pub struct HBridgeMotor<PWM, DIR> {
    pwm: PWM,
    dir: DIR,
    speed: i8,
}

impl<PWM: SetDutyCycle, DIR: OutputPin> HBridgeMotor<PWM, DIR> {
    pub fn new(pwm: PWM, dir: DIR) -> Self {
        Self { pwm, dir, speed: 0 }
    }

    /// Duty off, then direction back to forward.
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.dir
            .set_high()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.speed = 0;
        Ok(())
    }

    /// Last speed successfully applied.
    pub fn speed(&self) -> i8 {
        self.speed
    }

    /// Hand the peripherals back.
    pub fn release(self) -> (PWM, DIR) {
        (self.pwm, self.dir)
    }
}

impl<PWM: SetDutyCycle, DIR: OutputPin> SpeedControl for HBridgeMotor<PWM, DIR> {
    fn set_speed(&mut self, speed: i8) -> Result<(), ActuatorError> {
        let speed = speed.clamp(-100, 100);
        if speed == 0 {
            return self.stop();
        }

        self.dir
            .set_state(PinState::from(speed > 0))
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.pwm
            .set_duty_cycle_percent(speed.unsigned_abs())
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.speed = speed;
        Ok(())
    }
}
