//! Robot configuration parameters
//!
//! Every tuned constant of the robot: maneuver timer durations, sensor
//! thresholds and debounce depths.  The defaults are the values the robot
//! was tuned with on the competition field.  A JSON file can override them
//! through [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which side of a threshold band means "active".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Active when the raw reading drops below `enter`.
    ActiveLow,
    /// Active when the raw reading rises above `enter`.
    ActiveHigh,
}

/// Hysteresis band for an analog channel.
///
/// The channel becomes active when the reading crosses `enter` and only
/// clears again once it crosses back past `exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub enter: u16,
    pub exit: u16,
    pub polarity: Polarity,
}

impl Threshold {
    pub const fn active_low(enter: u16, exit: u16) -> Self {
        Self {
            enter,
            exit,
            polarity: Polarity::ActiveLow,
        }
    }

    pub const fn active_high(enter: u16, exit: u16) -> Self {
        Self {
            enter,
            exit,
            polarity: Polarity::ActiveHigh,
        }
    }

    /// `exit` must sit on the inactive side of `enter`, otherwise the band
    /// collapses and the channel chatters.
    pub fn is_ordered(&self) -> bool {
        match self.polarity {
            Polarity::ActiveLow => self.exit >= self.enter,
            Polarity::ActiveHigh => self.exit <= self.enter,
        }
    }
}

/// Core robot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    // --- Top-level timers (milliseconds) ---
    /// Full 360 degree lookout spin
    pub lookout_ms: u32,
    /// Search sweep before returning to lookout
    pub spin_ms: u32,
    /// Destroy `Back` bound armed by the top level on wall contact
    pub check_ms: u32,
    /// Retreat away from the tower after firing
    pub escape_ms: u32,
    /// Motors-off pause between `BallDeposit` and the retreat
    pub escape_settle_ms: u32,

    // --- Pursue maneuvers (milliseconds) ---
    pub backup_ms: u32,
    pub backup2_ms: u32,
    pub tape_back_ms: u32,
    pub tank_turn_ms: u32,
    pub tank_turn2_ms: u32,
    pub side_ms: u32,
    pub side_follow_ms: u32,
    /// Stopped window in `Check` so motor noise does not mask the wall reading
    pub wall_check_ms: u32,
    pub pivot_ms: u32,
    pub straight_ms: u32,
    /// Side contacts while wall-following before the bump-check sequence
    pub wall_contacts_required: u8,

    // --- Destroy maneuvers (milliseconds) ---
    pub destroy_back_ms: u32,
    pub destroy_forward_ms: u32,
    /// Cannon run time needed to deposit one ball
    pub shoot_ms: u32,
    /// Cannon spin-down before `BallDeposit` is reported
    pub fire_settle_ms: u32,

    // --- Sensors ---
    /// Poll period of the bumper / tape / beacon checkers
    pub sensor_poll_interval_ms: u32,
    /// Consecutive pressed polls before a front bump is reported
    pub front_bump_samples: u8,
    /// Consecutive pressed polls before a side bump is reported
    pub side_bump_samples: u8,
    pub left_tape: Threshold,
    pub right_tape: Threshold,
    pub cannon_tape: Threshold,
    pub beacon: Threshold,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            // Top level
            lookout_ms: 8500,
            spin_ms: 5000,
            check_ms: 600,
            escape_ms: 2500,
            escape_settle_ms: 2,

            // Pursue
            backup_ms: 150,
            backup2_ms: 150,
            tape_back_ms: 100,
            tank_turn_ms: 600,
            tank_turn2_ms: 500,
            side_ms: 250,
            side_follow_ms: 10_000,
            wall_check_ms: 1000,
            pivot_ms: 300,
            straight_ms: 500,
            wall_contacts_required: 3,

            // Destroy
            destroy_back_ms: 500,
            destroy_forward_ms: 1000,
            shoot_ms: 4250,
            fire_settle_ms: 100,

            // Sensors
            sensor_poll_interval_ms: 45,
            front_bump_samples: 2,
            side_bump_samples: 3,
            left_tape: Threshold::active_low(300, 350),
            right_tape: Threshold::active_high(700, 650),
            cannon_tape: Threshold::active_low(300, 350),
            beacon: Threshold::active_high(600, 400),
        }
    }
}

impl RobotConfig {
    /// Reject values that would stall a maneuver forever or make a sensor
    /// channel chatter.  Settle delays may be zero.
    pub fn validate(&self) -> Result<()> {
        let durations: [(&'static str, u32); 17] = [
            ("lookout_ms must be non-zero", self.lookout_ms),
            ("spin_ms must be non-zero", self.spin_ms),
            ("check_ms must be non-zero", self.check_ms),
            ("escape_ms must be non-zero", self.escape_ms),
            ("backup_ms must be non-zero", self.backup_ms),
            ("backup2_ms must be non-zero", self.backup2_ms),
            ("tape_back_ms must be non-zero", self.tape_back_ms),
            ("tank_turn_ms must be non-zero", self.tank_turn_ms),
            ("tank_turn2_ms must be non-zero", self.tank_turn2_ms),
            ("side_ms must be non-zero", self.side_ms),
            ("side_follow_ms must be non-zero", self.side_follow_ms),
            ("wall_check_ms must be non-zero", self.wall_check_ms),
            ("pivot_ms must be non-zero", self.pivot_ms),
            ("straight_ms must be non-zero", self.straight_ms),
            ("destroy_back_ms must be non-zero", self.destroy_back_ms),
            ("destroy_forward_ms must be non-zero", self.destroy_forward_ms),
            ("shoot_ms must be non-zero", self.shoot_ms),
        ];
        if let Some((msg, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(Error::Config(msg));
        }

        if self.sensor_poll_interval_ms == 0 {
            return Err(Error::Config("sensor_poll_interval_ms must be non-zero"));
        }
        if self.front_bump_samples == 0 || self.side_bump_samples == 0 {
            return Err(Error::Config("bump sample counts must be at least 1"));
        }
        if self.wall_contacts_required == 0 {
            return Err(Error::Config("wall_contacts_required must be at least 1"));
        }

        let bands = [
            ("left_tape hysteresis band is inverted", self.left_tape),
            ("right_tape hysteresis band is inverted", self.right_tape),
            ("cannon_tape hysteresis band is inverted", self.cannon_tape),
            ("beacon hysteresis band is inverted", self.beacon),
        ];
        if let Some((msg, _)) = bands.iter().find(|(_, t)| !t.is_ordered()) {
            return Err(Error::Config(msg));
        }

        Ok(())
    }

    /// Total HSM timer armed on `Destroy -> Escape`: settle, then retreat.
    pub fn escape_total_ms(&self) -> u32 {
        self.escape_settle_ms.saturating_add(self.escape_ms)
    }
}
