//! Port traits: the hexagonal boundary between the behaviour core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RobotService (domain)
//! ```
//!
//! Driven adapters (sensors, motors, event sinks, config files) implement
//! these traits.  The [`RobotService`](super::service::RobotService)
//! consumes them via generics, so the HSM never touches hardware directly.

use crate::config::RobotConfig;
use crate::sensors::SensorSnapshot;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per poll interval.
pub trait SensorPort {
    /// Read bumpers, tape sensors and the beacon detector together.
    ///
    /// Implementations log and paper over individual read failures (keep
    /// the previous reading); a flaky channel must not stop the robot.
    fn read_all(&mut self) -> SensorSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Drive port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: signed percent speeds, -100..=100.  Fire-and-forget.
pub trait DrivePort {
    fn set_left(&mut self, speed: i8);

    fn set_right(&mut self, speed: i8);

    fn set_cannon(&mut self, speed: i8);

    /// Stop every motor.
    fn all_off(&mut self) {
        self.set_left(0);
        self.set_right(0);
        self.set_cannon(0);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the robot configuration.
///
/// Implementations must validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] if nothing
    /// is stored yet; callers usually fall back to the defaults.
    fn load(&self) -> Result<RobotConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &RobotConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No stored config.
    NotFound,
    /// Stored config could not be parsed.
    Corrupted,
    /// A field failed validation; the string names it.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<crate::error::Error> for ConfigError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::Config(msg) => Self::ValidationFailed(msg),
            _ => Self::IoError,
        }
    }
}
