//! Towerbot behaviour library.
//!
//! A hierarchical state machine for a beacon-seeking competition robot:
//! look for the beacon, chase it, follow the tower wall, fire the cannon,
//! back away, repeat.  The core is pure logic; hardware sits behind the
//! port traits in [`app::ports`] and is supplied by [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod sensors;
pub mod timers;

pub use app::service::RobotService;
pub use config::RobotConfig;
pub use error::{Error, Result};
pub use events::{Event, EventKind};
pub use fsm::robot::{RobotHsm, TopState};
