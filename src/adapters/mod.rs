//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                    |
//! |----------------|--------------------|--------------------------------|
//! | `hardware`     | SensorPort         | embedded-hal GPIO, board ADC   |
//! |                | DrivePort          | embedded-hal PWM + GPIO        |
//! | `json_config`  | ConfigPort         | JSON file on the host          |
//! | `log_sink`     | EventSink          | `log` facade                   |
//! | `sim`          | SensorPort         | Scripted arena timeline        |
//! |                | DrivePort          | Recorded drive commands        |

pub mod hardware;
pub mod json_config;
pub mod log_sink;
pub mod sim;
