//! Towerbot host simulator: main entry point.
//!
//! Runs the full behaviour stack against a scripted arena.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimWorld              LogEventSink       JsonConfigFile       │
//! │  (Sensor+Drive)        (EventSink)        (ConfigPort)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            RobotService (pure logic)                   │    │
//! │  │  Timers · Event bus · Sensor checkers · Robot HSM      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `towerbot [config.json]`.  `RUST_LOG=debug` shows sub-machine
//! transitions as well.

use anyhow::{Context, Result};
use log::{info, warn};

use towerbot::adapters::json_config::JsonConfigFile;
use towerbot::adapters::log_sink::LogEventSink;
use towerbot::adapters::sim::SimWorld;
use towerbot::app::ports::{ConfigError, ConfigPort};
use towerbot::{RobotConfig, RobotService};

/// Loop period of the simulated controller.
const TICK_MS: u32 = 5;
/// Keep running this long after the last cue so the retreat completes.
const RUN_OUT_MS: u64 = 4_000;
const TELEMETRY_EVERY_MS: u64 = 1_000;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Towerbot simulator v{}            ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (file or defaults) ───────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let file = JsonConfigFile::new(path);
            match file.load() {
                Ok(cfg) => {
                    info!("Configuration loaded from {}", file.path().display());
                    cfg
                }
                Err(ConfigError::NotFound) => {
                    warn!("{} not found, using defaults", file.path().display());
                    RobotConfig::default()
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("loading {}", file.path().display()));
                }
            }
        }
        None => RobotConfig::default(),
    };

    // ── 3. Service + adapters ─────────────────────────────────
    let mut service = RobotService::new(config).context("invalid configuration")?;
    let mut world = SimWorld::mission();
    let mut sink = LogEventSink::new();

    service.start(&mut sink);

    // ── 4. Loop ───────────────────────────────────────────────
    let mut done_at: Option<u64> = None;
    loop {
        world.advance(TICK_MS);
        service.step(&mut world, &mut sink, TICK_MS);

        let now = world.now_ms();
        if now % TELEMETRY_EVERY_MS == 0 {
            service.report(&mut sink);
        }

        if world.script_done() && done_at.is_none() {
            done_at = Some(now);
        }
        if done_at.is_some_and(|t| now >= t + RUN_OUT_MS) {
            break;
        }
    }

    info!(
        "Simulation finished at t={}ms in {:?}: {} events dispatched, {} drive changes",
        world.now_ms(),
        service.state(),
        service.dispatch_count(),
        world.drive_changes(),
    );
    Ok(())
}
