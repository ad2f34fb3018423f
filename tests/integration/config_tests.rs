//! Configuration through the ConfigPort and into a running service.

use crate::mock_hw::{LogSink, MockConfigStore, MockHardware};

use towerbot::app::commands::AppCommand;
use towerbot::app::ports::{ConfigError, ConfigPort};
use towerbot::config::Threshold;
use towerbot::fsm::robot::TopState;
use towerbot::timers::TimerId;
use towerbot::{RobotConfig, RobotService};

#[test]
fn empty_store_reports_not_found() {
    let store = MockConfigStore::new();
    assert_eq!(store.load(), Err(ConfigError::NotFound));
}

#[test]
fn store_rejects_inverted_band() {
    let store = MockConfigStore::new();
    let bad = RobotConfig {
        left_tape: Threshold::active_low(400, 300),
        ..RobotConfig::default()
    };
    assert!(matches!(store.save(&bad), Err(ConfigError::ValidationFailed(_))));
    assert_eq!(store.load(), Err(ConfigError::NotFound));
}

#[test]
fn loaded_config_drives_the_service() {
    let store = MockConfigStore::new();
    let tuned = RobotConfig {
        lookout_ms: 2_000,
        spin_ms: 700,
        ..RobotConfig::default()
    };
    store.save(&tuned).unwrap();

    let mut svc = RobotService::new(store.load().unwrap()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    svc.start(&mut sink);
    assert_eq!(
        svc.hsm().context().timers.remaining_ms(TimerId::Hsm),
        Some(2_000)
    );

    svc.step(&mut hw, &mut sink, 2_000);
    assert_eq!(svc.state(), TopState::Search);
    svc.step(&mut hw, &mut sink, 700);
    assert_eq!(svc.state(), TopState::Lookout);
}

#[test]
fn hot_reload_moves_the_beacon_threshold() {
    let mut svc = RobotService::new(RobotConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    svc.start(&mut sink);

    let poll = svc.config().sensor_poll_interval_ms;
    hw.snapshot.beacon = 500;
    svc.step(&mut hw, &mut sink, poll);
    assert_eq!(svc.state(), TopState::Lookout);

    let sensitive = RobotConfig {
        beacon: Threshold::active_high(300, 200),
        ..RobotConfig::default()
    };
    svc.handle_command(AppCommand::UpdateConfig(sensitive), &mut hw, &mut sink)
        .unwrap();
    svc.step(&mut hw, &mut sink, poll);
    assert_eq!(svc.state(), TopState::Pursue);
}
