//! Integration tests for the RobotService → HSM → drive pipeline.
//!
//! These verify that sensor snapshots read through the port turn into
//! debounced events, that the events reach the hierarchy in order, and
//! that the resulting commands land on the mock motors.

use crate::mock_hw::{DriveCall, LogSink, MockHardware};

use towerbot::app::commands::AppCommand;
use towerbot::app::events::AppEvent;
use towerbot::events::EVENT_QUEUE_CAP;
use towerbot::fsm::pursue::PursueState;
use towerbot::fsm::robot::TopState;
use towerbot::sensors::bumper::{FRONT_RIGHT, SIDE};
use towerbot::timers::{MachineId, TimerId};
use towerbot::{Event, EventKind, RobotConfig, RobotService};

fn make_service() -> (RobotService, MockHardware, LogSink) {
    let mut svc = RobotService::new(RobotConfig::default()).unwrap();
    let mut sink = LogSink::new();
    svc.start(&mut sink);
    (svc, MockHardware::new(), sink)
}

/// Step in poll-sized increments.
fn run_polls(svc: &mut RobotService, hw: &mut MockHardware, sink: &mut LogSink, polls: u32) {
    let poll = svc.config().sensor_poll_interval_ms;
    for _ in 0..polls {
        svc.step(hw, sink, poll);
    }
}

#[test]
fn started_event_is_emitted() {
    let (_, _, sink) = make_service();
    assert_eq!(sink.events.last(), Some(&AppEvent::Started(TopState::Lookout)));
    assert_eq!(sink.top_transitions(), vec![("InitPseudo", "Lookout")]);
}

#[test]
fn every_step_writes_all_three_motors() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.step(&mut hw, &mut sink, 1);
    assert_eq!(hw.calls.len(), 3);
    assert!(matches!(hw.calls[0], DriveCall::Left(_)));
    assert!(matches!(hw.calls[1], DriveCall::Right(_)));
    assert!(matches!(hw.calls[2], DriveCall::Cannon(0)));
}

#[test]
fn lookout_spins_in_place() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.post(Event::signal(EventKind::NoBeaconFound));
    svc.step(&mut hw, &mut sink, 1);
    let d = hw.drive();
    assert_eq!(d.left, -d.right);
    assert_ne!(d.left, 0);
}

#[test]
fn beacon_above_threshold_starts_pursuit() {
    let (mut svc, mut hw, mut sink) = make_service();
    hw.snapshot.beacon = 550;
    run_polls(&mut svc, &mut hw, &mut sink, 2);
    assert_eq!(svc.state(), TopState::Lookout, "inside the band is not a sighting");

    hw.snapshot.beacon = 650;
    run_polls(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.state(), TopState::Pursue);

    // Wobbling inside the band is not a loss either.
    hw.snapshot.beacon = 450;
    run_polls(&mut svc, &mut hw, &mut sink, 3);
    assert_eq!(svc.pursue_state(), PursueState::Pursue);

    hw.snapshot.beacon = 100;
    run_polls(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.pursue_state(), PursueState::Adjust);
}

#[test]
fn side_switch_needs_three_samples() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.post(Event::signal(EventKind::BeaconFound));
    svc.post(Event::signal(EventKind::FrontLeftBump));
    svc.post(Event::timeout(TimerId::Pursue));
    svc.step(&mut hw, &mut sink, 0);
    assert_eq!(svc.pursue_state(), PursueState::Bump);

    hw.snapshot.bumpers = SIDE;
    run_polls(&mut svc, &mut hw, &mut sink, 2);
    assert_eq!(svc.pursue_state(), PursueState::Bump);
    run_polls(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.pursue_state(), PursueState::SideFollowOn);

    // A single open sample releases.
    hw.snapshot.bumpers = 0;
    run_polls(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.pursue_state(), PursueState::SideFollowOff);
}

#[test]
fn events_dispatch_in_arrival_order() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.post(Event::signal(EventKind::BeaconFound));
    svc.post(Event::signal(EventKind::NoBeaconFound));
    svc.post(Event::signal(EventKind::BeaconFound));
    svc.step(&mut hw, &mut sink, 0);
    assert_eq!(
        sink.entered(MachineId::Pursue)
            .into_iter()
            .rev()
            .take(2)
            .collect::<Vec<_>>(),
        vec!["Pursue", "Adjust"]
    );
}

#[test]
fn front_right_switch_bounces_are_filtered() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.post(Event::signal(EventKind::BeaconFound));
    svc.step(&mut hw, &mut sink, 0);

    for _ in 0..5 {
        hw.snapshot.bumpers = FRONT_RIGHT;
        run_polls(&mut svc, &mut hw, &mut sink, 1);
        hw.snapshot.bumpers = 0;
        run_polls(&mut svc, &mut hw, &mut sink, 1);
    }
    assert_eq!(svc.pursue_state(), PursueState::Pursue);
}

#[test]
fn foreign_timeout_surfaces_as_app_event() {
    let (mut svc, mut hw, mut sink) = make_service();
    // Escape's settle timer, delivered while Lookout runs.
    svc.post(Event::timeout(TimerId::Escape));
    svc.step(&mut hw, &mut sink, 0);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::TimeoutRejected { timer: TimerId::Escape, .. }))
    );
    assert_eq!(svc.state(), TopState::Lookout);
}

#[test]
fn overflowing_the_bus_reports_drops() {
    let (mut svc, _, _) = make_service();
    let accepted = (0..EVENT_QUEUE_CAP + 5)
        .filter(|_| svc.post(Event::signal(EventKind::NoSideBump)))
        .count();
    assert_eq!(accepted, EVENT_QUEUE_CAP);
    assert_eq!(svc.pending(), EVENT_QUEUE_CAP);
}

#[test]
fn restart_clears_motion() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.post(Event::signal(EventKind::BeaconFound));
    svc.step(&mut hw, &mut sink, 0);
    assert_eq!(svc.state(), TopState::Pursue);

    svc.handle_command(AppCommand::Restart, &mut hw, &mut sink)
        .unwrap();
    assert_eq!(svc.state(), TopState::Lookout);
    // All off first, then the Lookout spin.
    assert!(hw.calls.ends_with(&[
        DriveCall::Left(0),
        DriveCall::Right(0),
        DriveCall::Cannon(0),
        DriveCall::Left(70),
        DriveCall::Right(-70),
        DriveCall::Cannon(0),
    ]));
    assert_eq!(
        svc.hsm().context().timers.remaining_ms(TimerId::Hsm),
        Some(svc.config().lookout_ms)
    );
}

#[test]
fn telemetry_is_reported_through_sink() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.step(&mut hw, &mut sink, 100);
    svc.report(&mut sink);
    match sink.events.last() {
        Some(AppEvent::Telemetry(t)) => {
            assert_eq!(t.uptime_ms, 100);
            assert_eq!(t.state, TopState::Lookout);
        }
        other => panic!("expected telemetry, got {:?}", other),
    }
}
