//! End-to-end behaviour scenarios through the service.
//!
//! Events are either injected (bypassing the sensors) or produced by the
//! checkers from sensor snapshots, and the resulting motor commands are
//! read back from the mock hardware.

use crate::mock_hw::{LogSink, MockHardware};

use towerbot::adapters::sim::SimWorld;
use towerbot::app::commands::AppCommand;
use towerbot::fsm::destroy::DestroyState;
use towerbot::fsm::pursue::PursueState;
use towerbot::fsm::robot::TopState;
use towerbot::timers::{MachineId, TimerId};
use towerbot::{Event, EventKind, RobotConfig, RobotService};

fn make_service() -> (RobotService, MockHardware, LogSink) {
    let mut svc = RobotService::new(RobotConfig::default()).unwrap();
    let mut sink = LogSink::new();
    svc.start(&mut sink);
    (svc, MockHardware::new(), sink)
}

fn inject(svc: &mut RobotService, hw: &mut MockHardware, sink: &mut LogSink, ev: Event) {
    svc.handle_command(AppCommand::Inject(ev), hw, sink).unwrap();
}

fn sig(kind: EventKind) -> Event {
    Event::signal(kind)
}

/// Bump into the tower and follow its wall until the check confirms it.
fn drive_into_destroy(svc: &mut RobotService, hw: &mut MockHardware, sink: &mut LogSink) {
    inject(svc, hw, sink, sig(EventKind::BeaconFound));
    inject(svc, hw, sink, sig(EventKind::FrontLeftBump));
    inject(svc, hw, sink, Event::timeout(TimerId::Pursue));
    inject(svc, hw, sink, sig(EventKind::SideBump));
    for _ in 0..svc.config().wall_contacts_required {
        inject(svc, hw, sink, sig(EventKind::NoSideBump));
        inject(svc, hw, sink, sig(EventKind::SideBump));
    }
    inject(svc, hw, sink, Event::timeout(TimerId::Pursue));
    inject(svc, hw, sink, Event::timeout(TimerId::Pursue));
    inject(svc, hw, sink, Event::timeout(TimerId::Pursue));
    assert_eq!(svc.state(), TopState::Destroy);
}

// ── beacon in Lookout ──────────────────────────────────────

#[test]
fn beacon_in_lookout_enters_pursue_from_its_initial_state() {
    let (mut svc, mut hw, mut sink) = make_service();
    let out = svc.dispatch(sig(EventKind::BeaconFound), &mut hw, &mut sink);
    assert!(out.is_none(), "event must be consumed");
    assert_eq!(svc.state(), TopState::Pursue);
    assert_eq!(svc.pursue_state(), PursueState::Pursue);
    assert_eq!(hw.drive().left, 90);
    assert_eq!(hw.drive().right, 100);
}

// ── lookout times out ──────────────────────────────────────

#[test]
fn lookout_timeout_searches_with_spin_duration() {
    let (mut svc, mut hw, mut sink) = make_service();
    svc.step(&mut hw, &mut sink, 8_500);
    assert_eq!(svc.state(), TopState::Search);
    assert_eq!(
        svc.hsm().context().timers.remaining_ms(TimerId::Hsm),
        Some(svc.config().spin_ms)
    );
}

// ── bump while pursuing ────────────────────────────────────

#[test]
fn front_bump_backs_up_at_full_reverse() {
    let (mut svc, mut hw, mut sink) = make_service();
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::BeaconFound));
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::FrontRightBump));
    assert_eq!(svc.pursue_state(), PursueState::Backup);
    assert_eq!(
        svc.hsm().context().timers.remaining_ms(TimerId::Pursue),
        Some(svc.config().backup_ms)
    );
    assert_eq!(svc.hsm().context().timers.owner(TimerId::Pursue), Some(MachineId::Pursue));

    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::NoBeaconFound));
    assert_eq!(svc.pursue_state(), PursueState::Backup);
    assert_eq!((hw.drive().left, hw.drive().right), (-100, -100));
}

// ── lineup waits for the tape to clear ─────────────────────

#[test]
fn lineup_only_fires_once_tape_clears() {
    let (mut svc, mut hw, mut sink) = make_service();
    drive_into_destroy(&mut svc, &mut hw, &mut sink);
    inject(&mut svc, &mut hw, &mut sink, Event::new(EventKind::CannonTape, 120));
    assert_eq!(svc.destroy_state(), DestroyState::Lineup);

    for raw in [110, 100, 90, 150] {
        inject(&mut svc, &mut hw, &mut sink, Event::new(EventKind::CannonTape, raw));
        assert_eq!(svc.destroy_state(), DestroyState::Lineup);
    }

    inject(&mut svc, &mut hw, &mut sink, Event::new(EventKind::NoCannonTape, 800));
    assert_eq!(svc.destroy_state(), DestroyState::Fire);
    assert!(hw.drive().cannon > 0);
}

// ── wall following alternates ──────────────────────────────

#[test]
fn side_follow_alternates_on_contact_changes() {
    // Unreachable contact threshold, so only the On/Off pair is visible.
    let config = RobotConfig {
        wall_contacts_required: 100,
        ..RobotConfig::default()
    };
    let mut svc = RobotService::new(config).unwrap();
    let mut sink = LogSink::new();
    let mut hw = MockHardware::new();
    svc.start(&mut sink);

    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::BeaconFound));
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::FrontLeftBump));
    inject(&mut svc, &mut hw, &mut sink, Event::timeout(TimerId::Pursue));
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::SideBump));
    assert_eq!(svc.pursue_state(), PursueState::SideFollowOn);

    let script = [
        (sig(EventKind::NoSideBump), PursueState::SideFollowOff),
        (sig(EventKind::SideBump), PursueState::SideFollowOn),
        (sig(EventKind::NoSideBump), PursueState::SideFollowOff),
        (Event::timeout(TimerId::Pursue), PursueState::SideFollowOn),
        (sig(EventKind::NoSideBump), PursueState::SideFollowOff),
        (sig(EventKind::SideBump), PursueState::SideFollowOn),
    ];
    for (ev, expected) in script {
        inject(&mut svc, &mut hw, &mut sink, ev);
        assert_eq!(svc.pursue_state(), expected, "after {:?}", ev);
    }

    let entered = sink.entered(MachineId::Pursue);
    let follow: Vec<_> = entered
        .iter()
        .skip_while(|s| **s != "SideFollowOn")
        .collect();
    assert!(follow.windows(2).all(|w| w[0] != w[1]), "no self-loops: {:?}", follow);
}

#[test]
fn side_follow_alternates_until_contact_threshold() {
    let (mut svc, mut hw, mut sink) = make_service();
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::BeaconFound));
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::FrontLeftBump));
    inject(&mut svc, &mut hw, &mut sink, Event::timeout(TimerId::Pursue));
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::SideBump));
    assert_eq!(svc.pursue_state(), PursueState::SideFollowOn);

    // A Pursue timeout swings back without counting as a contact.
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::NoSideBump));
    inject(&mut svc, &mut hw, &mut sink, Event::timeout(TimerId::Pursue));
    assert_eq!(svc.pursue_state(), PursueState::SideFollowOn);

    for _ in 1..svc.config().wall_contacts_required {
        inject(&mut svc, &mut hw, &mut sink, sig(EventKind::NoSideBump));
        assert_eq!(svc.pursue_state(), PursueState::SideFollowOff);
        inject(&mut svc, &mut hw, &mut sink, sig(EventKind::SideBump));
        assert_eq!(svc.pursue_state(), PursueState::SideFollowOn);
    }

    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::NoSideBump));
    inject(&mut svc, &mut hw, &mut sink, sig(EventKind::SideBump));
    assert_eq!(svc.pursue_state(), PursueState::Backup2);
    assert_eq!((hw.drive().left, hw.drive().right), (0, -85));
}

// ── Full cycle ─────────────────────────────────────────────

#[test]
fn deposit_leads_through_escape_back_to_lookout() {
    let (mut svc, mut hw, mut sink) = make_service();
    drive_into_destroy(&mut svc, &mut hw, &mut sink);

    inject(&mut svc, &mut hw, &mut sink, Event::new(EventKind::CannonTape, 100));
    inject(&mut svc, &mut hw, &mut sink, Event::new(EventKind::NoCannonTape, 800));
    svc.step(&mut hw, &mut sink, svc.config().shoot_ms);
    assert_eq!(svc.destroy_state(), DestroyState::Settle);

    // Settle expiry posts BallDeposit, which the same step dispatches.
    svc.step(&mut hw, &mut sink, svc.config().fire_settle_ms);
    assert_eq!(svc.state(), TopState::Escape);

    svc.step(&mut hw, &mut sink, svc.config().escape_total_ms());
    assert_eq!(svc.state(), TopState::Lookout);
    assert_eq!(svc.pursue_state(), PursueState::Pursue);
    assert_eq!(svc.destroy_state(), DestroyState::Back);

    let deposits = sink
        .top_transitions()
        .iter()
        .filter(|t| **t == ("Destroy", "Escape"))
        .count();
    assert_eq!(deposits, 1);
}

#[test]
fn simulated_mission_completes_a_cycle() {
    let mut svc = RobotService::new(RobotConfig::default()).unwrap();
    let mut world = SimWorld::mission();
    let mut sink = LogSink::new();
    svc.start(&mut sink);

    let mut fired = false;
    while world.now_ms() < 16_000 {
        world.advance(5);
        svc.step(&mut world, &mut sink, 5);
        fired |= world.drive().cannon > 0;
    }

    let path = sink.top_transitions();
    let expected = [
        ("InitPseudo", "Lookout"),
        ("Lookout", "Pursue"),
        ("Pursue", "Destroy"),
        ("Destroy", "Escape"),
        ("Escape", "Lookout"),
    ];
    assert_eq!(path, expected, "top-level path");
    assert!(fired, "cannon never spun up");
    assert_eq!(svc.state(), TopState::Lookout);
    assert!(world.script_done());
}
