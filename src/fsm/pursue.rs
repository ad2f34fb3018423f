//! Pursue: close on the beacon, recover from bumps and tape, follow the
//! tower wall until it is confirmed.
//!
//! ```text
//!  Direct pursuit
//!  ──────────────
//!  Pursue ◀─[BeaconFound]─ Adjust ◀─[NoBeaconFound]─ Pursue
//!    │ front bump
//!    ▼
//!  Backup ─[T]─▶ Bump ─[SideBump]─▶ SideFollowOn ◀──────────┐
//!                                     │ [NoSideBump]         │ [SideBump | T]
//!                                     ▼                      │
//!                                   SideFollowOff ───────────┘
//!                                     │ [SideBump, contacts reached]
//!                                     ▼
//!                  Backup2 ─[T]─▶ Side ─[T]─▶ Check ─[T, side pressed]─▶ Stop + WallFound
//!                                               │ [T, side clear]
//!                                               ▼
//!                       SideFollowOn ◀─[SideBump]─ Slide ─[FrontLeftBump]─▶ PivotLeft ─[T]─▶ Slide2
//!
//!  Tape deflection
//!  ───────────────
//!  TapeBackR  ─[T]─▶ RightTape  ─┐
//!  TapeBackR2 ─[T]─▶ RightTape2 ─┼─[T]─▶ Straight ─[T]─▶ Pursue + post GoSeeking
//!  TapeBackL  ─[T]─▶ LeftTape   ─┘
//! ```
//!
//! `[T]` is always `Timeout(Pursue)`; any other timer id is stale here and
//! passes through untouched.

use log::debug;

use super::context::RobotContext;
use super::{pass_all, Reaction, StateDescriptor, StateMachine, StateSet};
use crate::config::RobotConfig;
use crate::events::{Event, EventKind};
use crate::timers::{MachineId, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PursueState {
    InitPseudo = 0,
    Pursue = 1,
    Adjust = 2,
    Slide = 3,
    Slide2 = 4,
    PivotLeft = 5,
    Backup = 6,
    Backup2 = 7,
    Side = 8,
    Bump = 9,
    Check = 10,
    RightTape = 11,
    RightTape2 = 12,
    LeftTape = 13,
    TapeBackR = 14,
    TapeBackR2 = 15,
    TapeBackL = 16,
    Stop = 17,
    SideFollowOn = 18,
    SideFollowOff = 19,
    Straight = 20,
}

impl PursueState {
    pub const COUNT: usize = 21;
}

impl StateSet for PursueState {
    const PSEUDO: Self = Self::InitPseudo;

    fn index(self) -> usize {
        self as usize
    }
}

pub type PursueMachine = StateMachine<PursueState, RobotContext, { PursueState::COUNT }>;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

const fn row(
    id: PursueState,
    name: &'static str,
    on_event: fn(&mut RobotContext, Event) -> Reaction<PursueState>,
) -> StateDescriptor<PursueState, RobotContext> {
    StateDescriptor {
        id,
        name,
        on_enter: None,
        on_exit: None,
        on_event,
    }
}

pub fn build() -> PursueMachine {
    use PursueState as S;
    StateMachine::new(
        MachineId::Pursue,
        [
            row(S::InitPseudo, "InitPseudo", init_event),
            row(S::Pursue, "Pursue", pursue_event),
            row(S::Adjust, "Adjust", adjust_event),
            row(S::Slide, "Slide", slide_event),
            row(S::Slide2, "Slide2", slide2_event),
            row(S::PivotLeft, "PivotLeft", pivot_left_event),
            row(S::Backup, "Backup", backup_event),
            row(S::Backup2, "Backup2", backup2_event),
            row(S::Side, "Side", side_event),
            row(S::Bump, "Bump", bump_event),
            row(S::Check, "Check", check_event),
            row(S::RightTape, "RightTape", tank_turn_event),
            row(S::RightTape2, "RightTape2", tank_turn_event),
            row(S::LeftTape, "LeftTape", left_tape_event),
            row(S::TapeBackR, "TapeBackR", tape_back_r_event),
            row(S::TapeBackR2, "TapeBackR2", tape_back_r2_event),
            row(S::TapeBackL, "TapeBackL", tape_back_l_event),
            row(S::Stop, "Stop", pass_all),
            row(S::SideFollowOn, "SideFollowOn", side_follow_on_event),
            row(S::SideFollowOff, "SideFollowOff", side_follow_off_event),
            row(S::Straight, "Straight", straight_event),
        ],
        output,
    )
}

// ═══════════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn timed(ctx: &mut RobotContext, next: PursueState, ms: fn(&RobotConfig) -> u32) -> Reaction<PursueState> {
    let ms = ms(&ctx.config);
    ctx.timers.arm(TimerId::Pursue, MachineId::Pursue, ms);
    Reaction::transition(next)
}

fn expired(ev: Event) -> bool {
    ev.is_timeout_for(TimerId::Pursue)
}

fn front_bump(ev: Event) -> bool {
    matches!(ev.kind, EventKind::FrontLeftBump | EventKind::FrontRightBump)
}

/// Bump and tape exits shared by `Pursue` and `Adjust`.
fn approach_exits(ctx: &mut RobotContext, ev: Event) -> Option<Reaction<PursueState>> {
    if front_bump(ev) {
        return Some(timed(ctx, PursueState::Backup, |c| c.backup_ms));
    }
    match ev.kind {
        EventKind::FrontRightTape => Some(timed(ctx, PursueState::TapeBackR, |c| c.tape_back_ms)),
        EventKind::FrontLeftTape => Some(timed(ctx, PursueState::TapeBackL, |c| c.tape_back_ms)),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Direct pursuit
// ═══════════════════════════════════════════════════════════════════════════

fn init_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if ev.is(EventKind::Init) {
        ctx.wall_contacts = 0;
        Reaction::transition(PursueState::Pursue)
    } else {
        Reaction::pass(ev)
    }
}

fn pursue_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if let Some(r) = approach_exits(ctx, ev) {
        return r;
    }
    match ev.kind {
        EventKind::NoBeaconFound => Reaction::transition(PursueState::Adjust),
        _ => Reaction::pass(ev),
    }
}

fn adjust_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if let Some(r) = approach_exits(ctx, ev) {
        return r;
    }
    match ev.kind {
        EventKind::BeaconFound => Reaction::transition(PursueState::Pursue),
        _ => Reaction::pass(ev),
    }
}

fn backup_event(_: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        Reaction::transition(PursueState::Bump)
    } else {
        Reaction::pass(ev)
    }
}

fn bump_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if front_bump(ev) {
        return timed(ctx, PursueState::Backup, |c| c.backup_ms);
    }
    match ev.kind {
        EventKind::SideBump => Reaction::transition(PursueState::SideFollowOn),
        EventKind::FrontLeftTape => timed(ctx, PursueState::TapeBackL, |c| c.tape_back_ms),
        _ => Reaction::pass(ev),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Wall following
// ═══════════════════════════════════════════════════════════════════════════

fn side_follow_on_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    match ev.kind {
        EventKind::NoSideBump | EventKind::NoFrontLeftBump => {
            timed(ctx, PursueState::SideFollowOff, |c| c.side_follow_ms)
        }
        _ => Reaction::pass(ev),
    }
}

fn side_follow_off_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        return Reaction::transition(PursueState::SideFollowOn);
    }
    match ev.kind {
        EventKind::SideBump => {
            ctx.wall_contacts = ctx.wall_contacts.saturating_add(1);
            if ctx.wall_contacts >= ctx.config.wall_contacts_required {
                debug!("Pursue: {} wall contacts, checking", ctx.wall_contacts);
                ctx.wall_contacts = 0;
                timed(ctx, PursueState::Backup2, |c| c.backup2_ms)
            } else {
                Reaction::transition(PursueState::SideFollowOn)
            }
        }
        EventKind::FrontLeftBump => Reaction::transition(PursueState::SideFollowOn),
        _ => Reaction::pass(ev),
    }
}

fn backup2_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        timed(ctx, PursueState::Side, |c| c.side_ms)
    } else {
        Reaction::pass(ev)
    }
}

fn side_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        return timed(ctx, PursueState::Check, |c| c.wall_check_ms);
    }
    match ev.kind {
        EventKind::SideBump => timed(ctx, PursueState::Backup2, |c| c.backup2_ms),
        _ => Reaction::pass(ev),
    }
}

/// Motors are stopped here so drive noise cannot mask the side switch.
fn check_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if !expired(ev) {
        return Reaction::pass(ev);
    }
    if ctx.levels.side {
        debug!("Pursue: wall confirmed");
        Reaction::transition_with(PursueState::Stop, Event::signal(EventKind::WallFound))
    } else {
        Reaction::transition(PursueState::Slide)
    }
}

fn slide_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    match ev.kind {
        EventKind::SideBump => timed(ctx, PursueState::SideFollowOn, |c| c.side_follow_ms),
        EventKind::FrontRightTape => timed(ctx, PursueState::TapeBackR2, |c| c.tape_back_ms),
        EventKind::FrontLeftBump => timed(ctx, PursueState::PivotLeft, |c| c.pivot_ms),
        _ => Reaction::pass(ev),
    }
}

fn pivot_left_event(_: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        Reaction::transition(PursueState::Slide2)
    } else {
        Reaction::pass(ev)
    }
}

fn slide2_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    match ev.kind {
        EventKind::SideBump => Reaction::transition(PursueState::SideFollowOn),
        EventKind::FrontRightTape => timed(ctx, PursueState::TapeBackR2, |c| c.tape_back_ms),
        _ => Reaction::pass(ev),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tape deflection
// ═══════════════════════════════════════════════════════════════════════════

fn tape_back_r_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        timed(ctx, PursueState::RightTape, |c| c.tank_turn_ms)
    } else {
        Reaction::pass(ev)
    }
}

fn tape_back_r2_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        timed(ctx, PursueState::RightTape2, |c| c.tank_turn2_ms)
    } else {
        Reaction::pass(ev)
    }
}

fn tape_back_l_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        return timed(ctx, PursueState::LeftTape, |c| c.tank_turn_ms);
    }
    match ev.kind {
        EventKind::BeaconFound => Reaction::transition(PursueState::Pursue),
        _ => Reaction::pass(ev),
    }
}

fn left_tape_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    match ev.kind {
        EventKind::BeaconFound => Reaction::transition(PursueState::Pursue),
        _ => tank_turn_event(ctx, ev),
    }
}

fn tank_turn_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        timed(ctx, PursueState::Straight, |c| c.straight_ms)
    } else {
        Reaction::pass(ev)
    }
}

fn straight_event(ctx: &mut RobotContext, ev: Event) -> Reaction<PursueState> {
    if expired(ev) {
        ctx.post(Event::signal(EventKind::GoSeeking));
        Reaction::transition(PursueState::Pursue)
    } else {
        Reaction::pass(ev)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Output law (left, right)
// ═══════════════════════════════════════════════════════════════════════════

fn speeds(state: PursueState) -> Option<(i8, i8)> {
    use PursueState as S;
    Some(match state {
        S::InitPseudo => return None,
        S::Pursue => (90, 100),
        S::Adjust => (100, 0),
        S::Slide => (60, 100),
        S::Slide2 => (70, 90),
        S::PivotLeft => (-60, 60),
        S::Backup => (-100, -100),
        S::Backup2 => (0, -85),
        S::Side => (100, 75),
        S::Bump => (90, 75),
        S::Check | S::Stop => (0, 0),
        S::RightTape => (-100, 0),
        S::RightTape2 | S::LeftTape => (0, -100),
        S::TapeBackR | S::TapeBackR2 | S::TapeBackL => (-100, -100),
        S::SideFollowOn => (100, 80),
        S::SideFollowOff => (40, 100),
        S::Straight => (85, 85),
    })
}

fn output(ctx: &mut RobotContext, state: PursueState) {
    if let Some((left, right)) = speeds(state) {
        ctx.drive(left, right);
    }
}
