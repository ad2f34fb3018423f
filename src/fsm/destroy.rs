//! Destroy: line the cannon up on the tower tape and fire one ball.
//!
//! ```text
//!  Back ◀──[Timeout(Destroy)]── Forward
//!   │  ──[Timeout(Destroy|Hsm)]──▶  │
//!   │                               │
//!   └──[CannonTape]──▶ Lineup ◀──[CannonTape]
//!                        │
//!                 [NoCannonTape]
//!                        ▼
//!                      Fire ──[Timeout]──▶ Settle ──[Timeout]──▶ post BallDeposit
//! ```
//!
//! `Back` has no bound of its own on the first pass; the top level arms
//! the HSM timer with the check duration when it enters Destroy.  If that
//! timer was lost the machine stalls in `Back`, which is accepted.

use log::debug;

use super::context::RobotContext;
use super::{Reaction, StateDescriptor, StateMachine, StateSet};
use crate::events::{Event, EventKind};
use crate::timers::{MachineId, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DestroyState {
    InitPseudo = 0,
    Back = 1,
    Forward = 2,
    Lineup = 3,
    Fire = 4,
    Settle = 5,
}

impl DestroyState {
    pub const COUNT: usize = 6;
}

impl StateSet for DestroyState {
    const PSEUDO: Self = Self::InitPseudo;

    fn index(self) -> usize {
        self as usize
    }
}

pub type DestroyMachine = StateMachine<DestroyState, RobotContext, { DestroyState::COUNT }>;

pub fn build() -> DestroyMachine {
    StateMachine::new(
        MachineId::Destroy,
        [
            StateDescriptor {
                id: DestroyState::InitPseudo,
                name: "InitPseudo",
                on_enter: None,
                on_exit: None,
                on_event: init_event,
            },
            StateDescriptor {
                id: DestroyState::Back,
                name: "Back",
                on_enter: None,
                on_exit: None,
                on_event: back_event,
            },
            StateDescriptor {
                id: DestroyState::Forward,
                name: "Forward",
                on_enter: None,
                on_exit: None,
                on_event: forward_event,
            },
            StateDescriptor {
                id: DestroyState::Lineup,
                name: "Lineup",
                on_enter: None,
                on_exit: None,
                on_event: lineup_event,
            },
            StateDescriptor {
                id: DestroyState::Fire,
                name: "Fire",
                on_enter: None,
                on_exit: None,
                on_event: fire_event,
            },
            StateDescriptor {
                id: DestroyState::Settle,
                name: "Settle",
                on_enter: Some(settle_enter),
                on_exit: None,
                on_event: settle_event,
            },
        ],
        output,
    )
}

fn arm(ctx: &mut RobotContext, ms: u32) {
    ctx.timers.arm(TimerId::Destroy, MachineId::Destroy, ms);
}

// ═══════════════════════════════════════════════════════════════════════════
//  Handlers
// ═══════════════════════════════════════════════════════════════════════════

fn init_event(_: &mut RobotContext, ev: Event) -> Reaction<DestroyState> {
    if ev.is(EventKind::Init) {
        Reaction::transition(DestroyState::Back)
    } else {
        Reaction::pass(ev)
    }
}

fn back_event(ctx: &mut RobotContext, ev: Event) -> Reaction<DestroyState> {
    if ev.is_timeout_for(TimerId::Destroy) || ev.is_timeout_for(TimerId::Hsm) {
        let ms = ctx.config.destroy_forward_ms;
        arm(ctx, ms);
        return Reaction::transition(DestroyState::Forward);
    }
    match ev.kind {
        EventKind::CannonTape => Reaction::transition(DestroyState::Lineup),
        _ => Reaction::pass(ev),
    }
}

fn forward_event(ctx: &mut RobotContext, ev: Event) -> Reaction<DestroyState> {
    if ev.is_timeout_for(TimerId::Destroy) {
        let ms = ctx.config.destroy_back_ms;
        arm(ctx, ms);
        return Reaction::transition(DestroyState::Back);
    }
    match ev.kind {
        EventKind::CannonTape => Reaction::transition(DestroyState::Lineup),
        _ => Reaction::pass(ev),
    }
}

/// Keep reversing over the tape until the cannon sensor leaves it.
fn lineup_event(ctx: &mut RobotContext, ev: Event) -> Reaction<DestroyState> {
    match ev.kind {
        EventKind::NoCannonTape => {
            let ms = ctx.config.shoot_ms;
            arm(ctx, ms);
            Reaction::transition(DestroyState::Fire)
        }
        _ => Reaction::pass(ev),
    }
}

fn fire_event(ctx: &mut RobotContext, ev: Event) -> Reaction<DestroyState> {
    if ev.is_timeout_for(TimerId::Destroy) {
        let ms = ctx.config.fire_settle_ms;
        arm(ctx, ms);
        Reaction::transition(DestroyState::Settle)
    } else {
        Reaction::pass(ev)
    }
}

fn settle_enter(ctx: &mut RobotContext) {
    ctx.deposit_posted = false;
}

fn settle_event(ctx: &mut RobotContext, ev: Event) -> Reaction<DestroyState> {
    if !ev.is_timeout_for(TimerId::Destroy) {
        return Reaction::pass(ev);
    }
    if !ctx.deposit_posted {
        debug!("Destroy: ball deposited");
        ctx.deposit_posted = true;
        ctx.post(Event::signal(EventKind::BallDeposit));
    }
    Reaction::consume()
}

// ═══════════════════════════════════════════════════════════════════════════
//  Output law
// ═══════════════════════════════════════════════════════════════════════════

fn output(ctx: &mut RobotContext, state: DestroyState) {
    match state {
        DestroyState::InitPseudo => {}
        DestroyState::Back => ctx.drive(-80, -80),
        DestroyState::Forward => ctx.drive(90, 100),
        DestroyState::Lineup => ctx.drive(-70, -70),
        DestroyState::Fire => {
            ctx.drive(0, 0);
            ctx.commands.cannon = 75;
        }
        DestroyState::Settle => ctx.stop_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotConfig;
    use crate::fsm::context::DriveCommands;

    fn setup() -> (DestroyMachine, RobotContext) {
        let mut ctx = RobotContext::new(RobotConfig::default());
        let mut m = build();
        m.init(&mut ctx);
        (m, ctx)
    }

    fn tape() -> Event {
        Event::new(EventKind::CannonTape, 120)
    }

    fn no_tape() -> Event {
        Event::new(EventKind::NoCannonTape, 900)
    }

    #[test]
    fn starts_backing_up() {
        let (m, _) = setup();
        assert_eq!(m.current_state(), DestroyState::Back);
    }

    #[test]
    fn back_and_forward_alternate_on_timeouts() {
        let (mut m, mut ctx) = setup();
        m.run(&mut ctx, Event::timeout(TimerId::Hsm));
        assert_eq!(m.current_state(), DestroyState::Forward);
        assert_eq!(ctx.timers.remaining_ms(TimerId::Destroy), Some(1000));
        assert_eq!((ctx.commands.left, ctx.commands.right), (90, 100));

        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        assert_eq!(m.current_state(), DestroyState::Back);
        assert_eq!(ctx.timers.remaining_ms(TimerId::Destroy), Some(500));

        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        assert_eq!(m.current_state(), DestroyState::Forward);
    }

    #[test]
    fn forward_ignores_hsm_timeout() {
        let (mut m, mut ctx) = setup();
        m.run(&mut ctx, Event::timeout(TimerId::Hsm));
        let ev = Event::timeout(TimerId::Hsm);
        assert_eq!(m.run(&mut ctx, ev), ev);
        assert_eq!(m.current_state(), DestroyState::Forward);
    }

    #[test]
    fn stale_timer_ignored_in_back() {
        let (mut m, mut ctx) = setup();
        let ev = Event::timeout(TimerId::Pursue);
        assert_eq!(m.run(&mut ctx, ev), ev);
        assert_eq!(m.current_state(), DestroyState::Back);
    }

    #[test]
    fn lineup_holds_until_tape_clears() {
        let (mut m, mut ctx) = setup();
        m.run(&mut ctx, tape());
        assert_eq!(m.current_state(), DestroyState::Lineup);

        for _ in 0..5 {
            m.run(&mut ctx, tape());
            assert_eq!(m.current_state(), DestroyState::Lineup);
            assert_eq!((ctx.commands.left, ctx.commands.right), (-70, -70));
        }
        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        assert_eq!(m.current_state(), DestroyState::Lineup);

        assert!(m.run(&mut ctx, no_tape()).is_none());
        assert_eq!(m.current_state(), DestroyState::Fire);
        assert_eq!(ctx.timers.remaining_ms(TimerId::Destroy), Some(4250));
        assert_eq!(
            ctx.commands,
            DriveCommands {
                left: 0,
                right: 0,
                cannon: 75
            }
        );
    }

    #[test]
    fn forward_reaches_lineup_on_tape() {
        let (mut m, mut ctx) = setup();
        m.run(&mut ctx, Event::timeout(TimerId::Hsm));
        m.run(&mut ctx, tape());
        assert_eq!(m.current_state(), DestroyState::Lineup);
    }

    #[test]
    fn ball_deposit_posted_once_per_cycle() {
        let (mut m, mut ctx) = setup();
        m.run(&mut ctx, tape());
        m.run(&mut ctx, no_tape());
        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        assert_eq!(m.current_state(), DestroyState::Settle);
        assert_eq!(ctx.commands, DriveCommands::STOPPED);
        assert!(ctx.take_outbox().is_empty());

        assert!(m.run(&mut ctx, Event::timeout(TimerId::Destroy)).is_none());
        assert_eq!(
            ctx.take_outbox().as_slice(),
            &[Event::signal(EventKind::BallDeposit)]
        );

        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        assert!(ctx.take_outbox().is_empty());

        // A fresh cycle posts again.
        m.init(&mut ctx);
        m.run(&mut ctx, tape());
        m.run(&mut ctx, no_tape());
        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        m.run(&mut ctx, Event::timeout(TimerId::Destroy));
        assert_eq!(ctx.take_outbox().len(), 1);
    }
}
