//! Escape: let the cannon spin down, then back away from the tower.
//!
//! ```text
//!  InitPseudo ──[Init]──▶ Settle ──[Timeout(Escape)]──▶ Retreat
//! ```
//!
//! The overall retreat is bounded by the HSM timer the top level arms on
//! entry; the sub-machine's own timer only covers the settle pause.

use super::context::RobotContext;
use super::{pass_all, Reaction, StateDescriptor, StateMachine, StateSet};
use crate::events::{Event, EventKind};
use crate::timers::{MachineId, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EscapeState {
    InitPseudo = 0,
    Settle = 1,
    Retreat = 2,
}

impl EscapeState {
    pub const COUNT: usize = 3;
}

impl StateSet for EscapeState {
    const PSEUDO: Self = Self::InitPseudo;

    fn index(self) -> usize {
        self as usize
    }
}

pub type EscapeMachine = StateMachine<EscapeState, RobotContext, { EscapeState::COUNT }>;

pub fn build() -> EscapeMachine {
    StateMachine::new(
        MachineId::Escape,
        [
            StateDescriptor {
                id: EscapeState::InitPseudo,
                name: "InitPseudo",
                on_enter: None,
                on_exit: None,
                on_event: init_event,
            },
            StateDescriptor {
                id: EscapeState::Settle,
                name: "Settle",
                on_enter: Some(settle_enter),
                on_exit: None,
                on_event: settle_event,
            },
            StateDescriptor {
                id: EscapeState::Retreat,
                name: "Retreat",
                on_enter: None,
                on_exit: None,
                on_event: pass_all,
            },
        ],
        output,
    )
}

fn init_event(_: &mut RobotContext, ev: Event) -> Reaction<EscapeState> {
    if ev.is(EventKind::Init) {
        Reaction::transition(EscapeState::Settle)
    } else {
        Reaction::pass(ev)
    }
}

fn settle_enter(ctx: &mut RobotContext) {
    let ms = ctx.config.escape_settle_ms;
    ctx.timers.arm(TimerId::Escape, MachineId::Escape, ms);
}

fn settle_event(_: &mut RobotContext, ev: Event) -> Reaction<EscapeState> {
    if ev.is_timeout_for(TimerId::Escape) {
        Reaction::transition(EscapeState::Retreat)
    } else {
        Reaction::pass(ev)
    }
}

fn output(ctx: &mut RobotContext, state: EscapeState) {
    match state {
        EscapeState::InitPseudo => {}
        EscapeState::Settle => ctx.stop_all(),
        EscapeState::Retreat => {
            ctx.drive(-85, -85);
            ctx.commands.cannon = 0;
        }
    }
}
