//! Lookout: spin in place while the beacon detector scans.
//!
//! The top level bounds the spin with the HSM timer; `BeaconFound` and the
//! timeout both pass straight through to it.

use super::context::RobotContext;
use super::{pass_all, Reaction, StateDescriptor, StateMachine, StateSet};
use crate::events::{Event, EventKind};
use crate::timers::MachineId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LookoutState {
    InitPseudo = 0,
    Spin = 1,
}

impl LookoutState {
    pub const COUNT: usize = 2;
}

impl StateSet for LookoutState {
    const PSEUDO: Self = Self::InitPseudo;

    fn index(self) -> usize {
        self as usize
    }
}

pub type LookoutMachine = StateMachine<LookoutState, RobotContext, { LookoutState::COUNT }>;

pub fn build() -> LookoutMachine {
    StateMachine::new(
        MachineId::Lookout,
        [
            StateDescriptor {
                id: LookoutState::InitPseudo,
                name: "InitPseudo",
                on_enter: None,
                on_exit: None,
                on_event: init_event,
            },
            StateDescriptor {
                id: LookoutState::Spin,
                name: "Spin",
                on_enter: None,
                on_exit: None,
                on_event: pass_all,
            },
        ],
        output,
    )
}

fn init_event(_: &mut RobotContext, ev: Event) -> Reaction<LookoutState> {
    if ev.is(EventKind::Init) {
        Reaction::transition(LookoutState::Spin)
    } else {
        Reaction::pass(ev)
    }
}

fn output(ctx: &mut RobotContext, state: LookoutState) {
    if state == LookoutState::Spin {
        ctx.drive(70, -70);
    }
}
