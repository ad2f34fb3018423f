//! Search: wide arc used when a full lookout spin found nothing.

use super::context::RobotContext;
use super::{pass_all, Reaction, StateDescriptor, StateMachine, StateSet};
use crate::events::{Event, EventKind};
use crate::timers::MachineId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SearchState {
    InitPseudo = 0,
    Sweep = 1,
}

impl SearchState {
    pub const COUNT: usize = 2;
}

impl StateSet for SearchState {
    const PSEUDO: Self = Self::InitPseudo;

    fn index(self) -> usize {
        self as usize
    }
}

pub type SearchMachine = StateMachine<SearchState, RobotContext, { SearchState::COUNT }>;

pub fn build() -> SearchMachine {
    StateMachine::new(
        MachineId::Search,
        [
            StateDescriptor {
                id: SearchState::InitPseudo,
                name: "InitPseudo",
                on_enter: None,
                on_exit: None,
                on_event: init_event,
            },
            StateDescriptor {
                id: SearchState::Sweep,
                name: "Sweep",
                on_enter: None,
                on_exit: None,
                on_event: pass_all,
            },
        ],
        output,
    )
}

fn init_event(_: &mut RobotContext, ev: Event) -> Reaction<SearchState> {
    if ev.is(EventKind::Init) {
        Reaction::transition(SearchState::Sweep)
    } else {
        Reaction::pass(ev)
    }
}

fn output(ctx: &mut RobotContext, state: SearchState) {
    if state == SearchState::Sweep {
        ctx.drive(80, 40);
    }
}
