//! Function-pointer hierarchical state machine engine.
//!
//! Classic embedded table-driven FSM, one table per machine:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  StateMachine<S, C, N>                                        │
//! │  ┌────────────┬───────────┬──────────┬────────────────────┐   │
//! │  │ S          │ on_enter  │ on_exit  │ on_event           │   │
//! │  ├────────────┼───────────┼──────────┼────────────────────┤   │
//! │  │ InitPseudo │ -         │ -        │ fn(ctx, ev)->React │   │
//! │  │ Backup     │ fn(ctx)   │ -        │ fn(ctx, ev)->React │   │
//! │  │ ...        │ ...       │ ...      │ ...                │   │
//! │  └────────────┴───────────┴──────────┴────────────────────┘   │
//! │  output: fn(ctx, current)   (Moore law, every dispatch)       │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each dispatch the engine calls `on_event` for the **current** state.
//! If the returned [`Reaction`] names a next state the engine performs
//! [`StateMachine::apply_transition`]: `on_exit(old)`, pointer update,
//! `on_enter(new)`, in that order and on the same call stack.  Finally
//! the output law of the (new) current state is re-asserted.
//!
//! Hierarchy is built by composition: a parent's context owns its child
//! machines, and the parent's `on_event` handlers call the child's
//! [`StateMachine::run`] and then inspect the returned event.

pub mod context;
pub mod destroy;
pub mod escape;
pub mod lookout;
pub mod pursue;
pub mod robot;
pub mod search;

use core::fmt::Debug;

use log::debug;

use crate::events::Event;
use crate::timers::MachineId;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// A closed enumeration of states for one machine.
///
/// `index()` must be dense in `0..N` and match the order of the table
/// handed to [`StateMachine::new`].
pub trait StateSet: Copy + Eq + Debug + 'static {
    /// The pseudo-initial state, left on the first `Init`.
    const PSEUDO: Self;

    fn index(self) -> usize;
}

// ---------------------------------------------------------------------------
// Handler signatures
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each transition.
pub type StateActionFn<C> = fn(&mut C);

/// Signature for the per-event handler.
pub type StateEventFn<S, C> = fn(&mut C, Event) -> Reaction<S>;

/// Moore output law: drive commands as a pure function of the state.
pub type OutputFn<S, C> = fn(&mut C, S);

/// What a state decided to do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction<S> {
    pub next: Option<S>,
    pub event: Event,
}

impl<S> Reaction<S> {
    /// Stay put and return `event` to the caller (unchanged or rewritten).
    pub fn pass(event: Event) -> Self {
        Self { next: None, event }
    }

    /// Stay put and swallow the event.
    pub fn consume() -> Self {
        Self::pass(Event::NONE)
    }

    /// Move to `next`; the triggering event is consumed.
    pub fn transition(next: S) -> Self {
        Self::transition_with(next, Event::NONE)
    }

    /// Move to `next` and hand `event` up to the parent.
    pub fn transition_with(next: S, event: Event) -> Self {
        Self {
            next: Some(next),
            event,
        }
    }
}

/// Handler for states that react to nothing and pass every event up.
pub fn pass_all<S, C>(_: &mut C, event: Event) -> Reaction<S> {
    Reaction::pass(event)
}

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single state.
/// Stored in a fixed-size array, no heap, no `dyn`.
pub struct StateDescriptor<S, C> {
    pub id: S,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<C>>,
    pub on_exit: Option<StateActionFn<C>>,
    pub on_event: StateEventFn<S, C>,
}

// ---------------------------------------------------------------------------
// Transition trace
// ---------------------------------------------------------------------------

/// One phase of a transition, in the order the engine runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStep {
    Exit(&'static str),
    Transition {
        from: &'static str,
        to: &'static str,
    },
    Entry(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub machine: MachineId,
    pub step: TraceStep,
}

/// Implemented by every context a machine runs against.
pub trait MachineContext {
    /// Called for each transition phase before the matching action runs.
    fn record(&mut self, entry: TraceEntry);
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One state machine: a table of [`StateDescriptor`]s plus the active state.
///
/// The context `C` is not owned; it is threaded through every call so a
/// parent can hand its own blackboard (or itself) to the children.
pub struct StateMachine<S: StateSet, C, const N: usize> {
    machine: MachineId,
    table: [StateDescriptor<S, C>; N],
    current: S,
    output: OutputFn<S, C>,
}

impl<S: StateSet, C: MachineContext, const N: usize> StateMachine<S, C, N> {
    /// Construct a machine parked in its pseudo state.  Call [`init`](Self::init)
    /// before dispatching anything else.
    pub fn new(machine: MachineId, table: [StateDescriptor<S, C>; N], output: OutputFn<S, C>) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, d)| d.id.index() == i),
            "state table out of order for {:?}",
            machine
        );
        Self {
            machine,
            table,
            current: S::PSEUDO,
            output,
        }
    }

    /// Force the pseudo state and dispatch `Init`.
    /// Returns `true` if the pseudo state consumed it.
    pub fn init(&mut self, ctx: &mut C) -> bool {
        self.current = S::PSEUDO;
        self.run(ctx, Event::INIT).is_none()
    }

    /// Dispatch one event.
    ///
    /// `Entry` and `Exit` are never matched against the table: they are
    /// handed back untouched.  Anything else goes to the current state's
    /// `on_event`; the returned event is either `NoEvent` (consumed), the
    /// input (passed through), or a signal for the parent.
    pub fn run(&mut self, ctx: &mut C, event: Event) -> Event {
        if event.kind.is_entry_or_exit() {
            return event;
        }

        let handler = self.descriptor(self.current).on_event;
        let reaction = handler(ctx, event);

        if let Some(next) = reaction.next {
            self.apply_transition(ctx, next);
        }

        (self.output)(ctx, self.current);
        reaction.event
    }

    /// Exit the current state, switch to `next`, enter it.
    ///
    /// The exit action of the old state always completes before the entry
    /// action of the new one starts.  A self-transition runs both.
    pub fn apply_transition(&mut self, ctx: &mut C, next: S) {
        let from = self.descriptor(self.current);
        let (from_name, on_exit) = (from.name, from.on_exit);
        let to = self.descriptor(next);
        let (to_name, on_enter) = (to.name, to.on_enter);

        debug!("{:?}: {} -> {}", self.machine, from_name, to_name);

        ctx.record(self.trace(TraceStep::Exit(from_name)));
        if let Some(exit) = on_exit {
            exit(ctx);
        }

        ctx.record(self.trace(TraceStep::Transition {
            from: from_name,
            to: to_name,
        }));
        self.current = next;

        ctx.record(self.trace(TraceStep::Entry(to_name)));
        if let Some(enter) = on_enter {
            enter(ctx);
        }
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn state_name(&self) -> &'static str {
        self.descriptor(self.current).name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn descriptor(&self, state: S) -> &StateDescriptor<S, C> {
        match self.table.get(state.index()) {
            Some(d) => d,
            None => {
                debug_assert!(false, "invalid state index: {}", state.index());
                &self.table[S::PSEUDO.index()]
            }
        }
    }

    fn trace(&self, step: TraceStep) -> TraceEntry {
        TraceEntry {
            machine: self.machine,
            step,
        }
    }
}
