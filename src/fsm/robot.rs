//! Top-level robot HSM.
//!
//! ```text
//!  InitPseudo ──[Init]──▶ LOOKOUT ──[BeaconFound]──────────▶ PURSUE
//!                          │   ▲                               │  │
//!                [T(Hsm)]  │   │ [T(Hsm)]        [GoSeeking]   │  │ [WallFound]
//!                          ▼   │                               │  ▼
//!                         SEARCH ──[BeaconFound]──▶ PURSUE     │ DESTROY
//!                                                              │  │ [BallDeposit]
//!                          LOOKOUT ◀───────────────────────────┘  ▼
//!                          LOOKOUT ◀──────────[T(Hsm)]────────── ESCAPE
//! ```
//!
//! Every event is first handed to the sub-machine of the active top state.
//! Whatever it returns (consumed, passed through, or rewritten into a
//! signal) is then matched against the top-level table.  The HSM timer is
//! armed by the entry action of each timed top state, so every path into
//! Lookout, Search, Destroy or Escape starts a fresh bound.

use log::{info, warn};

use super::context::{Notice, RobotContext};
use super::destroy::{self, DestroyMachine, DestroyState};
use super::escape::{self, EscapeMachine, EscapeState};
use super::lookout::{self, LookoutMachine, LookoutState};
use super::pursue::{self, PursueMachine, PursueState};
use super::search::{self, SearchMachine, SearchState};
use super::{MachineContext, Reaction, StateDescriptor, StateMachine, StateSet, TraceEntry};
use crate::config::RobotConfig;
use crate::events::{Event, EventKind};
use crate::timers::{MachineId, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TopState {
    InitPseudo = 0,
    Lookout = 1,
    Search = 2,
    Pursue = 3,
    Destroy = 4,
    Escape = 5,
}

impl TopState {
    pub const COUNT: usize = 6;

    /// Sub-machine that receives events while this state is active.
    pub fn machine(self) -> MachineId {
        match self {
            Self::InitPseudo => MachineId::Robot,
            Self::Lookout => MachineId::Lookout,
            Self::Search => MachineId::Search,
            Self::Pursue => MachineId::Pursue,
            Self::Destroy => MachineId::Destroy,
            Self::Escape => MachineId::Escape,
        }
    }
}

impl StateSet for TopState {
    const PSEUDO: Self = Self::InitPseudo;

    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// Hierarchy: the top level's context
// ---------------------------------------------------------------------------

/// The blackboard plus every sub-machine.  Top-level handlers receive
/// this so they can delegate to the children and arm shared timers.
struct Hierarchy {
    ctx: RobotContext,
    lookout: LookoutMachine,
    search: SearchMachine,
    pursue: PursueMachine,
    destroy: DestroyMachine,
    escape: EscapeMachine,
}

impl MachineContext for Hierarchy {
    fn record(&mut self, entry: TraceEntry) {
        self.ctx.record(entry);
    }
}

impl Hierarchy {
    fn arm_hsm(&mut self, ms: u32) {
        self.ctx.timers.arm(TimerId::Hsm, MachineId::Robot, ms);
    }

    /// Hand `ev` to `machine`, unless it is a timeout armed by someone
    /// other than the top level or that machine.
    fn delegate(&mut self, machine: MachineId, ev: Event) -> Event {
        if let Some(timer) = ev.timer() {
            let owner = self.ctx.timers.owner(timer);
            if owner != Some(MachineId::Robot) && owner != Some(machine) {
                warn!(
                    "rejecting Timeout({:?}) owned by {:?} while {:?} is active",
                    timer, owner, machine
                );
                self.ctx.notify(Notice::TimeoutRejected { timer, owner });
                return Event::NONE;
            }
        }

        let ctx = &mut self.ctx;
        match machine {
            MachineId::Lookout => self.lookout.run(ctx, ev),
            MachineId::Search => self.search.run(ctx, ev),
            MachineId::Pursue => self.pursue.run(ctx, ev),
            MachineId::Destroy => self.destroy.run(ctx, ev),
            MachineId::Escape => self.escape.run(ctx, ev),
            MachineId::Robot => ev,
        }
    }
}

type TopMachine = StateMachine<TopState, Hierarchy, { TopState::COUNT }>;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

fn build_top() -> TopMachine {
    StateMachine::new(
        MachineId::Robot,
        [
            StateDescriptor {
                id: TopState::InitPseudo,
                name: "InitPseudo",
                on_enter: None,
                on_exit: None,
                on_event: init_event,
            },
            StateDescriptor {
                id: TopState::Lookout,
                name: "Lookout",
                on_enter: Some(lookout_enter),
                on_exit: None,
                on_event: lookout_event,
            },
            StateDescriptor {
                id: TopState::Search,
                name: "Search",
                on_enter: Some(search_enter),
                on_exit: None,
                on_event: search_event,
            },
            StateDescriptor {
                id: TopState::Pursue,
                name: "Pursue",
                on_enter: Some(pursue_enter),
                on_exit: Some(pursue_exit),
                on_event: pursue_event,
            },
            StateDescriptor {
                id: TopState::Destroy,
                name: "Destroy",
                on_enter: Some(destroy_enter),
                on_exit: Some(destroy_exit),
                on_event: destroy_event,
            },
            StateDescriptor {
                id: TopState::Escape,
                name: "Escape",
                on_enter: Some(escape_enter),
                on_exit: Some(escape_exit),
                on_event: escape_event,
            },
        ],
        no_output,
    )
}

/// Sub-machines assert their own outputs while running.
fn no_output(_: &mut Hierarchy, _: TopState) {}

// ═══════════════════════════════════════════════════════════════════════════
//  Handlers
// ═══════════════════════════════════════════════════════════════════════════

/// Start-up: every sub-machine except Escape leaves its pseudo state.
/// Escape is initialised on entry so its settle timer only runs then.
fn init_event(h: &mut Hierarchy, ev: Event) -> Reaction<TopState> {
    if !ev.is(EventKind::Init) {
        return Reaction::pass(ev);
    }
    let ctx = &mut h.ctx;
    h.lookout.init(ctx);
    h.search.init(ctx);
    h.pursue.init(ctx);
    h.destroy.init(ctx);
    Reaction::transition(TopState::Lookout)
}

// ── Lookout ───────────────────────────────────────────────────

fn lookout_enter(h: &mut Hierarchy) {
    let ms = h.ctx.config.lookout_ms;
    h.arm_hsm(ms);
    h.lookout.init(&mut h.ctx);
}

fn lookout_event(h: &mut Hierarchy, ev: Event) -> Reaction<TopState> {
    let ev = h.delegate(MachineId::Lookout, ev);
    if ev.is_timeout_for(TimerId::Hsm) {
        return Reaction::transition(TopState::Search);
    }
    match ev.kind {
        EventKind::BeaconFound => Reaction::transition(TopState::Pursue),
        _ => Reaction::pass(ev),
    }
}

// ── Search ────────────────────────────────────────────────────

fn search_enter(h: &mut Hierarchy) {
    let ms = h.ctx.config.spin_ms;
    h.arm_hsm(ms);
    h.search.init(&mut h.ctx);
}

fn search_event(h: &mut Hierarchy, ev: Event) -> Reaction<TopState> {
    let ev = h.delegate(MachineId::Search, ev);
    if ev.is_timeout_for(TimerId::Hsm) {
        return Reaction::transition(TopState::Lookout);
    }
    match ev.kind {
        EventKind::BeaconFound => Reaction::transition(TopState::Pursue),
        _ => Reaction::pass(ev),
    }
}

// ── Pursue ────────────────────────────────────────────────────

fn pursue_enter(h: &mut Hierarchy) {
    h.ctx.timers.stop(TimerId::Hsm);
    h.pursue.init(&mut h.ctx);
}

fn pursue_exit(h: &mut Hierarchy) {
    h.ctx.timers.stop(TimerId::Pursue);
}

fn pursue_event(h: &mut Hierarchy, ev: Event) -> Reaction<TopState> {
    let ev = h.delegate(MachineId::Pursue, ev);
    match ev.kind {
        EventKind::WallFound => Reaction::transition(TopState::Destroy),
        EventKind::GoSeeking => Reaction::transition(TopState::Lookout),
        _ => Reaction::pass(ev),
    }
}

// ── Destroy ───────────────────────────────────────────────────

fn destroy_enter(h: &mut Hierarchy) {
    let ms = h.ctx.config.check_ms;
    h.arm_hsm(ms);
}

fn destroy_exit(h: &mut Hierarchy) {
    h.ctx.timers.stop(TimerId::Destroy);
}

fn destroy_event(h: &mut Hierarchy, ev: Event) -> Reaction<TopState> {
    let ev = h.delegate(MachineId::Destroy, ev);
    match ev.kind {
        EventKind::BallDeposit => Reaction::transition(TopState::Escape),
        _ => Reaction::pass(ev),
    }
}

// ── Escape ────────────────────────────────────────────────────

fn escape_enter(h: &mut Hierarchy) {
    let ms = h.ctx.config.escape_total_ms();
    h.arm_hsm(ms);
    h.escape.init(&mut h.ctx);
}

fn escape_exit(h: &mut Hierarchy) {
    h.ctx.timers.stop(TimerId::Escape);
}

fn escape_event(h: &mut Hierarchy, ev: Event) -> Reaction<TopState> {
    let ev = h.delegate(MachineId::Escape, ev);
    if ev.is_timeout_for(TimerId::Hsm) {
        h.pursue.init(&mut h.ctx);
        h.destroy.init(&mut h.ctx);
        return Reaction::transition(TopState::Lookout);
    }
    Reaction::pass(ev)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RobotHsm
// ═══════════════════════════════════════════════════════════════════════════

/// The whole behaviour hierarchy: top state plus five sub-machines, all
/// driven through one shared [`RobotContext`].
pub struct RobotHsm {
    top: TopMachine,
    hierarchy: Hierarchy,
}

impl RobotHsm {
    /// Build every machine parked in its pseudo state.  Call
    /// [`init`](Self::init) before dispatching.
    pub fn new(config: RobotConfig) -> Self {
        Self {
            top: build_top(),
            hierarchy: Hierarchy {
                ctx: RobotContext::new(config),
                lookout: lookout::build(),
                search: search::build(),
                pursue: pursue::build(),
                destroy: destroy::build(),
                escape: escape::build(),
            },
        }
    }

    /// Reset the whole hierarchy and enter Lookout.
    pub fn init(&mut self) -> bool {
        let h = &mut self.hierarchy;
        h.ctx.timers.reset();
        h.ctx.levels = Default::default();
        h.ctx.stop_all();
        let consumed = self.top.init(h);
        info!("robot HSM started in {}", self.top.state_name());
        consumed
    }

    /// Dispatch one event through the hierarchy.
    ///
    /// Returns `NoEvent` when the event was consumed anywhere, otherwise the
    /// (possibly rewritten) event nobody reacted to.
    pub fn run(&mut self, ev: Event) -> Event {
        let h = &mut self.hierarchy;
        h.ctx.levels.observe(ev);

        let before = self.top.current_state();
        let out = self.top.run(h, ev);
        let after = self.top.current_state();
        if before != after {
            info!("robot: {:?} -> {:?} on {:?}", before, after, ev);
        }
        out
    }

    pub fn current_state(&self) -> TopState {
        self.top.current_state()
    }

    pub fn lookout_state(&self) -> LookoutState {
        self.hierarchy.lookout.current_state()
    }

    pub fn search_state(&self) -> SearchState {
        self.hierarchy.search.current_state()
    }

    pub fn pursue_state(&self) -> PursueState {
        self.hierarchy.pursue.current_state()
    }

    pub fn destroy_state(&self) -> DestroyState {
        self.hierarchy.destroy.current_state()
    }

    pub fn escape_state(&self) -> EscapeState {
        self.hierarchy.escape.current_state()
    }

    /// Name of the current state of whichever sub-machine is running.
    pub fn active_substate(&self) -> &'static str {
        let h = &self.hierarchy;
        match self.top.current_state().machine() {
            MachineId::Lookout => h.lookout.state_name(),
            MachineId::Search => h.search.state_name(),
            MachineId::Pursue => h.pursue.state_name(),
            MachineId::Destroy => h.destroy.state_name(),
            MachineId::Escape => h.escape.state_name(),
            MachineId::Robot => self.top.state_name(),
        }
    }

    pub fn context(&self) -> &RobotContext {
        &self.hierarchy.ctx
    }

    pub fn context_mut(&mut self) -> &mut RobotContext {
        &mut self.hierarchy.ctx
    }
}
