//! Logical timer service.
//!
//! A small fixed set of named countdown slots shared by every machine.
//! Arming a slot records the owning machine; expiry produces exactly one
//! `Timeout { param: timer id }`.  Re-arming before expiry replaces the
//! pending countdown, so the earlier timeout never fires.
//!
//! ```text
//!   arm(Pursue, owner=Pursue, 150ms) ──▶ [ Pursue: 150ms, Pursue ]
//!   advance(100)                     ──▶ [ Pursue:  50ms, Pursue ]
//!   advance(100)                     ──▶ expire(Pursue) → Timeout(Pursue)
//! ```
//!
//! The last owner of a slot is remembered after expiry so the top-level
//! HSM can reject a timeout delivered to a machine that did not arm it.

use log::debug;

/// Named timer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TimerId {
    /// Top-level timer: lookout / search / destroy check / escape.
    Hsm = 0,
    Pursue = 1,
    Destroy = 2,
    Escape = 3,
}

impl TimerId {
    pub const COUNT: usize = 4;

    pub const ALL: [TimerId; Self::COUNT] = [Self::Hsm, Self::Pursue, Self::Destroy, Self::Escape];

    pub fn from_param(param: u16) -> Option<Self> {
        match param {
            0 => Some(Self::Hsm),
            1 => Some(Self::Pursue),
            2 => Some(Self::Destroy),
            3 => Some(Self::Escape),
            _ => None,
        }
    }
}

/// Identity of every machine in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineId {
    Robot,
    Lookout,
    Search,
    Pursue,
    Destroy,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    remaining_ms: u32,
}

/// The timer bank: one optional countdown per [`TimerId`].
#[derive(Debug, Clone)]
pub struct TimerBank {
    slots: [Option<Countdown>; TimerId::COUNT],
    owners: [Option<MachineId>; TimerId::COUNT],
}

impl TimerBank {
    pub fn new() -> Self {
        Self {
            slots: [None; TimerId::COUNT],
            owners: [None; TimerId::COUNT],
        }
    }

    /// Arm (or re-arm) `timer` for `ms` milliseconds on behalf of `owner`.
    pub fn arm(&mut self, timer: TimerId, owner: MachineId, ms: u32) {
        debug!("timer {:?} armed for {}ms by {:?}", timer, ms, owner);
        self.slots[timer as usize] = Some(Countdown { remaining_ms: ms });
        self.owners[timer as usize] = Some(owner);
    }

    /// Cancel a pending countdown.  No timeout will be produced.
    pub fn stop(&mut self, timer: TimerId) {
        self.slots[timer as usize] = None;
    }

    pub fn is_armed(&self, timer: TimerId) -> bool {
        self.slots[timer as usize].is_some()
    }

    pub fn remaining_ms(&self, timer: TimerId) -> Option<u32> {
        self.slots[timer as usize].map(|c| c.remaining_ms)
    }

    /// Machine that last armed `timer`, even after it expired.
    pub fn owner(&self, timer: TimerId) -> Option<MachineId> {
        self.owners[timer as usize]
    }

    /// Count every armed slot down by `elapsed_ms`, calling `expired` once
    /// for each slot that reaches zero.  Slots expire in `TimerId` order.
    pub fn advance(&mut self, elapsed_ms: u32, mut expired: impl FnMut(TimerId)) {
        for timer in TimerId::ALL {
            let slot = &mut self.slots[timer as usize];
            if let Some(countdown) = slot {
                if countdown.remaining_ms <= elapsed_ms {
                    *slot = None;
                    expired(timer);
                } else {
                    countdown.remaining_ms -= elapsed_ms;
                }
            }
        }
    }

    /// Drop every countdown and forget owners.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for TimerBank {
    fn default() -> Self {
        Self::new()
    }
}
