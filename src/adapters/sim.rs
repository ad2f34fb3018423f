//! Scripted simulated world.
//!
//! [`SimWorld`] stands in for the arena on the host: it implements
//! [`SensorPort`] by replaying a timeline of [`Cue`]s (switch presses,
//! tape crossings, the beacon coming into view) and [`DrivePort`] by
//! recording what the robot commands.  The world does not model motion;
//! the script is written against the robot's default timings.
//!
//! ```text
//!  time ──▶ cue cue   cue ...        SimWorld::advance(ms)
//!            │   │     │
//!            ▼   ▼     ▼
//!        SensorSnapshot ──read_all()──▶ RobotService ──set_*()──▶ DriveLog
//! ```

use log::debug;

use crate::app::ports::{DrivePort, SensorPort};
use crate::fsm::context::DriveCommands;
use crate::sensors::SensorSnapshot;
use crate::sensors::bumper::{FRONT_LEFT, SIDE};

/// One change to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stimulus {
    /// Close the bumper switches in the mask.
    Press(u8),
    /// Open the bumper switches in the mask.
    Release(u8),
    LeftTape(u16),
    RightTape(u16),
    CannonTape(u16),
    Beacon(u16),
}

/// A stimulus applied once world time reaches `at_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub at_ms: u64,
    pub stimulus: Stimulus,
}

impl Cue {
    pub const fn new(at_ms: u64, stimulus: Stimulus) -> Self {
        Self { at_ms, stimulus }
    }
}

pub struct SimWorld {
    now_ms: u64,
    snapshot: SensorSnapshot,
    script: Vec<Cue>,
    next: usize,
    drive: DriveCommands,
    drive_changes: u32,
}

impl SimWorld {
    /// Open floor plus a timeline.  Cues at the same instant apply in the
    /// order given.
    pub fn new(mut script: Vec<Cue>) -> Self {
        script.sort_by_key(|c| c.at_ms);
        Self {
            now_ms: 0,
            snapshot: SensorSnapshot::default(),
            script,
            next: 0,
            drive: DriveCommands::STOPPED,
            drive_changes: 0,
        }
    }

    /// One complete match against the default configuration: spot the
    /// beacon, hit the tower, follow its wall, fire, back away.
    pub fn mission() -> Self {
        use Stimulus::{Beacon, CannonTape, Press, Release};
        Self::new(vec![
            // Beacon comes into view during the first lookout spin.
            Cue::new(1_000, Beacon(900)),
            // Nose into the tower.
            Cue::new(2_000, Press(FRONT_LEFT)),
            Cue::new(2_300, Release(FRONT_LEFT)),
            // Side whisker finds the wall, then three more contacts.
            Cue::new(2_600, Press(SIDE)),
            Cue::new(3_000, Release(SIDE)),
            Cue::new(3_200, Press(SIDE)),
            Cue::new(3_500, Release(SIDE)),
            Cue::new(3_700, Press(SIDE)),
            Cue::new(4_000, Release(SIDE)),
            // Last contact held through the wall check.
            Cue::new(4_200, Press(SIDE)),
            Cue::new(6_500, Release(SIDE)),
            // Cannon sensor crosses the firing line.
            Cue::new(7_000, CannonTape(100)),
            Cue::new(7_300, CannonTape(900)),
            // Beacon lost while retreating.
            Cue::new(12_000, Beacon(0)),
        ])
    }

    /// Move world time forward and apply every cue that has come due.
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.now_ms += u64::from(elapsed_ms);
        while let Some(cue) = self.script.get(self.next).copied() {
            if cue.at_ms > self.now_ms {
                break;
            }
            self.apply(cue.stimulus);
            self.next += 1;
        }
    }

    fn apply(&mut self, stimulus: Stimulus) {
        debug!("sim t={}ms: {:?}", self.now_ms, stimulus);
        let s = &mut self.snapshot;
        match stimulus {
            Stimulus::Press(mask) => s.bumpers |= mask,
            Stimulus::Release(mask) => s.bumpers &= !mask,
            Stimulus::LeftTape(raw) => s.tape_left = raw,
            Stimulus::RightTape(raw) => s.tape_right = raw,
            Stimulus::CannonTape(raw) => s.tape_cannon = raw,
            Stimulus::Beacon(raw) => s.beacon = raw,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Every cue has been applied.
    pub fn script_done(&self) -> bool {
        self.next >= self.script.len()
    }

    /// What the robot is currently commanding.
    pub fn drive(&self) -> DriveCommands {
        self.drive
    }

    /// How many motor writes actually changed a speed.
    pub fn drive_changes(&self) -> u32 {
        self.drive_changes
    }

    fn record(&mut self, next: DriveCommands) {
        if next != self.drive {
            self.drive_changes += 1;
            self.drive = next;
        }
    }
}

impl SensorPort for SimWorld {
    fn read_all(&mut self) -> SensorSnapshot {
        self.snapshot
    }
}

impl DrivePort for SimWorld {
    fn set_left(&mut self, speed: i8) {
        self.record(DriveCommands {
            left: speed,
            ..self.drive
        });
    }

    fn set_right(&mut self, speed: i8) {
        self.record(DriveCommands {
            right: speed,
            ..self.drive
        });
    }

    fn set_cannon(&mut self, speed: i8) {
        self.record(DriveCommands {
            cannon: speed,
            ..self.drive
        });
    }
}
