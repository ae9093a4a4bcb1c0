//! In-process simulation rig for running the controller without a robot.
//!
//! [`SimRig`] assembles one scanner, one detector and one drive base.  Any
//! slot left empty is filled with a stub: an open-space scanner, a detector
//! that never sees the target, and a drive base that records every command.
//!
//! # Example
//!
//! ```rust
//! use reactnav_hal::sim::{SimDriveBase, SimRig};
//! use reactnav_hal::{DriveBase, RangeScanner};
//! use reactnav_types::VelocityCommand;
//!
//! let (drive_base, log) = SimDriveBase::with_log("drive_base");
//! let mut rig = SimRig::new().with_drive_base(drive_base).build();
//!
//! let frame = rig.scanner.scan().expect("sim scan must succeed");
//! assert_eq!(frame.len(), 720);
//!
//! rig.drive_base
//!     .drive(VelocityCommand::straight(0.3))
//!     .expect("sim drive must succeed");
//! assert_eq!(log.commands(), vec![VelocityCommand::straight(0.3)]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use reactnav_types::{NavError, ScanFrame, TargetObservation, VelocityCommand};
use tracing::trace;

use crate::detector::TargetDetector;
use crate::drive_base::DriveBase;
use crate::scanner::RangeScanner;

/// Readings per frame produced by the default sim scanner.
pub const DEFAULT_SIM_BEAMS: usize = 720;
/// Distance reported on every beam by the default sim scanner.
pub const DEFAULT_SIM_RANGE: f32 = 3.0;

// ────────────────────────────────────────────────────────────────────────────
// Stub drive base
// ────────────────────────────────────────────────────────────────────────────

/// Shared, append-only record of the commands a [`SimDriveBase`] received.
///
/// Cloning the log is cheap; every clone observes the same history.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    inner: Arc<Mutex<Vec<VelocityCommand>>>,
}

impl CommandLog {
    fn push(&self, cmd: VelocityCommand) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.push(cmd);
        }
    }

    /// Every command received so far, oldest first.
    pub fn commands(&self) -> Vec<VelocityCommand> {
        self.inner.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// The most recently received command.
    pub fn last(&self) -> Option<VelocityCommand> {
        self.inner.lock().ok().and_then(|g| g.last().copied())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A simulated drive base that records every command.  Always succeeds.
pub struct SimDriveBase {
    id: String,
    log: CommandLog,
}

impl SimDriveBase {
    /// Create a new simulated drive base with the given identifier.
    pub fn new(id: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            log: CommandLog::default(),
        })
    }

    /// Like [`new`][Self::new], also returning a handle onto the command
    /// history so a test can inspect it after the driver has been moved.
    pub fn with_log(id: impl Into<String>) -> (Box<Self>, CommandLog) {
        let base = Self::new(id);
        let log = base.log.clone();
        (base, log)
    }
}

impl DriveBase for SimDriveBase {
    fn id(&self) -> &str {
        &self.id
    }

    fn drive(&mut self, cmd: VelocityCommand) -> Result<(), NavError> {
        trace!(id = %self.id, linear = cmd.linear_velocity, angular = cmd.angular_velocity, "sim drive");
        self.log.push(cmd);
        Ok(())
    }

    fn last_command(&self) -> Option<VelocityCommand> {
        self.log.last()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub scanner
// ────────────────────────────────────────────────────────────────────────────

/// A simulated scanner replaying a fixed script of frames.
///
/// Frames are returned in order; once the script runs out the last frame is
/// repeated forever.
pub struct SimScanner {
    id: String,
    script: VecDeque<ScanFrame>,
    last: ScanFrame,
}

impl SimScanner {
    /// Scanner that always sees `distance` on each of `beams` readings.
    pub fn uniform(id: impl Into<String>, beams: usize, distance: f32) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            script: VecDeque::new(),
            last: ScanFrame::uniform(beams, distance),
        })
    }

    /// Scanner replaying `frames`.  An empty script yields empty frames.
    pub fn from_frames(id: impl Into<String>, frames: Vec<ScanFrame>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            script: frames.into(),
            last: ScanFrame::default(),
        })
    }
}

impl RangeScanner for SimScanner {
    fn id(&self) -> &str {
        &self.id
    }

    fn scan(&mut self) -> Result<ScanFrame, NavError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        Ok(self.last.clone())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stub detector
// ────────────────────────────────────────────────────────────────────────────

/// A simulated target detector following a script of observations.
///
/// Like [`SimScanner`], the last observation repeats once the script is
/// exhausted.
pub struct SimTargetDetector {
    id: String,
    script: VecDeque<TargetObservation>,
    last: TargetObservation,
}

impl SimTargetDetector {
    /// Detector that never sees the target.
    pub fn blind(id: impl Into<String>) -> Box<Self> {
        Self::scripted(id, Vec::new())
    }

    /// Detector reporting `observations` in order.
    pub fn scripted(id: impl Into<String>, observations: Vec<TargetObservation>) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            script: observations.into(),
            last: TargetObservation::ABSENT,
        })
    }
}

impl TargetDetector for SimTargetDetector {
    fn id(&self) -> &str {
        &self.id
    }

    fn detect(&mut self) -> Result<TargetObservation, NavError> {
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRig builder
// ────────────────────────────────────────────────────────────────────────────

/// The three collaborators the navigation runtime needs.
pub struct Rig {
    pub scanner: Box<dyn RangeScanner>,
    pub detector: Box<dyn TargetDetector>,
    pub drive_base: Box<dyn DriveBase>,
}

/// Builder producing a [`Rig`], filling unset slots with stub drivers.
#[derive(Default)]
pub struct SimRig {
    scanner: Option<Box<dyn RangeScanner>>,
    detector: Option<Box<dyn TargetDetector>>,
    drive_base: Option<Box<dyn DriveBase>>,
}

impl SimRig {
    /// Create an empty [`SimRig`] builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scanner(mut self, scanner: Box<dyn RangeScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn TargetDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Register a custom drive base.  Useful when a test needs a tracking
    /// driver to assert on emitted commands.
    pub fn with_drive_base(mut self, drive_base: Box<dyn DriveBase>) -> Self {
        self.drive_base = Some(drive_base);
        self
    }

    /// Consume the builder and return the assembled [`Rig`].
    pub fn build(self) -> Rig {
        Rig {
            scanner: self.scanner.unwrap_or_else(|| {
                SimScanner::uniform("sim_lidar", DEFAULT_SIM_BEAMS, DEFAULT_SIM_RANGE)
            }),
            detector: self
                .detector
                .unwrap_or_else(|| SimTargetDetector::blind("sim_detector")),
            drive_base: self
                .drive_base
                .unwrap_or_else(|| SimDriveBase::new("sim_drive_base")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
