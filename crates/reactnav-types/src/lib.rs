//! `reactnav-types` – shared vocabulary for the ReactNav workspace.
//!
//! Every other crate speaks in these types: scan frames coming in, target
//! observations from the detector, velocity commands going out, and the
//! single [`NavError`] enum used across the stack.
//!
//! The immutable controller tuning lives in [`specs`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod specs;

pub use specs::{Bearings, MoveSpecs, ScanGeometry, SectorWindow};

/// Coordinate value the detector reports on both axes when no target is
/// visible in the current camera frame.
pub const TARGET_ABSENT_SENTINEL: f32 = -10.0;

// ────────────────────────────────────────────────────────────────────────────
// Turn direction
// ────────────────────────────────────────────────────────────────────────────

/// Side the robot keeps the followed wall on.
///
/// [`TurnDirection::None`] is only valid before the first wall-follow
/// episode begins; once a side is chosen it never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    #[default]
    None,
    Right,
}

impl TurnDirection {
    /// Multiplier applied to angular velocity: `+1` for left, `-1` for
    /// right, `0` before a side has been chosen.
    pub fn sign(self) -> f32 {
        match self {
            TurnDirection::Left => 1.0,
            TurnDirection::None => 0.0,
            TurnDirection::Right => -1.0,
        }
    }

    /// `true` once a wall side has been chosen.
    pub fn is_sided(self) -> bool {
        !matches!(self, TurnDirection::None)
    }
}

impl std::fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnDirection::Left => write!(f, "left"),
            TurnDirection::None => write!(f, "none"),
            TurnDirection::Right => write!(f, "right"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sensor inputs
// ────────────────────────────────────────────────────────────────────────────

/// One sweep of the range scanner, in metres.
///
/// Index semantics are fixed by the sensor's angular resolution; see
/// [`ScanGeometry`].  Non-finite readings mean "nothing within range".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanFrame {
    pub ranges: Vec<f32>,
}

impl ScanFrame {
    pub fn new(ranges: Vec<f32>) -> Self {
        Self { ranges }
    }

    /// A frame of `len` identical readings.
    pub fn uniform(len: usize, distance: f32) -> Self {
        Self {
            ranges: vec![distance; len],
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Read the range at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::OutOfRange`] when the frame is too short to
    /// address `index`.
    pub fn range_at(&self, index: usize) -> Result<f32, NavError> {
        self.ranges
            .get(index)
            .copied()
            .ok_or(NavError::OutOfRange {
                index,
                len: self.ranges.len(),
            })
    }
}

/// Raw detector output: a target position in the robot frame (metres), or
/// the `(-10, -10)` sentinel when nothing was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetObservation {
    pub circle_x: f32,
    pub circle_y: f32,
}

impl TargetObservation {
    /// The "no target this cycle" observation.
    pub const ABSENT: Self = Self {
        circle_x: TARGET_ABSENT_SENTINEL,
        circle_y: TARGET_ABSENT_SENTINEL,
    };

    pub fn new(circle_x: f32, circle_y: f32) -> Self {
        Self { circle_x, circle_y }
    }

    pub fn is_absent(&self) -> bool {
        self.circle_x == TARGET_ABSENT_SENTINEL && self.circle_y == TARGET_ABSENT_SENTINEL
    }

    /// Decode the sentinel into an `Option`.
    pub fn target(&self) -> Option<Target> {
        if self.is_absent() {
            None
        } else {
            Some(Target {
                x: self.circle_x,
                y: self.circle_y,
            })
        }
    }
}

impl Default for TargetObservation {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// A detected target in the robot frame: `x` lateral, `y` forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub x: f32,
    pub y: f32,
}

/// Wire shape of one combined scan + detection message, as published by the
/// detector node and read back from replay files.
///
/// JSON has no infinity, so out-of-range readings travel as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanMessage {
    pub ranges: Vec<Option<f32>>,
    #[serde(default = "absent_coordinate")]
    pub circle_x: f32,
    #[serde(default = "absent_coordinate")]
    pub circle_y: f32,
}

fn absent_coordinate() -> f32 {
    TARGET_ABSENT_SENTINEL
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Differential-drive velocity command (`cmd_vel`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityCommand {
    /// Forward velocity (m/s).
    pub linear_velocity: f32,
    /// Yaw rate (rad/s), counter-clockwise positive.
    pub angular_velocity: f32,
}

impl VelocityCommand {
    pub const STOP: Self = Self {
        linear_velocity: 0.0,
        angular_velocity: 0.0,
    };

    pub fn new(linear_velocity: f32, angular_velocity: f32) -> Self {
        Self {
            linear_velocity,
            angular_velocity,
        }
    }

    /// Drive straight ahead at `linear_velocity`.
    pub fn straight(linear_velocity: f32) -> Self {
        Self::new(linear_velocity, 0.0)
    }

    /// Turn in place at `angular_velocity`.
    pub fn rotate(angular_velocity: f32) -> Self {
        Self::new(0.0, angular_velocity)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bus envelope
// ────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper for the in-process event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "reactnav-hal::sim/scanner"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Stamp `payload` with a fresh id and the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Scan(ScanFrame),
    TargetDetection(TargetObservation),
    Command(VelocityCommand),
    /// The controller switched permanently into target-approach mode.
    HitModeEngaged { turn_direction: TurnDirection },
    ControllerFault { component: String, message: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Error type shared by every ReactNav crate.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NavError {
    #[error("Invalid sector window [{low}, {high}] for a frame of {len} readings")]
    InvalidWindow { low: usize, high: usize, len: usize },

    #[error("Scan index {index} out of range for a frame of {len} readings")]
    OutOfRange { index: usize, len: usize },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Parse error: {0}")]
    Parsing(String),

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },
}

impl NavError {
    /// Fatal errors end the process; everything else only costs the current
    /// cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NavError::InvariantViolation(_) | NavError::Config(_))
    }
}
