//! [`ModeArbiter`] – one-way switch from wall following to target approach.
//!
//! A target is judged reachable when it sits roughly straight ahead
//! (`|x| < 0.5`), closer than one metre (`y < 1`), and the reading towards
//! the facing wall is clearly longer than the distance to the target.  The
//! last condition stops the wall behind the target from being mistaken for
//! the target itself.

use reactnav_types::{NavError, ScanFrame, Target, TargetObservation, TurnDirection};

/// Half-width of the lateral band the target must sit in.
pub const CENTER_TOLERANCE: f32 = 0.5;
/// Target must be nearer than this along the forward axis.
pub const MAX_TARGET_DISTANCE: f32 = 1.0;
/// Extra squared distance the wall must exceed the target by.
pub const WALL_MARGIN: f32 = 0.5;
/// Wall reference used before a side has been chosen.
pub const UNSIDED_WALL_REFERENCE: f32 = 1.0;

/// Decides, once per cycle, whether to switch permanently into target
/// approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeArbiter {
    left_wall_index: usize,
    right_wall_index: usize,
}

impl ModeArbiter {
    /// `left_wall_index` is sampled while following on the left,
    /// `right_wall_index` while following on the right.
    pub fn new(left_wall_index: usize, right_wall_index: usize) -> Self {
        Self {
            left_wall_index,
            right_wall_index,
        }
    }

    /// The facing-wall reading for the current side.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::OutOfRange`] when the frame is too short.
    pub fn wall_reference(
        &self,
        frame: &ScanFrame,
        turn_direction: TurnDirection,
    ) -> Result<f32, NavError> {
        match turn_direction {
            TurnDirection::Right => frame.range_at(self.right_wall_index),
            TurnDirection::Left => frame.range_at(self.left_wall_index),
            TurnDirection::None => Ok(UNSIDED_WALL_REFERENCE),
        }
    }

    /// Whether `observation` justifies entering hit mode given the facing
    /// `wall` distance.  An absent target never does.
    pub fn should_engage(&self, wall: f32, observation: TargetObservation) -> bool {
        observation
            .target()
            .is_some_and(|target| target_reachable(wall, target))
    }
}

fn target_reachable(wall: f32, target: Target) -> bool {
    let threshold = target.x * target.x + target.y * target.y + WALL_MARGIN;
    wall * wall > threshold
        && target.x > -CENTER_TOLERANCE
        && target.x < CENTER_TOLERANCE
        && target.y < MAX_TARGET_DISTANCE
}
