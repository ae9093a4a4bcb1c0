//! Target approach.
//!
//! Once hit mode is engaged the robot lines itself up using two readings on
//! the followed-wall side: a "back" reading at the edge of the side sector
//! and a "front" reading further forward.  When the robot is aligned the
//! front reading equals `sin(60°)` times the back one.  Corrections use a
//! quarter of the wall-follow angular velocity.

use std::f32::consts::FRAC_PI_3;

use reactnav_types::{MoveSpecs, NavError, ScanFrame, TurnDirection, VelocityCommand};
use tracing::{debug, warn};

/// `|diff|` at or below this counts as aligned.
pub const ALIGN_TOLERANCE: f32 = 0.05;
/// Divisor applied to the angular velocity for alignment corrections.
pub const FINE_TURN_DIVISOR: f32 = 4.0;

/// Signed alignment error: `front − sin(60°)·back`.
pub fn alignment_error(front: f32, back: f32) -> f32 {
    front - FRAC_PI_3.sin() * back
}

/// Command for a given alignment error.  Bounds are inclusive.
pub fn correction(
    diff: f32,
    turn_direction: TurnDirection,
    linear_velocity: f32,
    angular_velocity: f32,
) -> VelocityCommand {
    let fine = turn_direction.sign() * angular_velocity / FINE_TURN_DIVISOR;
    if diff.abs() <= ALIGN_TOLERANCE {
        VelocityCommand::straight(linear_velocity)
    } else if diff > ALIGN_TOLERANCE {
        VelocityCommand::rotate(-fine)
    } else {
        VelocityCommand::rotate(fine)
    }
}

/// Alignment controller active once hit mode is engaged.
#[derive(Debug, Clone)]
pub struct TargetApproach {
    right_back_index: usize,
    right_front_index: usize,
    left_back_index: usize,
    left_front_index: usize,
    linear_velocity: f32,
    angular_velocity: f32,
    warned_unsided: bool,
}

impl TargetApproach {
    /// The back readings sit on the outer edge of the side windows; the
    /// front indices come from the configured approach bearing.
    pub fn new(specs: &MoveSpecs, left_front_index: usize, right_front_index: usize) -> Self {
        Self {
            right_back_index: specs.right_window.low,
            right_front_index,
            left_back_index: specs.left_window.high,
            left_front_index,
            linear_velocity: specs.linear_velocity,
            angular_velocity: specs.angular_velocity,
            warned_unsided: false,
        }
    }

    /// Alignment command for `frame`.
    ///
    /// With no side chosen there is nothing to align against and no command
    /// is produced.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::OutOfRange`] when the frame is too short.
    pub fn step(
        &mut self,
        frame: &ScanFrame,
        turn_direction: TurnDirection,
    ) -> Result<Option<VelocityCommand>, NavError> {
        let (back_index, front_index) = match turn_direction {
            TurnDirection::Right => (self.right_back_index, self.right_front_index),
            TurnDirection::Left => (self.left_back_index, self.left_front_index),
            TurnDirection::None => {
                if !self.warned_unsided {
                    warn!("target approach engaged before a wall side was chosen; holding last command");
                    self.warned_unsided = true;
                }
                return Ok(None);
            }
        };
        let back = frame.range_at(back_index)?;
        let front = frame.range_at(front_index)?;
        let diff = alignment_error(front, back);
        let cmd = correction(
            diff,
            turn_direction,
            self.linear_velocity,
            self.angular_velocity,
        );
        debug!(front, back, diff, angular = cmd.angular_velocity, "approach alignment");
        Ok(Some(cmd))
    }
}
