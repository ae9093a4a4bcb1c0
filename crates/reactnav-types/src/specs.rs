//! Controller tuning loaded once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::NavError;

/// Inclusive index range `[low, high]` into a [`ScanFrame`][crate::ScanFrame].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorWindow {
    pub low: usize,
    pub high: usize,
}

impl SectorWindow {
    pub fn new(low: usize, high: usize) -> Self {
        Self { low, high }
    }
}

/// Distance thresholds, velocities and sector windows for the controller.
///
/// None of the fields has a default: a configuration missing any of them is
/// rejected before the first cycle runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSpecs {
    /// Minimum clearance (m) required on the priority side to keep going.
    pub high_security_distance: f32,
    /// Minimum clearance (m) required on the secondary side to keep going.
    pub low_security_distance: f32,
    /// Distance (m) under which the robot counts as hugging the wall.
    pub wall_follow_distance: f32,
    pub linear_velocity: f32,
    pub angular_velocity: f32,
    pub right_window: SectorWindow,
    pub left_window: SectorWindow,
    pub center_window: SectorWindow,
}

impl MoveSpecs {
    /// Reject values the controller cannot work with.
    ///
    /// Frame length is unknown at load time, so windows are only checked for
    /// ordering here; bounds are checked against every frame.
    pub fn validate(&self) -> Result<(), NavError> {
        let scalars = [
            ("high_security_distance", self.high_security_distance),
            ("low_security_distance", self.low_security_distance),
            ("wall_follow_distance", self.wall_follow_distance),
            ("linear_velocity", self.linear_velocity),
            ("angular_velocity", self.angular_velocity),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(NavError::Config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }

        let windows = [
            ("right_window", self.right_window),
            ("left_window", self.left_window),
            ("center_window", self.center_window),
        ];
        for (name, w) in windows {
            if w.low > w.high {
                return Err(NavError::Config(format!(
                    "{name} is empty: low {} > high {}",
                    w.low, w.high
                )));
            }
        }
        Ok(())
    }
}

/// Angular layout of the range scanner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanGeometry {
    /// Bearing of reading 0, degrees, counter-clockwise from straight ahead.
    #[serde(default = "default_angle_min_deg")]
    pub angle_min_deg: f32,
    /// Angular step between consecutive readings, degrees.
    #[serde(default = "default_angle_increment_deg")]
    pub angle_increment_deg: f32,
}

fn default_angle_min_deg() -> f32 {
    -90.0
}
fn default_angle_increment_deg() -> f32 {
    0.25
}

impl Default for ScanGeometry {
    fn default() -> Self {
        Self {
            angle_min_deg: default_angle_min_deg(),
            angle_increment_deg: default_angle_increment_deg(),
        }
    }
}

impl ScanGeometry {
    /// Index of the reading closest to `bearing_deg`.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Config`] when the bearing lies before the first
    /// reading or the geometry itself is degenerate.  Bearings past the end
    /// of a frame are caught per frame as [`NavError::OutOfRange`].
    pub fn index_for_bearing(&self, bearing_deg: f32) -> Result<usize, NavError> {
        if !self.angle_increment_deg.is_finite() || self.angle_increment_deg <= 0.0 {
            return Err(NavError::Config(format!(
                "angle_increment_deg must be positive (got {})",
                self.angle_increment_deg
            )));
        }
        let steps = ((bearing_deg - self.angle_min_deg) / self.angle_increment_deg).round();
        if !steps.is_finite() || steps < 0.0 {
            return Err(NavError::Config(format!(
                "bearing {bearing_deg}° lies outside the scan starting at {}°",
                self.angle_min_deg
            )));
        }
        Ok(steps as usize)
    }
}

/// Fixed bearings sampled by the mode arbiter and the approach controller,
/// given as magnitudes and mirrored per wall side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bearings {
    /// Offset from straight ahead (degrees) of the reading used as the
    /// facing-wall reference, taken on the side away from the followed wall.
    #[serde(default = "default_wall_reference_deg")]
    pub wall_reference_deg: f32,
    /// Offset from straight ahead (degrees) of the front reading used to
    /// align with the target, taken on the followed-wall side.
    #[serde(default = "default_approach_front_deg")]
    pub approach_front_deg: f32,
}

fn default_wall_reference_deg() -> f32 {
    5.0
}
fn default_approach_front_deg() -> f32 {
    67.5
}

impl Default for Bearings {
    fn default() -> Self {
        Self {
            wall_reference_deg: default_wall_reference_deg(),
            approach_front_deg: default_approach_front_deg(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> MoveSpecs {
        MoveSpecs {
            high_security_distance: 0.5,
            low_security_distance: 0.3,
            wall_follow_distance: 0.6,
            linear_velocity: 0.3,
            angular_velocity: 0.6,
            right_window: SectorWindow::new(0, 240),
            left_window: SectorWindow::new(480, 719),
            center_window: SectorWindow::new(241, 479),
        }
    }

    #[test]
    fn valid_specs_pass() {
        assert!(specs().validate().is_ok());
    }

    #[test]
    fn inverted_window_rejected() {
        let mut s = specs();
        s.center_window = SectorWindow::new(300, 200);
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("center_window"));
    }

    #[test]
    fn non_finite_velocity_rejected() {
        let mut s = specs();
        s.angular_velocity = f32::NAN;
        assert!(matches!(s.validate(), Err(NavError::Config(_))));
    }

    #[test]
    fn negative_distance_rejected() {
        let mut s = specs();
        s.wall_follow_distance = -0.1;
        assert!(matches!(s.validate(), Err(NavError::Config(_))));
    }

    #[test]
    fn default_geometry_reproduces_reference_indices() {
        let g = ScanGeometry::default();
        let b = Bearings::default();
        assert_eq!(g.index_for_bearing(-b.wall_reference_deg).unwrap(), 340);
        assert_eq!(g.index_for_bearing(b.wall_reference_deg).unwrap(), 380);
        assert_eq!(g.index_for_bearing(-b.approach_front_deg).unwrap(), 90);
        assert_eq!(g.index_for_bearing(b.approach_front_deg).unwrap(), 630);
    }

    #[test]
    fn bearing_before_first_reading_rejected() {
        let g = ScanGeometry::default();
        assert!(g.index_for_bearing(-120.0).is_err());
    }

    #[test]
    fn zero_increment_rejected() {
        let g = ScanGeometry {
            angle_min_deg: 0.0,
            angle_increment_deg: 0.0,
        };
        assert!(matches!(g.index_for_bearing(10.0), Err(NavError::Config(_))));
    }
}
