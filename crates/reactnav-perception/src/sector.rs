//! Sector distance analysis.
//!
//! The scan is split into three configured index windows (right, center,
//! left).  For each window the nearest valid reading is the sector's
//! clearance.  Readings that are not finite, or negative, mean the beam saw
//! nothing within range and never count as an obstacle.

use reactnav_types::{MoveSpecs, NavError, SectorWindow};

/// Smallest valid reading in the inclusive `window`.
///
/// Returns `f32::INFINITY` when every reading in the window is invalid.
///
/// # Errors
///
/// Returns [`NavError::InvalidWindow`] when `window.low > window.high` or
/// `window.high` does not address a reading of `ranges`.
pub fn min_in_window(ranges: &[f32], window: SectorWindow) -> Result<f32, NavError> {
    if window.low > window.high || window.high >= ranges.len() {
        return Err(NavError::InvalidWindow {
            low: window.low,
            high: window.high,
            len: ranges.len(),
        });
    }
    Ok(ranges[window.low..=window.high]
        .iter()
        .copied()
        .filter(|r| r.is_finite() && *r >= 0.0)
        .fold(f32::INFINITY, f32::min))
}

/// Clearance of each sector for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorMinima {
    pub right: f32,
    pub center: f32,
    pub left: f32,
}

impl SectorMinima {
    /// Measure all three sectors configured in `specs`.
    pub fn measure(ranges: &[f32], specs: &MoveSpecs) -> Result<Self, NavError> {
        Ok(Self {
            right: min_in_window(ranges, specs.right_window)?,
            center: min_in_window(ranges, specs.center_window)?,
            left: min_in_window(ranges, specs.left_window)?,
        })
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
            right_window: SectorWindow::new(0, 3),
            left_window: SectorWindow::new(8, 11),
            center_window: SectorWindow::new(4, 7),
        }
    }

    #[test]
    fn returns_smallest_reading_in_window() {
        let ranges = [3.0, 2.0, 0.7, 1.5, 9.0];
        assert_eq!(min_in_window(&ranges, SectorWindow::new(0, 3)).unwrap(), 0.7);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let ranges = [0.1, 5.0, 5.0, 0.2];
        assert_eq!(min_in_window(&ranges, SectorWindow::new(1, 3)).unwrap(), 0.2);
        assert_eq!(min_in_window(&ranges, SectorWindow::new(0, 0)).unwrap(), 0.1);
    }

    #[test]
    fn invalid_readings_are_ignored() {
        let ranges = [f32::INFINITY, f32::NAN, 2.5, -1.0, f32::NEG_INFINITY];
        assert_eq!(min_in_window(&ranges, SectorWindow::new(0, 4)).unwrap(), 2.5);
    }

    #[test]
    fn all_invalid_means_no_obstacle() {
        let ranges = [f32::INFINITY, f32::NAN];
        let min = min_in_window(&ranges, SectorWindow::new(0, 1)).unwrap();
        assert!(min.is_infinite() && min > 0.0);
    }

    #[test]
    fn inverted_window_fails() {
        let ranges = [1.0; 10];
        assert!(matches!(
            min_in_window(&ranges, SectorWindow::new(5, 4)),
            Err(NavError::InvalidWindow { low: 5, high: 4, len: 10 })
        ));
    }

    #[test]
    fn window_past_frame_end_fails() {
        let ranges = [1.0; 10];
        assert!(matches!(
            min_in_window(&ranges, SectorWindow::new(5, 10)),
            Err(NavError::InvalidWindow { .. })
        ));
        assert!(min_in_window(&[], SectorWindow::new(0, 0)).is_err());
    }

    #[test]
    fn measure_reports_each_sector() {
        let mut ranges = vec![4.0; 12];
        ranges[1] = 0.9; // right
        ranges[6] = 1.2; // center
        ranges[11] = 0.4; // left
        let minima = SectorMinima::measure(&ranges, &specs()).unwrap();
        assert_eq!(minima.right, 0.9);
        assert_eq!(minima.center, 1.2);
        assert_eq!(minima.left, 0.4);
    }

    #[test]
    fn measure_fails_on_undersized_frame() {
        let ranges = vec![4.0; 10];
        assert!(SectorMinima::measure(&ranges, &specs()).is_err());
    }
}
