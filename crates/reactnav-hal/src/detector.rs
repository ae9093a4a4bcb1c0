//! Generic `TargetDetector` trait for the upstream vision component.

use reactnav_types::{NavError, TargetObservation};

/// Scans camera frames for the target circle.
///
/// Detection runs on its own cadence; the controller only ever sees the most
/// recent observation.
pub trait TargetDetector: Send + Sync {
    /// Stable identifier, e.g. `"circle_detector"`.
    fn id(&self) -> &str;

    /// Look for the target in the latest camera frame.
    ///
    /// Returns [`TargetObservation::ABSENT`] when nothing was found.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if no frame could be analysed.
    fn detect(&mut self) -> Result<TargetObservation, NavError>;
}
