//! Generic `RangeScanner` trait for laser range finders.

use reactnav_types::{NavError, ScanFrame};

/// A range scanner producing one [`ScanFrame`] per sweep.
pub trait RangeScanner: Send + Sync {
    /// Stable identifier, e.g. `"front_lidar"`.
    fn id(&self) -> &str;

    /// Return the next available sweep.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::HardwareFault`] if no sweep can be read (e.g. the
    /// device is disconnected).
    fn scan(&mut self) -> Result<ScanFrame, NavError>;
}
