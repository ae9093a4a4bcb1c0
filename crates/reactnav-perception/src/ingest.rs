//! Scan ingest.
//!
//! Every decision cycle starts from exactly one [`CycleInput`]: the latest
//! scan frame paired with the most recent target observation.  Oversized
//! frames are rejected here so a malformed message cannot balloon memory
//! further down the pipeline.

use reactnav_types::{NavError, ScanFrame, ScanMessage, Target, TargetObservation};
use tracing::trace;

/// Maximum number of range readings accepted in a single scan.
pub const MAX_SCAN_RANGES: usize = 4096;

/// One cycle's worth of sensor input.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleInput {
    pub frame: ScanFrame,
    pub observation: TargetObservation,
}

impl CycleInput {
    /// Pair a scan frame with a target observation.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Parsing`] when the frame holds more than
    /// [`MAX_SCAN_RANGES`] readings.
    pub fn new(frame: ScanFrame, observation: TargetObservation) -> Result<Self, NavError> {
        check_len(frame.len())?;
        trace!(
            readings = frame.len(),
            circle_x = observation.circle_x,
            circle_y = observation.circle_y,
            "scan ingested"
        );
        Ok(Self { frame, observation })
    }

    /// Decode a combined wire message.  `null` readings become `+∞`.
    pub fn from_message(msg: ScanMessage) -> Result<Self, NavError> {
        check_len(msg.ranges.len())?;
        let ranges = msg
            .ranges
            .into_iter()
            .map(|r| r.unwrap_or(f32::INFINITY))
            .collect();
        Self::new(
            ScanFrame::new(ranges),
            TargetObservation::new(msg.circle_x, msg.circle_y),
        )
    }

    pub fn ranges(&self) -> &[f32] {
        &self.frame.ranges
    }

    pub fn target(&self) -> Option<Target> {
        self.observation.target()
    }
}

fn check_len(len: usize) -> Result<(), NavError> {
    if len > MAX_SCAN_RANGES {
        return Err(NavError::Parsing(format!(
            "scan has {len} range readings, exceeding the limit of {MAX_SCAN_RANGES}"
        )));
    }
    Ok(())
}
