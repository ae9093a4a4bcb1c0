//! Last-value-wins holder for the latest target observation.
//!
//! Detection and scanning run at independent rates.  The detector overwrites
//! the latch whenever it produces a result; each navigation cycle reads
//! whatever is there at that moment.  Older values are never queued.

use std::sync::Arc;

use reactnav_types::TargetObservation;
use tokio::sync::watch;

/// Shared latch.  Clones observe the same value.
#[derive(Debug, Clone)]
pub struct TargetLatch {
    tx: Arc<watch::Sender<TargetObservation>>,
}

impl TargetLatch {
    /// A latch starting out with [`TargetObservation::ABSENT`].
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TargetObservation::ABSENT);
        Self { tx: Arc::new(tx) }
    }

    /// Overwrite the held observation.
    pub fn store(&self, observation: TargetObservation) {
        self.tx.send_replace(observation);
    }

    /// The most recently stored observation.
    pub fn latest(&self) -> TargetObservation {
        *self.tx.borrow()
    }
}

impl Default for TargetLatch {
    fn default() -> Self {
        Self::new()
    }
}
