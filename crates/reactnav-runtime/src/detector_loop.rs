//! Periodic target detection.
//!
//! Polls a [`TargetDetector`] on its own cadence, overwrites the
//! [`TargetLatch`] with each result and mirrors it onto
//! [`Topic::TargetDetection`].  A failed detection leaves the latch untouched.

use std::time::Duration;

use reactnav_hal::TargetDetector;
use reactnav_middleware::{EventBus, TargetLatch, Topic};
use reactnav_types::{Event, EventPayload};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::pipeline::MIN_PERIOD;

/// Run until `shutdown` flips to `true` (or its sender is dropped).
///
/// Returns the number of successful detections.
pub async fn run_detector(
    mut detector: Box<dyn TargetDetector>,
    latch: TargetLatch,
    bus: EventBus,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let period = period.max(MIN_PERIOD);
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut detections = 0u64;
    let mut was_visible = false;

    info!(detector = detector.id(), period_ms = period.as_millis() as u64, "detector loop started");
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        }

        let observation = match detector.detect() {
            Ok(obs) => obs,
            Err(e) => {
                warn!(detector = detector.id(), error = %e, "detection failed; keeping last observation");
                continue;
            }
        };
        detections += 1;
        latch.store(observation);

        let visible = !observation.is_absent();
        if visible != was_visible {
            if visible {
                info!(
                    circle_x = observation.circle_x,
                    circle_y = observation.circle_y,
                    "target acquired"
                );
            } else {
                info!("target lost");
            }
            was_visible = visible;
        }

        let event = Event::new(detector.id(), EventPayload::TargetDetection(observation));
        if bus.publish_to(Topic::TargetDetection, event).is_err() {
            debug!("no subscribers on target_detection");
        }
    }
    info!(detector = detector.id(), detections, "detector loop stopped");
    detections
}
