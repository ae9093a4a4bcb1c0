//! Periodic scan acquisition onto [`Topic::Scan`].

use std::time::Duration;

use reactnav_hal::RangeScanner;
use reactnav_middleware::{EventBus, Topic};
use reactnav_types::{Event, EventPayload};
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, trace, warn};

use crate::pipeline::MIN_PERIOD;

/// Poll `scanner` every `period` (at least [`MIN_PERIOD`]) until `shutdown`
/// flips to `true`.
///
/// Returns the number of frames published.
pub async fn run_scanner(
    mut scanner: Box<dyn RangeScanner>,
    bus: EventBus,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let period = period.max(MIN_PERIOD);
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut published = 0u64;

    info!(scanner = scanner.id(), period_ms = period.as_millis() as u64, "scan loop started");
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

        let frame = match scanner.scan() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(scanner = scanner.id(), error = %e, "scan failed");
                continue;
            }
        };
        let event = Event::new(scanner.id(), EventPayload::Scan(frame));
        match bus.publish_to(Topic::Scan, event) {
            Ok(_) => published += 1,
            Err(_) => trace!("no subscribers on scan"),
        }
    }
    info!(scanner = scanner.id(), published, "scan loop stopped");
    published
}
