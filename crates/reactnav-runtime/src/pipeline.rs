//! Wires a [`Rig`] into a running navigation stack.
//!
//! Spawns the scan and detector loops, runs the [`NavLoop`] on the current
//! task and tears the sensor loops down once navigation ends.

use std::time::Duration;

use reactnav_hal::sim::Rig;
use reactnav_kernel::NavController;
use reactnav_middleware::{EventBus, TargetLatch, Topic};
use reactnav_types::NavError;
use tokio::sync::watch;
use tracing::warn;

use crate::detector_loop::run_detector;
use crate::emitter::CommandEmitter;
use crate::nav_loop::{LoopSummary, NavLoop};
use crate::scan_loop::run_scanner;

/// Fastest polling rate a sensor loop accepts.
pub const MAX_RATE_HZ: f64 = 1000.0;
/// Shortest period a sensor loop ticks at, whatever it is handed.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Tick period for `rate_hz`, or `None` unless `0 < rate_hz <= MAX_RATE_HZ`.
pub fn period_for(rate_hz: f64) -> Option<Duration> {
    if !(rate_hz > 0.0 && rate_hz <= MAX_RATE_HZ) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / rate_hz)
        .ok()
        .map(|period| period.max(MIN_PERIOD))
}

/// Polling periods and limits for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub scan_period: Duration,
    pub detection_period: Duration,
    /// Stop after this many navigation cycles.
    pub max_cycles: Option<u64>,
}

impl PipelineSettings {
    /// Settings for the given sensor rates.
    ///
    /// # Errors
    ///
    /// [`NavError::Config`] when a rate has no usable period (see
    /// [`period_for`]).
    pub fn from_rates(
        scan_rate_hz: f64,
        detection_rate_hz: f64,
        max_cycles: Option<u64>,
    ) -> Result<Self, NavError> {
        let period = |name: &str, rate: f64| {
            period_for(rate).ok_or_else(|| {
                NavError::Config(format!(
                    "{name} must be in (0, {MAX_RATE_HZ}] Hz, got {rate}"
                ))
            })
        };
        Ok(Self {
            scan_period: period("scan_rate_hz", scan_rate_hz)?,
            detection_period: period("detection_rate_hz", detection_rate_hz)?,
            max_cycles,
        })
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scan_period: Duration::from_millis(100),
            detection_period: Duration::from_millis(100),
            max_cycles: None,
        }
    }
}

/// Run navigation over `rig` until `shutdown` fires, the cycle limit is hit
/// or a fatal error occurs.
///
/// # Errors
///
/// Returns the fatal error that ended the navigation loop.
pub async fn run_pipeline(
    rig: Rig,
    controller: NavController,
    bus: EventBus,
    settings: PipelineSettings,
    shutdown: watch::Receiver<bool>,
) -> Result<LoopSummary, NavError> {
    let Rig {
        scanner,
        detector,
        drive_base,
    } = rig;
    let latch = TargetLatch::new();
    let (sensors_tx, sensors_rx) = watch::channel(false);

    // Subscribe before the scanner starts so no frame is missed.
    let scans = bus.subscribe_to(Topic::Scan);
    let scan_task = tokio::spawn(run_scanner(
        scanner,
        bus.clone(),
        settings.scan_period,
        sensors_rx.clone(),
    ));
    let detector_task = tokio::spawn(run_detector(
        detector,
        latch.clone(),
        bus.clone(),
        settings.detection_period,
        sensors_rx,
    ));

    let nav = NavLoop::new(controller, CommandEmitter::new(drive_base), latch, bus)
        .with_max_cycles(settings.max_cycles);
    let result = nav.run(scans, shutdown).await;

    let _ = sensors_tx.send(true);
    for (name, task) in [("scan", scan_task), ("detector", detector_task)] {
        if let Err(e) = task.await {
            warn!(task = name, error = %e, "sensor loop ended abnormally");
        }
    }
    result
}
