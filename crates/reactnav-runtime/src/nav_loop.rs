//! [`NavLoop`] – drives the controller once per scan.
//!
//! Each scan on [`Topic::Scan`] is paired with whatever the [`TargetLatch`]
//! holds at that moment and handed to [`NavController::step`].  Cycles are
//! strictly sequential: the next scan is not looked at until the previous
//! cycle's command has been emitted.
//!
//! # Failure handling
//!
//! | Error | Effect |
//! |---|---|
//! | [`NavError::OutOfRange`], [`NavError::InvalidWindow`], [`NavError::Parsing`] | cycle skipped, previous command stays in effect |
//! | [`NavError::HardwareFault`] while emitting | logged, loop continues |
//! | fatal ([`NavError::is_fatal`]) | `ControllerFault` on `SystemAlerts`, robot stopped, loop returns `Err` |
//!
//! # Example
//!
//! ```rust,no_run
//! use reactnav_hal::SimDriveBase;
//! use reactnav_kernel::{NavController, ReferenceIndices};
//! use reactnav_middleware::{EventBus, TargetLatch, Topic};
//! use reactnav_runtime::emitter::CommandEmitter;
//! use reactnav_runtime::nav_loop::NavLoop;
//! # async fn demo(specs: reactnav_types::MoveSpecs) -> Result<(), reactnav_types::NavError> {
//! let bus = EventBus::default();
//! let controller = NavController::with_seed(specs, ReferenceIndices::default(), 7)?;
//! let emitter = CommandEmitter::new(SimDriveBase::new("drive_base"));
//! let nav = NavLoop::new(controller, emitter, TargetLatch::new(), bus.clone());
//!
//! let scans = bus.subscribe_to(Topic::Scan);
//! let (_stop, shutdown) = tokio::sync::watch::channel(false);
//! let summary = nav.run(scans, shutdown).await?;
//! println!("{} cycles", summary.cycles);
//! # Ok(())
//! # }
//! ```

use reactnav_kernel::NavController;
use reactnav_middleware::{EventBus, TargetLatch, Topic, TopicReceiver};
use reactnav_perception::CycleInput;
use reactnav_types::{Event, EventPayload, NavError, ScanFrame, ScanMessage, VelocityCommand};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::emitter::CommandEmitter;

const SOURCE: &str = "nav_loop";

/// What happened during a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleResult {
    /// A new command was emitted.
    Emitted(VelocityCommand),
    /// The controller produced no command; the previous one stays in effect.
    Held,
    /// The cycle was abandoned because of a cycle-local error.
    Skipped(NavError),
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    pub cycles: u64,
    pub skipped: u64,
    pub emitted: u64,
    pub hit_mode: bool,
}

pub struct NavLoop {
    controller: NavController,
    emitter: CommandEmitter,
    latch: TargetLatch,
    bus: EventBus,
    max_cycles: Option<u64>,
    summary: LoopSummary,
}

impl NavLoop {
    pub fn new(
        controller: NavController,
        emitter: CommandEmitter,
        latch: TargetLatch,
        bus: EventBus,
    ) -> Self {
        Self {
            controller,
            emitter,
            latch,
            bus,
            max_cycles: None,
            summary: LoopSummary::default(),
        }
    }

    /// End [`run`][Self::run] after `cycles` scans have been processed.
    pub fn with_max_cycles(mut self, cycles: Option<u64>) -> Self {
        self.max_cycles = cycles;
        self
    }

    pub fn controller(&self) -> &NavController {
        &self.controller
    }

    pub fn emitter(&self) -> &CommandEmitter {
        &self.emitter
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    /// Run one cycle for `frame` against the latched target observation.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned; everything else is reported as
    /// [`CycleResult::Skipped`].
    pub fn process(&mut self, frame: ScanFrame) -> Result<CycleResult, NavError> {
        match CycleInput::new(frame, self.latch.latest()) {
            Ok(input) => self.run_cycle(input),
            Err(e) => self.reject(e),
        }
    }

    /// Run one cycle for a combined scan and detection message.  The
    /// message's target replaces whatever the latch held.
    pub fn process_message(&mut self, msg: ScanMessage) -> Result<CycleResult, NavError> {
        match CycleInput::from_message(msg) {
            Ok(input) => {
                self.latch.store(input.observation);
                self.run_cycle(input)
            }
            Err(e) => self.reject(e),
        }
    }

    /// Count a scan message that could not be decoded as a cycle and
    /// classify `e` the same way a failed controller step is classified.
    pub fn reject(&mut self, e: NavError) -> Result<CycleResult, NavError> {
        self.summary.cycles += 1;
        self.report_error(e)
    }

    #[instrument(level = "debug", skip_all, fields(cycle = self.summary.cycles + 1))]
    fn run_cycle(&mut self, input: CycleInput) -> Result<CycleResult, NavError> {
        self.summary.cycles += 1;
        let outcome = match self.controller.step(&input) {
            Ok(outcome) => outcome,
            Err(e) => return self.report_error(e),
        };

        if outcome.hit_mode_engaged {
            self.summary.hit_mode = true;
            let turn_direction = self.controller.state().turn_direction();
            self.alert(EventPayload::HitModeEngaged { turn_direction });
        }

        let Some(cmd) = outcome.command else {
            debug!("no command this cycle");
            return Ok(CycleResult::Held);
        };
        match self.emitter.emit(cmd) {
            Ok(()) => {
                self.summary.emitted += 1;
                Ok(CycleResult::Emitted(cmd))
            }
            Err(e) => self.report_error(e),
        }
    }

    /// Consume scans until shutdown, bus closure or the cycle limit.
    ///
    /// The robot is stopped on the way out.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error.
    pub async fn run(
        mut self,
        mut scans: TopicReceiver,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<LoopSummary, NavError> {
        info!(topic = ?scans.topic(), "navigation loop started");
        let result = loop {
            if *shutdown.borrow() {
                info!("shutdown requested");
                break Ok(());
            }
            if self.max_cycles.is_some_and(|max| self.summary.cycles >= max) {
                info!(cycles = self.summary.cycles, "cycle limit reached");
                break Ok(());
            }

            let event = tokio::select! {
                received = scans.recv() => received,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break Ok(());
                    }
                    continue;
                }
            };

            match event {
                Ok(Event {
                    payload: EventPayload::Scan(frame),
                    ..
                }) => {
                    if let Err(e) = self.process(frame) {
                        break Err(e);
                    }
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged_by = n, "navigation loop fell behind; dropped scans");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("scan topic closed");
                    break Ok(());
                }
            }
        };

        self.halt();
        let summary = self.summary;
        info!(
            cycles = summary.cycles,
            skipped = summary.skipped,
            emitted = summary.emitted,
            hit_mode = summary.hit_mode,
            "navigation loop stopped"
        );
        result.map(|()| summary)
    }

    /// Bring the robot to a standstill.  Failures are logged, not returned.
    pub fn halt(&mut self) {
        if let Err(e) = self.emitter.stop() {
            warn!(error = %e, "failed to stop drive base");
        }
    }

    /// Cycle-local errors are counted and turned into
    /// [`CycleResult::Skipped`]; fatal ones are announced on `SystemAlerts`
    /// and handed back.
    fn report_error(&mut self, e: NavError) -> Result<CycleResult, NavError> {
        if e.is_fatal() {
            error!(error = %e, "fatal controller fault");
            self.alert(EventPayload::ControllerFault {
                component: SOURCE.to_string(),
                message: e.to_string(),
            });
            return Err(e);
        }
        warn!(error = %e, "cycle skipped");
        self.summary.skipped += 1;
        Ok(CycleResult::Skipped(e))
    }

    fn alert(&self, payload: EventPayload) {
        if self
            .bus
            .publish_to(Topic::SystemAlerts, Event::new(SOURCE, payload))
            .is_err()
        {
            debug!("no subscribers on system_alerts");
        }
    }
}
