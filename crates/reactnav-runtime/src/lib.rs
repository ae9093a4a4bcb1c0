//! `reactnav-runtime` – runs the controller against live collaborators.
//!
//! # Modules
//!
//! - [`nav_loop`] – [`NavLoop`][nav_loop::NavLoop]: one controller cycle per
//!   scan, with the skip/abort policy for cycle errors.
//! - [`emitter`] – [`CommandEmitter`][emitter::CommandEmitter]: the single
//!   exit point for velocity commands.
//! - [`scan_loop`] / [`detector_loop`] – periodic sensor polling onto the
//!   event bus and the target latch.
//! - [`pipeline`] – [`run_pipeline`][pipeline::run_pipeline]: spawns the
//!   sensor loops around a navigation loop.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: initialises
//!   the global `tracing` subscriber with an optional OTLP span exporter.

pub mod detector_loop;
pub mod emitter;
pub mod nav_loop;
pub mod pipeline;
pub mod scan_loop;
pub mod telemetry;

pub use emitter::CommandEmitter;
pub use nav_loop::{CycleResult, LoopSummary, NavLoop};
pub use pipeline::{MAX_RATE_HZ, MIN_PERIOD, PipelineSettings, period_for, run_pipeline};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
