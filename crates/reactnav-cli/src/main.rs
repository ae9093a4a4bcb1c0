//! `reactnav` – reactive navigation command line.
//!
//! 1. Loads `~/.reactnav/config.toml` (or `--config` / `REACTNAV_CONFIG`);
//!    any configuration problem ends the process before the first cycle.
//! 2. Intercepts **Ctrl-C** to publish a zero-velocity command and shut the
//!    loops down.
//! 3. Drives the controller from a JSON-lines replay file (`--replay`) or
//!    from the built-in simulated rig.

mod config;
mod replay;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tokio::sync::watch;
use tracing::{error, warn};

use reactnav_hal::{SimRig, SimScanner, SimTargetDetector};
use reactnav_kernel::{NavController, ReferenceIndices};
use reactnav_middleware::{BusDriveBase, EventBus, TargetLatch, Topic, TopicReceiver};
use reactnav_runtime::{CommandEmitter, LoopSummary, NavLoop, PipelineSettings, run_pipeline};
use reactnav_types::{
    Event, EventPayload, NavError, ScanFrame, SectorWindow, TargetObservation, VelocityCommand,
};

fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = reactnav_runtime::init_tracing("reactnav");
    print_banner();

    let path = config::resolve_path(args.config.clone());
    if args.init_config {
        return match config::save_new(&config::Config::sample(), &path) {
            Ok(()) => {
                println!("  {} Config written to {}", "✓".green().bold(), path.display().to_string().bold());
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        };
    }

    match run(&args, &path) {
        Ok(summary) => {
            println!(
                "\n  {} {} cycles, {} commands, {} skipped{}",
                "✓".green().bold(),
                summary.cycles,
                summary.emitted,
                summary.skipped,
                if summary.hit_mode { ", target approach engaged".cyan().to_string() } else { String::new() },
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run(args: &Args, path: &std::path::Path) -> Result<LoopSummary, NavError> {
    let cfg = config::load_from(path)?;
    println!("  Config loaded from {}", path.display().to_string().bold());

    let indices = ReferenceIndices::resolve(&cfg.scan, &cfg.bearings)?;
    let controller = NavController::with_seed(cfg.move_specs.clone(), indices, cfg.runtime.rng_seed)?;

    let bus = EventBus::default();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    install_ctrlc(bus.clone(), shutdown_tx.clone());

    match &args.replay {
        Some(file) => {
            println!("  Replaying {}", file.display().to_string().bold());
            let reader = replay::ReplayReader::open(file)?;
            let mut nav = NavLoop::new(
                controller,
                CommandEmitter::new(BusDriveBase::new("drive_base", bus.clone())),
                TargetLatch::new(),
                bus,
            );
            replay::run_replay(reader, &mut nav, &shutdown_rx, args.cycles)
        }
        None => {
            println!("  Running simulated rig (Ctrl-C to stop)");
            let settings = PipelineSettings::from_rates(
                cfg.runtime.scan_rate_hz,
                cfg.runtime.detection_rate_hz,
                args.cycles,
            )?;
            let rig = demo_rig(&bus);
            let alerts = bus.subscribe_to(Topic::SystemAlerts);
            let runtime = tokio::runtime::Runtime::new()
                .map_err(|e| NavError::Config(format!("failed to start async runtime: {e}")))?;
            runtime.block_on(async move {
                let printer = tokio::spawn(print_alerts(alerts));
                let result = run_pipeline(rig, controller, bus, settings, shutdown_rx).await;
                printer.abort();
                result
            })
        }
    }
}

fn fail(e: &NavError) -> ExitCode {
    error!(error = %e, fatal = e.is_fatal(), "reactnav stopped");
    eprintln!("{}: {e}", "Error".red().bold());
    ExitCode::FAILURE
}

// ─────────────────────────────────────────────────────────────────────────────
// Arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Reactive wall-following navigation.
#[derive(Debug, Parser)]
#[command(name = "reactnav", version, long_about = None)]
struct Args {
    /// Config file [default: $REACTNAV_CONFIG or ~/.reactnav/config.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Replay scan messages from a JSON-lines file instead of the sim rig
    #[arg(long, value_name = "FILE.jsonl")]
    replay: Option<PathBuf>,

    /// Stop after this many navigation cycles
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Write a sample config to the config path and exit
    #[arg(long)]
    init_config: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Ctrl-C
// ─────────────────────────────────────────────────────────────────────────────

fn install_ctrlc(bus: EventBus, shutdown: Arc<watch::Sender<bool>>) {
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping the robot …".yellow().bold());

        let stop = Event::new("reactnav-cli", EventPayload::Command(VelocityCommand::STOP));
        match bus.publish_to(Topic::CmdVel, stop) {
            Ok(_) => println!("{}", "  ✓ Stop command published.".green()),
            Err(_) => println!("{}", "  ✓ No drive base listening.".green()),
        }
        shutdown.send_replace(true);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulated rig
// ─────────────────────────────────────────────────────────────────────────────

/// Open floor, then a wall ahead, then a corridor in which the target shows
/// up close and centred.
fn demo_rig(bus: &EventBus) -> reactnav_hal::sim::Rig {
    let open = ScanFrame::uniform(720, 3.0);
    let mut blocked = open.clone();
    fill(&mut blocked, SectorWindow::new(300, 420), 0.4);
    let mut corridor = open.clone();
    fill(&mut corridor, SectorWindow::new(0, 120), 1.0);
    fill(&mut corridor, SectorWindow::new(600, 719), 1.0);
    fill(&mut corridor, SectorWindow::new(330, 390), 1.0);

    let mut frames = vec![open; 30];
    frames.extend(std::iter::repeat_n(blocked, 20));
    frames.push(corridor);

    let mut sightings = vec![TargetObservation::ABSENT; 40];
    sightings.push(TargetObservation::new(0.05, 0.4));

    SimRig::new()
        .with_scanner(SimScanner::from_frames("sim_lidar", frames))
        .with_detector(SimTargetDetector::scripted("sim_detector", sightings))
        .with_drive_base(BusDriveBase::new("drive_base", bus.clone()))
        .build()
}

fn fill(frame: &mut ScanFrame, window: SectorWindow, distance: f32) {
    for r in &mut frame.ranges[window.low..=window.high] {
        *r = distance;
    }
}

/// Print alerts until the bus closes; returns how many were shown.
async fn print_alerts(mut alerts: TopicReceiver) -> usize {
    let mut shown = 0;
    while let Ok(event) = alerts.recv().await {
        match event.payload {
            EventPayload::HitModeEngaged { turn_direction } => println!(
                "  {} target in reach, approaching along the {} wall",
                "●".cyan().bold(),
                turn_direction
            ),
            EventPayload::ControllerFault { component, message } => {
                println!("  {} {component}: {message}", "✗".red().bold())
            }
            _ => continue,
        }
        shown += 1;
    }
    shown
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "ReactNav".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Reactive wall-following navigation");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactnav_hal::{RangeScanner, TargetDetector};

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("reactnav").chain(args.iter().copied()))
    }

    #[test]
    fn no_arguments_means_sim_with_default_config() {
        let args = parse(&[]).unwrap();
        assert!(args.config.is_none());
        assert!(args.replay.is_none());
        assert!(args.cycles.is_none());
        assert!(!args.init_config);
    }

    #[test]
    fn all_flags() {
        let args = parse(&["--config", "/tmp/c.toml", "--replay", "run.jsonl", "--cycles", "50"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(args.replay, Some(PathBuf::from("run.jsonl")));
        assert_eq!(args.cycles, Some(50));
        assert!(!args.init_config);
        assert!(parse(&["--init-config"]).unwrap().init_config);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&["--cycles"]).is_err());
        assert!(parse(&["--cycles", "many"]).is_err());
        assert!(parse(&["--fast"]).is_err());
    }

    #[test]
    fn help_is_generated() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(err.to_string().contains("--init-config"));
    }

    #[tokio::test]
    async fn alerts_published_before_printer_runs_are_kept() {
        let bus = EventBus::default();
        let alerts = bus.subscribe_to(Topic::SystemAlerts);
        bus.publish_to(
            Topic::SystemAlerts,
            Event::new(
                "nav_loop",
                EventPayload::HitModeEngaged {
                    turn_direction: reactnav_types::TurnDirection::Left,
                },
            ),
        )
        .unwrap();
        drop(bus);

        assert_eq!(print_alerts(alerts).await, 1);
    }

    #[test]
    fn demo_rig_frames_match_sample_config() {
        let mut rig = demo_rig(&EventBus::default());
        let frame = rig.scanner.scan().unwrap();
        assert_eq!(frame.len(), 720);
        assert!(rig.detector.detect().unwrap().is_absent());
    }
}
