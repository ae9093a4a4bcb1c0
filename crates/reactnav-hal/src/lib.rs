//! `reactnav-hal` – hardware abstraction for the collaborators around the
//! controller.
//!
//! The controller never talks to a device directly.  Drivers implement the
//! traits below and the runtime only ever holds trait objects, so a physical
//! robot, a log replay and the simulator are interchangeable.
//!
//! # Modules
//!
//! - [`drive_base`] – [`DriveBase`][drive_base::DriveBase]: accepts velocity
//!   commands.
//! - [`scanner`] – [`RangeScanner`][scanner::RangeScanner]: produces scan
//!   frames.
//! - [`detector`] – [`TargetDetector`][detector::TargetDetector]: reports the
//!   target position or the absent sentinel.
//! - [`sim`] – in-process stand-ins for all three plus the
//!   [`SimRig`][sim::SimRig] builder.

pub mod detector;
pub mod drive_base;
pub mod scanner;
pub mod sim;

pub use detector::TargetDetector;
pub use drive_base::DriveBase;
pub use scanner::RangeScanner;
pub use sim::{CommandLog, Rig, SimDriveBase, SimRig, SimScanner, SimTargetDetector};
