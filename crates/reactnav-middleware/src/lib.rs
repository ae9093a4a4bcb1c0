//! `reactnav-middleware` – plumbing between collaborators and the controller.
//!
//! Moves scans, detections and commands around without caring what they
//! mean.
//!
//! # Modules
//!
//! - [`bus`] – topic-based publish/subscribe event bus built on Tokio
//!   broadcast channels.
//! - [`latch`] – [`TargetLatch`], the last-value-wins holder for the most
//!   recent target observation.
//! - [`adapter`] – [`BusDriveBase`], a drive base that forwards every command
//!   onto the `CmdVel` topic.

pub mod adapter;
pub mod bus;
pub mod latch;

pub use adapter::BusDriveBase;
pub use bus::{EventBus, Topic, TopicReceiver};
pub use latch::TargetLatch;
