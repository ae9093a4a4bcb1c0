//! `reactnav-kernel` – the reactive decision engine.
//!
//! It does not plan and it keeps no map; it turns one scan cycle into at
//! most one velocity command.
//!
//! # Modules
//!
//! - [`state`] – [`ControllerState`][state::ControllerState]: everything
//!   that carries over from one cycle to the next, with its one-way
//!   transitions enforced.
//! - [`clearance`] – [`ClearancePolicy`][clearance::ClearancePolicy]:
//!   "clear to continue" and "close to the followed wall" signals from
//!   sector minima.
//! - [`mode_arbiter`] – [`ModeArbiter`][mode_arbiter::ModeArbiter]: decides
//!   when a detected target is reachable and the controller must switch for
//!   good into target approach.
//! - [`wall_follow`] – [`WallFollower`][wall_follow::WallFollower]: the
//!   wall-following finite-state controller with randomized side choice.
//! - [`target_approach`] – [`TargetApproach`][target_approach::TargetApproach]:
//!   fine alignment against the target using two offset range samples.
//! - [`controller`] – [`NavController`][controller::NavController]: wires the
//!   above into a single per-cycle `step`.

pub mod clearance;
pub mod controller;
pub mod mode_arbiter;
pub mod state;
pub mod target_approach;
pub mod wall_follow;

pub use clearance::ClearancePolicy;
pub use controller::{CycleOutcome, NavController, ReferenceIndices};
pub use mode_arbiter::ModeArbiter;
pub use state::{ControllerState, MoveStatus};
pub use target_approach::TargetApproach;
pub use wall_follow::{WallFollowDecision, WallFollower};
