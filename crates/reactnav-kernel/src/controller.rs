//! [`NavController`] – one decision cycle per scan.
//!
//! ```text
//! CycleInput ─► SectorMinima ─► ClearancePolicy ─► ModeArbiter ─┬─► WallFollower
//!                                                              └─► TargetApproach (hit mode)
//! ```
//!
//! All fallible reads of a cycle happen before any state is written, so a
//! cycle rejected for a short frame or a bad window leaves the controller
//! exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use reactnav_kernel::{NavController, ReferenceIndices};
//! use reactnav_perception::CycleInput;
//! use reactnav_types::{MoveSpecs, ScanFrame, SectorWindow, TargetObservation};
//!
//! let specs = MoveSpecs {
//!     high_security_distance: 0.5,
//!     low_security_distance: 0.3,
//!     wall_follow_distance: 0.6,
//!     linear_velocity: 0.3,
//!     angular_velocity: 0.6,
//!     right_window: SectorWindow::new(0, 240),
//!     left_window: SectorWindow::new(480, 719),
//!     center_window: SectorWindow::new(241, 479),
//! };
//! let mut controller = NavController::with_seed(specs, ReferenceIndices::default(), 42).unwrap();
//!
//! let input = CycleInput::new(ScanFrame::uniform(720, 3.0), TargetObservation::ABSENT).unwrap();
//! let outcome = controller.step(&input).unwrap();
//! assert_eq!(outcome.command.unwrap().linear_velocity, 0.3);
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use reactnav_perception::{CycleInput, SectorMinima};
use reactnav_types::{Bearings, MoveSpecs, NavError, ScanGeometry, VelocityCommand};
use tracing::{info, instrument};

use crate::clearance::ClearancePolicy;
use crate::mode_arbiter::ModeArbiter;
use crate::state::ControllerState;
use crate::target_approach::TargetApproach;
use crate::wall_follow::WallFollower;

/// Scan indices sampled at fixed bearings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceIndices {
    /// Facing-wall reference while following on the left.
    pub left_wall: usize,
    /// Facing-wall reference while following on the right.
    pub right_wall: usize,
    /// Approach front reading while following on the left.
    pub left_front: usize,
    /// Approach front reading while following on the right.
    pub right_front: usize,
}

impl ReferenceIndices {
    /// Derive the indices from the scanner layout.
    ///
    /// The wall reference sits on the side away from the followed wall; the
    /// approach front reading sits on the followed side.
    pub fn resolve(geometry: &ScanGeometry, bearings: &Bearings) -> Result<Self, NavError> {
        Ok(Self {
            left_wall: geometry.index_for_bearing(-bearings.wall_reference_deg)?,
            right_wall: geometry.index_for_bearing(bearings.wall_reference_deg)?,
            left_front: geometry.index_for_bearing(bearings.approach_front_deg)?,
            right_front: geometry.index_for_bearing(-bearings.approach_front_deg)?,
        })
    }
}

impl Default for ReferenceIndices {
    /// Indices for a 720-reading, 180° scanner.
    fn default() -> Self {
        Self {
            left_wall: 340,
            right_wall: 380,
            left_front: 630,
            right_front: 90,
        }
    }
}

/// Result of one [`NavController::step`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleOutcome {
    /// Command to emit, or `None` to leave the previous one in effect.
    pub command: Option<VelocityCommand>,
    /// Hit mode was engaged during this cycle.
    pub hit_mode_engaged: bool,
}

/// The reactive navigation controller.
pub struct NavController<R = SmallRng> {
    specs: MoveSpecs,
    policy: ClearancePolicy,
    arbiter: ModeArbiter,
    follower: WallFollower<R>,
    approach: TargetApproach,
    state: ControllerState,
}

impl NavController<SmallRng> {
    /// Build a controller with a [`SmallRng`] seeded once from `seed`, or
    /// from OS entropy when `seed` is `0`.
    pub fn with_seed(
        specs: MoveSpecs,
        indices: ReferenceIndices,
        seed: u64,
    ) -> Result<Self, NavError> {
        let rng = if seed == 0 {
            SmallRng::from_os_rng()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self::new(specs, indices, rng)
    }
}

impl<R: Rng> NavController<R> {
    /// Build a controller around an injected random source.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::Config`] when `specs` fails validation.
    pub fn new(specs: MoveSpecs, indices: ReferenceIndices, rng: R) -> Result<Self, NavError> {
        specs.validate()?;
        Ok(Self {
            policy: ClearancePolicy::from_specs(&specs),
            arbiter: ModeArbiter::new(indices.left_wall, indices.right_wall),
            follower: WallFollower::new(&specs, rng),
            approach: TargetApproach::new(&specs, indices.left_front, indices.right_front),
            state: ControllerState::new(),
            specs,
        })
    }

    pub fn specs(&self) -> &MoveSpecs {
        &self.specs
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Run one decision cycle.
    ///
    /// # Errors
    ///
    /// - [`NavError::OutOfRange`] / [`NavError::InvalidWindow`] when the
    ///   frame cannot be analysed; state is untouched and the cycle should
    ///   be skipped.
    /// - [`NavError::InvariantViolation`] when the controller reached an
    ///   impossible state; the caller must shut down.
    #[instrument(level = "debug", skip_all, fields(hit_mode = self.state.hit_mode()))]
    pub fn step(&mut self, input: &CycleInput) -> Result<CycleOutcome, NavError> {
        if self.state.hit_mode() {
            let command = self
                .approach
                .step(&input.frame, self.state.turn_direction())?;
            return Ok(CycleOutcome {
                command,
                hit_mode_engaged: false,
            });
        }

        let direction = self.state.turn_direction();
        let wall = self.arbiter.wall_reference(&input.frame, direction)?;
        let minima = SectorMinima::measure(input.ranges(), &self.specs)?;
        self.policy.apply(&minima, &mut self.state)?;

        self.state.record_observation(input.observation);
        let hit_mode_engaged = self.arbiter.should_engage(wall, input.observation);
        if hit_mode_engaged {
            self.state.engage_hit_mode();
            info!(
                circle_x = input.observation.circle_x,
                circle_y = input.observation.circle_y,
                wall,
                side = %direction,
                "target reachable; switching to target approach"
            );
        }

        // The switching cycle still completes its wall-follow decision.
        let command = self.follower.step(&mut self.state);
        Ok(CycleOutcome {
            command,
            hit_mode_engaged,
        })
    }
}
