//! Cycle-to-cycle controller state.
//!
//! All mutable memory of the controller lives in one [`ControllerState`]
//! value.  Its one-way transitions (choosing a wall side, entering hit mode)
//! are only reachable through methods that cannot undo them.

use reactnav_types::{TargetObservation, TurnDirection};

/// Movement flags re-evaluated every wall-follow cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveStatus {
    /// Enough clearance ahead to keep driving.
    pub can_continue: bool,
    /// The followed wall is within `wall_follow_distance`.  Only meaningful
    /// while `is_following_wall` is set.
    pub is_close_to_wall: bool,
    /// A wall-follow episode has started.  Never cleared.
    pub is_following_wall: bool,
}

impl Default for MoveStatus {
    fn default() -> Self {
        Self {
            can_continue: true,
            is_close_to_wall: false,
            is_following_wall: false,
        }
    }
}

/// Everything the controller remembers between cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    status: MoveStatus,
    turn_direction: TurnDirection,
    hit_mode: bool,
    last_observation: TargetObservation,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> MoveStatus {
        self.status
    }

    pub fn turn_direction(&self) -> TurnDirection {
        self.turn_direction
    }

    pub fn hit_mode(&self) -> bool {
        self.hit_mode
    }

    /// Target observation recorded on the last wall-follow cycle.  Frozen
    /// once hit mode is engaged.
    pub fn last_observation(&self) -> TargetObservation {
        self.last_observation
    }

    pub(crate) fn set_can_continue(&mut self, can_continue: bool) {
        self.status.can_continue = can_continue;
    }

    pub(crate) fn set_close_to_wall(&mut self, close: bool) {
        self.status.is_close_to_wall = close;
    }

    pub(crate) fn record_observation(&mut self, observation: TargetObservation) {
        if !self.hit_mode {
            self.last_observation = observation;
        }
    }

    /// Start a wall-follow episode on `side`.
    ///
    /// `side` must be [`TurnDirection::Left`] or [`TurnDirection::Right`];
    /// an unsided pick leaves the state untouched.
    pub(crate) fn begin_wall_follow(&mut self, side: TurnDirection) {
        if !side.is_sided() {
            return;
        }
        self.turn_direction = side;
        self.status.is_following_wall = true;
    }

    /// Switch permanently into target approach.
    pub(crate) fn engage_hit_mode(&mut self) {
        self.hit_mode = true;
    }
}
