//! Wall-following finite-state controller.
//!
//! The decision table is evaluated in priority order:
//!
//! | `can_continue` | `is_following_wall` | `is_close_to_wall` | Action |
//! |---|---|---|---|
//! | false | false | – | pick a side at random, no command |
//! | true  | false | – | straight ahead |
//! | true  | true  | true  | straight ahead |
//! | false | true  | –     | hard turn, `sign · ω` |
//! | true  | true  | false | steer back to the wall, `−sign · ω` |
//!
//! The side pick is the only randomized step.  The random source is owned
//! by the [`WallFollower`] and seeded by the caller exactly once.

use rand::Rng;
use rand::rngs::SmallRng;
use reactnav_types::{MoveSpecs, TurnDirection, VelocityCommand};
use tracing::{debug, info};

use crate::state::{ControllerState, MoveStatus};

/// Outcome of one pass through the decision table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallFollowDecision {
    /// Path blocked and no wall followed yet: choose a side.  The previous
    /// command stays in effect for this cycle.
    PickSide,
    Drive(VelocityCommand),
}

/// Pure decision table, with no side effects.
pub fn decide(
    status: MoveStatus,
    turn_direction: TurnDirection,
    linear_velocity: f32,
    angular_velocity: f32,
) -> WallFollowDecision {
    let sign = turn_direction.sign();
    match (status.can_continue, status.is_following_wall) {
        (false, false) => WallFollowDecision::PickSide,
        (true, false) => WallFollowDecision::Drive(VelocityCommand::straight(linear_velocity)),
        (true, true) if status.is_close_to_wall => {
            WallFollowDecision::Drive(VelocityCommand::straight(linear_velocity))
        }
        (false, true) => {
            WallFollowDecision::Drive(VelocityCommand::rotate(sign * angular_velocity))
        }
        (true, true) => {
            WallFollowDecision::Drive(VelocityCommand::rotate(-sign * angular_velocity))
        }
    }
}

/// Stateful wrapper around [`decide`] that owns the side-picking RNG.
#[derive(Debug)]
pub struct WallFollower<R = SmallRng> {
    rng: R,
    linear_velocity: f32,
    angular_velocity: f32,
}

impl<R: Rng> WallFollower<R> {
    pub fn new(specs: &MoveSpecs, rng: R) -> Self {
        Self {
            rng,
            linear_velocity: specs.linear_velocity,
            angular_velocity: specs.angular_velocity,
        }
    }

    /// Left or right with equal probability.
    pub fn pick_side(&mut self) -> TurnDirection {
        if self.rng.random_bool(0.5) {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        }
    }

    /// Run the decision table against `state`, starting a wall-follow
    /// episode when required.  Returns the command to emit, if any.
    pub fn step(&mut self, state: &mut ControllerState) -> Option<VelocityCommand> {
        match decide(
            state.status(),
            state.turn_direction(),
            self.linear_velocity,
            self.angular_velocity,
        ) {
            WallFollowDecision::PickSide => {
                let side = self.pick_side();
                state.begin_wall_follow(side);
                info!(side = %side, "path blocked; starting wall follow");
                None
            }
            WallFollowDecision::Drive(cmd) => {
                debug!(
                    linear = cmd.linear_velocity,
                    angular = cmd.angular_velocity,
                    "wall follow command"
                );
                Some(cmd)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use reactnav_types::SectorWindow;

    const LINEAR: f32 = 0.3;
    const ANGULAR: f32 = 0.6;

    fn specs() -> MoveSpecs {
        MoveSpecs {
            high_security_distance: 0.5,
            low_security_distance: 0.3,
            wall_follow_distance: 0.6,
            linear_velocity: LINEAR,
            angular_velocity: ANGULAR,
            right_window: SectorWindow::new(0, 0),
            left_window: SectorWindow::new(0, 0),
            center_window: SectorWindow::new(0, 0),
        }
    }

    fn follower(seed: u64) -> WallFollower<SmallRng> {
        WallFollower::new(&specs(), SmallRng::seed_from_u64(seed))
    }

    fn status(can_continue: bool, following: bool, close: bool) -> MoveStatus {
        MoveStatus {
            can_continue,
            is_following_wall: following,
            is_close_to_wall: close,
        }
    }

    #[test]
    fn blocked_and_not_following_picks_a_side() {
        for seed in 0..32 {
            let mut f = follower(seed);
            let mut state = ControllerState::new();
            state.set_can_continue(false);
            let cmd = f.step(&mut state);
            assert!(cmd.is_none(), "no command on the pick cycle");
            assert!(state.status().is_following_wall);
            assert!(state.turn_direction().is_sided());
        }
    }

    #[test]
    fn side_pick_uses_both_sides() {
        let mut f = follower(7);
        let picks: Vec<_> = (0..64).map(|_| f.pick_side()).collect();
        assert!(picks.contains(&TurnDirection::Left));
        assert!(picks.contains(&TurnDirection::Right));
        assert!(!picks.contains(&TurnDirection::None));
    }

    #[test]
    fn clear_and_not_following_drives_straight() {
        let d = decide(status(true, false, false), TurnDirection::None, LINEAR, ANGULAR);
        assert_eq!(d, WallFollowDecision::Drive(VelocityCommand::new(LINEAR, 0.0)));
    }

    #[test]
    fn following_clear_and_close_drives_straight() {
        for dir in [TurnDirection::Left, TurnDirection::Right] {
            let d = decide(status(true, true, true), dir, LINEAR, ANGULAR);
            assert_eq!(d, WallFollowDecision::Drive(VelocityCommand::new(LINEAR, 0.0)));
        }
    }

    #[test]
    fn following_right_and_blocked_turns_clockwise() {
        let d = decide(status(false, true, false), TurnDirection::Right, LINEAR, ANGULAR);
        assert_eq!(d, WallFollowDecision::Drive(VelocityCommand::new(0.0, -ANGULAR)));
    }

    #[test]
    fn following_left_and_blocked_turns_counter_clockwise() {
        let d = decide(status(false, true, true), TurnDirection::Left, LINEAR, ANGULAR);
        assert_eq!(d, WallFollowDecision::Drive(VelocityCommand::new(0.0, ANGULAR)));
    }

    #[test]
    fn drifting_from_wall_steers_back() {
        let right = decide(status(true, true, false), TurnDirection::Right, LINEAR, ANGULAR);
        assert_eq!(right, WallFollowDecision::Drive(VelocityCommand::new(0.0, ANGULAR)));
        let left = decide(status(true, true, false), TurnDirection::Left, LINEAR, ANGULAR);
        assert_eq!(left, WallFollowDecision::Drive(VelocityCommand::new(0.0, -ANGULAR)));
    }

    #[test]
    fn decision_table_is_exhaustive_and_deterministic() {
        for can_continue in [false, true] {
            for following in [false, true] {
                for close in [false, true] {
                    for dir in [TurnDirection::Left, TurnDirection::Right] {
                        let s = status(can_continue, following, close);
                        let first = decide(s, dir, LINEAR, ANGULAR);
                        assert_eq!(first, decide(s, dir, LINEAR, ANGULAR));

                        let expected = match (can_continue, following, close) {
                            (false, false, _) => WallFollowDecision::PickSide,
                            (true, false, _) | (true, true, true) => {
                                WallFollowDecision::Drive(VelocityCommand::new(LINEAR, 0.0))
                            }
                            (false, true, _) => WallFollowDecision::Drive(VelocityCommand::new(
                                0.0,
                                dir.sign() * ANGULAR,
                            )),
                            (true, true, false) => WallFollowDecision::Drive(
                                VelocityCommand::new(0.0, -dir.sign() * ANGULAR),
                            ),
                        };
                        assert_eq!(first, expected, "status {s:?} dir {dir:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn step_does_not_reset_following() {
        let mut f = follower(3);
        let mut state = ControllerState::new();
        state.begin_wall_follow(TurnDirection::Left);
        state.set_can_continue(true);
        state.set_close_to_wall(true);
        let cmd = f.step(&mut state);
        assert_eq!(cmd, Some(VelocityCommand::new(LINEAR, 0.0)));
        assert!(state.status().is_following_wall);
        assert_eq!(state.turn_direction(), TurnDirection::Left);
    }
}
