//! [`ClearancePolicy`] – "clear to continue" and "close to the wall".
//!
//! Which sectors matter depends on the side being followed: the sector on
//! the wall side and the center share the strict (high) threshold, the
//! opposite sector only has to clear the low one.  Before a side is chosen
//! every sector is held to both thresholds.

use reactnav_perception::SectorMinima;
use reactnav_types::{MoveSpecs, NavError, TurnDirection};

use crate::state::ControllerState;

/// Threshold policy derived from [`MoveSpecs`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearancePolicy {
    high_security_distance: f32,
    low_security_distance: f32,
    wall_follow_distance: f32,
}

impl ClearancePolicy {
    pub fn from_specs(specs: &MoveSpecs) -> Self {
        Self {
            high_security_distance: specs.high_security_distance,
            low_security_distance: specs.low_security_distance,
            wall_follow_distance: specs.wall_follow_distance,
        }
    }

    /// `true` when both the priority and the secondary clearance exceed
    /// their thresholds.
    pub fn evaluate_can_continue(
        &self,
        right_min: f32,
        left_min: f32,
        center_min: f32,
        turn_direction: TurnDirection,
    ) -> bool {
        let (priority, secondary) = match turn_direction {
            TurnDirection::Right => (center_min.min(right_min), left_min),
            TurnDirection::Left => (center_min.min(left_min), right_min),
            TurnDirection::None => {
                let all = right_min.min(left_min).min(center_min);
                (all, all)
            }
        };
        priority > self.high_security_distance && secondary > self.low_security_distance
    }

    /// Whether the followed wall is nearer than `wall_follow_distance`.
    ///
    /// Returns `Ok(None)` when no wall is being followed; the caller keeps
    /// its previous flag in that case.
    ///
    /// # Errors
    ///
    /// Returns [`NavError::InvariantViolation`] when following a wall with
    /// no side chosen.
    pub fn evaluate_close_to_wall(
        &self,
        right_min: f32,
        left_min: f32,
        turn_direction: TurnDirection,
        is_following_wall: bool,
    ) -> Result<Option<bool>, NavError> {
        if !is_following_wall {
            return Ok(None);
        }
        let wall = match turn_direction {
            TurnDirection::Right => right_min,
            TurnDirection::Left => left_min,
            TurnDirection::None => {
                return Err(NavError::InvariantViolation(
                    "following a wall with no turn direction chosen".to_string(),
                ));
            }
        };
        Ok(Some(wall < self.wall_follow_distance))
    }

    /// Evaluate both signals for `minima` and store them in `state`.
    ///
    /// Nothing is written when the close-to-wall check fails.
    pub fn apply(&self, minima: &SectorMinima, state: &mut ControllerState) -> Result<(), NavError> {
        let direction = state.turn_direction();
        let close = self.evaluate_close_to_wall(
            minima.right,
            minima.left,
            direction,
            state.status().is_following_wall,
        )?;
        let can_continue =
            self.evaluate_can_continue(minima.right, minima.left, minima.center, direction);

        state.set_can_continue(can_continue);
        if let Some(close) = close {
            state.set_close_to_wall(close);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactnav_types::SectorWindow;

    const DIRECTIONS: [TurnDirection; 3] = [
        TurnDirection::Left,
        TurnDirection::None,
        TurnDirection::Right,
    ];

    fn policy() -> ClearancePolicy {
        ClearancePolicy::from_specs(&MoveSpecs {
            high_security_distance: 0.5,
            low_security_distance: 0.3,
            wall_follow_distance: 0.6,
            linear_velocity: 0.3,
            angular_velocity: 0.6,
            right_window: SectorWindow::new(0, 0),
            left_window: SectorWindow::new(0, 0),
            center_window: SectorWindow::new(0, 0),
        })
    }

    #[test]
    fn right_uses_center_and_right_as_priority() {
        let p = policy();
        // left only needs to clear the low threshold
        assert!(p.evaluate_can_continue(1.0, 0.4, 1.0, TurnDirection::Right));
        // right side below the high threshold blocks
        assert!(!p.evaluate_can_continue(0.45, 2.0, 1.0, TurnDirection::Right));
        // center below the high threshold blocks
        assert!(!p.evaluate_can_continue(2.0, 2.0, 0.5, TurnDirection::Right));
        // left below the low threshold blocks
        assert!(!p.evaluate_can_continue(2.0, 0.3, 2.0, TurnDirection::Right));
    }

    #[test]
    fn left_mirrors_right() {
        let p = policy();
        assert!(p.evaluate_can_continue(0.4, 1.0, 1.0, TurnDirection::Left));
        assert!(!p.evaluate_can_continue(2.0, 0.45, 1.0, TurnDirection::Left));
        assert!(!p.evaluate_can_continue(0.3, 2.0, 2.0, TurnDirection::Left));
    }

    #[test]
    fn unsided_holds_every_sector_to_the_high_threshold() {
        let p = policy();
        assert!(p.evaluate_can_continue(0.6, 0.6, 0.6, TurnDirection::None));
        assert!(!p.evaluate_can_continue(0.4, 2.0, 2.0, TurnDirection::None));
        assert!(!p.evaluate_can_continue(2.0, 0.4, 2.0, TurnDirection::None));
    }

    #[test]
    fn thresholds_are_strict() {
        let p = policy();
        assert!(!p.evaluate_can_continue(0.5, 0.5, 0.5, TurnDirection::None));
    }

    #[test]
    fn can_continue_is_monotonic_in_every_clearance() {
        let p = policy();
        let grid: Vec<f32> = (0..=20).map(|i| i as f32 * 0.05).collect();
        for dir in DIRECTIONS {
            for &r in &grid {
                for &l in &grid {
                    for &c in &grid {
                        if !p.evaluate_can_continue(r, l, c, dir) {
                            continue;
                        }
                        for bump in [0.05, 0.5, f32::INFINITY] {
                            assert!(p.evaluate_can_continue(r + bump, l, c, dir));
                            assert!(p.evaluate_can_continue(r, l + bump, c, dir));
                            assert!(p.evaluate_can_continue(r, l, c + bump, dir));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn close_to_wall_picks_followed_side() {
        let p = policy();
        assert_eq!(
            p.evaluate_close_to_wall(0.5, 2.0, TurnDirection::Right, true),
            Ok(Some(true))
        );
        assert_eq!(
            p.evaluate_close_to_wall(0.5, 2.0, TurnDirection::Left, true),
            Ok(Some(false))
        );
        assert_eq!(
            p.evaluate_close_to_wall(2.0, 0.59, TurnDirection::Left, true),
            Ok(Some(true))
        );
        // equal to the threshold is not close
        assert_eq!(
            p.evaluate_close_to_wall(0.6, 0.6, TurnDirection::Right, true),
            Ok(Some(false))
        );
    }

    #[test]
    fn close_to_wall_skipped_when_not_following() {
        let p = policy();
        assert_eq!(
            p.evaluate_close_to_wall(0.1, 0.1, TurnDirection::None, false),
            Ok(None)
        );
    }

    #[test]
    fn following_without_side_is_an_invariant_violation() {
        let p = policy();
        let err = p
            .evaluate_close_to_wall(1.0, 1.0, TurnDirection::None, true)
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn apply_keeps_close_flag_when_not_following() {
        let p = policy();
        let mut state = ControllerState::new();
        let minima = SectorMinima {
            right: 0.1,
            center: 0.1,
            left: 0.1,
        };
        p.apply(&minima, &mut state).unwrap();
        assert!(!state.status().can_continue);
        assert!(!state.status().is_close_to_wall);
    }

    #[test]
    fn apply_updates_both_flags_while_following() {
        let p = policy();
        let mut state = ControllerState::new();
        state.begin_wall_follow(TurnDirection::Left);
        let minima = SectorMinima {
            right: 2.0,
            center: 2.0,
            left: 0.55,
        };
        p.apply(&minima, &mut state).unwrap();
        assert!(state.status().can_continue);
        assert!(state.status().is_close_to_wall);
    }
}
