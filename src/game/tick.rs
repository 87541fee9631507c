//! Authoritative Physics Update
//!
//! One call advances the ball by one tick: wall bounces, paddle returns or
//! points at the goal lines, then obstacle deflections. Random draws only
//! happen on a re-serve after a point, so a seeded state replays exactly.

use crate::core::court::{BALL_SIZE, BOUNCE_SPEEDUP, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::game::collision::{bounce_angle, obstacle_contact, paddle_covers, BounceAxis};
use crate::game::events::GameEvent;
use crate::game::state::{GameState, Slot};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Whether a winner was declared this tick
    pub round_ended: bool,
}

/// Run one physics update.
///
/// Does nothing (and draws nothing from the RNG) unless the round is running.
pub fn update(state: &mut GameState) -> TickResult {
    let mut result = TickResult::default();

    if !state.running {
        return result;
    }

    let mut next_x = state.ball_x + state.ball_speed_x;
    let mut next_y = state.ball_y + state.ball_speed_y;

    // 1. Top and bottom walls
    if next_y <= 0.0 || next_y >= CANVAS_HEIGHT {
        state.ball_speed_y = -state.ball_speed_y;
        next_y = next_y.clamp(0.0, CANVAS_HEIGHT);
        result.events.push(GameEvent::WallBounce);
    }

    // 2. Goal lines
    if next_x <= 0.0 {
        next_x = resolve_goal_line(state, Slot::One, &mut result);
    } else if next_x >= CANVAS_WIDTH {
        next_x = resolve_goal_line(state, Slot::Two, &mut result);
    }

    // 3. Obstacles, tested against the tentative position in order
    for (index, obstacle) in state.obstacles.iter().enumerate() {
        match obstacle_contact(obstacle, next_x, next_y) {
            Some(BounceAxis::Horizontal) => {
                state.ball_speed_x *= -BOUNCE_SPEEDUP;
                result.events.push(GameEvent::ObstacleHit { index });
            }
            Some(BounceAxis::Vertical) => {
                state.ball_speed_y *= -BOUNCE_SPEEDUP;
                result.events.push(GameEvent::ObstacleHit { index });
            }
            None => {}
        }
    }

    // 4. Commit
    state.ball_x = next_x;
    state.ball_y = next_y;

    result
}

/// Handle the ball reaching `defender`'s goal line.
///
/// Returns the committed x position: the goal line itself on a return,
/// one ball size inside the court on a point.
fn resolve_goal_line(state: &mut GameState, defender: Slot, result: &mut TickResult) -> f64 {
    let (goal_line, serve_x, direction) = match defender {
        Slot::One => (0.0, BALL_SIZE, 1.0),
        Slot::Two => (CANVAS_WIDTH, CANVAS_WIDTH - BALL_SIZE, -1.0),
    };

    let paddle_y = state.paddle_y(defender);

    // Uses the ball's current y, not the tentative one
    if paddle_covers(paddle_y, state.ball_y) {
        let angle = bounce_angle(paddle_y, state.ball_y);
        let speed = state.ball_speed_x.hypot(state.ball_speed_y);

        state.ball_speed_x = direction * (speed * BOUNCE_SPEEDUP).abs();
        state.ball_speed_y = speed * -angle;

        result.events.push(GameEvent::PaddleHit { slot: defender, speed });
        return goal_line;
    }

    let scorer = defender.opponent();
    let score = state.award_point(scorer);
    result.events.push(GameEvent::PointScored { scorer, score });

    if let Some(winner) = state.check_winner() {
        result.events.push(GameEvent::RoundWon { winner });
        result.round_ended = true;
    }

    state.ball_speed_x = -state.ball_speed_x;
    state.ball_speed_y = state.random_serve_speed_y();

    serve_x
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::court::PADDLE_MAX_Y;
    use crate::game::input::apply_movement;
    use crate::game::state::Obstacle;
    use proptest::prelude::*;

    /// Running state with no obstacles and the ball parked at `(x, y)`.
    fn running_state(x: f64, y: f64, vx: f64, vy: f64) -> GameState {
        let mut state = GameState::with_seed(42);
        state.start_game();
        state.obstacles.clear();
        state.ball_x = x;
        state.ball_y = y;
        state.ball_speed_x = vx;
        state.ball_speed_y = vy;
        state
    }

    #[test]
    fn test_update_is_noop_when_not_running() {
        let mut state = GameState::with_seed(9);
        let before = state.snapshot();
        let rng_before = state.rng.state();
        let speed_before = (state.ball_speed_x, state.ball_speed_y);

        let result = state.update();

        assert!(result.events.is_empty());
        assert_eq!(state.snapshot(), before);
        assert_eq!(state.rng.state(), rng_before);
        assert_eq!((state.ball_speed_x, state.ball_speed_y), speed_before);
    }

    #[test]
    fn test_update_is_noop_after_round_over() {
        let mut state = running_state(400.0, 300.0, 7.0, 0.0);
        state.player1_score = 10;
        state.check_winner();
        let before = state.snapshot();

        state.update();
        assert_eq!(state.snapshot(), before);
    }

    #[test]
    fn test_ball_moves_by_velocity() {
        let mut state = running_state(400.0, 300.0, 7.0, -3.0);
        let result = state.update();

        assert_eq!((state.ball_x, state.ball_y), (407.0, 297.0));
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_wall_bounce_clamps_and_inverts() {
        let mut state = running_state(400.0, 3.0, 0.0, -7.0);
        let result = state.update();

        assert_eq!(state.ball_y, 0.0);
        assert_eq!(state.ball_speed_y, 7.0);
        assert_eq!(result.events, vec![GameEvent::WallBounce]);

        let mut state = running_state(400.0, 598.0, 0.0, 5.0);
        state.update();
        assert_eq!(state.ball_y, 600.0);
        assert_eq!(state.ball_speed_y, -5.0);
    }

    #[test]
    fn test_left_paddle_returns_ball() {
        // Ball at x=5 level with the paddle center (250 + 50)
        let mut state = running_state(5.0, 300.0, -7.0, 0.0);
        let result = state.update();

        assert!(state.ball_speed_x > 0.0);
        assert!((state.ball_speed_x - 7.7).abs() < 1e-9);
        assert_eq!(state.ball_speed_y, 0.0);
        assert!(state.ball_x >= 0.0);
        assert_eq!(state.player2_score, 0);
        assert_eq!(result.events, vec![GameEvent::PaddleHit { slot: Slot::One, speed: 7.0 }]);
    }

    #[test]
    fn test_paddle_return_angle_follows_contact_point() {
        // Hit near the bottom tip of the right paddle
        let mut state = running_state(798.0, 340.0, 3.0, 4.0);
        state.player2_y = 250.0;
        state.update();

        // relative = (340 - 300) / 50 = 0.8, angle = 0.6, speed = 5
        assert!((state.ball_speed_x + 5.5).abs() < 1e-9);
        assert!((state.ball_speed_y + 3.0).abs() < 1e-9);
        assert_eq!(state.ball_x, 800.0);
    }

    #[test]
    fn test_left_miss_scores_for_player_two() {
        let mut state = running_state(5.0, 50.0, -7.0, 2.0);
        let result = state.update();

        assert_eq!(state.score(Slot::Two), 1);
        assert_eq!(state.score(Slot::One), 0);
        assert_eq!(state.ball_x, 10.0);
        assert_eq!(state.ball_speed_x, 7.0);
        assert!((-7.0..=7.0).contains(&state.ball_speed_y));
        assert!(state.running);
        assert!(!result.round_ended);
        assert!(result
            .events
            .contains(&GameEvent::PointScored { scorer: Slot::Two, score: 1 }));
    }

    #[test]
    fn test_right_miss_scores_for_player_one() {
        let mut state = running_state(797.0, 580.0, 6.0, 0.0);
        state.update();

        assert_eq!(state.score(Slot::One), 1);
        assert_eq!(state.ball_x, 790.0);
        assert_eq!(state.ball_speed_x, -6.0);
    }

    #[test]
    fn test_tenth_point_ends_round() {
        let mut state = running_state(5.0, 50.0, -7.0, 0.0);
        state.player2_score = 9;
        let result = state.update();

        assert_eq!(state.score(Slot::Two), 10);
        assert_eq!(state.winner, Some(Slot::Two));
        assert!(!state.running);
        assert!(result.round_ended);
        assert!(result.events.contains(&GameEvent::RoundWon { winner: Slot::Two }));
    }

    #[test]
    fn test_obstacle_reflects_larger_separation_axis() {
        let mut state = running_state(390.0, 300.0, 7.0, 0.0);
        state.obstacles.push(Obstacle { x: 420.0, y: 300.0, size: 30.0 });
        let result = state.update();

        // dx = 23, dy = 0: horizontal reflection with speed-up
        assert!((state.ball_speed_x + 7.7).abs() < 1e-9);
        assert_eq!(state.ball_x, 397.0);
        assert_eq!(result.events, vec![GameEvent::ObstacleHit { index: 0 }]);
    }

    #[test]
    fn test_obstacle_vertical_reflection() {
        let mut state = running_state(420.0, 270.0, 0.0, 7.0);
        state.obstacles.push(Obstacle { x: 420.0, y: 300.0, size: 30.0 });
        state.update();

        assert!((state.ball_speed_y + 7.7).abs() < 1e-9);
        assert_eq!(state.ball_speed_x, 0.0);
    }

    #[test]
    fn test_seeded_trajectories_match() {
        let mut a = GameState::with_seed(31337);
        let mut b = GameState::with_seed(31337);
        a.start_game();
        b.start_game();

        for _ in 0..2000 {
            a.update();
            b.update();
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }

    proptest! {
        #[test]
        fn prop_invariants_hold(
            seed in any::<u64>(),
            actions in proptest::collection::vec(0u8..8, 0..400),
        ) {
            let mut state = GameState::with_seed(seed);
            state.start_game();

            for action in actions {
                match action {
                    0 => { apply_movement(&mut state, Slot::One, "w"); }
                    1 => { apply_movement(&mut state, Slot::One, "S"); }
                    2 => { apply_movement(&mut state, Slot::Two, "ArrowUp"); }
                    3 => { apply_movement(&mut state, Slot::Two, "arrowdown"); }
                    _ => { state.update(); }
                }

                prop_assert!((0.0..=PADDLE_MAX_Y).contains(&state.player1_y));
                prop_assert!((0.0..=PADDLE_MAX_Y).contains(&state.player2_y));
                prop_assert!((0.0..=CANVAS_WIDTH).contains(&state.ball_x));
                prop_assert!((0.0..=CANVAS_HEIGHT).contains(&state.ball_y));
                if state.running {
                    prop_assert!(state.game_started);
                    prop_assert!(state.winner.is_none());
                }
                if state.winner.is_some() {
                    prop_assert!(!state.running);
                }
            }
        }

        #[test]
        fn prop_scores_never_regress_within_round(seed in any::<u64>(), ticks in 1usize..3000) {
            let mut state = GameState::with_seed(seed);
            state.start_game();
            let mut last = (0, 0);

            for _ in 0..ticks {
                state.update();
                let now = (state.player1_score, state.player2_score);
                prop_assert!(now.0 >= last.0 && now.1 >= last.1);
                prop_assert!(now.0 + now.1 <= last.0 + last.1 + 1);
                last = now;
            }
        }
    }
}
