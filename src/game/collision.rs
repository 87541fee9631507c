//! Collision Detection
//!
//! Paddle and obstacle contact tests for the ball.

use crate::core::court::{BALL_SIZE, MAX_BOUNCE_ANGLE, PADDLE_HEIGHT};
use crate::game::state::Obstacle;

/// Axis along which an obstacle reflects the ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BounceAxis {
    /// Invert horizontal speed
    Horizontal,
    /// Invert vertical speed
    Vertical,
}

/// Check whether a paddle whose top is at `paddle_y` covers `ball_y`.
///
/// Both paddle ends are inclusive.
#[inline]
pub fn paddle_covers(paddle_y: f64, ball_y: f64) -> bool {
    paddle_y <= ball_y && ball_y <= paddle_y + PADDLE_HEIGHT
}

/// Deflection for a ball meeting a paddle at `ball_y`.
///
/// `0` at the paddle center, `±MAX_BOUNCE_ANGLE` at the tips (positive below
/// the center).
#[inline]
pub fn bounce_angle(paddle_y: f64, ball_y: f64) -> f64 {
    let half = PADDLE_HEIGHT / 2.0;
    let relative_intersect = (ball_y - (paddle_y + half)) / half;
    relative_intersect * MAX_BOUNCE_ANGLE
}

/// Check a tentative ball position against one obstacle.
///
/// The contact box extends `BALL_SIZE` past the obstacle edge on each axis.
/// The axis with the larger center separation is reflected; ties go to
/// the vertical axis.
pub fn obstacle_contact(obstacle: &Obstacle, x: f64, y: f64) -> Option<BounceAxis> {
    let dx = (x - obstacle.x).abs();
    let dy = (y - obstacle.y).abs();
    let reach = obstacle.size / 2.0 + BALL_SIZE;

    if dx < reach && dy < reach {
        if dx > dy {
            Some(BounceAxis::Horizontal)
        } else {
            Some(BounceAxis::Vertical)
        }
    } else {
        None
    }
}
