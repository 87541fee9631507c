//! Movement Input
//!
//! Maps key names sent by clients to discrete paddle jumps. Each keypress
//! moves a paddle by a fixed step; there is no held-key or per-tick motion.

use crate::core::court::{PADDLE_MAX_Y, PADDLE_STEP};
use crate::game::state::{GameState, Slot};

/// Direction of a paddle jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaddleDirection {
    /// Toward y = 0
    Up,
    /// Toward the bottom wall
    Down,
}

/// A paddle jump decoded from a key name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaddleMove {
    /// Paddle the key belongs to
    pub slot: Slot,
    pub direction: PaddleDirection,
}

impl PaddleMove {
    /// Decode a key name, ignoring case.
    ///
    /// `w`/`s` drive paddle 1, `arrowup`/`arrowdown` drive paddle 2.
    /// Returns `None` for any other key.
    pub fn from_key(key: &str) -> Option<Self> {
        let (slot, direction) = match key.to_lowercase().as_str() {
            "w" => (Slot::One, PaddleDirection::Up),
            "s" => (Slot::One, PaddleDirection::Down),
            "arrowup" => (Slot::Two, PaddleDirection::Up),
            "arrowdown" => (Slot::Two, PaddleDirection::Down),
            _ => return None,
        };
        Some(Self { slot, direction })
    }

    /// Signed displacement of this jump.
    pub fn delta(&self) -> f64 {
        match self.direction {
            PaddleDirection::Up => -PADDLE_STEP,
            PaddleDirection::Down => PADDLE_STEP,
        }
    }
}

/// Apply a key press from the player in `sender`'s slot.
///
/// Keys belonging to the other paddle are ignored. The paddle is clamped to
/// `[0, PADDLE_MAX_Y]`. Returns whether the paddle moved.
pub fn apply_movement(state: &mut GameState, sender: Slot, key: &str) -> bool {
    let paddle_move = match PaddleMove::from_key(key) {
        Some(m) if m.slot == sender => m,
        _ => return false,
    };

    let paddle_y = state.paddle_y_mut(sender);
    let before = *paddle_y;
    *paddle_y = (before + paddle_move.delta()).clamp(0.0, PADDLE_MAX_Y);
    *paddle_y != before
}
