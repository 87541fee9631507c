//! Game Events
//!
//! What happened during a tick. Used for logging only, never sent on the wire.

use crate::game::state::Slot;

/// A notable thing that happened during one physics update.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Ball bounced off the top or bottom wall
    WallBounce,

    /// Ball was returned by a paddle
    PaddleHit {
        slot: Slot,
        /// Ball speed before the speed-up
        speed: f64,
    },

    /// Ball got past a paddle
    PointScored { scorer: Slot, score: u32 },

    /// Ball touched an obstacle
    ObstacleHit { index: usize },

    /// A score reached the limit
    RoundWon { winner: Slot },
}

impl GameEvent {
    /// Round results are worth an info log, everything else is debug noise.
    pub fn is_notable(&self) -> bool {
        matches!(self, GameEvent::RoundWon { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_round_results_are_notable() {
        assert!(GameEvent::RoundWon { winner: Slot::One }.is_notable());
        assert!(!GameEvent::WallBounce.is_notable());
        assert!(!GameEvent::PointScored { scorer: Slot::Two, score: 3 }.is_notable());
    }
}
