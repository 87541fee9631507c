//! Game State Definitions
//!
//! The single match state shared by both players, its round lifecycle,
//! and the projection that is broadcast to clients.

use serde::{Deserialize, Serialize};

use crate::core::court::{
    BASE_BALL_SPEED, CANVAS_HEIGHT, CANVAS_WIDTH, MAX_SCORE, OBSTACLE_COUNT, OBSTACLE_SIZE,
    OBSTACLE_X_RANGE, OBSTACLE_Y_RANGE, PADDLE_START_Y, SERVE_Y_SCALE, SERVE_Y_STEPS,
};
use crate::core::rng::DeterministicRng;
use crate::game::tick::{self, TickResult};

// =============================================================================
// SLOT
// =============================================================================

/// Which paddle and score a connection controls.
///
/// Serialized as the bare integer `1` or `2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Slot {
    /// Left paddle, keys `w` / `s`
    One = 1,
    /// Right paddle, keys `arrowup` / `arrowdown`
    Two = 2,
}

impl Slot {
    /// The other player.
    pub fn opponent(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Wire number (1 or 2).
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.number()
    }
}

impl TryFrom<u8> for Slot {
    type Error = InvalidSlot;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Slot::One),
            2 => Ok(Slot::Two),
            other => Err(InvalidSlot(other)),
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A slot number outside {1, 2}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid player slot {0}")]
pub struct InvalidSlot(pub u8);

// =============================================================================
// OBSTACLE
// =============================================================================

/// Square obstacle, positioned by its center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    /// Edge length
    pub size: f64,
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Authoritative state of one match.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Top of the left paddle, in [0, PADDLE_MAX_Y]
    pub player1_y: f64,
    /// Top of the right paddle, in [0, PADDLE_MAX_Y]
    pub player2_y: f64,

    /// Ball position
    pub ball_x: f64,
    pub ball_y: f64,

    /// Ball velocity per tick (never broadcast)
    pub ball_speed_x: f64,
    pub ball_speed_y: f64,

    pub player1_score: u32,
    pub player2_score: u32,

    /// Set by `start_game`, cleared by `reset_game`
    pub game_started: bool,
    /// True only while a round is in play
    pub running: bool,
    pub winner: Option<Slot>,

    /// Obstacles for the current round, in collision-test order
    pub obstacles: Vec<Obstacle>,

    /// Source of every random draw
    pub rng: DeterministicRng,
}

impl GameState {
    /// Create a state in lobby defaults, drawing from `rng`.
    pub fn new(rng: DeterministicRng) -> Self {
        let mut state = Self {
            player1_y: PADDLE_START_Y,
            player2_y: PADDLE_START_Y,
            ball_x: CANVAS_WIDTH / 2.0,
            ball_y: CANVAS_HEIGHT / 2.0,
            ball_speed_x: BASE_BALL_SPEED,
            ball_speed_y: BASE_BALL_SPEED,
            player1_score: 0,
            player2_score: 0,
            game_started: false,
            running: false,
            winner: None,
            obstacles: Vec::new(),
            rng,
        };
        state.reset_game();
        state
    }

    /// Create a state seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(DeterministicRng::new(seed))
    }

    /// Return to the lobby: no round, no winner, fresh obstacles.
    pub fn reset_game(&mut self) {
        self.player1_y = PADDLE_START_Y;
        self.player2_y = PADDLE_START_Y;
        self.ball_x = CANVAS_WIDTH / 2.0;
        self.ball_y = CANVAS_HEIGHT / 2.0;
        self.ball_speed_x = BASE_BALL_SPEED;
        self.ball_speed_y = BASE_BALL_SPEED;
        self.player1_score = 0;
        self.player2_score = 0;
        self.game_started = false;
        self.running = false;
        self.winner = None;
        self.obstacles = self.generate_obstacles();
    }

    /// Start (or restart) a round.
    pub fn start_game(&mut self) {
        self.game_started = true;
        self.running = true;
        self.winner = None;
        self.player1_score = 0;
        self.player2_score = 0;
        self.player1_y = PADDLE_START_Y;
        self.player2_y = PADDLE_START_Y;
        self.obstacles = self.generate_obstacles();
        self.reset_ball();
    }

    /// Serve from the center with a random direction.
    pub fn reset_ball(&mut self) {
        self.ball_x = CANVAS_WIDTH / 2.0;
        self.ball_y = CANVAS_HEIGHT / 2.0;
        self.ball_speed_x = if self.rng.next_coin() {
            -BASE_BALL_SPEED
        } else {
            BASE_BALL_SPEED
        };
        self.ball_speed_y = self.random_serve_speed_y();
    }

    /// Vertical speed for a serve or re-serve, uniform in [-7, 7].
    pub(crate) fn random_serve_speed_y(&mut self) -> f64 {
        self.rng.next_int_range(-SERVE_Y_STEPS, SERVE_Y_STEPS) as f64 / SERVE_Y_SCALE
    }

    /// Declare a winner once a score reaches `MAX_SCORE`.
    ///
    /// Player 1 is checked first. Returns the winner, if any.
    pub fn check_winner(&mut self) -> Option<Slot> {
        if self.player1_score >= MAX_SCORE {
            self.winner = Some(Slot::One);
            self.running = false;
        } else if self.player2_score >= MAX_SCORE {
            self.winner = Some(Slot::Two);
            self.running = false;
        }
        self.winner
    }

    /// Advance the ball one tick. No-op unless running.
    pub fn update(&mut self) -> TickResult {
        tick::update(self)
    }

    /// Paddle top for `slot`.
    pub fn paddle_y(&self, slot: Slot) -> f64 {
        match slot {
            Slot::One => self.player1_y,
            Slot::Two => self.player2_y,
        }
    }

    /// Mutable paddle top for `slot`.
    pub(crate) fn paddle_y_mut(&mut self, slot: Slot) -> &mut f64 {
        match slot {
            Slot::One => &mut self.player1_y,
            Slot::Two => &mut self.player2_y,
        }
    }

    /// Score for `slot`.
    pub fn score(&self, slot: Slot) -> u32 {
        match slot {
            Slot::One => self.player1_score,
            Slot::Two => self.player2_score,
        }
    }

    /// Add one point for `slot` and return the new score.
    pub(crate) fn award_point(&mut self, slot: Slot) -> u32 {
        let score = match slot {
            Slot::One => &mut self.player1_score,
            Slot::Two => &mut self.player2_score,
        };
        *score += 1;
        *score
    }

    /// Broadcast projection. Ball speed and constants are not exposed.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            player1_y: self.player1_y,
            player2_y: self.player2_y,
            ball_x: self.ball_x,
            ball_y: self.ball_y,
            player1_score: self.player1_score,
            player2_score: self.player2_score,
            obstacles: self.obstacles.clone(),
            game_started: self.game_started,
            running: self.running,
            winner: self.winner,
        }
    }

    fn generate_obstacles(&mut self) -> Vec<Obstacle> {
        (0..OBSTACLE_COUNT)
            .map(|_| Obstacle {
                x: self.rng.next_int_range(OBSTACLE_X_RANGE.0, OBSTACLE_X_RANGE.1) as f64,
                y: self.rng.next_int_range(OBSTACLE_Y_RANGE.0, OBSTACLE_Y_RANGE.1) as f64,
                size: OBSTACLE_SIZE,
            })
            .collect()
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// What clients see of the match. Field names follow the wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(rename = "player1Y")]
    pub player1_y: f64,
    #[serde(rename = "player2Y")]
    pub player2_y: f64,
    #[serde(rename = "ballX")]
    pub ball_x: f64,
    #[serde(rename = "ballY")]
    pub ball_y: f64,
    #[serde(rename = "player1Score")]
    pub player1_score: u32,
    #[serde(rename = "player2Score")]
    pub player2_score: u32,
    pub obstacles: Vec<Obstacle>,
    pub game_started: bool,
    pub running: bool,
    pub winner: Option<Slot>,
}
