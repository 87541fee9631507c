//! Court Geometry and Gameplay Constants
//!
//! All distances are in court units (one unit = one canvas pixel on the
//! reference client). The origin is the top-left corner, y grows downward.

// =============================================================================
// GEOMETRY
// =============================================================================

/// Court width: 800 units
pub const CANVAS_WIDTH: f64 = 800.0;

/// Court height: 600 units
pub const CANVAS_HEIGHT: f64 = 600.0;

/// Paddle width (rendering only, physics treats paddles as the court edge)
pub const PADDLE_WIDTH: f64 = 10.0;

/// Paddle height: 100 units
pub const PADDLE_HEIGHT: f64 = 100.0;

/// Ball size, also the re-serve inset and the obstacle contact margin
pub const BALL_SIZE: f64 = 10.0;

/// Highest valid paddle top: 600 - 100 = 500
pub const PADDLE_MAX_Y: f64 = CANVAS_HEIGHT - PADDLE_HEIGHT;

/// Paddle top at round start (centered)
pub const PADDLE_START_Y: f64 = 250.0;

// =============================================================================
// BALL
// =============================================================================

/// Horizontal serve speed, also the bound of the vertical serve speed
pub const BASE_BALL_SPEED: f64 = 7.0;

/// Speed multiplier on paddle and obstacle bounces (10% speed-up)
pub const BOUNCE_SPEEDUP: f64 = 1.1;

/// Maximum paddle deflection factor at the paddle tips
pub const MAX_BOUNCE_ANGLE: f64 = 0.75;

/// Vertical serve speed is drawn as an integer in
/// [-SERVE_Y_STEPS, SERVE_Y_STEPS] and divided by this (centi-units)
pub const SERVE_Y_STEPS: i32 = 700;

/// Divisor for the vertical serve draw
pub const SERVE_Y_SCALE: f64 = 100.0;

// =============================================================================
// OBSTACLES
// =============================================================================

/// Obstacles per round
pub const OBSTACLE_COUNT: usize = 2;

/// Obstacle edge length
pub const OBSTACLE_SIZE: f64 = 30.0;

/// Obstacle center x range (inclusive)
pub const OBSTACLE_X_RANGE: (i32, i32) = (100, 700);

/// Obstacle center y range (inclusive)
pub const OBSTACLE_Y_RANGE: (i32, i32) = (100, 500);

// =============================================================================
// RULES
// =============================================================================

/// Points needed to win a round
pub const MAX_SCORE: u32 = 10;

/// Paddle displacement per keypress
pub const PADDLE_STEP: f64 = 100.0;
