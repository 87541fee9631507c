//! Game Logic Module
//!
//! Pure match simulation, no I/O.
//!
//! ## Module Structure
//!
//! - `state`: Match state, round lifecycle, broadcast projection
//! - `tick`: Per-tick physics update
//! - `collision`: Paddle and obstacle contact tests
//! - `input`: Key to paddle movement mapping
//! - `events`: What happened during a tick

pub mod collision;
pub mod events;
pub mod input;
pub mod state;
pub mod tick;

// Re-export key types
pub use events::GameEvent;
pub use input::{apply_movement, PaddleDirection, PaddleMove};
pub use state::{GameState, Obstacle, Slot, StateSnapshot};
pub use tick::TickResult;
