//! # Obstacle Pong Server
//!
//! Authoritative two-player Pong with obstacles, played over WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    OBSTACLE PONG SERVER                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── court.rs    - Court geometry and rule constants         │
//! │  └── rng.rs      - Seedable Xorshift128+ PRNG                │
//! │                                                              │
//! │  game/           - Game logic (no I/O)                       │
//! │  ├── state.rs    - Match state and round lifecycle           │
//! │  ├── tick.rs     - Authoritative physics update              │
//! │  ├── collision.rs- Paddle and obstacle contact               │
//! │  ├── input.rs    - Key to paddle movement                    │
//! │  └── events.rs   - Per-tick events                           │
//! │                                                              │
//! │  network/        - Networking                                │
//! │  ├── server.rs   - WebSocket server                          │
//! │  ├── session.rs  - Session coordinator                       │
//! │  ├── driver.rs   - Fixed-rate tick driver                    │
//! │  ├── registry.rs - Player slot assignment                    │
//! │  ├── connection.rs - Non-blocking send handles               │
//! │  └── protocol.rs - JSON message types                        │
//! │                                                              │
//! │  config.rs       - Environment configuration                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! One session owns the game state. Connection events and ticks all take
//! its write lock, so they are applied one at a time in arrival order.
//! Broadcasts never wait on a client: a slow client just misses frames.
//!
//! ## Determinism
//!
//! All randomness (serve direction, serve angle, obstacle placement) comes
//! from one seeded Xorshift128+ per session. Given the same seed and the
//! same sequence of events, a session replays identically.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::config::{ConfigError, ServerConfig};
pub use crate::core::rng::DeterministicRng;
pub use crate::game::state::{GameState, Obstacle, Slot, StateSnapshot};
pub use crate::network::server::{GameServer, GameServerError};
pub use crate::network::session::SessionCoordinator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
