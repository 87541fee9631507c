//! Core primitives.
//!
//! Court constants and the seedable RNG every random draw goes through.

pub mod court;
pub mod rng;

// Re-export core types
pub use rng::{derive_session_seed, DeterministicRng};
