//! Shared test fixtures and utilities for simlink crates.
//!
//! Provides deterministic RNG setup, sample outbound values, and ready-made
//! sessions over the in-memory and TCP transports.

pub mod fixtures;
pub mod harness;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{sample_image, sample_reward, sample_scene};
pub use harness::{memory_session, poll_until, tcp_session};
pub use rng::seeded_rng;
