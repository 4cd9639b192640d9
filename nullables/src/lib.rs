//! Nullable infrastructure for deterministic testing.
//!
//! The only external dependency of the election engine is its randomness.
//! This crate provides test-friendly sources that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the OS entropy pool
//!
//! Usage: pass one of these to `end_voting` in place of a real source.

pub mod random;

pub use random::{CountingRandom, FailingRandom, NullRandom};
