//! Randomness for the end-of-election tie-break.
//!
//! The draw is the only randomized step in an election, and whoever controls
//! the randomness controls the outcome of a tie. Sources are therefore a
//! capability handed to the state machine at call time rather than something
//! it reaches for on its own:
//! - [`OsRandom`]: operating-system CSPRNG, for a trusted single operator.
//! - [`CommitRevealSource`]: combined reveals from several participants, so
//!   no single party (the administrator included) can steer the result.

pub mod commit_reveal;
pub mod error;
pub mod hash;
pub mod os;
pub mod select;

pub use commit_reveal::{CommitRevealSource, Commitment, Reveal};
pub use error::RandomError;
pub use os::OsRandom;
pub use select::pick_index;

use serde::{Deserialize, Serialize};

/// Trait for providing randomness to the tie-break.
pub trait RandomSource: Send + Sync {
    /// Get randomness bound to `context` (the election and its tie set).
    fn randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomError>;

    /// Check that an output was produced by this source for `context`.
    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, RandomError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

/// A random value together with whatever evidence its source can offer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomOutput {
    /// The random bytes (32 bytes).
    pub value: [u8; 32],
    /// Evidence the value was correctly generated; empty when the source has none.
    pub proof: Vec<u8>,
    /// Source-specific sequence number.
    pub round: u64,
}

impl RandomOutput {
    /// Hex rendering of the value, for logs and reports.
    pub fn value_hex(&self) -> String {
        hex::encode(self.value)
    }
}
