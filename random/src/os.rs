//! Operating-system entropy.

use crate::{RandomError, RandomOutput, RandomSource};
use std::sync::atomic::{AtomicU64, Ordering};

/// Randomness straight from the OS CSPRNG.
///
/// Unpredictable, but not verifiable: whoever runs the process sees the
/// value first. Suitable when the operator is trusted, otherwise prefer
/// [`CommitRevealSource`](crate::CommitRevealSource).
#[derive(Debug, Default)]
pub struct OsRandom {
    draws: AtomicU64,
}

impl OsRandom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomSource for OsRandom {
    fn randomness(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
        let mut value = [0u8; 32];
        getrandom::getrandom(&mut value).map_err(|e| RandomError::Unavailable(e.to_string()))?;
        let round = self.draws.fetch_add(1, Ordering::Relaxed);
        Ok(RandomOutput {
            value,
            proof: Vec::new(),
            round,
        })
    }

    /// OS entropy carries no proof; only the shape of the output can be checked.
    fn verify(&self, _context: &[u8], output: &RandomOutput) -> Result<bool, RandomError> {
        Ok(output.proof.is_empty())
    }

    fn name(&self) -> &str {
        "os"
    }
}
