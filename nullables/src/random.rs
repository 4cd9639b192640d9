//! Nullable random — deterministic random number generation.

use ballot_random::{RandomError, RandomOutput, RandomSource};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A deterministic source for testing.
///
/// Returns pre-configured values in order, cycling when exhausted.
pub struct NullRandom {
    outputs: Mutex<Vec<[u8; 32]>>,
    index: Mutex<usize>,
}

impl NullRandom {
    /// Create with a sequence of deterministic random values.
    pub fn new(outputs: Vec<[u8; 32]>) -> Self {
        assert!(!outputs.is_empty(), "NullRandom needs at least one output");
        Self {
            outputs: Mutex::new(outputs),
            index: Mutex::new(0),
        }
    }

    /// Create with a single value that will be returned for every call.
    pub fn constant(value: [u8; 32]) -> Self {
        Self::new(vec![value])
    }

    /// How many times randomness has been requested.
    pub fn calls(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl RandomSource for NullRandom {
    fn randomness(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
        let outputs = self.outputs.lock().unwrap();
        let mut idx = self.index.lock().unwrap();
        let current = *idx % outputs.len();
        *idx += 1;
        Ok(RandomOutput {
            value: outputs[current],
            proof: Vec::new(),
            round: current as u64,
        })
    }

    fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, RandomError> {
        Ok(true) // Always valid in test mode
    }

    fn name(&self) -> &str {
        "null-random"
    }
}

/// A reproducible stream of well-spread values: `blake2b(seed || n)` for
/// the n-th call. Useful for statistical tests that need many distinct
/// draws without depending on OS entropy.
pub struct CountingRandom {
    seed: u64,
    counter: AtomicU64,
}

impl CountingRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: AtomicU64::new(0),
        }
    }
}

impl RandomSource for CountingRandom {
    fn randomness(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(n.to_le_bytes());
        let mut value = [0u8; 32];
        value.copy_from_slice(&hasher.finalize());
        Ok(RandomOutput {
            value,
            proof: Vec::new(),
            round: n,
        })
    }

    fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, RandomError> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "counting-random"
    }
}

/// A source that is never available.
pub struct FailingRandom;

impl RandomSource for FailingRandom {
    fn randomness(&self, _context: &[u8]) -> Result<RandomOutput, RandomError> {
        Err(RandomError::Unavailable("failing test source".into()))
    }

    fn verify(&self, _context: &[u8], _output: &RandomOutput) -> Result<bool, RandomError> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "failing"
    }
}
