//! Uniform index selection from a random output.

use crate::hash::blake2b_256_multi;
use crate::RandomOutput;
use std::num::NonZeroUsize;

/// Map `output` to an index in `0..n`, uniformly.
///
/// Reads the value as little-endian 64-bit words and rejects words in the
/// biased tail above the largest multiple of `n`. If a whole block is
/// rejected the next block is `blake2b(value || counter)`, so the result is
/// a pure function of the output and anyone holding it can recompute the
/// pick.
pub fn pick_index(output: &RandomOutput, n: NonZeroUsize) -> usize {
    let n = n.get() as u64;
    // 2^64 mod n; words at or above 2^64 - tail would skew the modulo.
    let tail = (u64::MAX % n + 1) % n;
    let limit = 0u64.wrapping_sub(tail);

    let mut block = output.value;
    let mut counter: u64 = 0;
    loop {
        for chunk in block.chunks_exact(8) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            let x = u64::from_le_bytes(word);
            if tail == 0 || x < limit {
                return (x % n) as usize;
            }
        }
        counter += 1;
        block = blake2b_256_multi(&[&output.value, &counter.to_le_bytes()]);
    }
}
