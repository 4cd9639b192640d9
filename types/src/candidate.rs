//! Candidate identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based, sequential candidate identifier.
///
/// Ids are handed out in registration order; the first candidate is `1`.
/// There is no candidate `0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CandidateId(u32);

impl CandidateId {
    /// The id given to the first registered candidate.
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Position of this candidate in a registration-ordered list, or `None`
    /// for the invalid id `0`.
    pub fn index(&self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }

    /// The id for the candidate stored at `index` of a registration-ordered list.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CandidateId {
    fn from(raw: u32) -> Self {
        Self::new(raw)
    }
}
