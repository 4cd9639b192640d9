//! National identifiers, unique per registered voter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The citizen identifier a voter registers with.
///
/// Stored verbatim: two ids are the same only if their strings are equal.
/// Normalisation (case, separators) belongs to whoever issues the ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId(String);

impl NationalId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NationalId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NationalId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
