//! The election lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three phases of an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// Candidates and voters may register; no votes are accepted yet.
    #[default]
    NotStarted,
    /// Registered voters may cast their single vote.
    Voting,
    /// The winner is fixed. Terminal.
    Ended,
}

impl ElectionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Voting => "voting",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_elections_have_not_started() {
        assert_eq!(ElectionPhase::default(), ElectionPhase::NotStarted);
    }

    #[test]
    fn display_uses_readable_names() {
        assert_eq!(ElectionPhase::NotStarted.to_string(), "not started");
        assert_eq!(ElectionPhase::Voting.to_string(), "voting");
        assert_eq!(ElectionPhase::Ended.to_string(), "ended");
    }
}
