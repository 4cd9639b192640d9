//! Events recorded for every successful mutation.

use ballot_types::{AccountId, CandidateId};
use serde::{Deserialize, Serialize};

/// Election-level events, appended in the order the mutations committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionEvent {
    CandidateRegistered {
        id: CandidateId,
        name: String,
        party: String,
        account: AccountId,
    },
    VoterRegistered {
        account: AccountId,
    },
    VotingStarted,
    VoteCast {
        voter: AccountId,
        candidate: CandidateId,
    },
    /// `tie_size` is how many candidates shared the top count; above 1 the
    /// winner was drawn.
    VotingEnded {
        winner: CandidateId,
        tie_size: usize,
    },
}
