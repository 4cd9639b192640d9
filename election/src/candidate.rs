//! Registered candidates.

use ballot_types::{AccountId, CandidateId};
use serde::{Deserialize, Serialize};

/// A registered option voters can select.
///
/// Everything except `vote_count` is fixed at registration. The state machine
/// only hands out shared references, so counts change only through `vote`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// The account the candidate is linked to.
    pub account: AccountId,
    /// Party or affiliation label; may be empty for independents.
    pub party: String,
    pub vote_count: u64,
}

impl Candidate {
    pub(crate) fn new(id: CandidateId, name: String, account: AccountId, party: String) -> Self {
        Self {
            id,
            name,
            account,
            party,
            vote_count: 0,
        }
    }
}
