//! Self-registered voters.

use ballot_types::{AccountId, CandidateId, NationalId};
use serde::{Deserialize, Serialize};

/// An account registered to cast one vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub account: AccountId,
    pub national_id: NationalId,
    pub name: String,
    pub has_voted: bool,
    /// The candidate chosen; `Some` exactly when `has_voted`.
    pub voted_for: Option<CandidateId>,
}

impl Voter {
    pub(crate) fn new(account: AccountId, national_id: NationalId, name: String) -> Self {
        Self {
            account,
            national_id,
            name,
            has_voted: false,
            voted_for: None,
        }
    }
}
