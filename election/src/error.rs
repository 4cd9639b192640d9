use crate::phase::ElectionPhase;
use ballot_random::RandomError;
use ballot_types::CandidateId;
use thiserror::Error;

/// Every way an election operation can be refused.
///
/// All of these are business-rule violations rather than transient faults:
/// retrying the same call against the same state fails the same way.
#[derive(Debug, Error)]
pub enum ElectionError {
    #[error("only the election administrator can perform this action")]
    Unauthorized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("voter is already registered")]
    AlreadyRegistered,

    #[error("national id is already registered")]
    DuplicateNationalId,

    #[error("caller is not a registered voter")]
    NotRegistered,

    #[error("voter has already voted")]
    AlreadyVoted,

    #[error("candidate {0} does not exist")]
    InvalidCandidate(CandidateId),

    #[error("election is {actual}, expected {expected}")]
    InvalidPhase {
        expected: ElectionPhase,
        actual: ElectionPhase,
    },

    #[error("cannot end an election without candidates")]
    NoCandidates,

    #[error("tie-break randomness failed: {0}")]
    Randomness(#[from] RandomError),

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}
