use thiserror::Error;

#[derive(Debug, Error)]
pub enum RandomError {
    #[error("randomness unavailable: {0}")]
    Unavailable(String),

    #[error("commit-reveal: {0}")]
    CommitReveal(String),

    #[error("invalid proof")]
    InvalidProof,

    #[error("{0}")]
    Other(String),
}
