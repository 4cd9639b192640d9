//! Commit-reveal randomness among several participants.
//!
//! Each participant first commits `blake2b(secret)`, then reveals `secret`.
//! Once every commitment has been revealed, the output for a context is
//! `blake2b(context || secrets in commit order)`. A single honest participant
//! is enough to make the result unpredictable to everyone else. Nobody can
//! change a secret after seeing the others, because commitments close as soon
//! as the first reveal arrives.

use crate::hash::{blake2b_256, blake2b_256_multi};
use crate::{RandomError, RandomOutput, RandomSource};
use ballot_types::AccountId;
use serde::{Deserialize, Serialize};

/// A commitment from a participant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Commitment {
    pub participant: AccountId,
    /// Hash of the secret value.
    pub hash: [u8; 32],
}

impl Commitment {
    /// Build the commitment for `secret`.
    pub fn for_secret(participant: AccountId, secret: &[u8; 32]) -> Self {
        Self {
            participant,
            hash: blake2b_256(secret),
        }
    }
}

/// A reveal from a participant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reveal {
    pub participant: AccountId,
    /// The secret value.
    pub value: [u8; 32],
}

/// Commit-reveal randomness source.
#[derive(Debug, Default)]
pub struct CommitRevealSource {
    commitments: Vec<Commitment>,
    /// Parallel to `commitments`.
    reveals: Vec<Option<[u8; 32]>>,
}

impl CommitRevealSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commitment. Fails once any reveal has been accepted, or if
    /// the participant already committed.
    pub fn record_commitment(&mut self, commitment: Commitment) -> Result<(), RandomError> {
        if self.reveals.iter().any(Option::is_some) {
            return Err(RandomError::CommitReveal(
                "commitments are closed once reveals begin".into(),
            ));
        }
        if self.position(&commitment.participant).is_some() {
            return Err(RandomError::CommitReveal(format!(
                "{} has already committed",
                commitment.participant
            )));
        }
        tracing::debug!(
            participant = %commitment.participant,
            hash = %hex::encode(commitment.hash),
            "commitment recorded"
        );
        self.commitments.push(commitment);
        self.reveals.push(None);
        Ok(())
    }

    /// Record a reveal and check it matches the participant's commitment.
    pub fn record_reveal(&mut self, reveal: Reveal) -> Result<(), RandomError> {
        let idx = self.position(&reveal.participant).ok_or_else(|| {
            RandomError::CommitReveal(format!("{} never committed", reveal.participant))
        })?;
        if self.reveals[idx].is_some() {
            return Err(RandomError::CommitReveal(format!(
                "{} has already revealed",
                reveal.participant
            )));
        }
        if blake2b_256(&reveal.value) != self.commitments[idx].hash {
            tracing::warn!(participant = %reveal.participant, "reveal does not match commitment");
            return Err(RandomError::InvalidProof);
        }
        self.reveals[idx] = Some(reveal.value);
        tracing::debug!(participant = %reveal.participant, "reveal accepted");
        Ok(())
    }

    /// Participants that committed but have not revealed yet.
    pub fn pending(&self) -> Vec<&AccountId> {
        self.commitments
            .iter()
            .zip(&self.reveals)
            .filter(|(_, r)| r.is_none())
            .map(|(c, _)| &c.participant)
            .collect()
    }

    pub fn commitment_count(&self) -> usize {
        self.commitments.len()
    }

    /// Concatenate all reveals in commit order. Fails while any are missing.
    pub fn combine_reveals(&self) -> Result<Vec<u8>, RandomError> {
        if self.commitments.is_empty() {
            return Err(RandomError::CommitReveal("no commitments recorded".into()));
        }
        let pending = self.pending();
        if !pending.is_empty() {
            return Err(RandomError::CommitReveal(format!(
                "{} participant(s) have not revealed",
                pending.len()
            )));
        }
        Ok(self.reveals.iter().flatten().flatten().copied().collect())
    }

    fn position(&self, participant: &AccountId) -> Option<usize> {
        self.commitments
            .iter()
            .position(|c| &c.participant == participant)
    }
}

impl RandomSource for CommitRevealSource {
    fn randomness(&self, context: &[u8]) -> Result<RandomOutput, RandomError> {
        let proof = self.combine_reveals()?;
        Ok(RandomOutput {
            value: blake2b_256_multi(&[context, &proof]),
            round: self.commitments.len() as u64,
            proof,
        })
    }

    fn verify(&self, context: &[u8], output: &RandomOutput) -> Result<bool, RandomError> {
        if output.proof.len() != self.commitments.len() * 32 {
            return Ok(false);
        }
        let reveals_match = output
            .proof
            .chunks_exact(32)
            .zip(&self.commitments)
            .all(|(secret, c)| blake2b_256(secret) == c.hash);
        Ok(reveals_match && blake2b_256_multi(&[context, &output.proof]) == output.value)
    }

    fn name(&self) -> &str {
        "commit-reveal"
    }
}
