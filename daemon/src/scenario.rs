//! Scripted elections loaded from TOML.
//!
//! A scenario lists the administrator, the candidates, the voters (with an
//! optional choice each) and, for commit-reveal randomness, the
//! participants' secrets. [`run`] plays it through every phase the way an
//! external caller would: registrations, open, votes, close.

use anyhow::{bail, Context};
use ballot_election::{ElectionError, ElectionState};
use ballot_random::{CommitRevealSource, Commitment, OsRandom, RandomSource, Reveal};
use ballot_types::{AccountId, CandidateId, NationalId};
use serde::Deserialize;
use std::path::Path;

use crate::config::RandomSourceKind;

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub admin: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub candidates: Vec<CandidateEntry>,
    #[serde(default)]
    pub voters: Vec<VoterEntry>,
    #[serde(default)]
    pub participants: Vec<ParticipantEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CandidateEntry {
    pub name: String,
    pub account: String,
    #[serde(default)]
    pub party: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VoterEntry {
    pub account: String,
    pub national_id: String,
    #[serde(default)]
    pub name: String,
    /// Candidate id to vote for once voting opens.
    #[serde(default)]
    pub vote: Option<u32>,
}

/// A commit-reveal participant; `secret` is 32 bytes of hex.
#[derive(Clone, Debug, Deserialize)]
pub struct ParticipantEntry {
    pub account: String,
    pub secret: String,
}

/// What happened when a scenario was played.
#[derive(Debug)]
pub struct Outcome {
    pub election: ElectionState,
    pub winner: CandidateId,
    /// Operations the election refused, in order, with the reason.
    pub rejected: Vec<(String, ElectionError)>,
    pub source: String,
}

impl Scenario {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Build the tie-break source the config asks for.
    pub fn random_source(&self, kind: RandomSourceKind) -> anyhow::Result<Box<dyn RandomSource>> {
        match kind {
            RandomSourceKind::Os => Ok(Box::new(OsRandom::new())),
            RandomSourceKind::CommitReveal => {
                if self.participants.is_empty() {
                    bail!("commit-reveal randomness needs at least one participant");
                }
                let secrets = self
                    .participants
                    .iter()
                    .map(|p| -> anyhow::Result<(AccountId, [u8; 32])> {
                        Ok((AccountId::new(&p.account), parse_secret(&p.secret)?))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;

                let mut source = CommitRevealSource::new();
                for (participant, secret) in &secrets {
                    source.record_commitment(Commitment::for_secret(participant.clone(), secret))?;
                }
                for (participant, secret) in secrets {
                    source.record_reveal(Reveal {
                        participant,
                        value: secret,
                    })?;
                }
                Ok(Box::new(source))
            }
        }
    }
}

fn parse_secret(raw: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = hex::decode(raw.trim()).context("participant secret is not valid hex")?;
    let secret: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("participant secret must be 32 bytes, got {}", b.len()))?;
    Ok(secret)
}

/// Play `scenario` against a fresh election.
///
/// Refused registrations and votes are collected rather than aborting the
/// run, the same way a front end would report them to the caller. Failing
/// to open or close the election is fatal.
pub fn run(scenario: &Scenario, default_label: &str, random: &dyn RandomSource) -> anyhow::Result<Outcome> {
    let admin = AccountId::new(&scenario.admin);
    if !admin.is_valid() {
        bail!("scenario admin must not be blank");
    }
    let label = scenario.label.as_deref().unwrap_or(default_label);
    let mut election = ElectionState::with_label(admin.clone(), label);
    let mut rejected = Vec::new();

    for c in &scenario.candidates {
        if let Err(e) = election.register_candidate(&admin, &c.name, AccountId::new(&c.account), &c.party) {
            rejected.push((format!("register candidate {:?}", c.name), e));
        }
    }
    for v in &scenario.voters {
        let account = AccountId::new(&v.account);
        if let Err(e) = election.register_voter(&account, NationalId::new(&v.national_id), &v.name) {
            rejected.push((format!("register voter {}", v.account), e));
        }
    }

    election.start_voting(&admin)?;
    for v in &scenario.voters {
        if let Some(choice) = v.vote {
            let account = AccountId::new(&v.account);
            if let Err(e) = election.vote(&account, CandidateId::new(choice)) {
                rejected.push((format!("vote by {} for {choice}", v.account), e));
            }
        }
    }

    let winner = election.end_voting(&admin, random)?;
    Ok(Outcome {
        election,
        winner,
        rejected,
        source: random.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_election::ElectionPhase;

    const SCENARIO: &str = r#"
        admin = "admin"
        label = "test"

        [[candidates]]
        name = "Candidate 1"
        account = "voter1"
        party = "Party A"

        [[candidates]]
        name = "Candidate 2"
        account = "voter2"
        party = "Party B"

        [[voters]]
        account = "voter1"
        national_id = "VOTER1_ID"
        name = "Voter 1"
        vote = 1

        [[voters]]
        account = "voter2"
        national_id = "VOTER1_ID"
        name = "Voter 2"
        vote = 2

        [[voters]]
        account = "voter3"
        national_id = "VOTER3_ID"
        vote = 2

        [[voters]]
        account = "voter4"
        national_id = "VOTER4_ID"
        vote = 2

        [[participants]]
        account = "observer"
        secret = "0101010101010101010101010101010101010101010101010101010101010101"
    "#;

    #[test]
    fn plays_scenario_and_collects_rejections() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        let random = scenario.random_source(RandomSourceKind::Os).unwrap();
        let outcome = run(&scenario, "fallback", random.as_ref()).unwrap();

        assert_eq!(outcome.election.label(), "test");
        assert_eq!(outcome.election.phase(), ElectionPhase::Ended);
        assert_eq!(outcome.winner, CandidateId::new(2));
        assert_eq!(outcome.source, "os");

        // voter2 reused voter1's national id, so both its registration and
        // its vote were refused.
        assert_eq!(outcome.rejected.len(), 2);
        assert!(matches!(outcome.rejected[0].1, ElectionError::DuplicateNationalId));
        assert!(matches!(outcome.rejected[1].1, ElectionError::NotRegistered));
    }

    #[test]
    fn commit_reveal_source_is_built_from_participants() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        let random = scenario
            .random_source(RandomSourceKind::CommitReveal)
            .unwrap();
        assert_eq!(random.name(), "commit-reveal");
        assert!(random.randomness(b"ctx").is_ok());
    }

    #[test]
    fn commit_reveal_without_participants_fails() {
        let scenario = Scenario::from_toml_str(r#"admin = "admin""#).unwrap();
        assert!(scenario
            .random_source(RandomSourceKind::CommitReveal)
            .is_err());
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(parse_secret("abcd").is_err());
        assert!(parse_secret("zz").is_err());
        assert_eq!(parse_secret(&"ff".repeat(32)).unwrap(), [0xff; 32]);
    }

    #[test]
    fn scenario_without_candidates_cannot_close() {
        let scenario = Scenario::from_toml_str(r#"admin = "admin""#).unwrap();
        let random = scenario.random_source(RandomSourceKind::Os).unwrap();
        assert!(run(&scenario, "empty", random.as_ref()).is_err());
    }

    #[test]
    fn label_falls_back_to_config() {
        let scenario = Scenario::from_toml_str(
            r#"
            admin = "admin"
            [[candidates]]
            name = "Solo"
            account = "solo"
        "#,
        )
        .unwrap();
        let random = scenario.random_source(RandomSourceKind::Os).unwrap();
        let outcome = run(&scenario, "fallback", random.as_ref()).unwrap();
        assert_eq!(outcome.election.label(), "fallback");
        assert_eq!(outcome.winner, CandidateId::FIRST);
    }
}
