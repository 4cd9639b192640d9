//! Serializable snapshots of an election.
//!
//! The byte layout is bincode over [`ElectionSnapshot`] and is not a stable
//! format; it exists so a caller can park an election and pick it up again.
//! Restoring re-checks every invariant, including that the event log agrees
//! with the records, so a tampered or truncated snapshot is rejected instead
//! of producing an election that breaks them.

use crate::candidate::Candidate;
use crate::error::ElectionError;
use crate::event::ElectionEvent;
use crate::phase::ElectionPhase;
use crate::state::{ElectionState, WinnerRecord};
use crate::voter::Voter;
use ballot_types::{AccountId, CandidateId, NationalId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Everything needed to rebuild an [`ElectionState`]. The national-id index
/// is derived, so it is not stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    pub admin: AccountId,
    pub label: String,
    pub phase: ElectionPhase,
    pub candidates: Vec<Candidate>,
    /// Sorted by account so equal elections give equal bytes.
    pub voters: Vec<Voter>,
    pub winner: Option<WinnerRecord>,
    pub events: Vec<ElectionEvent>,
}

impl ElectionState {
    /// Capture the current state.
    pub fn to_snapshot(&self) -> ElectionSnapshot {
        let mut voters: Vec<Voter> = self.voters.values().cloned().collect();
        voters.sort_by(|a, b| a.account.cmp(&b.account));
        ElectionSnapshot {
            admin: self.admin.clone(),
            label: self.label.clone(),
            phase: self.phase,
            candidates: self.candidates.clone(),
            voters,
            winner: self.winner.clone(),
            events: self.events.clone(),
        }
    }

    /// Serialize the election to bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>, ElectionError> {
        bincode::serialize(&self.to_snapshot()).map_err(|e| ElectionError::Serialization(e.to_string()))
    }

    /// Rebuild an election from bytes produced by [`snapshot`](Self::snapshot).
    pub fn restore(data: &[u8]) -> Result<Self, ElectionError> {
        let snapshot: ElectionSnapshot =
            bincode::deserialize(data).map_err(|e| ElectionError::CorruptSnapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Rebuild an election, validating all invariants.
    pub fn from_snapshot(snapshot: ElectionSnapshot) -> Result<Self, ElectionError> {
        let corrupt =
            |msg: String| -> Result<Self, ElectionError> { Err(ElectionError::CorruptSnapshot(msg)) };

        for (i, candidate) in snapshot.candidates.iter().enumerate() {
            if candidate.id != CandidateId::from_index(i) {
                return corrupt(format!("candidate at position {i} has id {}", candidate.id));
            }
        }

        let mut voters = HashMap::with_capacity(snapshot.voters.len());
        let mut national_ids: HashMap<NationalId, AccountId> = HashMap::new();
        let mut tallies = vec![0u64; snapshot.candidates.len()];
        for voter in snapshot.voters {
            if voter.has_voted != voter.voted_for.is_some() {
                return corrupt(format!("voter {} has inconsistent vote flags", voter.account));
            }
            if let Some(choice) = voter.voted_for {
                match choice.index().filter(|&i| i < tallies.len()) {
                    Some(i) => tallies[i] += 1,
                    None => return corrupt(format!("voter {} voted for unknown candidate {choice}", voter.account)),
                }
            }
            if national_ids
                .insert(voter.national_id.clone(), voter.account.clone())
                .is_some()
            {
                return corrupt(format!("national id {} is registered twice", voter.national_id));
            }
            let account = voter.account.clone();
            if voters.insert(account.clone(), voter).is_some() {
                return corrupt(format!("voter {account} is registered twice"));
            }
        }

        for (candidate, tally) in snapshot.candidates.iter().zip(&tallies) {
            if candidate.vote_count != *tally {
                return corrupt(format!(
                    "candidate {} has {} votes but {} ballots",
                    candidate.id, candidate.vote_count, tally
                ));
            }
        }
        if snapshot.phase == ElectionPhase::NotStarted && tallies.iter().any(|&t| t > 0) {
            return corrupt("votes recorded before voting started".into());
        }

        match (&snapshot.winner, snapshot.phase) {
            (None, ElectionPhase::Ended) => return corrupt("ended election has no winner".into()),
            (Some(_), phase) if phase != ElectionPhase::Ended => {
                return corrupt(format!("winner recorded while election is {phase}"))
            }
            (Some(record), _) => {
                let max = tallies.iter().copied().max().unwrap_or(0);
                let winner_votes = record
                    .candidate_id
                    .index()
                    .and_then(|i| tallies.get(i).copied());
                if winner_votes != Some(max) || record.vote_count != max {
                    return corrupt(format!(
                        "winner {} does not hold the maximal vote count",
                        record.candidate_id
                    ));
                }
            }
            (None, _) => {}
        }

        if let Err(msg) = check_events(
            &snapshot.events,
            snapshot.candidates.len(),
            &voters,
            snapshot.phase,
            snapshot.winner.as_ref(),
        ) {
            return corrupt(msg);
        }

        tracing::info!(
            label = %snapshot.label,
            phase = %snapshot.phase,
            candidates = snapshot.candidates.len(),
            voters = voters.len(),
            "election restored from snapshot"
        );
        Ok(Self {
            admin: snapshot.admin,
            label: snapshot.label,
            phase: snapshot.phase,
            candidates: snapshot.candidates,
            voters,
            national_ids,
            winner: snapshot.winner,
            events: snapshot.events,
        })
    }
}

/// The event log must tell the same story as the records: one registration
/// event per candidate (in id order) and per voter, one `VoteCast` per ballot
/// matching the voter's recorded choice, and start/end events that agree
/// with the phase and winner.
fn check_events(
    events: &[ElectionEvent],
    candidate_count: usize,
    voters: &HashMap<AccountId, Voter>,
    phase: ElectionPhase,
    winner: Option<&WinnerRecord>,
) -> Result<(), String> {
    let mut candidates_seen = 0usize;
    let mut voters_seen: HashSet<&AccountId> = HashSet::new();
    let mut ballots: HashSet<&AccountId> = HashSet::new();
    let mut starts = 0usize;
    let mut ends = Vec::new();

    for event in events {
        match event {
            ElectionEvent::CandidateRegistered { id, .. } => {
                if *id != CandidateId::from_index(candidates_seen) {
                    return Err(format!("candidate {id} registered out of order"));
                }
                candidates_seen += 1;
            }
            ElectionEvent::VoterRegistered { account } => {
                if !voters.contains_key(account) || !voters_seen.insert(account) {
                    return Err(format!("unexpected registration event for {account}"));
                }
            }
            ElectionEvent::VotingStarted => starts += 1,
            ElectionEvent::VoteCast { voter, candidate } => {
                let recorded = voters.get(voter).and_then(|v| v.voted_for);
                if recorded != Some(*candidate) || !ballots.insert(voter) {
                    return Err(format!("vote by {voter} for {candidate} has no matching ballot"));
                }
            }
            ElectionEvent::VotingEnded { winner, tie_size } => ends.push((*winner, *tie_size)),
        }
    }

    if candidates_seen != candidate_count {
        return Err(format!(
            "{candidates_seen} candidate registrations for {candidate_count} candidates"
        ));
    }
    if voters_seen.len() != voters.len() {
        return Err(format!(
            "{} voter registrations for {} voters",
            voters_seen.len(),
            voters.len()
        ));
    }
    let cast = voters.values().filter(|v| v.has_voted).count();
    if ballots.len() != cast {
        return Err(format!("{} vote events for {cast} ballots", ballots.len()));
    }
    if starts != usize::from(phase != ElectionPhase::NotStarted) {
        return Err(format!("{starts} start events while election is {phase}"));
    }
    let expected_end: Vec<_> = winner.map(|w| (w.candidate_id, w.tie_size)).into_iter().collect();
    if ends != expected_end {
        return Err("end event does not match the recorded winner".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_nullables::NullRandom;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn voting_election() -> ElectionState {
        let admin = acct("admin");
        let mut election = ElectionState::with_label(admin.clone(), "snapshot-test");
        election
            .register_candidate(&admin, "A", acct("a"), "PA")
            .unwrap();
        election
            .register_candidate(&admin, "B", acct("b"), "PB")
            .unwrap();
        for v in ["v1", "v2", "v3"] {
            election
                .register_voter(&acct(v), NationalId::new(format!("N_{v}")), v)
                .unwrap();
        }
        election.start_voting(&admin).unwrap();
        election.vote(&acct("v1"), CandidateId::new(1)).unwrap();
        election.vote(&acct("v2"), CandidateId::new(2)).unwrap();
        election
    }

    #[test]
    fn restore_reproduces_state_and_keeps_rules() {
        let election = voting_election();
        let bytes = election.snapshot().unwrap();
        let mut restored = ElectionState::restore(&bytes).unwrap();

        assert_eq!(restored.phase(), ElectionPhase::Voting);
        assert_eq!(restored.label(), "snapshot-test");
        assert_eq!(restored.candidates(), election.candidates());
        assert_eq!(restored.events(), election.events());
        assert_eq!(restored.votes_cast(), 2);

        // Derived index is rebuilt: duplicate national id still rejected.
        assert!(matches!(
            restored.register_voter(&acct("v4"), NationalId::new("N_v1"), "x"),
            Err(ElectionError::DuplicateNationalId)
        ));
        assert!(matches!(
            restored.vote(&acct("v1"), CandidateId::new(2)),
            Err(ElectionError::AlreadyVoted)
        ));
        restored.vote(&acct("v3"), CandidateId::new(2)).unwrap();
        let winner = restored
            .end_voting(&acct("admin"), &NullRandom::constant([0u8; 32]))
            .unwrap();
        assert_eq!(winner, CandidateId::new(2));
    }

    #[test]
    fn ended_election_round_trips_winner() {
        let mut election = voting_election();
        election
            .end_voting(&acct("admin"), &NullRandom::constant([0u8; 32]))
            .unwrap();
        let restored = ElectionState::restore(&election.snapshot().unwrap()).unwrap();
        assert_eq!(restored.winner(), election.winner());
        assert_eq!(restored.phase(), ElectionPhase::Ended);
    }

    #[test]
    fn snapshot_bytes_are_deterministic() {
        let election = voting_election();
        assert_eq!(election.snapshot().unwrap(), election.clone().snapshot().unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            ElectionState::restore(b"not a snapshot"),
            Err(ElectionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn inflated_vote_count_is_rejected() {
        let mut snapshot = voting_election().to_snapshot();
        snapshot.candidates[0].vote_count += 1;
        assert!(matches!(
            ElectionState::from_snapshot(snapshot),
            Err(ElectionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn gap_in_candidate_ids_is_rejected() {
        let mut snapshot = voting_election().to_snapshot();
        snapshot.candidates[1].id = CandidateId::new(5);
        assert!(ElectionState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn duplicate_national_id_is_rejected() {
        let mut snapshot = voting_election().to_snapshot();
        snapshot.voters[2].national_id = snapshot.voters[0].national_id.clone();
        assert!(ElectionState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn winner_outside_tie_set_is_rejected() {
        let mut election = voting_election();
        election
            .vote(&acct("v3"), CandidateId::new(1))
            .unwrap();
        election
            .end_voting(&acct("admin"), &NullRandom::constant([0u8; 32]))
            .unwrap();
        let mut snapshot = election.to_snapshot();
        if let Some(record) = snapshot.winner.as_mut() {
            record.candidate_id = CandidateId::new(2);
        }
        assert!(ElectionState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn vote_event_without_ballot_is_rejected() {
        let mut snapshot = voting_election().to_snapshot();
        snapshot.events.push(ElectionEvent::VoteCast {
            voter: acct("v3"),
            candidate: CandidateId::new(1),
        });
        assert!(matches!(
            ElectionState::from_snapshot(snapshot),
            Err(ElectionError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn vote_event_for_other_candidate_is_rejected() {
        let mut snapshot = voting_election().to_snapshot();
        for event in snapshot.events.iter_mut() {
            if let ElectionEvent::VoteCast { candidate, .. } = event {
                *candidate = CandidateId::new(3);
            }
        }
        assert!(ElectionState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn missing_events_are_rejected() {
        let mut snapshot = voting_election().to_snapshot();
        snapshot
            .events
            .retain(|e| !matches!(e, ElectionEvent::VoterRegistered { .. }));
        assert!(ElectionState::from_snapshot(snapshot).is_err());

        let mut snapshot = voting_election().to_snapshot();
        snapshot.events.retain(|e| *e != ElectionEvent::VotingStarted);
        assert!(ElectionState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn end_event_must_match_winner() {
        let mut election = voting_election();
        election.vote(&acct("v3"), CandidateId::new(1)).unwrap();
        election
            .end_voting(&acct("admin"), &NullRandom::constant([0u8; 32]))
            .unwrap();
        let mut snapshot = election.to_snapshot();
        for event in snapshot.events.iter_mut() {
            if let ElectionEvent::VotingEnded { winner, .. } = event {
                *winner = CandidateId::new(2);
            }
        }
        assert!(ElectionState::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn snapshot_serializes_to_json_for_inspection() {
        let snapshot = voting_election().to_snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "Voting");
        assert_eq!(json["candidates"].as_array().unwrap().len(), 2);
    }
}
