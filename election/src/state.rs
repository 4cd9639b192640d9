//! The election state machine.

use crate::candidate::Candidate;
use crate::error::ElectionError;
use crate::event::ElectionEvent;
use crate::phase::ElectionPhase;
use crate::voter::Voter;
use ballot_random::{pick_index, RandomOutput, RandomSource};
use ballot_types::{AccountId, CandidateId, NationalId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// The outcome fixed when voting ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub candidate_id: CandidateId,
    /// The winning (maximal) vote count.
    pub vote_count: u64,
    /// How many candidates shared that count.
    pub tie_size: usize,
    /// The randomness used to break the tie; `None` when there was no tie.
    pub draw: Option<RandomOutput>,
}

/// A single election and all of its data.
///
/// Every mutating call checks its preconditions before touching any field,
/// so a call either applies completely or returns an error and leaves the
/// state exactly as it was.
#[derive(Clone, Debug)]
pub struct ElectionState {
    pub(crate) admin: AccountId,
    pub(crate) label: String,
    pub(crate) phase: ElectionPhase,
    /// Registration order; `candidates[i].id == i + 1`.
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) voters: HashMap<AccountId, Voter>,
    /// national id → owning account.
    pub(crate) national_ids: HashMap<NationalId, AccountId>,
    pub(crate) winner: Option<WinnerRecord>,
    pub(crate) events: Vec<ElectionEvent>,
}

impl ElectionState {
    /// Create an election administered by `admin`.
    pub fn new(admin: AccountId) -> Self {
        Self::with_label(admin, "election")
    }

    /// Create an election with a human-readable label. The label is bound
    /// into the tie-break randomness context.
    pub fn with_label(admin: AccountId, label: impl Into<String>) -> Self {
        let label = label.into();
        tracing::info!(%admin, %label, "election created");
        Self {
            admin,
            label,
            phase: ElectionPhase::NotStarted,
            candidates: Vec::new(),
            voters: HashMap::new(),
            national_ids: HashMap::new(),
            winner: None,
            events: Vec::new(),
        }
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Register a candidate (administrator only). Returns the new id.
    ///
    /// Not gated by phase.
    pub fn register_candidate(
        &mut self,
        caller: &AccountId,
        name: &str,
        account: AccountId,
        party: &str,
    ) -> Result<CandidateId, ElectionError> {
        self.ensure_admin(caller)
            .and_then(|_| {
                if name.trim().is_empty() {
                    return Err(ElectionError::InvalidArgument(
                        "candidate name must not be empty".into(),
                    ));
                }
                Ok(())
            })
            .inspect_err(|e| tracing::warn!(%caller, error = %e, "candidate registration rejected"))?;

        let id = CandidateId::from_index(self.candidates.len());
        self.candidates.push(Candidate::new(
            id,
            name.to_string(),
            account.clone(),
            party.to_string(),
        ));
        self.events.push(ElectionEvent::CandidateRegistered {
            id,
            name: name.to_string(),
            party: party.to_string(),
            account,
        });
        tracing::info!(candidate_id = %id, name, party, "candidate registered");
        Ok(id)
    }

    /// Register the caller as a voter.
    ///
    /// Not gated by phase.
    pub fn register_voter(
        &mut self,
        caller: &AccountId,
        national_id: NationalId,
        name: &str,
    ) -> Result<(), ElectionError> {
        let check = if self.voters.contains_key(caller) {
            Err(ElectionError::AlreadyRegistered)
        } else if self.national_ids.contains_key(&national_id) {
            Err(ElectionError::DuplicateNationalId)
        } else {
            Ok(())
        };
        check.inspect_err(|e| tracing::warn!(%caller, error = %e, "voter registration rejected"))?;

        self.national_ids.insert(national_id.clone(), caller.clone());
        self.voters.insert(
            caller.clone(),
            Voter::new(caller.clone(), national_id, name.to_string()),
        );
        self.events.push(ElectionEvent::VoterRegistered {
            account: caller.clone(),
        });
        tracing::info!(account = %caller, "voter registered");
        Ok(())
    }

    /// Open voting (administrator only). NotStarted → Voting.
    pub fn start_voting(&mut self, caller: &AccountId) -> Result<(), ElectionError> {
        self.ensure_admin(caller)
            .and_then(|_| self.ensure_phase(ElectionPhase::NotStarted))
            .inspect_err(|e| tracing::warn!(%caller, error = %e, "start voting rejected"))?;

        self.phase = ElectionPhase::Voting;
        self.events.push(ElectionEvent::VotingStarted);
        tracing::info!(candidates = self.candidates.len(), voters = self.voters.len(), "voting started");
        Ok(())
    }

    /// Cast the caller's single vote for `candidate_id`.
    pub fn vote(&mut self, caller: &AccountId, candidate_id: CandidateId) -> Result<(), ElectionError> {
        let slot = self
            .ensure_phase(ElectionPhase::Voting)
            .and_then(|_| match self.voters.get(caller) {
                None => Err(ElectionError::NotRegistered),
                Some(voter) if voter.has_voted => Err(ElectionError::AlreadyVoted),
                Some(_) => self.candidate_slot(candidate_id),
            })
            .inspect_err(|e| {
                tracing::warn!(%caller, candidate_id = %candidate_id, error = %e, "vote rejected")
            })?;

        // Both writes below are infallible once the checks above passed.
        self.candidates[slot].vote_count += 1;
        if let Some(voter) = self.voters.get_mut(caller) {
            voter.has_voted = true;
            voter.voted_for = Some(candidate_id);
        }
        self.events.push(ElectionEvent::VoteCast {
            voter: caller.clone(),
            candidate: candidate_id,
        });
        tracing::info!(account = %caller, candidate_id = %candidate_id, "vote cast");
        Ok(())
    }

    /// Close voting (administrator only) and fix the winner. Voting → Ended.
    ///
    /// The candidate with the most votes wins. When several share the top
    /// count, one is drawn uniformly from them using `random`; with a single
    /// leader `random` is never consulted. If there are no candidates, or the
    /// source fails, the election stays open.
    pub fn end_voting(
        &mut self,
        caller: &AccountId,
        random: &dyn RandomSource,
    ) -> Result<CandidateId, ElectionError> {
        let record = self
            .ensure_admin(caller)
            .and_then(|_| self.ensure_phase(ElectionPhase::Voting))
            .and_then(|_| self.resolve_winner(random))
            .inspect_err(|e| tracing::warn!(%caller, error = %e, "end voting rejected"))?;

        let winner = record.candidate_id;
        self.events.push(ElectionEvent::VotingEnded {
            winner,
            tie_size: record.tie_size,
        });
        tracing::info!(
            winner = %winner,
            votes = record.vote_count,
            tie_size = record.tie_size,
            source = random.name(),
            "voting ended"
        );
        self.winner = Some(record);
        self.phase = ElectionPhase::Ended;
        Ok(winner)
    }

    // ── Reads ──────────────────────────────────────────────────────────

    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn phase(&self) -> ElectionPhase {
        self.phase
    }

    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        id.index().and_then(|i| self.candidates.get(i))
    }

    /// All candidates in registration order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn voter(&self, account: &AccountId) -> Option<&Voter> {
        self.voters.get(account)
    }

    /// All voters, in no particular order.
    pub fn voters(&self) -> impl Iterator<Item = &Voter> {
        self.voters.values()
    }

    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }

    /// Number of voters who have voted. Always equals the sum of all
    /// candidates' vote counts.
    pub fn votes_cast(&self) -> usize {
        self.voters.values().filter(|v| v.has_voted).count()
    }

    /// `Some` only once the election has ended.
    pub fn winner_id(&self) -> Option<CandidateId> {
        self.winner.as_ref().map(|w| w.candidate_id)
    }

    pub fn winner(&self) -> Option<&WinnerRecord> {
        self.winner.as_ref()
    }

    /// Candidates by descending vote count, ties in registration order.
    pub fn results(&self) -> Vec<&Candidate> {
        let mut ranked: Vec<&Candidate> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| b.vote_count.cmp(&a.vote_count).then(a.id.cmp(&b.id)));
        ranked
    }

    /// Everything that has happened, oldest first.
    pub fn events(&self) -> &[ElectionEvent] {
        &self.events
    }

    /// The bytes a tie among `tie` is drawn against: the election label and
    /// the tied ids, so one source output cannot be replayed for another
    /// election or another tie.
    pub fn tie_break_context(&self, tie: &[CandidateId]) -> Vec<u8> {
        let mut context = Vec::with_capacity(self.label.len() + 1 + tie.len() * 4);
        context.extend_from_slice(self.label.as_bytes());
        context.push(0);
        for id in tie {
            context.extend_from_slice(&id.get().to_le_bytes());
        }
        context
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn ensure_admin(&self, caller: &AccountId) -> Result<(), ElectionError> {
        if caller == &self.admin {
            Ok(())
        } else {
            Err(ElectionError::Unauthorized)
        }
    }

    fn ensure_phase(&self, expected: ElectionPhase) -> Result<(), ElectionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ElectionError::InvalidPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn candidate_slot(&self, id: CandidateId) -> Result<usize, ElectionError> {
        id.index()
            .filter(|&i| i < self.candidates.len())
            .ok_or(ElectionError::InvalidCandidate(id))
    }

    /// Compute the winner without mutating anything.
    fn resolve_winner(&self, random: &dyn RandomSource) -> Result<WinnerRecord, ElectionError> {
        let max = self.candidates.iter().map(|c| c.vote_count).max().unwrap_or(0);
        let tie: Vec<CandidateId> = self
            .candidates
            .iter()
            .filter(|c| c.vote_count == max)
            .map(|c| c.id)
            .collect();
        // At least one candidate always holds the maximum, so the tie set is
        // empty exactly when nobody is registered.
        let size = NonZeroUsize::new(tie.len()).ok_or(ElectionError::NoCandidates)?;

        if size == NonZeroUsize::MIN {
            return Ok(WinnerRecord {
                candidate_id: tie[0],
                vote_count: max,
                tie_size: 1,
                draw: None,
            });
        }

        let output = random.randomness(&self.tie_break_context(&tie))?;
        let picked = pick_index(&output, size);
        tracing::debug!(
            tie_size = tie.len(),
            picked = %tie[picked],
            value = %output.value_hex(),
            "tie broken"
        );
        Ok(WinnerRecord {
            candidate_id: tie[picked],
            vote_count: max,
            tie_size: tie.len(),
            draw: Some(output),
        })
    }
}
