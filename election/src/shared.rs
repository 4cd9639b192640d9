//! A thread-safe handle for serving one election to concurrent callers.

use crate::candidate::Candidate;
use crate::error::ElectionError;
use crate::phase::ElectionPhase;
use crate::state::{ElectionState, WinnerRecord};
use crate::voter::Voter;
use ballot_random::RandomSource;
use ballot_types::{AccountId, CandidateId, NationalId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to an [`ElectionState`] behind a single lock.
///
/// Every call holds the lock for its whole duration, so each operation is
/// one atomic transaction: two `vote` calls for the same voter cannot both
/// pass the double-vote check, and `end_voting` always sees a settled tally.
/// Operation volume is low and each call is short, so one coarse lock is
/// enough. Reads return owned copies so no guard escapes.
#[derive(Clone, Debug)]
pub struct SharedElection {
    inner: Arc<Mutex<ElectionState>>,
}

impl SharedElection {
    pub fn new(admin: AccountId) -> Self {
        Self::from_state(ElectionState::new(admin))
    }

    pub fn with_label(admin: AccountId, label: impl Into<String>) -> Self {
        Self::from_state(ElectionState::with_label(admin, label))
    }

    pub fn from_state(state: ElectionState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Mutations validate before they write, so a panic while the lock was
    /// held cannot have left a half-applied change behind.
    fn lock(&self) -> MutexGuard<'_, ElectionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_candidate(
        &self,
        caller: &AccountId,
        name: &str,
        account: AccountId,
        party: &str,
    ) -> Result<CandidateId, ElectionError> {
        self.lock().register_candidate(caller, name, account, party)
    }

    pub fn register_voter(
        &self,
        caller: &AccountId,
        national_id: NationalId,
        name: &str,
    ) -> Result<(), ElectionError> {
        self.lock().register_voter(caller, national_id, name)
    }

    pub fn start_voting(&self, caller: &AccountId) -> Result<(), ElectionError> {
        self.lock().start_voting(caller)
    }

    pub fn vote(&self, caller: &AccountId, candidate_id: CandidateId) -> Result<(), ElectionError> {
        self.lock().vote(caller, candidate_id)
    }

    pub fn end_voting(
        &self,
        caller: &AccountId,
        random: &dyn RandomSource,
    ) -> Result<CandidateId, ElectionError> {
        self.lock().end_voting(caller, random)
    }

    pub fn phase(&self) -> ElectionPhase {
        self.lock().phase()
    }

    pub fn candidate(&self, id: CandidateId) -> Option<Candidate> {
        self.lock().candidate(id).cloned()
    }

    pub fn voter(&self, account: &AccountId) -> Option<Voter> {
        self.lock().voter(account).cloned()
    }

    pub fn winner_id(&self) -> Option<CandidateId> {
        self.lock().winner_id()
    }

    pub fn winner(&self) -> Option<WinnerRecord> {
        self.lock().winner().cloned()
    }

    pub fn results(&self) -> Vec<Candidate> {
        self.lock().results().into_iter().cloned().collect()
    }

    /// Run `f` against a consistent view of the whole state.
    pub fn read<R>(&self, f: impl FnOnce(&ElectionState) -> R) -> R {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> Result<Vec<u8>, ElectionError> {
        self.lock().snapshot()
    }
}
