use proptest::prelude::*;

use ballot_election::{ElectionError, ElectionPhase, ElectionState};
use ballot_nullables::CountingRandom;
use ballot_types::{AccountId, CandidateId, NationalId};

/// One step of an arbitrary call sequence. Small index spaces make
/// collisions (same voter, same national id) likely.
#[derive(Clone, Debug)]
enum Op {
    RegisterCandidate { caller: u8, name_len: u8 },
    RegisterVoter { account: u8, national_id: u8 },
    StartVoting { caller: u8 },
    Vote { account: u8, candidate: u32 },
    EndVoting { caller: u8, seed: u64 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3, 0u8..4).prop_map(|(caller, name_len)| Op::RegisterCandidate { caller, name_len }),
        (0u8..8, 0u8..6).prop_map(|(account, national_id)| Op::RegisterVoter { account, national_id }),
        (0u8..3).prop_map(|caller| Op::StartVoting { caller }),
        (0u8..8, 0u32..6).prop_map(|(account, candidate)| Op::Vote { account, candidate }),
        (0u8..3, any::<u64>()).prop_map(|(caller, seed)| Op::EndVoting { caller, seed }),
    ]
}

/// Caller 0 is the administrator.
fn account(n: u8) -> AccountId {
    if n == 0 {
        AccountId::new("admin")
    } else {
        AccountId::new(format!("acct{n}"))
    }
}

fn apply(election: &mut ElectionState, op: &Op) -> Result<(), ElectionError> {
    match *op {
        Op::RegisterCandidate { caller, name_len } => {
            let name = "x".repeat(name_len as usize);
            election
                .register_candidate(&account(caller), &name, account(caller + 10), "P")
                .map(|_| ())
        }
        Op::RegisterVoter { account: a, national_id } => election.register_voter(
            &account(a),
            NationalId::new(format!("N{national_id}")),
            "voter",
        ),
        Op::StartVoting { caller } => election.start_voting(&account(caller)),
        Op::Vote { account: a, candidate } => election.vote(&account(a), CandidateId::new(candidate)),
        Op::EndVoting { caller, seed } => election
            .end_voting(&account(caller), &CountingRandom::new(seed))
            .map(|_| ()),
    }
}

fn assert_invariants(election: &ElectionState) -> Result<(), TestCaseError> {
    for (i, c) in election.candidates().iter().enumerate() {
        prop_assert_eq!(c.id, CandidateId::from_index(i));
    }
    let total: u64 = election.candidates().iter().map(|c| c.vote_count).sum();
    prop_assert_eq!(total as usize, election.votes_cast());

    let mut national_ids: Vec<_> = election.voters().map(|v| v.national_id.clone()).collect();
    let before = national_ids.len();
    national_ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    national_ids.dedup();
    prop_assert_eq!(national_ids.len(), before);

    match election.winner() {
        Some(record) => {
            prop_assert_eq!(election.phase(), ElectionPhase::Ended);
            let max = election.candidates().iter().map(|c| c.vote_count).max();
            let winner = election.candidate(record.candidate_id).map(|c| c.vote_count);
            prop_assert_eq!(winner, max);
        }
        None => prop_assert_ne!(election.phase(), ElectionPhase::Ended),
    }
    Ok(())
}

proptest! {
    /// Every invariant holds after every step of any call sequence, and a
    /// failed call leaves the state byte-for-byte unchanged.
    #[test]
    fn invariants_hold_for_any_sequence(ops in prop::collection::vec(op(), 0..60)) {
        let mut election = ElectionState::new(account(0));
        for op in &ops {
            let before = election.snapshot().unwrap();
            let phase = election.phase();
            let outcome = apply(&mut election, op);
            if let Err(err) = &outcome {
                prop_assert_eq!(
                    election.snapshot().unwrap(),
                    before,
                    "{:?} failed with {} but mutated state",
                    op,
                    err
                );
            }
            if matches!(op, Op::Vote { .. }) && phase != ElectionPhase::Voting {
                let wrong_phase = matches!(outcome, Err(ElectionError::InvalidPhase { .. }));
                prop_assert!(wrong_phase, "{:?} outside voting returned {:?}", op, outcome);
            }
            assert_invariants(&election)?;
        }
    }

    /// Candidate ids are exactly 1..=N in call order.
    #[test]
    fn candidate_ids_follow_call_order(names in prop::collection::vec("[A-Za-z]{1,8}", 1..30)) {
        let admin = account(0);
        let mut election = ElectionState::new(admin.clone());
        for (i, name) in names.iter().enumerate() {
            let id = election
                .register_candidate(&admin, name, account(1), "P")
                .unwrap();
            prop_assert_eq!(id.get() as usize, i + 1);
            prop_assert_eq!(&election.candidate(id).unwrap().name, name);
        }
    }

    /// Non-admin callers never get past the authorization check.
    #[test]
    fn non_admin_is_always_unauthorized(caller in 1u8..50, seed in any::<u64>()) {
        let mut election = ElectionState::new(account(0));
        let intruder = account(caller);
        let outcomes = [
            election
                .register_candidate(&intruder, "C", account(2), "P")
                .map(|_| ()),
            election.start_voting(&intruder),
            election
                .end_voting(&intruder, &CountingRandom::new(seed))
                .map(|_| ()),
        ];
        for outcome in &outcomes {
            let unauthorized = matches!(outcome, Err(ElectionError::Unauthorized));
            prop_assert!(unauthorized, "non-admin call returned {:?}", outcome);
        }
        prop_assert!(election.events().is_empty());
    }

    /// A vote outside the Voting phase is rejected with InvalidPhase and
    /// leaves every count at zero.
    #[test]
    fn vote_outside_voting_is_invalid_phase(candidate in 0u32..5, ended in any::<bool>()) {
        let admin = account(0);
        let mut election = ElectionState::new(admin.clone());
        election.register_candidate(&admin, "A", account(1), "P").unwrap();
        election.register_voter(&account(3), NationalId::new("N3"), "v").unwrap();
        if ended {
            election.start_voting(&admin).unwrap();
            election.end_voting(&admin, &CountingRandom::new(0)).unwrap();
        }
        let outcome = election.vote(&account(3), CandidateId::new(candidate));
        let wrong_phase = matches!(outcome, Err(ElectionError::InvalidPhase { .. }));
        prop_assert!(wrong_phase, "vote returned {:?}", outcome);
        prop_assert_eq!(election.candidates()[0].vote_count, 0);
    }
}
