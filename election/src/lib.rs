//! Single-election voting for the ballot workspace.
//!
//! One administrator registers candidates and opens/closes voting; accounts
//! register themselves as voters and cast exactly one vote each. Closing the
//! vote picks the candidate with the most votes, drawing uniformly among the
//! tied leaders with an injected [`RandomSource`](ballot_random::RandomSource).
//!
//! Lifecycle: NotStarted → Voting → Ended (terminal).
//!
//! [`ElectionState`] is a plain value that enforces every invariant on each
//! mutating call; [`SharedElection`] wraps it for concurrent callers.

pub mod candidate;
pub mod error;
pub mod event;
pub mod phase;
pub mod shared;
pub mod snapshot;
pub mod state;
pub mod voter;

pub use candidate::Candidate;
pub use error::ElectionError;
pub use event::ElectionEvent;
pub use phase::ElectionPhase;
pub use shared::SharedElection;
pub use snapshot::ElectionSnapshot;
pub use state::{ElectionState, WinnerRecord};
pub use voter::Voter;
