//! Fundamental types for the ballot election engine.
//!
//! Identifiers shared by every other crate in the workspace: the account an
//! authenticated caller acts as, the national identifier a voter registers
//! with, and the sequential candidate id.

pub mod account;
pub mod candidate;
pub mod national_id;

pub use account::AccountId;
pub use candidate::CandidateId;
pub use national_id::NationalId;
