//! Ascent Domain Layer
//!
//! This crate contains the progression ledger and reward-calculation rules for
//! Ascent. It depends only on `uuid` and defines the value objects, pure
//! algorithms, and trait interfaces that the store and engine crates build on.
//!
//! ## Key Concepts
//!
//! - **Rank letter**: one of seven ordered letters `F < E < D < C < B < A < S`
//! - **Level**: a rank letter plus a sublevel in `0..=9`, encoded as an ordinal
//! - **Tier**: the rank letter an athlete reached on one challenge attempt
//! - **Claimed tiers**: tiers already paid out for an (athlete, challenge) pair
//! - **Banked XP**: XP earned past a rank's ceiling, held for a breakthrough
//! - **Prime level**: the floored mean ordinal across all of an athlete's domains
//!
//! ## Reward Pipeline
//!
//! | Step | Module | Operation |
//! |------|--------|-----------|
//! | 1 | [`grading`] | [`resolve_tier`] turns a raw value into the hardest tier met |
//! | 2 | [`claims`] | [`claim_new_tiers`] drops tiers already paid |
//! | 3 | [`reward`] | [`base_reward`] + [`split_reward`] distribute points per domain |
//! | 4 | [`progression`] | [`apply_award`] advances sublevels and banks overflow |
//! | 5 | [`breakthrough`] | [`select_rule`] + [`evaluate`] gate the next letter |
//! | - | [`prime`] | [`compute_prime`] aggregates levels for display |
//!
//! ## Architecture
//!
//! - Pure business logic only; every algorithm is total over well-formed input
//! - Storage is reached through [`traits::ProgressionStore`], never global state
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod breakthrough;
pub mod challenge;
pub mod claims;
pub mod grading;
pub mod ids;
pub mod ledger;
pub mod prime;
pub mod progression;
pub mod rank;
pub mod reward;
pub mod tables;
pub mod traits;

// Re-exports for convenience
pub use breakthrough::{
    evaluate, select_rule, BreakthroughRule, BreakthroughStatus, Completion, RuleScope,
};
pub use challenge::{Athlete, Challenge, ChallengeGrade, Domain, ReviewStatus, Submission};
pub use claims::{claim_new_tiers, ClaimedTiers};
pub use grading::{resolve_tier, GradingType, Threshold};
pub use ids::{AthleteId, ChallengeId, DivisionId, DomainId, LedgerEntryId, SubmissionId};
pub use ledger::{XpLedgerEntry, XpSource};
pub use prime::compute_prime;
pub use progression::{advance_letter, apply_award, AwardOutcome, DomainProgress};
pub use rank::{from_ordinal, to_ordinal, Level, RankLetter};
pub use reward::{base_reward, split_reward, DomainShare, DomainSplit};
pub use tables::RankTables;
