//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the progression rules and
//! infrastructure. Implementations live in other crates (`ascent-store` for
//! persistence); the engine receives them by injection and never touches
//! process-wide state.

use crate::breakthrough::{BreakthroughRule, Completion};
use crate::challenge::{Athlete, Challenge, ChallengeGrade, Submission};
use crate::ids::{AthleteId, ChallengeId, DivisionId, DomainId, SubmissionId};
use crate::ledger::{XpLedgerEntry, XpSource};
use crate::progression::{AwardOutcome, DomainProgress};
use crate::rank::RankLetter;

/// Classification of store errors the engine reacts to
pub trait StoreFailure: std::fmt::Display {
    /// Whether the failure is a transient write conflict worth retrying
    fn is_conflict(&self) -> bool;
}

/// Transactional access to progression state
///
/// Implemented by the infrastructure layer (ascent-store)
pub trait ProgressionStore {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Transaction handle
    type Tx<'a>: ProgressionTx<Error = Self::Error>
    where
        Self: 'a;

    /// Open a transaction with write intent
    ///
    /// Concurrent transactions touching the same submission or
    /// (athlete, domain) row must be serialized by the store, or fail with
    /// an error whose [`StoreFailure::is_conflict`] is true.
    fn begin(&mut self) -> Result<Self::Tx<'_>, Self::Error>;
}

/// One open transaction
///
/// Dropping the handle without calling [`ProgressionTx::commit`] rolls back
/// every write made through it.
pub trait ProgressionTx {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Get an athlete by ID
    fn athlete(&self, id: AthleteId) -> Result<Option<Athlete>, Self::Error>;

    /// Whether a domain exists
    fn domain_exists(&self, id: DomainId) -> Result<bool, Self::Error>;

    /// Get a challenge by ID
    fn challenge(&self, id: ChallengeId) -> Result<Option<Challenge>, Self::Error>;

    /// Grades of a challenge for a division
    fn grades(
        &self,
        challenge: ChallengeId,
        division: Option<DivisionId>,
    ) -> Result<Vec<ChallengeGrade>, Self::Error>;

    /// Get a submission by ID
    fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, Self::Error>;

    /// The submission for an (athlete, challenge) pair, if any
    fn submission_for(
        &self,
        athlete: AthleteId,
        challenge: ChallengeId,
    ) -> Result<Option<Submission>, Self::Error>;

    /// Insert a new submission; the stored row starts at version 1
    fn insert_submission(&mut self, submission: &Submission) -> Result<(), Self::Error>;

    /// Update a submission if its stored version still equals
    /// `submission.version`; returns the new version
    fn save_submission(&mut self, submission: &Submission) -> Result<u64, Self::Error>;

    /// Progress row for (athlete, domain), if created
    fn progress(
        &self,
        athlete: AthleteId,
        domain: DomainId,
    ) -> Result<Option<DomainProgress>, Self::Error>;

    /// Every progress row of an athlete
    fn athlete_progress(&self, athlete: AthleteId) -> Result<Vec<DomainProgress>, Self::Error>;

    /// Insert (version 0) or update (version check) a progress row;
    /// returns the new version
    fn save_progress(&mut self, progress: &DomainProgress) -> Result<u64, Self::Error>;

    /// Append an immutable ledger entry
    fn append_ledger(&mut self, entry: &XpLedgerEntry) -> Result<(), Self::Error>;

    /// Ledger entries of an athlete, newest first
    fn ledger(
        &self,
        athlete: AthleteId,
        domain: Option<DomainId>,
    ) -> Result<Vec<XpLedgerEntry>, Self::Error>;

    /// Breakthrough rules for transitions out of `from`
    fn breakthrough_rules(&self, from: RankLetter) -> Result<Vec<BreakthroughRule>, Self::Error>;

    /// Approved submissions with an achieved tier on challenges crediting `domain`
    fn completions(
        &self,
        athlete: AthleteId,
        domain: DomainId,
    ) -> Result<Vec<Completion>, Self::Error>;

    /// Make every write durable
    fn commit(self) -> Result<(), Self::Error>;
}

/// Notification emitted after a transaction commits
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressionEvent {
    /// XP was applied to a domain
    XpAwarded {
        /// Athlete credited
        athlete: AthleteId,
        /// Domain credited
        domain: DomainId,
        /// Source of the award
        source: XpSource,
        /// State transition
        outcome: AwardOutcome,
    },

    /// A submission review paid out new tiers
    TiersClaimed {
        /// Submission reviewed
        submission: SubmissionId,
        /// Athlete credited
        athlete: AthleteId,
        /// Tiers newly paid
        tiers: Vec<RankLetter>,
        /// Base reward before splitting
        base_reward: i64,
    },

    /// An athlete moved to the next rank letter in a domain
    BreakthroughConfirmed {
        /// Athlete promoted
        athlete: AthleteId,
        /// Domain promoted in
        domain: DomainId,
        /// State transition
        outcome: AwardOutcome,
    },
}

/// Receiver for post-commit notifications
///
/// Dispatch is best-effort: an error is reported back but never undoes the
/// committed change.
pub trait EventSink {
    /// Deliver one event
    fn dispatch(&self, event: &ProgressionEvent) -> Result<(), String>;
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn dispatch(&self, _event: &ProgressionEvent) -> Result<(), String> {
        Ok(())
    }
}
