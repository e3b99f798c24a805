//! Transactional progression flows

use crate::retry::{with_retry, Failure};
use crate::{EngineConfig, EngineError, EngineMetrics};
use ascent_domain::traits::{EventSink, NoopSink, ProgressionEvent, ProgressionStore, ProgressionTx};
use ascent_domain::{
    advance_letter, apply_award, base_reward, claim_new_tiers, compute_prime, evaluate,
    resolve_tier, select_rule, split_reward, Athlete, AthleteId, AwardOutcome, BreakthroughStatus,
    ChallengeGrade, ChallengeId, DomainId, DomainProgress, Level, RankLetter, RankTables,
    ReviewStatus, Submission, SubmissionId, Threshold, XpLedgerEntry, XpSource,
};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current timestamp in seconds since Unix epoch
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One XP award to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRequest {
    /// Athlete credited
    pub athlete: AthleteId,
    /// Domain credited
    pub domain: DomainId,
    /// Signed amount; negative values are admin corrections
    pub amount: i64,
    /// What produced the award
    pub source: XpSource,
    /// Id of the originating record, if any
    pub source_ref: Option<String>,
    /// Free-text note
    pub note: Option<String>,
}

impl AwardRequest {
    /// Create a request without reference or note
    pub fn new(athlete: AthleteId, domain: DomainId, amount: i64, source: XpSource) -> Self {
        Self {
            athlete,
            domain,
            amount,
            source,
            source_ref: None,
            note: None,
        }
    }

    /// Attach a source reference
    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = Some(source_ref.into());
        self
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// XP credited to one domain by a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainAward {
    /// Domain credited
    pub domain: DomainId,
    /// Share of the base reward
    pub amount: i64,
    /// State transition in that domain
    pub outcome: AwardOutcome,
}

/// Result of reviewing a submission
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewOutcome {
    /// Submission reviewed
    pub submission: SubmissionId,
    /// Athlete who submitted
    pub athlete: AthleteId,
    /// Status after the review
    pub status: ReviewStatus,
    /// Best tier achieved so far
    pub achieved_tier: Option<RankLetter>,
    /// Tiers paid out by this review (empty on re-review)
    pub new_tiers: Vec<RankLetter>,
    /// Points for the new tiers before splitting
    pub base_reward: i64,
    /// Per-domain credits
    pub awards: Vec<DomainAward>,
}

/// Progression engine
///
/// Runs every operation inside one store transaction, retries write
/// conflicts up to [`EngineConfig::max_conflict_retries`] times, and
/// dispatches events to the sink only after the transaction commits.
///
/// # Examples
///
/// ```no_run
/// use ascent_domain::{AthleteId, DomainId, XpSource};
/// use ascent_engine::{AwardRequest, ProgressionEngine};
/// use ascent_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("ascent.db")?;
/// let mut engine = ProgressionEngine::default_config();
///
/// let request = AwardRequest::new(AthleteId::new(), DomainId::new(), 150, XpSource::Training);
/// let outcome = engine.award_xp(&mut store, &request)?;
/// println!("{} -> {}", outcome.previous, outcome.new);
/// # Ok(())
/// # }
/// ```
pub struct ProgressionEngine<E: EventSink = NoopSink> {
    config: EngineConfig,
    tables: RankTables,
    sink: E,
    metrics: EngineMetrics,
}

impl ProgressionEngine<NoopSink> {
    /// Create an engine that drops its events
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_sink(config, NoopSink)
    }

    /// Create an engine with default configuration
    pub fn default_config() -> Self {
        let config = EngineConfig::default();
        Self {
            tables: config.tables(),
            config,
            sink: NoopSink,
            metrics: EngineMetrics::new(),
        }
    }
}

impl<E: EventSink> ProgressionEngine<E> {
    /// Create an engine that reports committed changes to `sink`
    pub fn with_sink(config: EngineConfig, sink: E) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            tables: config.tables(),
            config,
            sink,
            metrics: EngineMetrics::new(),
        })
    }

    /// Get the active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Apply an XP award to one (athlete, domain)
    ///
    /// The progress row is created at F0 on first award. The ledger entry is
    /// appended even when the award leaves the progress row unchanged.
    #[tracing::instrument(skip_all, fields(athlete = %request.athlete, domain = %request.domain, amount = request.amount))]
    pub fn award_xp<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        request: &AwardRequest,
    ) -> Result<AwardOutcome, EngineError> {
        let tables = &self.tables;
        let now = current_timestamp();

        let outcome = with_retry("award_xp", self.config.max_conflict_retries, &mut self.metrics, || {
            let mut tx = store.begin().map_err(Failure::Store)?;
            require_athlete(&tx, request.athlete)?;
            require_domain(&tx, request.domain)?;
            let outcome = credit(&mut tx, tables, request, now)?;
            tx.commit().map_err(Failure::Store)?;
            Ok(outcome)
        })?;

        self.after_award(request.athlete, request.domain, request.source, outcome);
        Ok(outcome)
    }

    /// Get or create the submission for (athlete, challenge)
    #[tracing::instrument(skip_all, fields(athlete = %athlete, challenge = %challenge))]
    pub fn open_submission<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        athlete: AthleteId,
        challenge: ChallengeId,
    ) -> Result<Submission, EngineError> {
        with_retry("open_submission", self.config.max_conflict_retries, &mut self.metrics, || {
            let mut tx = store.begin().map_err(Failure::Store)?;
            require_athlete(&tx, athlete)?;
            if tx.challenge(challenge).map_err(Failure::Store)?.is_none() {
                return Err(EngineError::NotFound(format!("challenge {}", challenge)).into());
            }
            if let Some(existing) = tx.submission_for(athlete, challenge).map_err(Failure::Store)? {
                return Ok(existing);
            }

            let mut submission = Submission::new(athlete, challenge);
            tx.insert_submission(&submission).map_err(Failure::Store)?;
            tx.commit().map_err(Failure::Store)?;
            submission.version = 1;
            Ok(submission)
        })
    }

    /// Record a review of a submission and pay any newly earned tiers
    ///
    /// `achieved_value`, when given, replaces the recorded value. An
    /// [`ReviewStatus::Approved`] review grades the recorded value against
    /// the challenge's thresholds for the athlete's division and may raise
    /// the stored tier; any other status leaves the tier untouched. Each
    /// tier is paid at most once per submission, so repeating a review is a
    /// no-op for progression.
    #[tracing::instrument(skip_all, fields(submission = %submission_id, status = %status.as_str()))]
    pub fn grade_submission<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        submission_id: SubmissionId,
        achieved_value: Option<f64>,
        status: ReviewStatus,
    ) -> Result<ReviewOutcome, EngineError> {
        let tables = &self.tables;
        let now = current_timestamp();

        let review = with_retry("grade_submission", self.config.max_conflict_retries, &mut self.metrics, || {
            let mut tx = store.begin().map_err(Failure::Store)?;
            let mut submission = tx
                .submission(submission_id)
                .map_err(Failure::Store)?
                .ok_or_else(|| EngineError::NotFound(format!("submission {}", submission_id)))?;
            let challenge = tx
                .challenge(submission.challenge)
                .map_err(Failure::Store)?
                .ok_or_else(|| EngineError::NotFound(format!("challenge {}", submission.challenge)))?;
            let athlete = require_athlete(&tx, submission.athlete)?;

            if achieved_value.is_some() {
                submission.achieved_value = achieved_value;
            }
            // Only an approved value may move the tier
            let graded = match (status, submission.achieved_value) {
                (ReviewStatus::Approved, Some(value)) => {
                    let grades = tx.grades(challenge.id, athlete.division).map_err(Failure::Store)?;
                    let thresholds: Vec<Threshold> = grades.iter().map(ChallengeGrade::threshold).collect();
                    resolve_tier(value, challenge.grading, &thresholds).map(|tier| challenge.cap_tier(tier))
                }
                _ => None,
            };
            if let Some(tier) = graded {
                submission.achieved_tier = Some(submission.achieved_tier.map_or(tier, |t| t.max(tier)));
            }
            submission.status = status;

            let new_tiers = match (status, submission.achieved_tier) {
                (ReviewStatus::Approved, Some(tier)) => {
                    claim_new_tiers(tier, challenge.min_tier, &submission.claimed_tiers)
                }
                _ => Vec::new(),
            };

            let mut base = 0;
            let mut awards = Vec::new();
            if !new_tiers.is_empty() {
                base = base_reward(&new_tiers, tables);
                let source_ref = submission.id.to_string();
                for (domain, amount) in split_reward(base, &challenge.split) {
                    let request = AwardRequest::new(submission.athlete, domain, amount, XpSource::ChallengeCompletion)
                        .with_source_ref(source_ref.clone());
                    let outcome = credit(&mut tx, tables, &request, now)?;
                    submission.xp_awarded += amount;
                    awards.push(DomainAward { domain, amount, outcome });
                }
                submission.claimed_tiers = submission.claimed_tiers.union(&new_tiers);
            }

            submission.version = tx.save_submission(&submission).map_err(Failure::Store)?;
            tx.commit().map_err(Failure::Store)?;

            Ok(ReviewOutcome {
                submission: submission.id,
                athlete: submission.athlete,
                status,
                achieved_tier: submission.achieved_tier,
                new_tiers,
                base_reward: base,
                awards,
            })
        })?;

        self.metrics.record_review(review.new_tiers.len());
        if review.new_tiers.is_empty() {
            tracing::debug!(achieved_tier = ?review.achieved_tier, "review paid no new tiers");
        } else {
            tracing::info!(
                tiers = review.new_tiers.len(),
                base_reward = review.base_reward,
                "review paid new tiers"
            );
            self.dispatch(ProgressionEvent::TiersClaimed {
                submission: review.submission,
                athlete: review.athlete,
                tiers: review.new_tiers.clone(),
                base_reward: review.base_reward,
            });
        }
        for award in &review.awards {
            self.after_award(review.athlete, award.domain, XpSource::ChallengeCompletion, award.outcome);
        }

        Ok(review)
    }

    /// Evaluate the breakthrough out of the athlete's current letter
    ///
    /// Returns `None` when no rule governs the transition.
    #[tracing::instrument(skip_all, fields(athlete = %athlete, domain = %domain))]
    pub fn resolve_breakthrough<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        athlete: AthleteId,
        domain: DomainId,
    ) -> Result<Option<BreakthroughStatus>, EngineError> {
        with_retry("resolve_breakthrough", self.config.max_conflict_retries, &mut self.metrics, || {
            let tx = store.begin().map_err(Failure::Store)?;
            let athlete = require_athlete(&tx, athlete)?;
            require_domain(&tx, domain)?;
            let letter = tx
                .progress(athlete.id, domain)
                .map_err(Failure::Store)?
                .map_or(RankLetter::F, |p| p.letter);
            breakthrough_status(&tx, &athlete, domain, letter)
        })
    }

    /// Move a ready, qualifying domain to the next rank letter
    ///
    /// The domain restarts at sublevel 0 of the next letter and its banked XP
    /// is replayed as a fresh award there. No ledger entry is written: the
    /// banked XP was recorded when it was earned.
    #[tracing::instrument(skip_all, fields(athlete = %athlete, domain = %domain))]
    pub fn confirm_breakthrough<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        athlete: AthleteId,
        domain: DomainId,
    ) -> Result<AwardOutcome, EngineError> {
        let tables = &self.tables;

        let outcome = with_retry("confirm_breakthrough", self.config.max_conflict_retries, &mut self.metrics, || {
            let mut tx = store.begin().map_err(Failure::Store)?;
            let athlete = require_athlete(&tx, athlete)?;
            require_domain(&tx, domain)?;

            let mut progress = tx
                .progress(athlete.id, domain)
                .map_err(Failure::Store)?
                .filter(|p| p.breakthrough_ready)
                .ok_or(EngineError::BreakthroughNotReady)?;
            if progress.letter.next().is_none() {
                return Err(EngineError::AtTopRank.into());
            }

            let status = breakthrough_status(&tx, &athlete, domain, progress.letter)?
                .ok_or(EngineError::BreakthroughUnavailable { from: progress.letter })?;
            if !status.satisfied {
                return Err(EngineError::BreakthroughUnsatisfied {
                    qualifying: status.qualifying,
                    required: status.required,
                }
                .into());
            }

            let outcome = advance_letter(&mut progress, tables).ok_or(EngineError::AtTopRank)?;
            tx.save_progress(&progress).map_err(Failure::Store)?;
            tx.commit().map_err(Failure::Store)?;
            Ok(outcome)
        })?;

        self.metrics.record_breakthrough();
        tracing::info!(from = %outcome.previous, to = %outcome.new, "breakthrough confirmed");
        self.dispatch(ProgressionEvent::BreakthroughConfirmed { athlete, domain, outcome });
        Ok(outcome)
    }

    /// Composite level across every domain the athlete has progress in
    pub fn prime_level<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        athlete: AthleteId,
    ) -> Result<Level, EngineError> {
        let rows = self.progress_for(store, athlete)?;
        let levels: Vec<Level> = rows.iter().map(DomainProgress::level).collect();
        Ok(compute_prime(&levels))
    }

    /// Every progress row of an athlete
    pub fn progress_for<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        athlete: AthleteId,
    ) -> Result<Vec<DomainProgress>, EngineError> {
        with_retry("progress_for", self.config.max_conflict_retries, &mut self.metrics, || {
            let tx = store.begin().map_err(Failure::Store)?;
            require_athlete(&tx, athlete)?;
            tx.athlete_progress(athlete).map_err(Failure::Store)
        })
    }

    /// Ledger entries of an athlete, newest first, optionally for one domain
    pub fn ledger_history<S: ProgressionStore>(
        &mut self,
        store: &mut S,
        athlete: AthleteId,
        domain: Option<DomainId>,
    ) -> Result<Vec<XpLedgerEntry>, EngineError> {
        with_retry("ledger_history", self.config.max_conflict_retries, &mut self.metrics, || {
            let tx = store.begin().map_err(Failure::Store)?;
            require_athlete(&tx, athlete)?;
            tx.ledger(athlete, domain).map_err(Failure::Store)
        })
    }

    fn after_award(&mut self, athlete: AthleteId, domain: DomainId, source: XpSource, outcome: AwardOutcome) {
        self.metrics.record_award(source, domain, outcome.amount, outcome.leveled_up);
        tracing::info!(
            athlete = %athlete,
            domain = %domain,
            source = %source,
            amount = outcome.amount,
            from = %outcome.previous,
            to = %outcome.new,
            breakthrough_ready = outcome.breakthrough_ready,
            "xp awarded"
        );
        self.dispatch(ProgressionEvent::XpAwarded { athlete, domain, source, outcome });
    }

    fn dispatch(&mut self, event: ProgressionEvent) {
        if let Err(error) = self.sink.dispatch(&event) {
            self.metrics.record_dispatch_failure();
            tracing::warn!(%error, ?event, "event dispatch failed");
        }
    }
}

fn require_athlete<T: ProgressionTx>(tx: &T, id: AthleteId) -> Result<Athlete, Failure<T::Error>> {
    tx.athlete(id)
        .map_err(Failure::Store)?
        .ok_or_else(|| EngineError::NotFound(format!("athlete {}", id)).into())
}

fn require_domain<T: ProgressionTx>(tx: &T, id: DomainId) -> Result<(), Failure<T::Error>> {
    if tx.domain_exists(id).map_err(Failure::Store)? {
        Ok(())
    } else {
        Err(EngineError::NotFound(format!("domain {}", id)).into())
    }
}

/// Append the ledger entry and apply the award inside `tx`
fn credit<T: ProgressionTx>(
    tx: &mut T,
    tables: &RankTables,
    request: &AwardRequest,
    now: u64,
) -> Result<AwardOutcome, Failure<T::Error>> {
    let mut progress = tx
        .progress(request.athlete, request.domain)
        .map_err(Failure::Store)?
        .unwrap_or_else(|| DomainProgress::new(request.athlete, request.domain));

    let mut entry = XpLedgerEntry::new(request.athlete, request.domain, request.amount, request.source, now);
    entry.source_ref = request.source_ref.clone();
    entry.note = request.note.clone();
    tx.append_ledger(&entry).map_err(Failure::Store)?;

    let outcome = apply_award(&mut progress, request.amount, tables);
    tx.save_progress(&progress).map_err(Failure::Store)?;
    Ok(outcome)
}

fn breakthrough_status<T: ProgressionTx>(
    tx: &T,
    athlete: &Athlete,
    domain: DomainId,
    from: RankLetter,
) -> Result<Option<BreakthroughStatus>, Failure<T::Error>> {
    let rules = tx.breakthrough_rules(from).map_err(Failure::Store)?;
    let Some(rule) = select_rule(&rules, domain, athlete.division, from) else {
        tracing::debug!(%from, "no breakthrough rule");
        return Ok(None);
    };
    let completions = tx.completions(athlete.id, domain).map_err(Failure::Store)?;
    Ok(Some(evaluate(rule, &completions)))
}
