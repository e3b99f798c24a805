//! Transaction handle implementing [`ProgressionTx`]

use crate::codec::{
    challenge_from_row, completion_from_row, grade_from_row, id_to_bytes, ledger_from_row,
    letter_text, progress_from_row, rule_from_row, submission_from_row, CHALLENGE_COLUMNS,
    LEDGER_COLUMNS, PROGRESS_COLUMNS, SUBMISSION_COLUMNS,
};
use crate::StoreError;
use ascent_domain::traits::ProgressionTx;
use ascent_domain::{
    Athlete, AthleteId, BreakthroughRule, Challenge, ChallengeGrade, ChallengeId, Completion,
    DivisionId, DomainId, DomainProgress, RankLetter, Submission, SubmissionId, XpLedgerEntry,
};
use rusqlite::{params, ErrorCode, OptionalExtension, Transaction};

/// An open `BEGIN IMMEDIATE` transaction
///
/// Dropping it without [`ProgressionTx::commit`] rolls back.
pub struct SqliteTx<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteTx<'conn> {
    pub(crate) fn new(tx: Transaction<'conn>) -> Self {
        Self { tx }
    }
}

impl ProgressionTx for SqliteTx<'_> {
    type Error = StoreError;

    fn athlete(&self, id: AthleteId) -> Result<Option<Athlete>, Self::Error> {
        let division: Option<Option<Vec<u8>>> = self
            .tx
            .query_row(
                "SELECT division_id FROM athletes WHERE id = ?1",
                params![id_to_bytes(id.value())],
                |row| row.get(0),
            )
            .optional()?;

        match division {
            None => Ok(None),
            Some(division) => {
                let division = division
                    .map(|bytes| crate::codec::bytes_to_id(&bytes).map(DivisionId::from_value))
                    .transpose()?;
                Ok(Some(Athlete { id, division }))
            }
        }
    }

    fn domain_exists(&self, id: DomainId) -> Result<bool, Self::Error> {
        let exists = self
            .tx
            .query_row(
                "SELECT 1 FROM domains WHERE id = ?1",
                params![id_to_bytes(id.value())],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    fn challenge(&self, id: ChallengeId) -> Result<Option<Challenge>, Self::Error> {
        let challenge = self
            .tx
            .query_row(
                &format!("SELECT {} FROM challenges WHERE id = ?1", CHALLENGE_COLUMNS),
                params![id_to_bytes(id.value())],
                challenge_from_row,
            )
            .optional()?;
        Ok(challenge)
    }

    fn grades(
        &self,
        challenge: ChallengeId,
        division: Option<DivisionId>,
    ) -> Result<Vec<ChallengeGrade>, Self::Error> {
        let mut stmt = self.tx.prepare(
            "SELECT challenge_id, division_id, tier, target, weight
             FROM challenge_grades WHERE challenge_id = ?1 AND division_id IS ?2",
        )?;
        let grades = stmt
            .query_map(
                params![
                    id_to_bytes(challenge.value()),
                    division.map(|d| id_to_bytes(d.value())),
                ],
                grade_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(grades)
    }

    fn submission(&self, id: SubmissionId) -> Result<Option<Submission>, Self::Error> {
        let submission = self
            .tx
            .query_row(
                &format!("SELECT {} FROM submissions WHERE id = ?1", SUBMISSION_COLUMNS),
                params![id_to_bytes(id.value())],
                submission_from_row,
            )
            .optional()?;
        Ok(submission)
    }

    fn submission_for(
        &self,
        athlete: AthleteId,
        challenge: ChallengeId,
    ) -> Result<Option<Submission>, Self::Error> {
        let submission = self
            .tx
            .query_row(
                &format!(
                    "SELECT {} FROM submissions WHERE athlete_id = ?1 AND challenge_id = ?2",
                    SUBMISSION_COLUMNS
                ),
                params![id_to_bytes(athlete.value()), id_to_bytes(challenge.value())],
                submission_from_row,
            )
            .optional()?;
        Ok(submission)
    }

    fn insert_submission(&mut self, submission: &Submission) -> Result<(), Self::Error> {
        let result = self.tx.execute(
            "INSERT INTO submissions (id, athlete_id, challenge_id, achieved_value, achieved_tier,
                 claimed_tiers, xp_awarded, status, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1)",
            params![
                id_to_bytes(submission.id.value()),
                id_to_bytes(submission.athlete.value()),
                id_to_bytes(submission.challenge.value()),
                submission.achieved_value,
                submission.achieved_tier.map(letter_text),
                submission.claimed_tiers.to_string(),
                submission.xp_awarded,
                submission.status.as_str(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(StoreError::Conflict(format!(
                    "submission for athlete {} on challenge {} already exists",
                    submission.athlete, submission.challenge
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_submission(&mut self, submission: &Submission) -> Result<u64, Self::Error> {
        let updated = self.tx.execute(
            "UPDATE submissions SET achieved_value = ?1, achieved_tier = ?2, claimed_tiers = ?3,
                 xp_awarded = ?4, status = ?5, version = version + 1
             WHERE id = ?6 AND version = ?7",
            params![
                submission.achieved_value,
                submission.achieved_tier.map(letter_text),
                submission.claimed_tiers.to_string(),
                submission.xp_awarded,
                submission.status.as_str(),
                id_to_bytes(submission.id.value()),
                submission.version as i64,
            ],
        )?;

        if updated == 0 {
            if self.submission(submission.id)?.is_none() {
                return Err(StoreError::NotFound(format!("submission {}", submission.id)));
            }
            return Err(StoreError::Conflict(format!(
                "submission {} changed since version {}",
                submission.id, submission.version
            )));
        }
        Ok(submission.version + 1)
    }

    fn progress(
        &self,
        athlete: AthleteId,
        domain: DomainId,
    ) -> Result<Option<DomainProgress>, Self::Error> {
        let progress = self
            .tx
            .query_row(
                &format!(
                    "SELECT {} FROM domain_progress WHERE athlete_id = ?1 AND domain_id = ?2",
                    PROGRESS_COLUMNS
                ),
                params![id_to_bytes(athlete.value()), id_to_bytes(domain.value())],
                progress_from_row,
            )
            .optional()?;
        Ok(progress)
    }

    fn athlete_progress(&self, athlete: AthleteId) -> Result<Vec<DomainProgress>, Self::Error> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {} FROM domain_progress WHERE athlete_id = ?1 ORDER BY domain_id",
            PROGRESS_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![id_to_bytes(athlete.value())], progress_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn save_progress(&mut self, progress: &DomainProgress) -> Result<u64, Self::Error> {
        let athlete = id_to_bytes(progress.athlete.value());
        let domain = id_to_bytes(progress.domain.value());

        if progress.version == 0 {
            let inserted = self.tx.execute(
                "INSERT INTO domain_progress (athlete_id, domain_id, letter, sublevel, current_xp,
                     banked_xp, breakthrough_ready, version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
                 ON CONFLICT(athlete_id, domain_id) DO NOTHING",
                params![
                    athlete,
                    domain,
                    letter_text(progress.letter),
                    i64::from(progress.sublevel),
                    progress.current_xp as i64,
                    progress.banked_xp as i64,
                    progress.breakthrough_ready,
                ],
            )?;
            if inserted == 0 {
                return Err(StoreError::Conflict(format!(
                    "progress for athlete {} in domain {} was created concurrently",
                    progress.athlete, progress.domain
                )));
            }
            return Ok(1);
        }

        let updated = self.tx.execute(
            "UPDATE domain_progress SET letter = ?1, sublevel = ?2, current_xp = ?3,
                 banked_xp = ?4, breakthrough_ready = ?5, version = version + 1
             WHERE athlete_id = ?6 AND domain_id = ?7 AND version = ?8",
            params![
                letter_text(progress.letter),
                i64::from(progress.sublevel),
                progress.current_xp as i64,
                progress.banked_xp as i64,
                progress.breakthrough_ready,
                athlete,
                domain,
                progress.version as i64,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::Conflict(format!(
                "progress for athlete {} in domain {} changed since version {}",
                progress.athlete, progress.domain, progress.version
            )));
        }
        Ok(progress.version + 1)
    }

    fn append_ledger(&mut self, entry: &XpLedgerEntry) -> Result<(), Self::Error> {
        self.tx.execute(
            &format!("INSERT INTO xp_ledger ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)", LEDGER_COLUMNS),
            params![
                id_to_bytes(entry.id.value()),
                id_to_bytes(entry.athlete.value()),
                id_to_bytes(entry.domain.value()),
                entry.amount,
                entry.source.as_str(),
                entry.source_ref,
                entry.note,
                entry.created_at as i64,
            ],
        )?;
        Ok(())
    }

    fn ledger(
        &self,
        athlete: AthleteId,
        domain: Option<DomainId>,
    ) -> Result<Vec<XpLedgerEntry>, Self::Error> {
        let athlete = id_to_bytes(athlete.value());
        let entries = match domain {
            Some(domain) => {
                let mut stmt = self.tx.prepare(&format!(
                    "SELECT {} FROM xp_ledger WHERE athlete_id = ?1 AND domain_id = ?2
                     ORDER BY created_at DESC, id DESC",
                    LEDGER_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![athlete, id_to_bytes(domain.value())], ledger_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.tx.prepare(&format!(
                    "SELECT {} FROM xp_ledger WHERE athlete_id = ?1
                     ORDER BY created_at DESC, id DESC",
                    LEDGER_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![athlete], ledger_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(entries)
    }

    fn breakthrough_rules(&self, from: RankLetter) -> Result<Vec<BreakthroughRule>, Self::Error> {
        let mut stmt = self.tx.prepare(
            "SELECT domain_id, division_id, from_letter, to_letter, required_tier, required_count
             FROM breakthrough_rules WHERE from_letter = ?1",
        )?;
        let rules = stmt
            .query_map(params![letter_text(from)], rule_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    fn completions(
        &self,
        athlete: AthleteId,
        domain: DomainId,
    ) -> Result<Vec<Completion>, Self::Error> {
        let mut stmt = self.tx.prepare(
            "SELECT s.challenge_id, s.achieved_tier
             FROM submissions s JOIN challenges c ON c.id = s.challenge_id
             WHERE s.athlete_id = ?1
               AND s.status = 'approved'
               AND s.achieved_tier IS NOT NULL
               AND ((c.primary_domain = ?2 AND c.primary_pct > 0)
                 OR (c.secondary_domain = ?2 AND c.secondary_pct > 0)
                 OR (c.tertiary_domain = ?2 AND c.tertiary_pct > 0))",
        )?;
        let completions = stmt
            .query_map(
                params![id_to_bytes(athlete.value()), id_to_bytes(domain.value())],
                completion_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    fn commit(self) -> Result<(), Self::Error> {
        self.tx.commit()?;
        Ok(())
    }
}
