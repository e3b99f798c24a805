//! Ascent Storage Layer
//!
//! Implements the [`ProgressionStore`] trait on SQLite.
//!
//! # Architecture
//!
//! - One [`SqliteStore`] wraps one connection
//! - [`ProgressionStore::begin`] opens a `BEGIN IMMEDIATE` transaction, so the
//!   write lock is taken up front and concurrent writers queue behind it
//!   (up to the busy timeout) instead of interleaving read-modify-write cycles
//! - Progress and submission rows carry a `version`; saves that find a
//!   different version fail with [`StoreError::Conflict`]
//! - Reference data (domains, athletes, challenges, grades, rules) is written
//!   through the `upsert_*` methods, outside the progression transaction API
//!
//! # Examples
//!
//! ```no_run
//! use ascent_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for progression operations
//! ```

#![warn(missing_docs)]

mod codec;
mod transaction;

pub use transaction::SqliteTx;

use ascent_domain::traits::{ProgressionStore, StoreFailure};
use ascent_domain::{
    Athlete, BreakthroughRule, Challenge, ChallengeGrade, Domain, RuleScope,
};
use codec::{id_to_bytes, letter_text, opt_id_to_bytes};
use rusqlite::{params, Connection, ErrorCode, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default time a writer waits for the database lock
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Row changed since it was read
    #[error("Write conflict: {0}")]
    Conflict(String),
}

impl StoreFailure for StoreError {
    fn is_conflict(&self) -> bool {
        match self {
            StoreError::Conflict(_) => true,
            StoreError::Database(e) => matches!(
                e.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            StoreError::NotFound(_) | StoreError::InvalidData(_) => false,
        }
    }
}

/// SQLite-based implementation of [`ProgressionStore`]
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should open its own
/// SqliteStore on the same database file; the immediate transactions
/// serialize their writes.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a store at `path` with the default busy timeout
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_busy_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open a store at `path`, waiting up to `timeout` for the write lock
    pub fn with_busy_timeout<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "opened progression store");

        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Insert or rename a domain
    pub fn upsert_domain(&mut self, domain: &Domain) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO domains (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![id_to_bytes(domain.id.value()), &domain.name],
        )?;
        Ok(())
    }

    /// List every domain, ordered by name
    pub fn domains(&self) -> Result<Vec<Domain>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM domains ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| {
                let bytes: Vec<u8> = row.get(0)?;
                Ok((bytes, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(bytes, name)| {
                Ok(Domain {
                    id: ascent_domain::DomainId::from_value(codec::bytes_to_id(&bytes)?),
                    name,
                })
            })
            .collect()
    }

    /// Insert an athlete or change their division
    pub fn upsert_athlete(&mut self, athlete: &Athlete) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO athletes (id, division_id) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET division_id = excluded.division_id",
            params![
                id_to_bytes(athlete.id.value()),
                opt_id_to_bytes(athlete.division.map(|d| d.value())),
            ],
        )?;
        Ok(())
    }

    /// Insert or replace a challenge's grading configuration
    ///
    /// The configuration is validated first; invalid challenges are rejected
    /// with [`StoreError::InvalidData`].
    pub fn upsert_challenge(&mut self, challenge: &Challenge) -> Result<(), StoreError> {
        challenge.validate().map_err(StoreError::InvalidData)?;

        let split = &challenge.split;
        self.conn.execute(
            "INSERT INTO challenges (id, name, grading, min_tier, max_tier,
                 primary_domain, primary_pct, secondary_domain, secondary_pct,
                 tertiary_domain, tertiary_pct)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name, grading = excluded.grading,
                 min_tier = excluded.min_tier, max_tier = excluded.max_tier,
                 primary_domain = excluded.primary_domain, primary_pct = excluded.primary_pct,
                 secondary_domain = excluded.secondary_domain, secondary_pct = excluded.secondary_pct,
                 tertiary_domain = excluded.tertiary_domain, tertiary_pct = excluded.tertiary_pct",
            params![
                id_to_bytes(challenge.id.value()),
                &challenge.name,
                challenge.grading.as_str(),
                letter_text(challenge.min_tier),
                letter_text(challenge.max_tier),
                id_to_bytes(split.primary.domain.value()),
                i64::from(split.primary.percent),
                opt_id_to_bytes(split.secondary.map(|s| s.domain.value())),
                split.secondary.map(|s| i64::from(s.percent)),
                opt_id_to_bytes(split.tertiary.map(|s| s.domain.value())),
                split.tertiary.map(|s| i64::from(s.percent)),
            ],
        )?;
        Ok(())
    }

    /// Insert or replace the target for one (challenge, division, tier)
    pub fn upsert_grade(&mut self, grade: &ChallengeGrade) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO challenge_grades (challenge_id, division_id, tier, target, weight)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id_to_bytes(grade.challenge.value()),
                opt_id_to_bytes(grade.division.map(|d| d.value())),
                letter_text(grade.tier),
                grade.target,
                grade.weight,
            ],
        )?;
        Ok(())
    }

    /// Insert or replace a breakthrough rule
    ///
    /// Rules are keyed by (scope, division, from letter).
    pub fn upsert_breakthrough_rule(&mut self, rule: &BreakthroughRule) -> Result<(), StoreError> {
        if rule.from.next() != Some(rule.to) {
            return Err(StoreError::InvalidData(format!(
                "breakthrough rule must move one letter up, got {} -> {}",
                rule.from, rule.to
            )));
        }

        let domain = match rule.scope {
            RuleScope::Domain(domain) => Some(domain.value()),
            RuleScope::AllDomains => None,
        };
        self.conn.execute(
            "INSERT OR REPLACE INTO breakthrough_rules
                 (domain_id, division_id, from_letter, to_letter, required_tier, required_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                opt_id_to_bytes(domain),
                opt_id_to_bytes(rule.division.map(|d| d.value())),
                letter_text(rule.from),
                letter_text(rule.to),
                letter_text(rule.required_tier),
                i64::from(rule.required_count),
            ],
        )?;
        Ok(())
    }
}

impl ProgressionStore for SqliteStore {
    type Error = StoreError;
    type Tx<'a> = SqliteTx<'a>;

    fn begin(&mut self) -> Result<Self::Tx<'_>, Self::Error> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTx::new(tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_is_conflict() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(StoreError::Database(busy).is_conflict());
        assert!(StoreError::Conflict("progress".into()).is_conflict());
        assert!(!StoreError::NotFound("submission".into()).is_conflict());
    }
}
