//! Column encoding and row mapping
//!
//! Ids are stored as 16-byte big-endian blobs so that byte order matches
//! UUIDv7 chronological order. Enum values use their domain storage names.

use crate::StoreError;
use ascent_domain::reward::DomainShare;
use ascent_domain::{
    AthleteId, BreakthroughRule, Challenge, ChallengeGrade, ChallengeId, ClaimedTiers, Completion,
    DivisionId, DomainId, DomainProgress, DomainSplit, GradingType, LedgerEntryId, RankLetter,
    ReviewStatus, RuleScope, Submission, SubmissionId, XpLedgerEntry, XpSource,
};
use rusqlite::types::Type;
use rusqlite::Row;

/// Convert a raw id value to its blob form
pub(crate) fn id_to_bytes(value: u128) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Optional id to blob
pub(crate) fn opt_id_to_bytes(value: Option<u128>) -> Option<Vec<u8>> {
    value.map(id_to_bytes)
}

/// Convert a blob back to a raw id value
pub(crate) fn bytes_to_id(bytes: &[u8]) -> Result<u128, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for id, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(u128::from_be_bytes(arr))
}

fn conversion_failure(idx: usize, ty: Type, err: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

fn id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u128> {
    let bytes: Vec<u8> = row.get(idx)?;
    bytes_to_id(&bytes).map_err(|e| conversion_failure(idx, Type::Blob, e))
}

fn opt_id_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u128>> {
    let bytes: Option<Vec<u8>> = row.get(idx)?;
    bytes
        .map(|b| bytes_to_id(&b).map_err(|e| conversion_failure(idx, Type::Blob, e)))
        .transpose()
}

fn text_column<T>(
    row: &Row<'_>,
    idx: usize,
    what: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    parse(&text).ok_or_else(|| {
        conversion_failure(
            idx,
            Type::Text,
            StoreError::InvalidData(format!("Unknown {}: {}", what, text)),
        )
    })
}

fn letter_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<RankLetter> {
    text_column(row, idx, "rank letter", RankLetter::parse)
}

fn opt_letter_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<RankLetter>> {
    let text: Option<String> = row.get(idx)?;
    match text {
        None => Ok(None),
        Some(text) => RankLetter::parse(&text).map(Some).ok_or_else(|| {
            conversion_failure(
                idx,
                Type::Text,
                StoreError::InvalidData(format!("Unknown rank letter: {}", text)),
            )
        }),
    }
}

fn share_columns(
    row: &Row<'_>,
    domain_idx: usize,
    pct_idx: usize,
) -> rusqlite::Result<Option<DomainShare>> {
    let domain = opt_id_column(row, domain_idx)?;
    let pct: Option<i64> = row.get(pct_idx)?;
    Ok(domain.map(|d| DomainShare::new(DomainId::from_value(d), pct.unwrap_or(0).clamp(0, 100) as u8)))
}

/// Columns: id, athlete_id, domain_id, amount, source, source_ref, note, created_at
pub(crate) const LEDGER_COLUMNS: &str =
    "id, athlete_id, domain_id, amount, source, source_ref, note, created_at";

pub(crate) fn ledger_from_row(row: &Row<'_>) -> rusqlite::Result<XpLedgerEntry> {
    Ok(XpLedgerEntry {
        id: LedgerEntryId::from_value(id_column(row, 0)?),
        athlete: AthleteId::from_value(id_column(row, 1)?),
        domain: DomainId::from_value(id_column(row, 2)?),
        amount: row.get(3)?,
        source: text_column(row, 4, "XP source", XpSource::parse)?,
        source_ref: row.get(5)?,
        note: row.get(6)?,
        created_at: row.get::<_, i64>(7)? as u64,
    })
}

/// Columns: athlete_id, domain_id, letter, sublevel, current_xp, banked_xp,
/// breakthrough_ready, version
pub(crate) const PROGRESS_COLUMNS: &str =
    "athlete_id, domain_id, letter, sublevel, current_xp, banked_xp, breakthrough_ready, version";

pub(crate) fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<DomainProgress> {
    Ok(DomainProgress {
        athlete: AthleteId::from_value(id_column(row, 0)?),
        domain: DomainId::from_value(id_column(row, 1)?),
        letter: letter_column(row, 2)?,
        sublevel: row.get::<_, i64>(3)?.clamp(0, 9) as u8,
        current_xp: row.get::<_, i64>(4)? as u64,
        banked_xp: row.get::<_, i64>(5)? as u64,
        breakthrough_ready: row.get(6)?,
        version: row.get::<_, i64>(7)? as u64,
    })
}

/// Columns: id, athlete_id, challenge_id, achieved_value, achieved_tier,
/// claimed_tiers, xp_awarded, status, version
pub(crate) const SUBMISSION_COLUMNS: &str = "id, athlete_id, challenge_id, achieved_value, \
     achieved_tier, claimed_tiers, xp_awarded, status, version";

pub(crate) fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    let claimed: String = row.get(5)?;
    let claimed_tiers = ClaimedTiers::parse(&claimed)
        .map_err(|e| conversion_failure(5, Type::Text, StoreError::InvalidData(e)))?;

    Ok(Submission {
        id: SubmissionId::from_value(id_column(row, 0)?),
        athlete: AthleteId::from_value(id_column(row, 1)?),
        challenge: ChallengeId::from_value(id_column(row, 2)?),
        achieved_value: row.get(3)?,
        achieved_tier: opt_letter_column(row, 4)?,
        claimed_tiers,
        xp_awarded: row.get(6)?,
        status: text_column(row, 7, "review status", ReviewStatus::parse)?,
        version: row.get::<_, i64>(8)? as u64,
    })
}

/// Columns: id, name, grading, min_tier, max_tier, primary_domain,
/// primary_pct, secondary_domain, secondary_pct, tertiary_domain, tertiary_pct
pub(crate) const CHALLENGE_COLUMNS: &str = "id, name, grading, min_tier, max_tier, \
     primary_domain, primary_pct, secondary_domain, secondary_pct, tertiary_domain, tertiary_pct";

pub(crate) fn challenge_from_row(row: &Row<'_>) -> rusqlite::Result<Challenge> {
    let primary = share_columns(row, 5, 6)?.ok_or_else(|| {
        conversion_failure(
            5,
            Type::Blob,
            StoreError::InvalidData("challenge without primary domain".to_string()),
        )
    })?;

    Ok(Challenge {
        id: ChallengeId::from_value(id_column(row, 0)?),
        name: row.get(1)?,
        grading: text_column(row, 2, "grading type", GradingType::parse)?,
        min_tier: letter_column(row, 3)?,
        max_tier: letter_column(row, 4)?,
        split: DomainSplit {
            primary,
            secondary: share_columns(row, 7, 8)?,
            tertiary: share_columns(row, 9, 10)?,
        },
    })
}

/// Columns: challenge_id, division_id, tier, target, weight
pub(crate) fn grade_from_row(row: &Row<'_>) -> rusqlite::Result<ChallengeGrade> {
    Ok(ChallengeGrade {
        challenge: ChallengeId::from_value(id_column(row, 0)?),
        division: opt_id_column(row, 1)?.map(DivisionId::from_value),
        tier: letter_column(row, 2)?,
        target: row.get(3)?,
        weight: row.get(4)?,
    })
}

/// Columns: domain_id, division_id, from_letter, to_letter, required_tier,
/// required_count
pub(crate) fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<BreakthroughRule> {
    let scope = match opt_id_column(row, 0)? {
        Some(domain) => RuleScope::Domain(DomainId::from_value(domain)),
        None => RuleScope::AllDomains,
    };
    Ok(BreakthroughRule {
        scope,
        division: opt_id_column(row, 1)?.map(DivisionId::from_value),
        from: letter_column(row, 2)?,
        to: letter_column(row, 3)?,
        required_tier: letter_column(row, 4)?,
        required_count: row.get::<_, i64>(5)?.max(0) as u32,
    })
}

/// Columns: challenge_id, achieved_tier
pub(crate) fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<Completion> {
    Ok(Completion {
        challenge: ChallengeId::from_value(id_column(row, 0)?),
        tier: letter_column(row, 1)?,
    })
}

/// Single-letter storage form
pub(crate) fn letter_text(letter: RankLetter) -> String {
    letter.as_char().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_bytes_roundtrip() {
        let value = 0x0190_1234_5678_7abc_8def_0123_4567_89abu128;
        let bytes = id_to_bytes(value);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes_to_id(&bytes).unwrap(), value);
    }

    #[test]
    fn test_bytes_preserve_order() {
        assert!(id_to_bytes(1) < id_to_bytes(256));
        assert!(id_to_bytes(u128::MAX - 1) < id_to_bytes(u128::MAX));
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        assert!(matches!(bytes_to_id(&[0u8; 8]), Err(StoreError::InvalidData(_))));
    }
}
