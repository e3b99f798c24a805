//! XP ledger - append-only audit trail of every award

use crate::ids::{AthleteId, DomainId, LedgerEntryId};
use std::fmt;

/// What caused an XP award
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XpSource {
    /// Newly claimed tiers on an approved submission
    ChallengeCompletion,
    /// Logged training session
    Training,
    /// Competition placement
    Competition,
    /// Event participation
    Event,
    /// Promotional or discretionary bonus
    Bonus,
    /// Manual administrative adjustment (may be negative)
    Admin,
}

impl XpSource {
    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::ChallengeCompletion => "challenge_completion",
            XpSource::Training => "training",
            XpSource::Competition => "competition",
            XpSource::Event => "event",
            XpSource::Bonus => "bonus",
            XpSource::Admin => "admin",
        }
    }

    /// Parse a source from its storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "challenge_completion" => Some(XpSource::ChallengeCompletion),
            "training" => Some(XpSource::Training),
            "competition" => Some(XpSource::Competition),
            "event" => Some(XpSource::Event),
            "bonus" => Some(XpSource::Bonus),
            "admin" => Some(XpSource::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for XpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for XpSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid XP source: {}", s))
    }
}

/// Immutable record of one award
///
/// The ledger records intent: an entry is appended for every award even when
/// the progress update it accompanies turns out to be a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct XpLedgerEntry {
    /// Unique identifier
    pub id: LedgerEntryId,

    /// Athlete credited
    pub athlete: AthleteId,

    /// Domain credited
    pub domain: DomainId,

    /// Signed amount awarded
    pub amount: i64,

    /// Kind of source
    pub source: XpSource,

    /// Optional reference to the source record (e.g. a submission id)
    pub source_ref: Option<String>,

    /// Optional free-text note
    pub note: Option<String>,

    /// When the award was recorded (seconds since Unix epoch)
    pub created_at: u64,
}

impl XpLedgerEntry {
    /// Create a new entry
    pub fn new(
        athlete: AthleteId,
        domain: DomainId,
        amount: i64,
        source: XpSource,
        created_at: u64,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            athlete,
            domain,
            amount,
            source,
            source_ref: None,
            note: None,
            created_at,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_names() {
        for source in [
            XpSource::ChallengeCompletion,
            XpSource::Training,
            XpSource::Competition,
            XpSource::Event,
            XpSource::Bonus,
            XpSource::Admin,
        ] {
            assert_eq!(XpSource::parse(source.as_str()), Some(source));
        }
        assert_eq!(XpSource::parse("ADMIN"), Some(XpSource::Admin));
        assert!("referral".parse::<XpSource>().is_err());
    }

    #[test]
    fn test_entry_builders() {
        let entry = XpLedgerEntry::new(AthleteId::new(), DomainId::new(), -20, XpSource::Admin, 1000)
            .with_source_ref("ticket-17")
            .with_note("duplicate upload");
        assert_eq!(entry.amount, -20);
        assert_eq!(entry.source_ref.as_deref(), Some("ticket-17"));
        assert_eq!(entry.note.as_deref(), Some("duplicate upload"));
    }
}
