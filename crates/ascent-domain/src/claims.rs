//! Tier-claim ledger
//!
//! Each (athlete, challenge) pair keeps the set of tiers that have already
//! triggered a payout. This set is the idempotency boundary for rewards:
//! re-grading or a duplicate review never pays the same tier twice.

use crate::rank::RankLetter;
use std::fmt;

/// Ordered, deduplicated set of claimed tiers
///
/// Stored compactly as a string of letters in ascending rank order
/// (e.g. `"FED"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ClaimedTiers(Vec<RankLetter>);

impl ClaimedTiers {
    /// Empty claim set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalized set from any sequence of letters
    pub fn from_letters<I: IntoIterator<Item = RankLetter>>(letters: I) -> Self {
        let mut tiers: Vec<RankLetter> = letters.into_iter().collect();
        tiers.sort();
        tiers.dedup();
        Self(tiers)
    }

    /// Parse the compact storage form
    pub fn parse(s: &str) -> Result<Self, String> {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| RankLetter::from_char(c).ok_or_else(|| format!("Invalid claimed tier: {}", c)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_letters)
    }

    /// Whether `tier` has already been paid out
    pub fn contains(&self, tier: RankLetter) -> bool {
        self.0.binary_search(&tier).is_ok()
    }

    /// Claimed tiers in ascending order
    pub fn letters(&self) -> &[RankLetter] {
        &self.0
    }

    /// Number of claimed tiers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union with newly claimed tiers, normalized to ascending order
    pub fn union(&self, tiers: &[RankLetter]) -> Self {
        Self::from_letters(self.0.iter().chain(tiers.iter()).copied())
    }
}

impl fmt::Display for ClaimedTiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for letter in &self.0 {
            write!(f, "{}", letter)?;
        }
        Ok(())
    }
}

/// Tiers in `[min_tier..=achieved]` that have not been claimed yet
///
/// Returned in ascending rank order. An achieved tier below the challenge's
/// minimum yields nothing.
///
/// # Examples
///
/// ```
/// use ascent_domain::{claim_new_tiers, ClaimedTiers, RankLetter};
///
/// let claimed = ClaimedTiers::from_letters([RankLetter::F, RankLetter::E]);
/// let new = claim_new_tiers(RankLetter::D, RankLetter::F, &claimed);
/// assert_eq!(new, vec![RankLetter::D]);
///
/// let claimed = claimed.union(&new);
/// assert!(claim_new_tiers(RankLetter::D, RankLetter::F, &claimed).is_empty());
/// ```
pub fn claim_new_tiers(
    achieved: RankLetter,
    min_tier: RankLetter,
    claimed: &ClaimedTiers,
) -> Vec<RankLetter> {
    RankLetter::range(min_tier, achieved)
        .filter(|tier| !claimed.contains(*tier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_only_unpaid_tiers() {
        let claimed = ClaimedTiers::from_letters([RankLetter::E, RankLetter::F]);
        assert_eq!(
            claim_new_tiers(RankLetter::D, RankLetter::F, &claimed),
            vec![RankLetter::D]
        );
    }

    #[test]
    fn test_second_call_is_empty() {
        let claimed = ClaimedTiers::from_letters([RankLetter::F, RankLetter::E]);
        let first = claim_new_tiers(RankLetter::D, RankLetter::F, &claimed);
        let claimed = claimed.union(&first);
        assert_eq!(claimed.to_string(), "FED");
        assert!(claim_new_tiers(RankLetter::D, RankLetter::F, &claimed).is_empty());
    }

    #[test]
    fn test_first_claim_covers_whole_range() {
        let new = claim_new_tiers(RankLetter::C, RankLetter::E, &ClaimedTiers::new());
        assert_eq!(new, vec![RankLetter::E, RankLetter::D, RankLetter::C]);
    }

    #[test]
    fn test_below_minimum_tier() {
        let new = claim_new_tiers(RankLetter::F, RankLetter::D, &ClaimedTiers::new());
        assert!(new.is_empty());
    }

    #[test]
    fn test_gap_in_claims_is_filled() {
        // An earlier grade at C after a manual E claim leaves F and D unpaid
        let claimed = ClaimedTiers::from_letters([RankLetter::E, RankLetter::C]);
        let new = claim_new_tiers(RankLetter::C, RankLetter::F, &claimed);
        assert_eq!(new, vec![RankLetter::F, RankLetter::D]);
    }

    #[test]
    fn test_parse_normalizes() {
        let claimed = ClaimedTiers::parse("d,f,E,F").unwrap();
        assert_eq!(claimed.letters(), &[RankLetter::F, RankLetter::E, RankLetter::D]);
        assert_eq!(ClaimedTiers::parse("").unwrap(), ClaimedTiers::new());
        assert!(ClaimedTiers::parse("FZ").is_err());
    }
}
