//! Multi-domain reward splitting
//!
//! A challenge credits up to three skill domains. The base reward for newly
//! claimed tiers is divided between them by configured percentages.

use crate::ids::DomainId;
use crate::rank::RankLetter;
use crate::tables::RankTables;

/// One domain's percentage of a challenge reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainShare {
    /// Domain credited
    pub domain: DomainId,

    /// Percentage of the base reward, `0..=100`
    pub percent: u8,
}

impl DomainShare {
    /// Create a share
    pub fn new(domain: DomainId, percent: u8) -> Self {
        Self { domain, percent }
    }
}

/// Domain and percentage configuration of a challenge
///
/// The primary domain is mandatory; secondary and tertiary are optional.
/// Percentages are validated to sum to 100 by the configuration layer
/// ([`DomainSplit::validate`]) before a challenge reaches the reward rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainSplit {
    /// Mandatory primary domain
    pub primary: DomainShare,

    /// Optional secondary domain
    pub secondary: Option<DomainShare>,

    /// Optional tertiary domain
    pub tertiary: Option<DomainShare>,
}

impl DomainSplit {
    /// A split that credits a single domain with the whole reward
    pub fn single(domain: DomainId) -> Self {
        Self {
            primary: DomainShare::new(domain, 100),
            secondary: None,
            tertiary: None,
        }
    }

    /// Add a secondary domain
    pub fn with_secondary(mut self, share: DomainShare) -> Self {
        self.secondary = Some(share);
        self
    }

    /// Add a tertiary domain
    pub fn with_tertiary(mut self, share: DomainShare) -> Self {
        self.tertiary = Some(share);
        self
    }

    /// Configured shares, primary first
    pub fn shares(&self) -> impl Iterator<Item = DomainShare> + '_ {
        std::iter::once(self.primary)
            .chain(self.secondary)
            .chain(self.tertiary)
    }

    /// Whether `domain` receives a non-zero share
    pub fn credits(&self, domain: DomainId) -> bool {
        self.shares().any(|s| s.domain == domain && s.percent > 0)
    }

    /// Configuration-time validation
    ///
    /// The primary share must be non-zero, domains must be distinct and the
    /// percentages must sum to exactly 100.
    pub fn validate(&self) -> Result<(), String> {
        if self.primary.percent == 0 {
            return Err("primary domain must receive a non-zero share".to_string());
        }

        let shares: Vec<DomainShare> = self.shares().collect();
        for (i, a) in shares.iter().enumerate() {
            if shares[i + 1..].iter().any(|b| b.domain == a.domain) {
                return Err(format!("domain {} appears more than once", a.domain));
            }
        }

        let total: u32 = shares.iter().map(|s| u32::from(s.percent)).sum();
        if total != 100 {
            return Err(format!("domain percentages sum to {}, expected 100", total));
        }
        Ok(())
    }
}

/// Sum of fixed per-tier points for `tiers`
pub fn base_reward(tiers: &[RankLetter], tables: &RankTables) -> i64 {
    tiers.iter().map(|tier| tables.tier_points(*tier)).sum()
}

/// Divide `base` between the configured domains
///
/// Each share is `round(base * percent / 100)` computed independently, so the
/// shares may differ from `base` by a rounding remainder. Domains with a zero
/// percentage are omitted and receive no award.
///
/// # Examples
///
/// ```
/// use ascent_domain::{split_reward, DomainId, DomainSplit};
/// use ascent_domain::reward::DomainShare;
///
/// let strength = DomainId::new();
/// let endurance = DomainId::new();
/// let split = DomainSplit {
///     primary: DomainShare::new(strength, 70),
///     secondary: Some(DomainShare::new(endurance, 30)),
///     tertiary: None,
/// };
/// assert_eq!(split_reward(100, &split), vec![(strength, 70), (endurance, 30)]);
/// ```
pub fn split_reward(base: i64, split: &DomainSplit) -> Vec<(DomainId, i64)> {
    split
        .shares()
        .filter(|share| share.percent > 0)
        .map(|share| (share.domain, round_share(base, share.percent)))
        .collect()
}

/// `base * percent / 100`, rounding halves away from zero
fn round_share(base: i64, percent: u8) -> i64 {
    let scaled = i128::from(base) * i128::from(percent);
    let rounded = if scaled >= 0 {
        (scaled + 50) / 100
    } else {
        (scaled - 50) / 100
    };
    rounded as i64
}
