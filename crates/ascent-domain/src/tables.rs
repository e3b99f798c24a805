//! Per-rank constant tables
//!
//! Both tables are keyed by rank letter and must be strictly increasing.
//! They are deployment-time configuration: the engine loads them once and
//! never mutates them at runtime.

use crate::rank::{RankLetter, MAX_SUBLEVEL};

/// XP required to advance one sublevel, per rank letter (F..=S)
pub const XP_PER_SUBLEVEL: [u64; 7] = [100, 150, 225, 340, 500, 750, 1100];

/// Points paid out the first time a tier is claimed, per rank letter (F..=S)
pub const TIER_POINTS: [i64; 7] = [25, 50, 100, 175, 275, 400, 600];

/// Constant tables used by the reward and progression rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTables {
    /// XP cost of a single sublevel, indexed by [`RankLetter::index`]
    pub xp_per_sublevel: [u64; 7],

    /// Reward points for claiming a tier, indexed by [`RankLetter::index`]
    pub tier_points: [i64; 7],
}

impl Default for RankTables {
    fn default() -> Self {
        Self {
            xp_per_sublevel: XP_PER_SUBLEVEL,
            tier_points: TIER_POINTS,
        }
    }
}

impl RankTables {
    /// XP needed per sublevel at `letter`
    pub fn xp_per_sublevel(&self, letter: RankLetter) -> u64 {
        self.xp_per_sublevel[usize::from(letter.index())]
    }

    /// Maximum `current_xp` a progress row can hold at `letter`
    ///
    /// Reaching this value puts the athlete at sublevel 9.
    pub fn ceiling(&self, letter: RankLetter) -> u64 {
        self.xp_per_sublevel(letter) * u64::from(MAX_SUBLEVEL)
    }

    /// Points paid for claiming `tier`
    pub fn tier_points(&self, tier: RankLetter) -> i64 {
        self.tier_points[usize::from(tier.index())]
    }

    /// Check both tables are positive and strictly increasing with rank
    pub fn validate(&self) -> Result<(), String> {
        if self.xp_per_sublevel[0] == 0 {
            return Err("xp_per_sublevel must be positive".to_string());
        }
        if self.tier_points[0] <= 0 {
            return Err("tier_points must be positive".to_string());
        }
        for i in 1..7 {
            if self.xp_per_sublevel[i] <= self.xp_per_sublevel[i - 1] {
                return Err(format!(
                    "xp_per_sublevel must increase with rank ({} <= {})",
                    RankLetter::from_index(i as u8),
                    RankLetter::from_index(i as u8 - 1)
                ));
            }
            if self.tier_points[i] <= self.tier_points[i - 1] {
                return Err(format!(
                    "tier_points must increase with rank ({} <= {})",
                    RankLetter::from_index(i as u8),
                    RankLetter::from_index(i as u8 - 1)
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_valid() {
        assert!(RankTables::default().validate().is_ok());
    }

    #[test]
    fn test_ceiling() {
        let tables = RankTables::default();
        assert_eq!(tables.xp_per_sublevel(RankLetter::F), 100);
        assert_eq!(tables.ceiling(RankLetter::F), 900);
    }

    #[test]
    fn test_rejects_non_increasing_tables() {
        let mut tables = RankTables::default();
        tables.tier_points[3] = tables.tier_points[2];
        let err = tables.validate().unwrap_err();
        assert!(err.contains("tier_points"));

        let mut tables = RankTables::default();
        tables.xp_per_sublevel[0] = 0;
        assert!(tables.validate().is_err());
    }
}
