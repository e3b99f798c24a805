//! Configuration for progression operations
//!
//! Holds the conflict-retry budget and the per-rank constant tables.

use crate::EngineError;
use ascent_domain::tables::{TIER_POINTS, XP_PER_SUBLEVEL};
use ascent_domain::RankTables;
use serde::{Deserialize, Serialize};

/// Configuration for the progression engine
///
/// The tables are deployment-time constants: they are read once when the
/// engine is built and validated strictly increasing.
///
/// # Examples
///
/// ```
/// use ascent_engine::EngineConfig;
///
/// // Default configuration
/// let config = EngineConfig::default();
/// assert_eq!(config.max_conflict_retries, 3);
///
/// // Fail fast on contention
/// let config = EngineConfig::strict();
/// assert_eq!(config.max_conflict_retries, 0);
///
/// // Ride out heavy contention
/// let config = EngineConfig::patient();
/// assert_eq!(config.max_conflict_retries, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many times a conflicting transaction is retried before the
    /// operation fails with [`EngineError::Conflict`]
    /// Default: 3
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// XP cost of one sublevel per rank letter, F through S
    /// Default: 100, 150, 225, 340, 500, 750, 1100
    #[serde(default = "default_xp_per_sublevel")]
    pub xp_per_sublevel: [u64; 7],

    /// Reward points per claimed tier, F through S
    /// Default: 25, 50, 100, 175, 275, 400, 600
    #[serde(default = "default_tier_points")]
    pub tier_points: [i64; 7],
}

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_xp_per_sublevel() -> [u64; 7] {
    XP_PER_SUBLEVEL
}

fn default_tier_points() -> [i64; 7] {
    TIER_POINTS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: default_max_conflict_retries(),
            xp_per_sublevel: XP_PER_SUBLEVEL,
            tier_points: TIER_POINTS,
        }
    }
}

impl EngineConfig {
    /// No retries: the first conflict is reported to the caller
    pub fn strict() -> Self {
        Self {
            max_conflict_retries: 0,
            ..Self::default()
        }
    }

    /// Generous retry budget for many concurrent writers on one database
    pub fn patient() -> Self {
        Self {
            max_conflict_retries: 10,
            ..Self::default()
        }
    }

    /// Constant tables as used by the domain rules
    pub fn tables(&self) -> RankTables {
        RankTables {
            xp_per_sublevel: self.xp_per_sublevel,
            tier_points: self.tier_points,
        }
    }

    /// Reject tables that are not positive and strictly increasing
    pub fn validate(&self) -> Result<(), EngineError> {
        self.tables().validate().map_err(EngineError::Config)
    }
}
