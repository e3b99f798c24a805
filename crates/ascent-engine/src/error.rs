//! Error types for progression operations

use ascent_domain::RankLetter;
use thiserror::Error;

/// Errors that can occur during progression operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Referenced athlete, domain, challenge or submission does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concurrent writers kept colliding; safe to retry later
    #[error("Write conflict persisted after {attempts} attempts")]
    Conflict {
        /// Attempts made before giving up
        attempts: u32,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No breakthrough rule governs this transition
    #[error("No breakthrough rule for {from} in this domain")]
    BreakthroughUnavailable {
        /// Letter the athlete is trying to leave
        from: RankLetter,
    },

    /// Domain has not reached its rank ceiling
    #[error("Breakthrough not ready: rank ceiling not reached")]
    BreakthroughNotReady,

    /// Rule exists but is not met yet
    #[error("Breakthrough requirement not met: {qualifying}/{required} qualifying challenges")]
    BreakthroughUnsatisfied {
        /// Distinct qualifying challenges
        qualifying: u32,
        /// Count the rule requires
        required: u32,
    },

    /// Already at the top rank letter
    #[error("Already at the top rank")]
    AtTopRank,
}

impl EngineError {
    /// Whether the caller may retry the same request unchanged
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Conflict { .. })
    }
}
