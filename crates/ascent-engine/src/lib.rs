//! Ascent Engine
//!
//! Transactional orchestration of the progression rules in `ascent-domain`.
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Awards**: appending a ledger entry and advancing one domain's progress
//! - **Reviews**: grading a submission, claiming unpaid tiers, splitting the
//!   reward across the challenge's domains
//! - **Breakthroughs**: evaluating and confirming the move to the next letter
//! - **Read models**: prime level, progress rows, ledger history
//!
//! # Architecture
//!
//! Every operation opens one transaction on the injected
//! [`ProgressionStore`](ascent_domain::traits::ProgressionStore), so the ledger
//! append and the progress update commit together or not at all. Write
//! conflicts are retried a bounded number of times. Events go to the
//! [`EventSink`](ascent_domain::traits::EventSink) after commit; a failing
//! sink is logged and never undoes the change.
//!
//! | Operation | Writes | Event |
//! |-----------|--------|-------|
//! | `award_xp` | ledger, progress | `XpAwarded` |
//! | `open_submission` | submission | - |
//! | `grade_submission` | submission, ledger, progress | `TiersClaimed`, `XpAwarded` |
//! | `confirm_breakthrough` | progress | `BreakthroughConfirmed` |
//! | `resolve_breakthrough`, `prime_level`, `progress_for`, `ledger_history` | - | - |
//!
//! # Usage
//!
//! ```no_run
//! use ascent_domain::{ReviewStatus, SubmissionId};
//! use ascent_engine::{EngineConfig, ProgressionEngine};
//! use ascent_store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("ascent.db")?;
//! let mut engine = ProgressionEngine::new(EngineConfig::default())?;
//!
//! # let submission = SubmissionId::new();
//! let review = engine.grade_submission(&mut store, submission, Some(42.0), ReviewStatus::Approved)?;
//! println!("paid {:?} for {} points", review.new_tiers, review.base_reward);
//! println!("{}", engine.metrics().summary());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [engine]
//! max_conflict_retries = 3
//! xp_per_sublevel = [100, 150, 225, 340, 500, 750, 1100]
//! tier_points = [25, 50, 100, 175, 275, 400, 600]
//! ```

#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod metrics;
mod retry;

pub use config::EngineConfig;
pub use engine::{AwardRequest, DomainAward, ProgressionEngine, ReviewOutcome};
pub use error::EngineError;
pub use metrics::EngineMetrics;
