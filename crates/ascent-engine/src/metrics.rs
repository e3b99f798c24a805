//! Metrics collection for progression operations

use ascent_domain::{DomainId, XpSource};
use std::collections::HashMap;

/// Counters collected by a [`crate::ProgressionEngine`]
///
/// Only committed work is counted; retried attempts show up in
/// `conflicts_retried` alone.
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    /// Awards applied per source
    pub awards: HashMap<XpSource, usize>,

    /// Net XP applied per domain
    pub xp_by_domain: HashMap<DomainId, i64>,

    /// Awards that raised a sublevel
    pub level_ups: usize,

    /// Submissions reviewed
    pub reviews: usize,

    /// Tiers paid out across all reviews
    pub tiers_claimed: usize,

    /// Breakthroughs confirmed
    pub breakthroughs: usize,

    /// Transactions retried after a write conflict
    pub conflicts_retried: usize,

    /// Events the sink failed to deliver
    pub dispatch_failures: usize,
}

impl EngineMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one applied award
    pub fn record_award(&mut self, source: XpSource, domain: DomainId, amount: i64, leveled_up: bool) {
        *self.awards.entry(source).or_insert(0) += 1;
        let total = self.xp_by_domain.entry(domain).or_insert(0);
        *total = total.saturating_add(amount);
        if leveled_up {
            self.level_ups += 1;
        }
    }

    /// Record a reviewed submission and the tiers it paid
    pub fn record_review(&mut self, tiers: usize) {
        self.reviews += 1;
        self.tiers_claimed += tiers;
    }

    /// Record a confirmed breakthrough
    pub fn record_breakthrough(&mut self) {
        self.breakthroughs += 1;
    }

    /// Record a retried transaction
    pub fn record_conflict_retry(&mut self) {
        self.conflicts_retried += 1;
    }

    /// Record an undelivered event
    pub fn record_dispatch_failure(&mut self) {
        self.dispatch_failures += 1;
    }

    /// Total awards across all sources
    pub fn total_awards(&self) -> usize {
        self.awards.values().sum()
    }

    /// Net XP across all domains
    pub fn total_xp(&self) -> i64 {
        self.xp_by_domain.values().fold(0, |acc, &xp| acc.saturating_add(xp))
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Progression Metrics Summary".to_string(),
            "===========================".to_string(),
            format!("Awards: {}", self.total_awards()),
            format!("XP applied: {}", self.total_xp()),
            format!("Level ups: {}", self.level_ups),
            format!("Reviews: {} ({} tiers claimed)", self.reviews, self.tiers_claimed),
            format!("Breakthroughs: {}", self.breakthroughs),
            format!("Conflicts retried: {}", self.conflicts_retried),
            format!("Dispatch failures: {}", self.dispatch_failures),
        ];

        if !self.awards.is_empty() {
            lines.push(String::new());
            lines.push("Awards by source:".to_string());
            let mut sources: Vec<_> = self.awards.iter().collect();
            sources.sort_by_key(|(source, _)| source.as_str());
            for (source, count) in sources {
                lines.push(format!("  {}: {}", source, count));
            }
        }

        lines.join("\n")
    }
}
