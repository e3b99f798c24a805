//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use ascent_domain::{
    AwardOutcome, BreakthroughStatus, DomainId, DomainProgress, Level, Submission, XpLedgerEntry,
};
use ascent_engine::ReviewOutcome;
use colored::*;
use std::collections::HashMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of an award.
    pub fn format_award(&self, outcome: &AwardOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&award_json(outcome))?),
            OutputFormat::Quiet => Ok(outcome.new.to_string()),
            OutputFormat::Table => {
                let mut message = format!("{:+} XP: {} -> {}", outcome.amount, outcome.previous, outcome.new);
                if outcome.banked_delta != 0 {
                    message.push_str(&format!(" ({:+} banked)", outcome.banked_delta));
                }
                let mut lines = vec![self.success(&message)];
                if outcome.breakthrough_ready {
                    lines.push(self.info("Rank ceiling reached: breakthrough ready"));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a submission.
    pub fn format_submission(&self, submission: &Submission) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "id": submission.id.to_string(),
                "athlete": submission.athlete.to_string(),
                "challenge": submission.challenge.to_string(),
                "achieved_value": submission.achieved_value,
                "achieved_tier": submission.achieved_tier.map(|t| t.to_string()),
                "claimed_tiers": submission.claimed_tiers.to_string(),
                "xp_awarded": submission.xp_awarded,
                "status": submission.status.as_str(),
            }))?),
            OutputFormat::Quiet => Ok(submission.id.to_string()),
            OutputFormat::Table => Ok(self.success(&format!(
                "Submission {} ({}, claimed: {})",
                submission.id,
                submission.status.as_str(),
                display_claimed(&submission.claimed_tiers.to_string())
            ))),
        }
    }

    /// Format the result of a review.
    pub fn format_review(&self, review: &ReviewOutcome) -> Result<String> {
        let tiers: String = review.new_tiers.iter().map(|t| t.as_char()).collect();
        match self.format {
            OutputFormat::Json => {
                let awards: Vec<serde_json::Value> = review
                    .awards
                    .iter()
                    .map(|a| {
                        serde_json::json!({
                            "domain": a.domain.to_string(),
                            "amount": a.amount,
                            "outcome": award_json(&a.outcome),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "submission": review.submission.to_string(),
                    "status": review.status.as_str(),
                    "achieved_tier": review.achieved_tier.map(|t| t.to_string()),
                    "new_tiers": tiers,
                    "base_reward": review.base_reward,
                    "awards": awards,
                }))?)
            }
            OutputFormat::Quiet => Ok(tiers),
            OutputFormat::Table => {
                let achieved = review
                    .achieved_tier
                    .map_or_else(|| "none".to_string(), |t| t.to_string());
                if review.new_tiers.is_empty() {
                    return Ok(self.info(&format!(
                        "Reviewed as {} (tier {}); no new tiers",
                        review.status.as_str(),
                        achieved
                    )));
                }

                let mut builder = Builder::default();
                builder.push_record(["Domain", "XP", "From", "To", "Ready"]);
                for award in &review.awards {
                    builder.push_record([
                        short_id(&award.domain.to_string()),
                        award.amount.to_string(),
                        award.outcome.previous.to_string(),
                        award.outcome.new.to_string(),
                        yes_no(award.outcome.breakthrough_ready),
                    ]);
                }
                Ok(format!(
                    "{}\n{}",
                    self.success(&format!(
                        "Tier {} reached; paid {} for {} points",
                        achieved, tiers, review.base_reward
                    )),
                    self.table(builder)
                ))
            }
        }
    }

    /// Format a breakthrough evaluation.
    pub fn format_breakthrough(&self, status: Option<&BreakthroughStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&match status {
                None => serde_json::json!({ "available": false }),
                Some(s) => serde_json::json!({
                    "available": true,
                    "from": s.rule.from.to_string(),
                    "to": s.rule.to.to_string(),
                    "required_tier": s.rule.required_tier.to_string(),
                    "qualifying": s.qualifying,
                    "required": s.required,
                    "satisfied": s.satisfied,
                }),
            })?),
            OutputFormat::Quiet => Ok(status.map_or("unavailable", |s| if s.satisfied { "satisfied" } else { "unsatisfied" }).to_string()),
            OutputFormat::Table => match status {
                None => Ok(self.warning("No breakthrough rule for this transition")),
                Some(s) => {
                    let message = format!(
                        "{} -> {}: {}/{} challenges at tier {} or better",
                        s.rule.from, s.rule.to, s.qualifying, s.required, s.rule.required_tier
                    );
                    Ok(if s.satisfied { self.success(&message) } else { self.warning(&message) })
                }
            },
        }
    }

    /// Format an athlete's prime level and per-domain progress.
    pub fn format_progress(
        &self,
        prime: Level,
        rows: &[DomainProgress],
        names: &HashMap<DomainId, String>,
    ) -> Result<String> {
        let name_of = |id: DomainId| names.get(&id).cloned().unwrap_or_else(|| short_id(&id.to_string()));
        match self.format {
            OutputFormat::Json => {
                let domains: Vec<serde_json::Value> = rows
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "domain": p.domain.to_string(),
                            "name": name_of(p.domain),
                            "level": p.level().to_string(),
                            "ordinal": p.level().ordinal(),
                            "current_xp": p.current_xp,
                            "banked_xp": p.banked_xp,
                            "breakthrough_ready": p.breakthrough_ready,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "prime": prime.to_string(),
                    "domains": domains,
                }))?)
            }
            OutputFormat::Quiet => Ok(prime.to_string()),
            OutputFormat::Table => {
                let header = self.colorize(&format!("Prime level: {}", prime), "cyan");
                if rows.is_empty() {
                    return Ok(format!("{}\n{}", header, self.colorize("No progress yet.", "yellow")));
                }

                let mut builder = Builder::default();
                builder.push_record(["Domain", "Level", "XP", "Banked", "Ready"]);
                for p in rows {
                    builder.push_record([
                        name_of(p.domain),
                        p.level().to_string(),
                        p.current_xp.to_string(),
                        p.banked_xp.to_string(),
                        yes_no(p.breakthrough_ready),
                    ]);
                }
                Ok(format!("{}\n{}", header, self.table(builder)))
            }
        }
    }

    /// Format ledger entries.
    pub fn format_ledger(&self, entries: &[XpLedgerEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "id": e.id.to_string(),
                            "domain": e.domain.to_string(),
                            "amount": e.amount,
                            "source": e.source.as_str(),
                            "source_ref": e.source_ref,
                            "note": e.note,
                            "created_at": e.created_at,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Quiet => {
                let ids: Vec<String> = entries.iter().map(|e| e.id.to_string()).collect();
                Ok(ids.join("\n"))
            }
            OutputFormat::Table => {
                if entries.is_empty() {
                    return Ok(self.colorize("No ledger entries found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Domain", "Amount", "Source", "Ref", "Note", "At"]);
                for e in entries {
                    builder.push_record([
                        short_id(&e.id.to_string()),
                        short_id(&e.domain.to_string()),
                        format!("{:+}", e.amount),
                        e.source.to_string(),
                        e.source_ref.clone().unwrap_or_default(),
                        e.note.clone().unwrap_or_default(),
                        e.created_at.to_string(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn award_json(outcome: &AwardOutcome) -> serde_json::Value {
    serde_json::json!({
        "amount": outcome.amount,
        "previous": outcome.previous.to_string(),
        "new": outcome.new.to_string(),
        "leveled_up": outcome.leveled_up,
        "breakthrough_ready": outcome.breakthrough_ready,
        "banked_delta": outcome.banked_delta,
    })
}

/// Truncate an id for readability.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

fn display_claimed(claimed: &str) -> &str {
    if claimed.is_empty() {
        "none"
    } else {
        claimed
    }
}
