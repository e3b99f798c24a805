//! CLI command definitions and argument parsing.

use ascent_domain::{AthleteId, ChallengeId, DomainId, ReviewStatus, SubmissionId, XpSource};
use clap::{Parser, Subcommand};

/// Ascent CLI - Operate the skill progression ledger.
#[derive(Debug, Parser)]
#[command(name = "ascent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Database file (overrides the configured path)
    #[arg(long, global = true, env = "ASCENT_DATABASE")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Award XP to one domain of an athlete
    Award(AwardArgs),

    /// Open (or look up) an athlete's submission for a challenge
    Submit(SubmitArgs),

    /// Review a submission and pay newly earned tiers
    Grade(GradeArgs),

    /// Evaluate or confirm a breakthrough to the next rank letter
    Breakthrough(BreakthroughArgs),

    /// Show an athlete's prime level and per-domain progress
    Prime(AthleteArgs),

    /// Show an athlete's XP ledger
    Ledger(LedgerArgs),

    /// Import reference data (domains, athletes, challenges, rules) from JSON
    Import(ImportArgs),

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments for the award command.
#[derive(Debug, Parser)]
pub struct AwardArgs {
    /// Athlete ID
    pub athlete: AthleteId,

    /// Domain ID
    pub domain: DomainId,

    /// XP amount (negative for corrections)
    #[arg(allow_negative_numbers = true)]
    pub amount: i64,

    /// Source of the award
    #[arg(short, long, value_enum, default_value = "training")]
    pub source: SourceArg,

    /// Id of the originating record
    #[arg(short = 'r', long)]
    pub source_ref: Option<String>,

    /// Free-text note
    #[arg(short, long)]
    pub note: Option<String>,
}

/// Arguments for the submit command.
#[derive(Debug, Parser)]
pub struct SubmitArgs {
    /// Athlete ID
    pub athlete: AthleteId,

    /// Challenge ID
    pub challenge: ChallengeId,
}

/// Arguments for the grade command.
#[derive(Debug, Parser)]
pub struct GradeArgs {
    /// Submission ID
    pub submission: SubmissionId,

    /// Achieved value (reps, seconds, meters, 1 for pass)
    #[arg(short, long, allow_negative_numbers = true)]
    pub value: Option<f64>,

    /// Review status
    #[arg(short, long, value_enum, default_value = "approved")]
    pub status: StatusArg,
}

/// Arguments for the breakthrough command.
#[derive(Debug, Parser)]
pub struct BreakthroughArgs {
    /// Athlete ID
    pub athlete: AthleteId,

    /// Domain ID
    pub domain: DomainId,

    /// Advance to the next letter if the requirement is met
    #[arg(long)]
    pub confirm: bool,
}

/// Arguments naming one athlete.
#[derive(Debug, Parser)]
pub struct AthleteArgs {
    /// Athlete ID
    pub athlete: AthleteId,
}

/// Arguments for the ledger command.
#[derive(Debug, Parser)]
pub struct LedgerArgs {
    /// Athlete ID
    pub athlete: AthleteId,

    /// Only entries for this domain
    #[arg(short, long)]
    pub domain: Option<DomainId>,

    /// Maximum number of entries
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON file with reference data
    pub file: Option<String>,

    /// Read the JSON document from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// XP source argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SourceArg {
    /// Challenge completion
    ChallengeCompletion,
    /// Training session
    Training,
    /// Competition result
    Competition,
    /// Event participation
    Event,
    /// Discretionary bonus
    Bonus,
    /// Administrative correction
    Admin,
}

/// Review status argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatusArg {
    /// Awaiting review
    Pending,
    /// Approved; pays new tiers
    Approved,
    /// Rejected
    Rejected,
    /// Sent back to the athlete
    NeedsRevision,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<SourceArg> for XpSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::ChallengeCompletion => XpSource::ChallengeCompletion,
            SourceArg::Training => XpSource::Training,
            SourceArg::Competition => XpSource::Competition,
            SourceArg::Event => XpSource::Event,
            SourceArg::Bonus => XpSource::Bonus,
            SourceArg::Admin => XpSource::Admin,
        }
    }
}

impl From<StatusArg> for ReviewStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Pending => ReviewStatus::Pending,
            StatusArg::Approved => ReviewStatus::Approved,
            StatusArg::Rejected => ReviewStatus::Rejected,
            StatusArg::NeedsRevision => ReviewStatus::NeedsRevision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATHLETE: &str = "01920000-0000-7000-8000-000000000001";
    const DOMAIN: &str = "01920000-0000-7000-8000-000000000002";

    #[test]
    fn test_award_command() {
        let cli = Cli::parse_from(["ascent", "award", ATHLETE, DOMAIN, "150", "--source", "bonus"]);
        match cli.command {
            Command::Award(args) => {
                assert_eq!(args.amount, 150);
                assert_eq!(args.athlete.to_string(), ATHLETE);
                assert_eq!(XpSource::from(args.source), XpSource::Bonus);
            }
            _ => panic!("Expected Award command"),
        }
    }

    #[test]
    fn test_negative_award() {
        let cli = Cli::parse_from(["ascent", "award", ATHLETE, DOMAIN, "-40", "-s", "admin"]);
        match cli.command {
            Command::Award(args) => assert_eq!(args.amount, -40),
            _ => panic!("Expected Award command"),
        }
    }

    #[test]
    fn test_invalid_id_rejected() {
        let result = Cli::try_parse_from(["ascent", "prime", "not-a-uuid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_grade_defaults_to_approved() {
        let cli = Cli::parse_from(["ascent", "grade", ATHLETE, "--value", "12.5"]);
        match cli.command {
            Command::Grade(args) => {
                assert_eq!(args.value, Some(12.5));
                assert_eq!(ReviewStatus::from(args.status), ReviewStatus::Approved);
            }
            _ => panic!("Expected Grade command"),
        }
    }

    #[test]
    fn test_breakthrough_confirm_flag() {
        let cli = Cli::parse_from(["ascent", "breakthrough", ATHLETE, DOMAIN, "--confirm"]);
        assert!(matches!(cli.command, Command::Breakthrough(BreakthroughArgs { confirm: true, .. })));
    }
}
