//! Import command implementation.

use crate::cli::ImportArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use ascent_domain::{
    Athlete, AthleteId, BreakthroughRule, Challenge, ChallengeGrade, ChallengeId, DivisionId,
    Domain, DomainId, DomainShare, DomainSplit, GradingType, RankLetter, RuleScope,
};
use ascent_store::SqliteStore;
use serde::Deserialize;
use std::fs;
use std::io::{self, Read};

/// Execute the import command.
pub fn execute_import(args: ImportArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<()> {
    let json_data = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = args.file {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either a file or --stdin".to_string(),
        ));
    };

    let document: ReferenceData = serde_json::from_str(&json_data)?;
    let counts = import_reference_data(store, document)?;
    println!("{}", formatter.success(&counts.to_string()));
    Ok(())
}

/// Number of rows written by one import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportCounts {
    /// Domains upserted
    pub domains: usize,
    /// Athletes upserted
    pub athletes: usize,
    /// Challenges upserted
    pub challenges: usize,
    /// Grade targets upserted
    pub grades: usize,
    /// Breakthrough rules upserted
    pub rules: usize,
}

impl std::fmt::Display for ImportCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} domain(s), {} athlete(s), {} challenge(s), {} grade(s), {} rule(s)",
            self.domains, self.athletes, self.challenges, self.grades, self.rules
        )
    }
}

/// Reference data document.
///
/// Every section is optional; rows are upserted by id, so re-importing the
/// same document is harmless.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    domains: Vec<DomainDef>,
    #[serde(default)]
    athletes: Vec<AthleteDef>,
    #[serde(default)]
    challenges: Vec<ChallengeDef>,
    #[serde(default)]
    breakthrough_rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
struct DomainDef {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AthleteDef {
    id: String,
    #[serde(default)]
    division: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShareDef {
    domain: String,
    percent: u8,
}

#[derive(Debug, Deserialize)]
struct GradeDef {
    tier: String,
    target: f64,
    #[serde(default)]
    division: Option<String>,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChallengeDef {
    id: String,
    name: String,
    grading: String,
    #[serde(default = "default_min_tier")]
    min_tier: String,
    #[serde(default = "default_max_tier")]
    max_tier: String,
    primary: ShareDef,
    #[serde(default)]
    secondary: Option<ShareDef>,
    #[serde(default)]
    tertiary: Option<ShareDef>,
    #[serde(default)]
    grades: Vec<GradeDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    /// Absent means the rule covers every domain
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    division: Option<String>,
    from: String,
    to: String,
    required_tier: String,
    required_count: u32,
}

fn default_min_tier() -> String {
    "F".to_string()
}

fn default_max_tier() -> String {
    "S".to_string()
}

/// Upsert every row of `document` into `store`.
pub fn import_reference_data(store: &mut SqliteStore, document: ReferenceData) -> Result<ImportCounts> {
    let mut counts = ImportCounts::default();

    for def in document.domains {
        store.upsert_domain(&Domain {
            id: parse_id(&def.id, DomainId::from_string)?,
            name: def.name,
        })?;
        counts.domains += 1;
    }

    for def in document.athletes {
        store.upsert_athlete(&Athlete {
            id: parse_id(&def.id, AthleteId::from_string)?,
            division: parse_division(def.division.as_deref())?,
        })?;
        counts.athletes += 1;
    }

    for def in document.challenges {
        let id = parse_id(&def.id, ChallengeId::from_string)?;
        let mut split = DomainSplit {
            primary: parse_share(&def.primary)?,
            secondary: None,
            tertiary: None,
        };
        if let Some(share) = &def.secondary {
            split = split.with_secondary(parse_share(share)?);
        }
        if let Some(share) = &def.tertiary {
            split = split.with_tertiary(parse_share(share)?);
        }

        store.upsert_challenge(&Challenge {
            id,
            name: def.name,
            grading: GradingType::parse(&def.grading)
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown grading type '{}'", def.grading)))?,
            min_tier: parse_letter(&def.min_tier)?,
            max_tier: parse_letter(&def.max_tier)?,
            split,
        })?;
        counts.challenges += 1;

        for grade in def.grades {
            store.upsert_grade(&ChallengeGrade {
                challenge: id,
                division: parse_division(grade.division.as_deref())?,
                tier: parse_letter(&grade.tier)?,
                target: grade.target,
                weight: grade.weight,
            })?;
            counts.grades += 1;
        }
    }

    for def in document.breakthrough_rules {
        let scope = match def.domain.as_deref() {
            Some(domain) => RuleScope::Domain(parse_id(domain, DomainId::from_string)?),
            None => RuleScope::AllDomains,
        };
        store.upsert_breakthrough_rule(&BreakthroughRule {
            scope,
            division: parse_division(def.division.as_deref())?,
            from: parse_letter(&def.from)?,
            to: parse_letter(&def.to)?,
            required_tier: parse_letter(&def.required_tier)?,
            required_count: def.required_count,
        })?;
        counts.rules += 1;
    }

    tracing::info!(
        domains = counts.domains,
        athletes = counts.athletes,
        challenges = counts.challenges,
        grades = counts.grades,
        rules = counts.rules,
        "reference data imported"
    );
    Ok(counts)
}

fn parse_id<T>(input: &str, parse: fn(&str) -> std::result::Result<T, String>) -> Result<T> {
    parse(input).map_err(CliError::InvalidInput)
}

fn parse_division(input: Option<&str>) -> Result<Option<DivisionId>> {
    input.map(|s| parse_id(s, DivisionId::from_string)).transpose()
}

fn parse_letter(input: &str) -> Result<RankLetter> {
    RankLetter::parse(input)
        .ok_or_else(|| CliError::InvalidInput(format!("Invalid rank letter '{}'", input)))
}

fn parse_share(def: &ShareDef) -> Result<DomainShare> {
    Ok(DomainShare::new(parse_id(&def.domain, DomainId::from_string)?, def.percent))
}
