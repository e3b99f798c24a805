//! Integration tests for ascent-store
//!
//! These tests exercise the transaction API and reference-data upserts
//! against real SQLite databases.

use ascent_domain::reward::DomainShare;
use ascent_domain::traits::{ProgressionStore, ProgressionTx, StoreFailure};
use ascent_domain::{
    Athlete, AthleteId, BreakthroughRule, Challenge, ChallengeGrade, ChallengeId, ClaimedTiers,
    DivisionId, Domain, DomainId, DomainProgress, DomainSplit, GradingType, RankLetter,
    ReviewStatus, RuleScope, Submission, XpLedgerEntry, XpSource,
};
use ascent_store::{SqliteStore, StoreError};

struct Fixture {
    store: SqliteStore,
    athlete: AthleteId,
    strength: DomainId,
    endurance: DomainId,
    challenge: ChallengeId,
}

fn fixture() -> Fixture {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let athlete = AthleteId::new();
    let strength = DomainId::new();
    let endurance = DomainId::new();
    let challenge = ChallengeId::new();

    store
        .upsert_domain(&Domain { id: strength, name: "Strength".to_string() })
        .unwrap();
    store
        .upsert_domain(&Domain { id: endurance, name: "Endurance".to_string() })
        .unwrap();
    store
        .upsert_athlete(&Athlete { id: athlete, division: None })
        .unwrap();
    store
        .upsert_challenge(&Challenge {
            id: challenge,
            name: "Row 2k".to_string(),
            grading: GradingType::Time,
            min_tier: RankLetter::F,
            max_tier: RankLetter::S,
            split: DomainSplit {
                primary: DomainShare::new(endurance, 70),
                secondary: Some(DomainShare::new(strength, 30)),
                tertiary: None,
            },
        })
        .unwrap();

    Fixture { store, athlete, strength, endurance, challenge }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_domains_listed_by_name() {
    let f = fixture();
    let names: Vec<String> = f.store.domains().unwrap().into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["Endurance".to_string(), "Strength".to_string()]);
}

#[test]
fn test_challenge_roundtrip() {
    let mut f = fixture();
    let tx = f.store.begin().unwrap();
    let challenge = tx.challenge(f.challenge).unwrap().expect("challenge stored");

    assert_eq!(challenge.grading, GradingType::Time);
    assert_eq!(challenge.split.primary, DomainShare::new(f.endurance, 70));
    assert_eq!(challenge.split.secondary, Some(DomainShare::new(f.strength, 30)));
    assert_eq!(challenge.split.tertiary, None);
    assert!(tx.challenge(ChallengeId::new()).unwrap().is_none());
}

#[test]
fn test_invalid_challenge_rejected() {
    let mut f = fixture();
    let result = f.store.upsert_challenge(&Challenge {
        id: ChallengeId::new(),
        name: "Broken".to_string(),
        grading: GradingType::Reps,
        min_tier: RankLetter::F,
        max_tier: RankLetter::S,
        split: DomainSplit {
            primary: DomainShare::new(f.strength, 60),
            secondary: None,
            tertiary: None,
        },
    });
    assert!(matches!(result, Err(StoreError::InvalidData(_))));
}

#[test]
fn test_grades_filtered_by_division() {
    let mut f = fixture();
    let division = DivisionId::new();
    for (tier, target, div) in [
        (RankLetter::F, 600.0, None),
        (RankLetter::E, 540.0, None),
        (RankLetter::F, 660.0, Some(division)),
    ] {
        f.store
            .upsert_grade(&ChallengeGrade {
                challenge: f.challenge,
                division: div,
                tier,
                target,
                weight: None,
            })
            .unwrap();
    }
    // Replacing a grade keeps one row per (challenge, division, tier)
    f.store
        .upsert_grade(&ChallengeGrade {
            challenge: f.challenge,
            division: None,
            tier: RankLetter::E,
            target: 520.0,
            weight: None,
        })
        .unwrap();

    let tx = f.store.begin().unwrap();
    let default = tx.grades(f.challenge, None).unwrap();
    assert_eq!(default.len(), 2);
    assert!(default.iter().any(|g| g.tier == RankLetter::E && g.target == 520.0));

    let divisional = tx.grades(f.challenge, Some(division)).unwrap();
    assert_eq!(divisional.len(), 1);
    assert_eq!(divisional[0].target, 660.0);
}

#[test]
fn test_submission_version_check() {
    let mut f = fixture();
    let mut submission = Submission::new(f.athlete, f.challenge);

    let mut tx = f.store.begin().unwrap();
    tx.insert_submission(&submission).unwrap();
    submission.version = 1;

    submission.achieved_tier = Some(RankLetter::D);
    submission.claimed_tiers = ClaimedTiers::from_letters([RankLetter::F, RankLetter::E, RankLetter::D]);
    submission.status = ReviewStatus::Approved;
    submission.xp_awarded = 175;
    assert_eq!(tx.save_submission(&submission).unwrap(), 2);

    // Saving again from the stale version 1 must conflict
    let err = tx.save_submission(&submission).unwrap_err();
    assert!(err.is_conflict());

    let stored = tx.submission_for(f.athlete, f.challenge).unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.claimed_tiers.to_string(), "FED");
    assert_eq!(stored.status, ReviewStatus::Approved);
    tx.commit().unwrap();
}

#[test]
fn test_duplicate_submission_is_conflict() {
    let mut f = fixture();
    let mut tx = f.store.begin().unwrap();
    tx.insert_submission(&Submission::new(f.athlete, f.challenge)).unwrap();
    let err = tx
        .insert_submission(&Submission::new(f.athlete, f.challenge))
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn test_missing_submission_is_not_found() {
    let mut f = fixture();
    let mut tx = f.store.begin().unwrap();
    let mut ghost = Submission::new(f.athlete, f.challenge);
    ghost.version = 1;
    assert!(matches!(tx.save_submission(&ghost), Err(StoreError::NotFound(_))));
}

#[test]
fn test_progress_insert_then_update() {
    let mut f = fixture();
    let mut progress = DomainProgress::new(f.athlete, f.strength);
    progress.sublevel = 2;
    progress.current_xp = 250;

    let mut tx = f.store.begin().unwrap();
    progress.version = tx.save_progress(&progress).unwrap();
    assert_eq!(progress.version, 1);

    // A second lazy insert for the same row conflicts
    let fresh = DomainProgress::new(f.athlete, f.strength);
    assert!(tx.save_progress(&fresh).unwrap_err().is_conflict());

    progress.current_xp = 900;
    progress.sublevel = 9;
    progress.banked_xp = 40;
    progress.breakthrough_ready = true;
    progress.version = tx.save_progress(&progress).unwrap();
    tx.commit().unwrap();

    let tx = f.store.begin().unwrap();
    let stored = tx.progress(f.athlete, f.strength).unwrap().unwrap();
    assert_eq!(stored, progress);
    assert_eq!(tx.athlete_progress(f.athlete).unwrap().len(), 1);
    assert!(tx.progress(f.athlete, f.endurance).unwrap().is_none());
}

#[test]
fn test_rollback_on_drop() {
    let mut f = fixture();
    {
        let mut tx = f.store.begin().unwrap();
        tx.save_progress(&DomainProgress::new(f.athlete, f.strength)).unwrap();
        tx.append_ledger(&XpLedgerEntry::new(f.athlete, f.strength, 10, XpSource::Bonus, 1))
            .unwrap();
        // dropped without commit
    }
    let tx = f.store.begin().unwrap();
    assert!(tx.progress(f.athlete, f.strength).unwrap().is_none());
    assert!(tx.ledger(f.athlete, None).unwrap().is_empty());
}

#[test]
fn test_ledger_newest_first_and_filtered() {
    let mut f = fixture();
    let mut tx = f.store.begin().unwrap();
    tx.append_ledger(&XpLedgerEntry::new(f.athlete, f.strength, 10, XpSource::Training, 100))
        .unwrap();
    tx.append_ledger(
        &XpLedgerEntry::new(f.athlete, f.endurance, 25, XpSource::Admin, 200)
            .with_note("manual fix"),
    )
    .unwrap();
    tx.append_ledger(&XpLedgerEntry::new(f.athlete, f.strength, -5, XpSource::Admin, 300))
        .unwrap();
    tx.commit().unwrap();

    let tx = f.store.begin().unwrap();
    let all = tx.ledger(f.athlete, None).unwrap();
    let created: Vec<u64> = all.iter().map(|e| e.created_at).collect();
    assert_eq!(created, vec![300, 200, 100]);
    assert_eq!(all[1].note.as_deref(), Some("manual fix"));

    let strength = tx.ledger(f.athlete, Some(f.strength)).unwrap();
    let amounts: Vec<i64> = strength.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![-5, 10]);
}

#[test]
fn test_breakthrough_rules_by_letter() {
    let mut f = fixture();
    let division = DivisionId::new();
    for (scope, div, count) in [
        (RuleScope::Domain(f.strength), None, 3),
        (RuleScope::Domain(f.strength), Some(division), 2),
        (RuleScope::AllDomains, None, 4),
    ] {
        f.store
            .upsert_breakthrough_rule(&BreakthroughRule {
                scope,
                division: div,
                from: RankLetter::F,
                to: RankLetter::E,
                required_tier: RankLetter::E,
                required_count: count,
            })
            .unwrap();
    }

    let skip = f.store.upsert_breakthrough_rule(&BreakthroughRule {
        scope: RuleScope::AllDomains,
        division: None,
        from: RankLetter::F,
        to: RankLetter::D,
        required_tier: RankLetter::E,
        required_count: 1,
    });
    assert!(matches!(skip, Err(StoreError::InvalidData(_))));

    let tx = f.store.begin().unwrap();
    let rules = tx.breakthrough_rules(RankLetter::F).unwrap();
    assert_eq!(rules.len(), 3);
    assert!(rules.iter().any(|r| r.scope == RuleScope::AllDomains && r.required_count == 4));
    assert!(rules.iter().any(|r| r.division == Some(division) && r.required_count == 2));
    assert!(tx.breakthrough_rules(RankLetter::E).unwrap().is_empty());
}

#[test]
fn test_completions_only_approved_crediting_challenges() {
    let mut f = fixture();
    let other = ChallengeId::new();
    f.store
        .upsert_challenge(&Challenge {
            id: other,
            name: "Bench".to_string(),
            grading: GradingType::WeightedReps,
            min_tier: RankLetter::F,
            max_tier: RankLetter::S,
            split: DomainSplit::single(f.strength),
        })
        .unwrap();

    let mut tx = f.store.begin().unwrap();
    let mut rowing = Submission::new(f.athlete, f.challenge);
    rowing.achieved_tier = Some(RankLetter::D);
    rowing.status = ReviewStatus::Approved;
    tx.insert_submission(&rowing).unwrap();

    let mut bench = Submission::new(f.athlete, other);
    bench.achieved_tier = Some(RankLetter::C);
    bench.status = ReviewStatus::Pending;
    tx.insert_submission(&bench).unwrap();

    let endurance = tx.completions(f.athlete, f.endurance).unwrap();
    assert_eq!(endurance.len(), 1);
    assert_eq!(endurance[0].tier, RankLetter::D);

    // Pending bench does not count; approved rowing credits strength at 30%
    let strength = tx.completions(f.athlete, f.strength).unwrap();
    assert_eq!(strength.len(), 1);
    assert_eq!(strength[0].challenge, f.challenge);
}

#[test]
fn test_file_store_shared_between_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ascent.db");

    let athlete = AthleteId::new();
    let domain = DomainId::new();
    {
        let mut writer = SqliteStore::new(&path).unwrap();
        writer.upsert_domain(&Domain { id: domain, name: "Power".to_string() }).unwrap();
        writer.upsert_athlete(&Athlete { id: athlete, division: None }).unwrap();
        let mut tx = writer.begin().unwrap();
        tx.save_progress(&DomainProgress::new(athlete, domain)).unwrap();
        tx.commit().unwrap();
    }

    let mut reader = SqliteStore::new(&path).unwrap();
    let tx = reader.begin().unwrap();
    let progress = tx.progress(athlete, domain).unwrap().unwrap();
    assert_eq!(progress.version, 1);
    assert!(tx.athlete(athlete).unwrap().is_some());
    assert!(tx.domain_exists(domain).unwrap());
}
