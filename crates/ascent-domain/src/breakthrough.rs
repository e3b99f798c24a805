//! Breakthrough rules
//!
//! Advancing from one rank letter's ceiling to the next letter requires a
//! number of distinct challenges completed at or above a required tier.
//! Rules are configured per domain (or for all domains) and may be
//! overridden per division.

use crate::ids::{ChallengeId, DivisionId, DomainId};
use crate::rank::RankLetter;
use std::collections::HashSet;

/// Which domains a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleScope {
    /// One specific domain
    Domain(DomainId),
    /// Every domain without a more specific rule
    AllDomains,
}

/// Requirement for the `from -> to` letter transition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BreakthroughRule {
    /// Domain scope
    pub scope: RuleScope,

    /// Division override (`None` = default rule)
    pub division: Option<DivisionId>,

    /// Letter being left
    pub from: RankLetter,

    /// Letter being entered
    pub to: RankLetter,

    /// Minimum tier a qualifying challenge must have been achieved at
    pub required_tier: RankLetter,

    /// Number of distinct qualifying challenges required
    pub required_count: u32,
}

/// An athlete's achieved tier on one completed challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Completion {
    /// Challenge completed
    pub challenge: ChallengeId,

    /// Tier achieved on it
    pub tier: RankLetter,
}

/// Evaluation of a rule against an athlete's completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakthroughStatus {
    /// Rule that applied
    pub rule: BreakthroughRule,

    /// Distinct challenges at or above the required tier
    pub qualifying: u32,

    /// Count required by the rule
    pub required: u32,

    /// Whether the requirement is met
    pub satisfied: bool,
}

/// Pick the rule governing `from`'s breakthrough for `domain`
///
/// Precedence, most specific first:
/// 1. division override for the domain
/// 2. domain default
/// 3. division override for all domains
/// 4. all-domains default
///
/// Returns `None` when nothing matches; breakthrough is then unavailable.
pub fn select_rule<'a>(
    rules: &'a [BreakthroughRule],
    domain: DomainId,
    division: Option<DivisionId>,
    from: RankLetter,
) -> Option<&'a BreakthroughRule> {
    let candidates = [
        (RuleScope::Domain(domain), division),
        (RuleScope::Domain(domain), None),
        (RuleScope::AllDomains, division),
        (RuleScope::AllDomains, None),
    ];

    candidates.iter().find_map(|(scope, div)| {
        rules
            .iter()
            .find(|r| r.from == from && r.scope == *scope && r.division == *div)
    })
}

/// Evaluate `rule` against the athlete's completed challenges
///
/// Each challenge counts once, using the best tier seen for it.
pub fn evaluate(rule: &BreakthroughRule, completions: &[Completion]) -> BreakthroughStatus {
    let qualifying: HashSet<ChallengeId> = completions
        .iter()
        .filter(|c| c.tier >= rule.required_tier)
        .map(|c| c.challenge)
        .collect();
    let qualifying = qualifying.len() as u32;

    BreakthroughStatus {
        rule: rule.clone(),
        qualifying,
        required: rule.required_count,
        satisfied: qualifying >= rule.required_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(scope: RuleScope, division: Option<DivisionId>, count: u32) -> BreakthroughRule {
        BreakthroughRule {
            scope,
            division,
            from: RankLetter::F,
            to: RankLetter::E,
            required_tier: RankLetter::E,
            required_count: count,
        }
    }

    fn completion(id: u128, tier: RankLetter) -> Completion {
        Completion {
            challenge: ChallengeId::from_value(id),
            tier,
        }
    }

    #[test]
    fn test_division_override_wins() {
        let domain = DomainId::from_value(1);
        let division = DivisionId::from_value(7);
        let rules = vec![
            rule(RuleScope::AllDomains, None, 1),
            rule(RuleScope::Domain(domain), None, 2),
            rule(RuleScope::Domain(domain), Some(division), 3),
        ];

        let selected = select_rule(&rules, domain, Some(division), RankLetter::F).unwrap();
        assert_eq!(selected.required_count, 3);

        let selected = select_rule(&rules, domain, None, RankLetter::F).unwrap();
        assert_eq!(selected.required_count, 2);
    }

    #[test]
    fn test_other_division_override_is_ignored() {
        let domain = DomainId::from_value(1);
        let rules = vec![
            rule(RuleScope::Domain(domain), Some(DivisionId::from_value(8)), 3),
            rule(RuleScope::Domain(domain), None, 2),
        ];
        let selected = select_rule(&rules, domain, Some(DivisionId::from_value(7)), RankLetter::F);
        assert_eq!(selected.unwrap().required_count, 2);
    }

    #[test]
    fn test_falls_back_to_all_domains() {
        let domain = DomainId::from_value(1);
        let other = DomainId::from_value(2);
        let rules = vec![
            rule(RuleScope::Domain(other), None, 5),
            rule(RuleScope::AllDomains, None, 1),
        ];
        let selected = select_rule(&rules, domain, None, RankLetter::F).unwrap();
        assert_eq!(selected.scope, RuleScope::AllDomains);
    }

    #[test]
    fn test_no_rule_fails_closed() {
        let domain = DomainId::from_value(1);
        let rules = vec![rule(RuleScope::Domain(domain), None, 1)];
        assert!(select_rule(&rules, domain, None, RankLetter::E).is_none());
        assert!(select_rule(&[], domain, None, RankLetter::F).is_none());
    }

    #[test]
    fn test_evaluate_counts_distinct_challenges() {
        let r = rule(RuleScope::AllDomains, None, 2);
        let completions = vec![
            completion(1, RankLetter::D),
            completion(1, RankLetter::E),
            completion(2, RankLetter::F),
        ];
        let status = evaluate(&r, &completions);
        assert_eq!(status.qualifying, 1);
        assert!(!status.satisfied);

        let mut completions = completions;
        completions.push(completion(3, RankLetter::E));
        let status = evaluate(&r, &completions);
        assert_eq!(status.qualifying, 2);
        assert_eq!(status.required, 2);
        assert!(status.satisfied);
    }

    #[test]
    fn test_zero_count_rule_is_satisfied() {
        let r = rule(RuleScope::AllDomains, None, 0);
        assert!(evaluate(&r, &[]).satisfied);
    }
}
