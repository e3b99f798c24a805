//! Tier threshold resolution
//!
//! A challenge defines, per division, a target value for each tier. Resolving
//! an attempt means finding the hardest tier whose target the athlete met.

use crate::rank::RankLetter;
use std::fmt;

/// How a challenge attempt is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradingType {
    /// Completed or not; a value of `1.0` conventionally means pass
    PassFail,
    /// Repetition count
    Reps,
    /// Elapsed seconds (lower is better)
    Time,
    /// Distance covered
    Distance,
    /// Repetitions inside a fixed time window
    TimedReps,
    /// Repetitions at a prescribed weight
    WeightedReps,
}

impl GradingType {
    /// Whether a lower achieved value is the better result
    pub fn lower_is_better(self) -> bool {
        match self {
            GradingType::Time => true,
            GradingType::PassFail
            | GradingType::Reps
            | GradingType::Distance
            | GradingType::TimedReps
            | GradingType::WeightedReps => false,
        }
    }

    /// Whether `achieved` meets `target` under this grading type
    pub fn meets(self, achieved: f64, target: f64) -> bool {
        if self.lower_is_better() {
            achieved <= target
        } else {
            achieved >= target
        }
    }

    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            GradingType::PassFail => "pass_fail",
            GradingType::Reps => "reps",
            GradingType::Time => "time",
            GradingType::Distance => "distance",
            GradingType::TimedReps => "timed_reps",
            GradingType::WeightedReps => "weighted_reps",
        }
    }

    /// Parse a grading type from its storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pass_fail" => Some(GradingType::PassFail),
            "reps" => Some(GradingType::Reps),
            "time" => Some(GradingType::Time),
            "distance" => Some(GradingType::Distance),
            "timed_reps" => Some(GradingType::TimedReps),
            "weighted_reps" => Some(GradingType::WeightedReps),
            _ => None,
        }
    }
}

impl fmt::Display for GradingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GradingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid grading type: {}", s))
    }
}

/// Target an athlete must meet or beat to be credited with `tier`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// Tier credited when the target is met
    pub tier: RankLetter,

    /// Target value in the challenge's unit
    pub target: f64,
}

impl Threshold {
    /// Create a threshold
    pub fn new(tier: RankLetter, target: f64) -> Self {
        Self { tier, target }
    }
}

/// Resolve the hardest tier met by `achieved`
///
/// Thresholds are scanned in increasing difficulty (descending target for
/// [`GradingType::Time`], ascending otherwise) and every met threshold
/// overwrites the previous best, so the result is the hardest tier satisfied
/// rather than the first. Returns `None` when no threshold is met or the
/// division has no thresholds at all.
///
/// # Examples
///
/// ```
/// use ascent_domain::{resolve_tier, GradingType, RankLetter, Threshold};
///
/// let thresholds = [
///     Threshold::new(RankLetter::S, 10.0),
///     Threshold::new(RankLetter::A, 15.0),
///     Threshold::new(RankLetter::B, 20.0),
/// ];
/// assert_eq!(resolve_tier(12.0, GradingType::Time, &thresholds), Some(RankLetter::A));
/// ```
pub fn resolve_tier(
    achieved: f64,
    grading: GradingType,
    thresholds: &[Threshold],
) -> Option<RankLetter> {
    let mut ordered: Vec<Threshold> = thresholds.to_vec();
    if grading.lower_is_better() {
        ordered.sort_by(|a, b| b.target.total_cmp(&a.target).then(a.tier.cmp(&b.tier)));
    } else {
        ordered.sort_by(|a, b| a.target.total_cmp(&b.target).then(a.tier.cmp(&b.tier)));
    }

    let mut best = None;
    for threshold in ordered {
        if grading.meets(achieved, threshold.target) {
            best = Some(threshold.tier);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascending_ladder() -> Vec<Threshold> {
        vec![
            Threshold::new(RankLetter::C, 30.0),
            Threshold::new(RankLetter::F, 0.0),
            Threshold::new(RankLetter::D, 20.0),
            Threshold::new(RankLetter::E, 10.0),
        ]
    }

    #[test]
    fn test_ascending_picks_hardest_met() {
        let thresholds = ascending_ladder();
        assert_eq!(resolve_tier(25.0, GradingType::Reps, &thresholds), Some(RankLetter::D));
        assert_eq!(resolve_tier(30.0, GradingType::Reps, &thresholds), Some(RankLetter::C));
        assert_eq!(resolve_tier(0.0, GradingType::Distance, &thresholds), Some(RankLetter::F));
    }

    #[test]
    fn test_below_every_target() {
        let thresholds = vec![Threshold::new(RankLetter::E, 10.0)];
        assert_eq!(resolve_tier(9.5, GradingType::Reps, &thresholds), None);
    }

    #[test]
    fn test_time_lower_is_better() {
        let thresholds = vec![
            Threshold::new(RankLetter::S, 10.0),
            Threshold::new(RankLetter::A, 15.0),
            Threshold::new(RankLetter::B, 20.0),
        ];
        assert_eq!(resolve_tier(12.0, GradingType::Time, &thresholds), Some(RankLetter::A));
        assert_eq!(resolve_tier(9.0, GradingType::Time, &thresholds), Some(RankLetter::S));
        assert_eq!(resolve_tier(20.0, GradingType::Time, &thresholds), Some(RankLetter::B));
        assert_eq!(resolve_tier(25.0, GradingType::Time, &thresholds), None);
    }

    #[test]
    fn test_no_thresholds_is_ungraded() {
        assert_eq!(resolve_tier(100.0, GradingType::Reps, &[]), None);
        assert_eq!(resolve_tier(0.0, GradingType::Time, &[]), None);
    }

    #[test]
    fn test_pass_fail_flat_tier() {
        let thresholds = vec![Threshold::new(RankLetter::D, 1.0)];
        assert_eq!(resolve_tier(1.0, GradingType::PassFail, &thresholds), Some(RankLetter::D));
        assert_eq!(resolve_tier(0.0, GradingType::PassFail, &thresholds), None);
    }

    #[test]
    fn test_equal_targets_credit_higher_tier() {
        let thresholds = vec![
            Threshold::new(RankLetter::C, 10.0),
            Threshold::new(RankLetter::D, 10.0),
        ];
        assert_eq!(resolve_tier(10.0, GradingType::Reps, &thresholds), Some(RankLetter::C));
    }

    #[test]
    fn test_grading_type_names() {
        for grading in [
            GradingType::PassFail,
            GradingType::Reps,
            GradingType::Time,
            GradingType::Distance,
            GradingType::TimedReps,
            GradingType::WeightedReps,
        ] {
            assert_eq!(GradingType::parse(grading.as_str()), Some(grading));
        }
        assert!("sprint".parse::<GradingType>().is_err());
    }
}
