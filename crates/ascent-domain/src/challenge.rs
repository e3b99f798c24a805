//! Challenge, grade and submission records
//!
//! Reference data (domains, athletes, challenges, grades) is maintained by
//! administrative tooling; the reward rules only read it. Submissions are the
//! one record here that the rules write back to.

use crate::claims::ClaimedTiers;
use crate::grading::{GradingType, Threshold};
use crate::ids::{AthleteId, ChallengeId, DivisionId, DomainId, SubmissionId};
use crate::rank::RankLetter;
use crate::reward::DomainSplit;

/// A named skill axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Unique identifier
    pub id: DomainId,

    /// Display name (e.g. "Strength")
    pub name: String,
}

/// The parts of an athlete record the progression rules need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Athlete {
    /// Unique identifier
    pub id: AthleteId,

    /// Division used to select grade targets and rule overrides
    pub division: Option<DivisionId>,
}

/// Grading configuration of a challenge
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Unique identifier
    pub id: ChallengeId,

    /// Display name
    pub name: String,

    /// How attempts are measured
    pub grading: GradingType,

    /// Lowest tier that pays out
    pub min_tier: RankLetter,

    /// Highest tier that can be achieved
    pub max_tier: RankLetter,

    /// Domains credited and their percentages
    pub split: DomainSplit,
}

impl Challenge {
    /// Clamp a resolved tier to this challenge's maximum
    pub fn cap_tier(&self, tier: RankLetter) -> RankLetter {
        tier.min(self.max_tier)
    }

    /// Configuration-time validation
    pub fn validate(&self) -> Result<(), String> {
        if self.min_tier > self.max_tier {
            return Err(format!(
                "challenge {}: min tier {} is above max tier {}",
                self.name, self.min_tier, self.max_tier
            ));
        }
        self.split
            .validate()
            .map_err(|e| format!("challenge {}: {}", self.name, e))
    }
}

/// Target for one tier of a challenge within one division
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChallengeGrade {
    /// Challenge graded
    pub challenge: ChallengeId,

    /// Division the target applies to
    pub division: Option<DivisionId>,

    /// Tier credited
    pub tier: RankLetter,

    /// Value to meet or beat
    pub target: f64,

    /// Prescribed weight for weighted grading types
    pub weight: Option<f64>,
}

impl ChallengeGrade {
    /// Threshold view used by the resolver
    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.tier, self.target)
    }
}

/// Review state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewStatus {
    /// Awaiting review
    Pending,
    /// Accepted; eligible for rewards
    Approved,
    /// Refused
    Rejected,
    /// Returned to the athlete for changes
    NeedsRevision,
}

impl ReviewStatus {
    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::NeedsRevision => "needs_revision",
        }
    }

    /// Parse a status from its storage name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ReviewStatus::Pending),
            "approved" => Some(ReviewStatus::Approved),
            "rejected" => Some(ReviewStatus::Rejected),
            "needs_revision" => Some(ReviewStatus::NeedsRevision),
            _ => None,
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid review status: {}", s))
    }
}

/// One athlete's attempt at one challenge
///
/// Unique per (athlete, challenge): re-grading updates the same record.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Unique identifier
    pub id: SubmissionId,

    /// Athlete who submitted
    pub athlete: AthleteId,

    /// Challenge attempted
    pub challenge: ChallengeId,

    /// Raw achieved value, once graded
    pub achieved_value: Option<f64>,

    /// Best tier achieved so far
    pub achieved_tier: Option<RankLetter>,

    /// Tiers already paid out
    pub claimed_tiers: ClaimedTiers,

    /// Cumulative XP paid for this submission
    pub xp_awarded: i64,

    /// Review state
    pub status: ReviewStatus,

    /// Optimistic concurrency counter, bumped by the store on every save
    pub version: u64,
}

impl Submission {
    /// New pending submission
    pub fn new(athlete: AthleteId, challenge: ChallengeId) -> Self {
        Self {
            id: SubmissionId::new(),
            athlete,
            challenge,
            achieved_value: None,
            achieved_tier: None,
            claimed_tiers: ClaimedTiers::new(),
            xp_awarded: 0,
            status: ReviewStatus::Pending,
            version: 0,
        }
    }
}
