//! Domain progression state machine
//!
//! Applies awards to one athlete's progress in one domain. Sublevels advance
//! as XP accumulates; at the rank ceiling (sublevel 9) further XP is banked
//! and the row is flagged ready for a breakthrough. The rank letter itself
//! only changes through [`advance_letter`].

use crate::ids::{AthleteId, DomainId};
use crate::rank::{Level, RankLetter, MAX_SUBLEVEL};
use crate::tables::RankTables;

/// Per (athlete, domain) progression record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProgress {
    /// Athlete this row belongs to
    pub athlete: AthleteId,

    /// Domain this row tracks
    pub domain: DomainId,

    /// Current rank letter
    pub letter: RankLetter,

    /// Current sublevel, `0..=9`
    pub sublevel: u8,

    /// XP toward the current letter's ceiling, never above it
    pub current_xp: u64,

    /// XP earned past the ceiling, held until a breakthrough
    pub banked_xp: u64,

    /// Whether the ceiling has been reached
    pub breakthrough_ready: bool,

    /// Optimistic concurrency counter, bumped by the store on every save
    pub version: u64,
}

impl DomainProgress {
    /// Fresh row at `F0` with no XP
    pub fn new(athlete: AthleteId, domain: DomainId) -> Self {
        Self {
            athlete,
            domain,
            letter: RankLetter::F,
            sublevel: 0,
            current_xp: 0,
            banked_xp: 0,
            breakthrough_ready: false,
            version: 0,
        }
    }

    /// Current level
    pub fn level(&self) -> Level {
        Level::new(self.letter, self.sublevel)
    }
}

/// Result of applying one award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardOutcome {
    /// Level before the award
    pub previous: Level,

    /// Level after the award
    pub new: Level,

    /// Whether the sublevel (or letter) went up
    pub leveled_up: bool,

    /// Readiness flag after the award
    pub breakthrough_ready: bool,

    /// Raw amount awarded, for display
    pub amount: i64,

    /// Change applied to banked XP
    pub banked_delta: i64,
}

/// Apply `amount` XP to `progress`
///
/// Let the ceiling be `9 * xp_per_sublevel(letter)`. Positive awards raise
/// `current_xp`; once it reaches the ceiling the sublevel is pinned at 9, the
/// excess is banked and `breakthrough_ready` is set. Negative awards (admin
/// corrections) drain banked XP first, then `current_xp`, but never below the
/// start of the current sublevel, so levels never go down.
///
/// # Examples
///
/// ```
/// use ascent_domain::{apply_award, AthleteId, DomainId, DomainProgress, RankTables};
///
/// let tables = RankTables::default();
/// let mut progress = DomainProgress::new(AthleteId::new(), DomainId::new());
/// progress.sublevel = 3;
/// progress.current_xp = 300;
///
/// let outcome = apply_award(&mut progress, 150, &tables);
/// assert_eq!(progress.sublevel, 4);
/// assert!(outcome.leveled_up);
/// ```
pub fn apply_award(progress: &mut DomainProgress, amount: i64, tables: &RankTables) -> AwardOutcome {
    let previous = progress.level();
    let per_sublevel = tables.xp_per_sublevel(progress.letter);
    let ceiling = tables.ceiling(progress.letter);
    let mut banked_delta = 0i64;

    if amount >= 0 {
        let new_xp = progress.current_xp.saturating_add(amount.unsigned_abs());
        if new_xp >= ceiling {
            let overflow = new_xp - ceiling;
            progress.banked_xp = progress.banked_xp.saturating_add(overflow);
            banked_delta = i64::try_from(overflow).unwrap_or(i64::MAX);
            progress.current_xp = ceiling;
            progress.sublevel = MAX_SUBLEVEL;
            progress.breakthrough_ready = true;
        } else {
            let potential = (new_xp / per_sublevel) as u8;
            progress.current_xp = new_xp;
            progress.sublevel = progress.sublevel.max(potential);
        }
    } else {
        let mut debit = amount.unsigned_abs();
        let from_bank = debit.min(progress.banked_xp);
        progress.banked_xp -= from_bank;
        debit -= from_bank;
        banked_delta = -i64::try_from(from_bank).unwrap_or(i64::MAX);

        let floor = u64::from(progress.sublevel) * per_sublevel;
        progress.current_xp = progress.current_xp.saturating_sub(debit).max(floor);
    }

    progress.current_xp = progress.current_xp.min(ceiling);
    let new = progress.level();

    AwardOutcome {
        previous,
        new,
        leveled_up: new > previous,
        breakthrough_ready: progress.breakthrough_ready,
        amount,
        banked_delta,
    }
}

/// Move `progress` to the next rank letter and replay its banked XP
///
/// The row restarts at sublevel 0 of the next letter with no XP and the
/// readiness flag cleared; the banked XP is then applied through
/// [`apply_award`] as a fresh award at the new rank. Returns `None` (and
/// leaves the row untouched) when the athlete is already at the top letter.
///
/// Readiness and rule satisfaction are the caller's responsibility.
pub fn advance_letter(progress: &mut DomainProgress, tables: &RankTables) -> Option<AwardOutcome> {
    let next = progress.letter.next()?;
    let previous = progress.level();
    let banked = progress.banked_xp;

    progress.letter = next;
    progress.sublevel = 0;
    progress.current_xp = 0;
    progress.banked_xp = 0;
    progress.breakthrough_ready = false;

    let replay = i64::try_from(banked).unwrap_or(i64::MAX);
    let outcome = apply_award(progress, replay, tables);

    Some(AwardOutcome {
        previous,
        leveled_up: true,
        banked_delta: outcome.banked_delta - replay,
        ..outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(letter: RankLetter, sublevel: u8, current_xp: u64) -> DomainProgress {
        let mut progress = DomainProgress::new(AthleteId::from_value(1), DomainId::from_value(2));
        progress.letter = letter;
        progress.sublevel = sublevel;
        progress.current_xp = current_xp;
        progress
    }

    #[test]
    fn test_sublevel_advance() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 3, 300);
        let outcome = apply_award(&mut progress, 150, &tables);

        assert_eq!(progress.current_xp, 450);
        assert_eq!(progress.sublevel, 4);
        assert!(outcome.leveled_up);
        assert!(!outcome.breakthrough_ready);
        assert_eq!(outcome.previous, Level::new(RankLetter::F, 3));
        assert_eq!(outcome.new, Level::new(RankLetter::F, 4));
    }

    #[test]
    fn test_award_within_sublevel() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 2, 210);
        let outcome = apply_award(&mut progress, 50, &tables);

        assert_eq!(progress.current_xp, 260);
        assert_eq!(progress.sublevel, 2);
        assert!(!outcome.leveled_up);
    }

    #[test]
    fn test_banking_at_ceiling() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 9, 900);
        let outcome = apply_award(&mut progress, 50, &tables);

        assert_eq!(progress.sublevel, 9);
        assert_eq!(progress.current_xp, 900);
        assert_eq!(progress.banked_xp, 50);
        assert!(progress.breakthrough_ready);
        assert!(!outcome.leveled_up);
        assert_eq!(outcome.banked_delta, 50);
    }

    #[test]
    fn test_crossing_ceiling_levels_up_and_banks() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 7, 780);
        let outcome = apply_award(&mut progress, 300, &tables);

        assert_eq!(progress.sublevel, 9);
        assert_eq!(progress.current_xp, 900);
        assert_eq!(progress.banked_xp, 180);
        assert!(outcome.leveled_up);
        assert!(outcome.breakthrough_ready);
    }

    #[test]
    fn test_exact_ceiling_is_ready_without_banking() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 8, 850);
        let outcome = apply_award(&mut progress, 50, &tables);

        assert_eq!(progress.sublevel, 9);
        assert_eq!(progress.banked_xp, 0);
        assert!(outcome.breakthrough_ready);
    }

    #[test]
    fn test_zero_award_is_noop() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::E, 4, 640);
        let before = progress.clone();
        let outcome = apply_award(&mut progress, 0, &tables);

        assert_eq!(progress, before);
        assert!(!outcome.leveled_up);
    }

    #[test]
    fn test_negative_award_drains_bank_then_xp() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 9, 900);
        progress.banked_xp = 30;
        progress.breakthrough_ready = true;

        let outcome = apply_award(&mut progress, -50, &tables);
        assert_eq!(progress.banked_xp, 0);
        assert_eq!(outcome.banked_delta, -30);
        // floor of sublevel 9 is 900, so current_xp cannot drop
        assert_eq!(progress.current_xp, 900);
        assert_eq!(progress.sublevel, 9);
    }

    #[test]
    fn test_negative_award_never_drops_sublevel() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 4, 470);
        apply_award(&mut progress, -200, &tables);

        assert_eq!(progress.sublevel, 4);
        assert_eq!(progress.current_xp, 400);
    }

    #[test]
    fn test_advance_letter_replays_bank() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 9, 900);
        progress.banked_xp = 320;
        progress.breakthrough_ready = true;

        let outcome = advance_letter(&mut progress, &tables).unwrap();
        // E costs 150 per sublevel: 320 XP lands on E2
        assert_eq!(progress.letter, RankLetter::E);
        assert_eq!(progress.sublevel, 2);
        assert_eq!(progress.current_xp, 320);
        assert_eq!(progress.banked_xp, 0);
        assert!(!progress.breakthrough_ready);
        assert_eq!(outcome.previous, Level::new(RankLetter::F, 9));
        assert_eq!(outcome.new, Level::new(RankLetter::E, 2));
        assert!(outcome.leveled_up);
        assert_eq!(outcome.banked_delta, -320);
    }

    #[test]
    fn test_advance_letter_with_large_bank_rebanks() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::F, 9, 900);
        progress.banked_xp = 1500;

        advance_letter(&mut progress, &tables).unwrap();
        assert_eq!(progress.letter, RankLetter::E);
        assert_eq!(progress.sublevel, 9);
        assert_eq!(progress.current_xp, 1350);
        assert_eq!(progress.banked_xp, 150);
        assert!(progress.breakthrough_ready);
    }

    #[test]
    fn test_advance_letter_at_top() {
        let tables = RankTables::default();
        let mut progress = at(RankLetter::S, 9, tables.ceiling(RankLetter::S));
        let before = progress.clone();
        assert!(advance_letter(&mut progress, &tables).is_none());
        assert_eq!(progress, before);
    }
}
