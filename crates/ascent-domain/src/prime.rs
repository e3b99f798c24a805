//! Prime level - an athlete's composite level across domains

use crate::rank::{from_ordinal, Level};

/// Floored mean of the ordinals of `levels`
///
/// An empty slice yields the lowest level (`F0`).
///
/// # Examples
///
/// ```
/// use ascent_domain::{compute_prime, Level, RankLetter};
///
/// let levels = [Level::new(RankLetter::E, 5), Level::new(RankLetter::D, 2)];
/// // (15 + 22) / 2 = 18.5 -> 18
/// assert_eq!(compute_prime(&levels), Level::new(RankLetter::E, 8));
/// assert_eq!(compute_prime(&[]), Level::LOWEST);
/// ```
pub fn compute_prime(levels: &[Level]) -> Level {
    if levels.is_empty() {
        return Level::LOWEST;
    }
    let total: usize = levels.iter().map(|l| usize::from(l.ordinal())).sum();
    let mean = total / levels.len();
    from_ordinal(mean.min(usize::from(u8::MAX)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::RankLetter;

    #[test]
    fn test_empty_is_lowest() {
        assert_eq!(compute_prime(&[]), Level::new(RankLetter::F, 0));
    }

    #[test]
    fn test_equal_levels() {
        let level = Level::new(RankLetter::C, 7);
        assert_eq!(compute_prime(&[level; 4]), level);
    }

    #[test]
    fn test_floors_mean() {
        let levels = [
            Level::new(RankLetter::F, 0),
            Level::new(RankLetter::F, 0),
            Level::new(RankLetter::F, 5),
        ];
        assert_eq!(compute_prime(&levels), Level::new(RankLetter::F, 1));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::rank::to_ordinal;
    use crate::rank::RankLetter;
    use proptest::prelude::*;

    proptest! {
        /// Property: prime level lies between the lowest and highest input
        #[test]
        fn test_prime_bounded(levels in proptest::collection::vec((0u8..7, 0u8..10), 1..12)) {
            let levels: Vec<Level> = levels
                .into_iter()
                .map(|(l, s)| Level::new(RankLetter::from_index(l), s))
                .collect();
            let prime = compute_prime(&levels);
            let min = levels.iter().min().copied().unwrap_or_default();
            let max = levels.iter().max().copied().unwrap_or_default();
            prop_assert!(prime >= min && prime <= max);
            prop_assert!(to_ordinal(prime.letter, prime.sublevel) <= 69);
        }
    }
}
