//! Rank module - letters, sublevels and their ordinal encoding

use std::fmt;

/// Highest sublevel within a rank letter
pub const MAX_SUBLEVEL: u8 = 9;

/// Highest encodable ordinal (`S9`)
pub const MAX_ORDINAL: u8 = 69;

/// Rank letter on the progression ladder
///
/// Letters are ordered from lowest to highest:
/// `F < E < D < C < B < A < S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankLetter {
    /// Entry rank
    F,
    /// Second rank
    E,
    /// Third rank
    D,
    /// Fourth rank
    C,
    /// Fifth rank
    B,
    /// Sixth rank
    A,
    /// Top rank
    S,
}

impl RankLetter {
    /// All letters in ascending order
    pub const ALL: [RankLetter; 7] = [
        RankLetter::F,
        RankLetter::E,
        RankLetter::D,
        RankLetter::C,
        RankLetter::B,
        RankLetter::A,
        RankLetter::S,
    ];

    /// Zero-based position on the ladder
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Letter at `index`, clamped into `0..=6`
    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index.min(6))]
    }

    /// The next letter up, if any
    pub fn next(self) -> Option<Self> {
        match self {
            RankLetter::S => None,
            other => Some(Self::from_index(other.index() + 1)),
        }
    }

    /// The next letter down, if any
    pub fn previous(self) -> Option<Self> {
        match self {
            RankLetter::F => None,
            other => Some(Self::from_index(other.index() - 1)),
        }
    }

    /// Single-character representation used for storage
    pub fn as_char(self) -> char {
        match self {
            RankLetter::F => 'F',
            RankLetter::E => 'E',
            RankLetter::D => 'D',
            RankLetter::C => 'C',
            RankLetter::B => 'B',
            RankLetter::A => 'A',
            RankLetter::S => 'S',
        }
    }

    /// Parse a letter from its character (case-insensitive)
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'F' => Some(RankLetter::F),
            'E' => Some(RankLetter::E),
            'D' => Some(RankLetter::D),
            'C' => Some(RankLetter::C),
            'B' => Some(RankLetter::B),
            'A' => Some(RankLetter::A),
            'S' => Some(RankLetter::S),
            _ => None,
        }
    }

    /// Parse a letter from a one-character string
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    /// Iterate letters in `low..=high`, ascending
    pub fn range(low: Self, high: Self) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |letter| *letter >= low && *letter <= high)
    }
}

impl fmt::Display for RankLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for RankLetter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid rank letter: {}", s))
    }
}

/// A rank letter paired with a sublevel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level {
    /// Rank letter
    pub letter: RankLetter,

    /// Sublevel in `0..=9`
    pub sublevel: u8,
}

impl Level {
    /// The lowest level on the ladder (`F0`)
    pub const LOWEST: Level = Level {
        letter: RankLetter::F,
        sublevel: 0,
    };

    /// Create a level, clamping the sublevel into `0..=9`
    pub fn new(letter: RankLetter, sublevel: u8) -> Self {
        Self {
            letter,
            sublevel: sublevel.min(MAX_SUBLEVEL),
        }
    }

    /// Ordinal encoding of this level
    pub fn ordinal(&self) -> u8 {
        to_ordinal(self.letter, self.sublevel)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.sublevel)
    }
}

/// Encode a (letter, sublevel) pair as a single ordinal in `[0, 69]`
///
/// Callers are expected to pass a sublevel in `0..=9`; larger values are
/// clamped so the function stays total.
///
/// # Examples
///
/// ```
/// use ascent_domain::{to_ordinal, RankLetter};
///
/// assert_eq!(to_ordinal(RankLetter::F, 0), 0);
/// assert_eq!(to_ordinal(RankLetter::D, 4), 24);
/// assert_eq!(to_ordinal(RankLetter::S, 9), 69);
/// ```
pub fn to_ordinal(letter: RankLetter, sublevel: u8) -> u8 {
    letter.index() * 10 + sublevel.min(MAX_SUBLEVEL)
}

/// Decode an ordinal back to a level, clamping into `[0, 69]` first
///
/// # Examples
///
/// ```
/// use ascent_domain::{from_ordinal, Level, RankLetter};
///
/// assert_eq!(from_ordinal(24), Level::new(RankLetter::D, 4));
/// assert_eq!(from_ordinal(250), Level::new(RankLetter::S, 9));
/// ```
pub fn from_ordinal(n: u8) -> Level {
    let n = n.min(MAX_ORDINAL);
    Level {
        letter: RankLetter::from_index(n / 10),
        sublevel: n % 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_progression() {
        assert_eq!(RankLetter::F.next(), Some(RankLetter::E));
        assert_eq!(RankLetter::A.next(), Some(RankLetter::S));
        assert_eq!(RankLetter::S.next(), None);
        assert_eq!(RankLetter::F.previous(), None);
        assert_eq!(RankLetter::S.previous(), Some(RankLetter::A));
    }

    #[test]
    fn test_letter_parse() {
        assert_eq!(RankLetter::parse("d"), Some(RankLetter::D));
        assert_eq!(RankLetter::parse(" S "), Some(RankLetter::S));
        assert_eq!(RankLetter::parse("X"), None);
        assert_eq!(RankLetter::parse("AB"), None);
        assert!("Q".parse::<RankLetter>().is_err());
    }

    #[test]
    fn test_from_index_clamps() {
        assert_eq!(RankLetter::from_index(0), RankLetter::F);
        assert_eq!(RankLetter::from_index(6), RankLetter::S);
        assert_eq!(RankLetter::from_index(42), RankLetter::S);
    }

    #[test]
    fn test_range_is_ascending_and_inclusive() {
        let letters: Vec<_> = RankLetter::range(RankLetter::E, RankLetter::C).collect();
        assert_eq!(letters, vec![RankLetter::E, RankLetter::D, RankLetter::C]);
        assert_eq!(RankLetter::range(RankLetter::C, RankLetter::E).count(), 0);
    }

    #[test]
    fn test_ordinal_bounds() {
        assert_eq!(to_ordinal(RankLetter::F, 0), 0);
        assert_eq!(to_ordinal(RankLetter::S, 9), MAX_ORDINAL);
        assert_eq!(to_ordinal(RankLetter::C, 12), 39);
        assert_eq!(from_ordinal(0), Level::LOWEST);
        assert_eq!(from_ordinal(u8::MAX), Level::new(RankLetter::S, 9));
    }

    #[test]
    fn test_level_display_and_order() {
        let low = Level::new(RankLetter::E, 9);
        let high = Level::new(RankLetter::D, 0);
        assert!(low < high);
        assert_eq!(high.to_string(), "D0");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: decoding an encoded level returns the same level
        #[test]
        fn test_ordinal_roundtrip(letter in 0u8..7, sub in 0u8..10) {
            let letter = RankLetter::from_index(letter);
            let decoded = from_ordinal(to_ordinal(letter, sub));
            prop_assert_eq!(decoded, Level::new(letter, sub));
        }

        /// Property: ordinals follow lexicographic (letter, sublevel) order
        #[test]
        fn test_ordinal_strictly_increasing(
            a in (0u8..7, 0u8..10),
            b in (0u8..7, 0u8..10),
        ) {
            let oa = to_ordinal(RankLetter::from_index(a.0), a.1);
            let ob = to_ordinal(RankLetter::from_index(b.0), b.1);
            prop_assert_eq!(oa.cmp(&ob), a.cmp(&b));
        }

        /// Property: decoding is total and always lands on the ladder
        #[test]
        fn test_from_ordinal_total(n: u8) {
            let level = from_ordinal(n);
            prop_assert!(level.sublevel <= MAX_SUBLEVEL);
            prop_assert!(level.ordinal() <= MAX_ORDINAL);
        }
    }
}
