//! Identifier newtypes
//!
//! Every entity is identified by a UUIDv7 stored as a raw `u128`, which keeps
//! ids chronologically sortable and lets the store persist them as 16-byte
//! blobs.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Generate a new UUIDv7-based identifier
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7().as_u128())
            }

            /// Create an identifier from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization.
            pub fn from_value(value: u128) -> Self {
                Self(value)
            }

            /// Parse an identifier from its UUID string form
            pub fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(|u| Self(u.as_u128()))
                    .map_err(|e| format!("Invalid {} string: {}", stringify!($name), e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", uuid::Uuid::from_u128(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }
    };
}

define_id!(
    /// Identifier of an athlete
    AthleteId
);
define_id!(
    /// Identifier of a skill domain (e.g. Strength, Endurance)
    DomainId
);
define_id!(
    /// Identifier of a challenge
    ChallengeId
);
define_id!(
    /// Identifier of a submission (one athlete's attempt at one challenge)
    SubmissionId
);
define_id!(
    /// Identifier of a competitive division
    DivisionId
);
define_id!(
    /// Identifier of an XP ledger entry
    LedgerEntryId
);
