//! Strongly-typed identifiers for domain entities
//!
//! Records are keyed by store-assigned sequential integers. Wrapping them in
//! newtypes keeps a member key from being passed where a provider key is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw key
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(MemberId, "MBR");
define_id!(ProviderId, "PRV");
define_id!(ProcedureId, "PRC");
define_id!(ClaimId, "CLM");

/// Correlation identifier for a single claim submission
///
/// Never persisted; it ties together every log line emitted while one
/// submission is adjudicated so a failed call can be traced and replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Creates a new time-ordered identifier (v7)
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new_v7()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SUB-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_display() {
        let id = MemberId::new(42);
        assert_eq!(id.to_string(), "MBR-42");
    }

    #[test]
    fn test_id_parsing() {
        let original = ClaimId::new(1001);
        let parsed: ClaimId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: ClaimId = "7".parse().unwrap();
        assert_eq!(bare.value(), 7);
    }

    #[test]
    fn test_id_parsing_rejects_garbage() {
        assert!("MBR-abc".parse::<MemberId>().is_err());
    }

    #[test]
    fn test_submission_ids_are_unique() {
        assert_ne!(SubmissionId::new_v7(), SubmissionId::new_v7());
    }
}
