//! Typed identifiers.
//!
//! Each ID wraps the platform's integer primary key so a `PolicyId` cannot
//! be passed where a `MergeRequestId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create a new ID from the raw key.
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw key.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Project identifier.
    ProjectId
);

define_id!(
    /// Group (namespace) identifier.
    GroupId
);

define_id!(
    /// Compliance framework identifier.
    ComplianceFrameworkId
);

define_id!(
    /// Merge request identifier (global, not the per-project iid).
    MergeRequestId
);

define_id!(
    /// Scan result policy identifier; correlates a policy with its
    /// approval rules and violation rows.
    PolicyId
);

define_id!(
    /// Merge request approval rule identifier.
    ApprovalRuleId
);

define_id!(
    /// CI pipeline identifier.
    PipelineId
);

define_id!(
    /// Comment (note) identifier.
    CommentId
);

/// Stable identifier of a single vulnerability finding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
