//! Normalized legislators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A legislator as reported by any source, normalized.
///
/// Only [`Member::key`] takes part in sponsorship comparisons; everything else
/// is biographical metadata that may drift between observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    /// Stable cross-source identifier. Preferred over `numeric_id`.
    pub slug: String,
    pub numeric_id: i64,
    pub full_name: String,
    pub short_name: String,
    pub district: String,
    pub party: String,
    pub url: String,
}

/// Sponsorship identity of a [`Member`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKey {
    Slug(String),
    Numeric(i64),
}

impl Member {
    /// The identity key: the slug when present, otherwise the numeric id.
    #[must_use]
    pub fn key(&self) -> MemberKey {
        if self.slug.is_empty() {
            MemberKey::Numeric(self.numeric_id)
        } else {
            MemberKey::Slug(self.slug.clone())
        }
    }

    /// Two members are the same sponsor iff their identity keys match.
    #[must_use]
    pub fn same_sponsor(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Best available display name.
    #[must_use]
    pub fn name(&self) -> &str {
        if self.short_name.is_empty() {
            &self.full_name
        } else {
            &self.short_name
        }
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slug(slug) => f.write_str(slug),
            Self::Numeric(id) => write!(f, "#{id}"),
        }
    }
}
