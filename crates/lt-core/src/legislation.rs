//! The canonical bill/resolution record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::body::BodyId;
use crate::member::{Member, MemberKey};
use crate::session::Session;

/// Opaque per-body identifier (e.g. `"118-hr1234"`, `"2021-S5130"`).
///
/// The grammar is body specific; see [`crate::ids`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegislationId(String);

impl LegislationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LegislationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LegislationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LegislationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegislationType {
    #[default]
    Bill,
    Resolution,
}

/// A bill or resolution in one body. Identity is `(body, id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Legislation {
    pub body: BodyId,
    pub id: LegislationId,
    pub display_id: String,
    pub title: String,
    pub summary: String,
    pub description: String,
    pub url: String,
    pub session: Session,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: LegislationType,
    pub sponsors: Vec<Member>,
    /// Companion bill in the body's bicameral partner.
    pub same_as: Option<LegislationId>,
    pub substituted_by: Option<LegislationId>,
    pub introduced_date: Option<NaiveDate>,
    /// Set once when the record is first stored.
    pub added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Updated on every successful refresh.
    pub last_checked: DateTime<Utc>,
}

impl Legislation {
    #[must_use]
    pub fn identity(&self) -> (BodyId, LegislationId) {
        (self.body.clone(), self.id.clone())
    }

    #[must_use]
    pub fn sponsor_keys(&self) -> HashSet<MemberKey> {
        self.sponsors.iter().map(Member::key).collect()
    }

    /// The companion id, ignoring an empty placeholder some sources send.
    #[must_use]
    pub fn companion_id(&self) -> Option<&LegislationId> {
        self.same_as.as_ref().filter(|id| !id.is_empty())
    }

    /// Whether any field a reader would notice differs from `other`.
    #[must_use]
    pub fn content_differs(&self, other: &Self) -> bool {
        self.title != other.title
            || self.summary != other.summary
            || self.description != other.description
            || self.status != other.status
            || self.display_id != other.display_id
            || self.url != other.url
            || self.sponsors != other.sponsors
            || self.same_as != other.same_as
            || self.substituted_by != other.substituted_by
            || self.introduced_date != other.introduced_date
    }

    /// Stamp a freshly fetched snapshot with the bookkeeping of the stored one.
    ///
    /// `added` carries over, `last_checked` becomes `now`, and
    /// `last_modified` only moves when content changed.
    #[must_use]
    pub fn refreshed(previous: &Self, mut incoming: Self, now: DateTime<Utc>) -> Self {
        incoming.last_modified = if previous.content_differs(&incoming) {
            now
        } else {
            previous.last_modified
        };
        incoming.added = previous.added;
        incoming.last_checked = now;
        incoming
    }

    /// Stamp a snapshot that is about to be stored for the first time.
    #[must_use]
    pub fn created(mut incoming: Self, now: DateTime<Utc>) -> Self {
        incoming.added = now;
        incoming.last_modified = now;
        incoming.last_checked = now;
        incoming
    }
}
