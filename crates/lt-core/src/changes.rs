//! Append-only sponsor change log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::member::{Member, MemberKey};

/// One observed sponsorship transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorChange {
    pub member: Member,
    pub date: DateTime<Utc>,
    /// `false`: newly sponsored. `true`: sponsorship disappeared.
    pub withdraw: bool,
}

impl SponsorChange {
    #[must_use]
    pub const fn added(member: Member, date: DateTime<Utc>) -> Self {
        Self {
            member,
            date,
            withdraw: false,
        }
    }

    #[must_use]
    pub const fn withdrawn(member: Member, date: DateTime<Utc>) -> Self {
        Self {
            member,
            date,
            withdraw: true,
        }
    }

    /// Merge key: one entry per member per direction.
    #[must_use]
    pub fn merge_key(&self) -> (MemberKey, bool) {
        (self.member.key(), self.withdraw)
    }
}

/// Sponsor history for one `(body, id)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    #[serde(default)]
    pub sponsors: Vec<SponsorChange>,
}

impl Changes {
    /// Set-union `incoming` into the log.
    ///
    /// Existing entries are never replaced or reordered; entries whose
    /// `(member key, withdraw)` is already present are dropped. Returns the
    /// number of entries appended.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = SponsorChange>) -> usize {
        let mut seen: HashSet<(MemberKey, bool)> =
            self.sponsors.iter().map(SponsorChange::merge_key).collect();
        let before = self.sponsors.len();
        for change in incoming {
            if seen.insert(change.merge_key()) {
                self.sponsors.push(change);
            }
        }
        self.sponsors.len() - before
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sponsors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sponsors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member(id: i64) -> Member {
        Member {
            numeric_id: id,
            ..Member::default()
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn merge_appends_new_entries() {
        let mut log = Changes::default();
        let added = log.merge([
            SponsorChange::added(member(1), day(1)),
            SponsorChange::added(member(2), day(1)),
        ]);
        assert_eq!(added, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let batch = vec![
            SponsorChange::added(member(1), day(1)),
            SponsorChange::withdrawn(member(3), day(1)),
        ];
        let mut once = Changes::default();
        once.merge(batch.clone());
        let mut twice = once.clone();
        assert_eq!(twice.merge(batch), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn reobservation_keeps_original_date() {
        let mut log = Changes::default();
        log.merge([SponsorChange::added(member(1), day(1))]);
        log.merge([SponsorChange::added(member(1), day(9))]);
        assert_eq!(log.sponsors, vec![SponsorChange::added(member(1), day(1))]);
    }

    #[test]
    fn add_and_withdraw_of_same_member_are_distinct() {
        let mut log = Changes::default();
        log.merge([SponsorChange::added(member(1), day(1))]);
        let added = log.merge([SponsorChange::withdrawn(member(1), day(2))]);
        assert_eq!(added, 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn duplicates_within_one_batch_collapse() {
        let mut log = Changes::default();
        let added = log.merge([
            SponsorChange::added(member(1), day(1)),
            SponsorChange::added(member(1), day(2)),
        ]);
        assert_eq!(added, 1);
    }
}
