//! Sponsor change detection between two snapshots of the same bill.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::changes::SponsorChange;
use crate::legislation::Legislation;
use crate::member::{Member, MemberKey};

/// Compare two snapshots of the same `(body, id)` and report sponsorship
/// transitions, dated `now`.
///
/// Additions come first in `incoming`'s order, then withdrawals in
/// `previous`'s order. Members present in both (by [`Member::key`]) produce
/// nothing even if their names or districts changed.
#[must_use]
pub fn diff(
    previous: &Legislation,
    incoming: &Legislation,
    now: DateTime<Utc>,
) -> Vec<SponsorChange> {
    diff_sponsors(&previous.sponsors, &incoming.sponsors, now)
}

/// [`diff`] over bare sponsor lists.
#[must_use]
pub fn diff_sponsors(
    previous: &[Member],
    incoming: &[Member],
    now: DateTime<Utc>,
) -> Vec<SponsorChange> {
    let before: HashSet<MemberKey> = previous.iter().map(Member::key).collect();
    let after: HashSet<MemberKey> = incoming.iter().map(Member::key).collect();

    // A source listing someone twice still yields one change.
    let mut emitted = HashSet::new();
    let mut changes = Vec::new();

    for member in incoming {
        let key = member.key();
        if !before.contains(&key) && emitted.insert((key, false)) {
            changes.push(SponsorChange::added(member.clone(), now));
        }
    }
    for member in previous {
        let key = member.key();
        if !after.contains(&key) && emitted.insert((key, true)) {
            changes.push(SponsorChange::withdrawn(member.clone(), now));
        }
    }
    changes
}
