//! Scorecards and whip counts: how closely legislators line up with a set of
//! tracked positions.
//!
//! A [`Scorecard`] is a person × item matrix. Each cell is a [`Score`]: what
//! the person actually did on the item (`"Sponsor"`, `"Aye"`, `"Nay"`, ...)
//! and whether the tracker wanted the item to pass. A [`WhipCount`] folds any
//! collection of scores into totals; the same reducer runs across a row
//! (one legislator over the agenda) and down a column (a chamber on one
//! item).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::body::BodyId;
use crate::bookmark::Bookmark;
use crate::legislation::{Legislation, LegislationId};
use crate::member::{Member, MemberKey};
use crate::session::Session;

const AFFIRMATIVE: [&str; 3] = ["affirmative", "aye", "sponsor"];
const NEGATIVE: [&str; 2] = ["negative", "nay"];

fn matches_any(status: &str, words: &[&str]) -> bool {
    words.iter().any(|w| status.eq_ignore_ascii_case(w))
}

/// One cell of a scorecard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Observed position, as the source spells it. Empty when unknown.
    pub status: String,
    /// Whether the tracker wants the item to pass.
    pub desired: bool,
}

impl Score {
    #[must_use]
    pub fn new(status: impl Into<String>, desired: bool) -> Self {
        Self {
            status: status.into(),
            desired,
        }
    }

    /// `+1` when the position lines up with the desired outcome, `-1` when it
    /// works against it, `0` when it is neither (absent, excused, ...).
    #[must_use]
    pub fn score(&self) -> i32 {
        let status = self.status.as_str();
        if matches_any(status, &AFFIRMATIVE) {
            if self.desired {
                1
            } else {
                -1
            }
        } else if matches_any(status, &NEGATIVE) {
            if self.desired {
                -1
            } else {
                1
            }
        } else {
            0
        }
    }

    /// Presentation class for the observed position.
    #[must_use]
    pub fn css(&self) -> &'static str {
        let status = self.status.as_str();
        if matches_any(status, &AFFIRMATIVE) {
            "affirmative"
        } else if matches_any(status, &NEGATIVE) {
            "negative"
        } else if status.is_empty() {
            ""
        } else {
            "excused"
        }
    }
}

/// Totals over a collection of scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhipCount {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
}

impl WhipCount {
    pub fn tally<'a>(scores: impl IntoIterator<Item = &'a Score>) -> Self {
        let mut count = Self::default();
        for score in scores {
            count.add(score);
        }
        count
    }

    pub fn add(&mut self, score: &Score) {
        self.total += 1;
        match score.score() {
            1 => self.correct += 1,
            -1 => self.incorrect += 1,
            _ => {}
        }
    }

    /// Share of scores in line with the desired position, `0..=100`.
    #[must_use]
    pub fn percent_correct(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * f64::from(self.correct) / f64::from(self.total)
    }

    /// Net alignment, `-100..=100`.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 * (f64::from(self.correct) - f64::from(self.incorrect)) / f64::from(self.total)
    }
}

/// Anything that can be a scorecard column.
pub trait Scorable {
    fn body(&self) -> &BodyId;
    fn legislation_id(&self) -> &LegislationId;
    /// The tracker wants this item to fail.
    fn oppose(&self) -> bool;
}

impl Scorable for Bookmark {
    fn body(&self) -> &BodyId {
        &self.body
    }

    fn legislation_id(&self) -> &LegislationId {
        &self.legislation_id
    }

    fn oppose(&self) -> bool {
        self.oppose
    }
}

/// A bookmark joined with the stored item it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredBookmark {
    pub bookmark: Bookmark,
    pub legislation: Legislation,
}

impl Scorable for ScoredBookmark {
    fn body(&self) -> &BodyId {
        &self.legislation.body
    }

    fn legislation_id(&self) -> &LegislationId {
        &self.legislation.id
    }

    fn oppose(&self) -> bool {
        self.bookmark.oppose
    }
}

/// Input column: an item, the tracked stance, and each member's observed
/// position keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct ScorecardItem {
    pub legislation: Legislation,
    pub oppose: bool,
    pub positions: HashMap<MemberKey, String>,
}

/// Output column with the chamber-wide whip count for the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredColumn {
    pub legislation: Legislation,
    pub oppose: bool,
    pub whip_count: WhipCount,
}

/// One row: a legislator's scores across every column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardPerson {
    pub member: Member,
    pub scores: Vec<Score>,
    pub whip_count: WhipCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub body: BodyId,
    pub session: Session,
    pub people: Vec<ScorecardPerson>,
    pub items: Vec<ScoredColumn>,
}

impl Scorecard {
    /// Build the matrix for a fixed roster. Rows follow `people`, columns
    /// follow `items`.
    #[must_use]
    pub fn build(
        body: BodyId,
        session: Session,
        people: Vec<Member>,
        items: Vec<ScorecardItem>,
    ) -> Self {
        let mut columns: Vec<WhipCount> = vec![WhipCount::default(); items.len()];

        let people: Vec<ScorecardPerson> = people
            .into_iter()
            .map(|member| {
                let key = member.key();
                let scores: Vec<Score> = items
                    .iter()
                    .map(|item| Score {
                        status: item.positions.get(&key).cloned().unwrap_or_default(),
                        desired: !item.oppose,
                    })
                    .collect();
                for (column, score) in columns.iter_mut().zip(&scores) {
                    column.add(score);
                }
                ScorecardPerson {
                    whip_count: WhipCount::tally(&scores),
                    member,
                    scores,
                }
            })
            .collect();

        let items = items
            .into_iter()
            .zip(columns)
            .map(|(item, whip_count)| ScoredColumn {
                legislation: item.legislation,
                oppose: item.oppose,
                whip_count,
            })
            .collect();

        Self {
            body,
            session,
            people,
            items,
        }
    }

    #[must_use]
    pub fn person(&self, key: &MemberKey) -> Option<&ScorecardPerson> {
        self.people.iter().find(|p| &p.member.key() == key)
    }
}
