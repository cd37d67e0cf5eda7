//! Legislative sessions: the time-bounded terms a bill belongs to.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A legislature's term, inclusive on both ends (e.g. 2023-2024).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Session {
    pub start_year: i32,
    pub end_year: i32,
}

impl Session {
    #[must_use]
    pub const fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    /// Whether `year` falls within this session.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.start_year <= year && year <= self.end_year
    }

    /// Whether the session spans the current date.
    #[must_use]
    pub fn active(&self) -> bool {
        self.contains(Utc::now().year())
    }

    /// Whether the session has not yet ended as of `year`.
    ///
    /// This is the refresh-candidate test: a session that has not started yet
    /// still counts as open.
    #[must_use]
    pub const fn is_open_at(&self, year: i32) -> bool {
        self.end_year >= year
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

/// Error returned when a string is not a `start-end` session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid session {0:?}: expected START-END years")]
pub struct SessionParseError(String);

impl FromStr for Session {
    type Err = SessionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SessionParseError(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(err)?;
        let start_year: i32 = start.trim().parse().map_err(|_| err())?;
        let end_year: i32 = end.trim().parse().map_err(|_| err())?;
        if end_year < start_year {
            return Err(err());
        }
        Ok(Self::new(start_year, end_year))
    }
}

/// A body's session calendar, kept ordered by start year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sessions(Vec<Session>);

impl Sessions {
    #[must_use]
    pub fn new(mut sessions: Vec<Session>) -> Self {
        sessions.sort();
        sessions.dedup();
        Self(sessions)
    }

    /// Consecutive sessions of `length` years starting at `first` through the
    /// session containing `last_year`.
    #[must_use]
    pub fn every(length: i32, first: i32, last_year: i32) -> Self {
        let length = length.max(1);
        let mut sessions = Vec::new();
        let mut start = first;
        while start <= last_year {
            sessions.push(Session::new(start, start + length - 1));
            start += length;
        }
        Self(sessions)
    }

    /// Find the session containing `year`.
    #[must_use]
    pub fn find(&self, year: i32) -> Option<Session> {
        self.0.iter().copied().find(|s| s.contains(year))
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current_at(Utc::now().year())
    }

    #[must_use]
    pub fn current_at(&self, year: i32) -> Option<Session> {
        self.find(year)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
