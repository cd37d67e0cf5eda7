//! Legislative bodies: static configuration loaded once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::session::Sessions;

/// Opaque key for a legislative body (e.g. `"us-house"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(String);

impl BodyId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BodyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BodyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifiers of the built-in bodies.
pub mod known {
    pub const US_HOUSE: &str = "us-house";
    pub const US_SENATE: &str = "us-senate";
    pub const NY_SENATE: &str = "ny-senate";
    pub const NY_ASSEMBLY: &str = "ny-assembly";
    pub const NYC_COUNCIL: &str = "nyc-council";
}

/// Static configuration for one chamber or council.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub location: String,
    pub url: String,
    /// The other chamber of a bicameral legislature, if any.
    pub bicameral: Option<BodyId>,
    /// How members are addressed ("Senator", "Council Member", ...).
    pub member_label: String,
    pub sessions: Sessions,
}

impl Body {
    #[must_use]
    pub const fn is_bicameral(&self) -> bool {
        self.bicameral.is_some()
    }
}

/// Immutable catalogue of bodies, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Bodies {
    order: Vec<BodyId>,
    by_id: HashMap<BodyId, Body>,
}

/// Last year the built-in session calendars extend to.
const CALENDAR_HORIZON: i32 = 2030;

impl Bodies {
    /// Build a catalogue. Later duplicates of an id replace earlier ones.
    #[must_use]
    pub fn new(bodies: impl IntoIterator<Item = Body>) -> Self {
        let mut order = Vec::new();
        let mut by_id = HashMap::new();
        for body in bodies {
            if !by_id.contains_key(&body.id) {
                order.push(body.id.clone());
            }
            by_id.insert(body.id.clone(), body);
        }
        Self { order, by_id }
    }

    /// The bodies tracked out of the box.
    #[must_use]
    pub fn builtin() -> Self {
        let two_year = Sessions::every(2, 2015, CALENDAR_HORIZON);
        let council = Sessions::new(vec![
            crate::Session::new(2014, 2017),
            crate::Session::new(2018, 2021),
            crate::Session::new(2022, 2023),
            crate::Session::new(2024, 2025),
            crate::Session::new(2026, 2029),
        ]);

        Self::new([
            Body {
                id: known::US_HOUSE.into(),
                name: "U.S. House of Representatives".into(),
                location: "United States".into(),
                url: "https://www.congress.gov".into(),
                bicameral: Some(known::US_SENATE.into()),
                member_label: "Representative".into(),
                sessions: two_year.clone(),
            },
            Body {
                id: known::US_SENATE.into(),
                name: "U.S. Senate".into(),
                location: "United States".into(),
                url: "https://www.congress.gov".into(),
                bicameral: Some(known::US_HOUSE.into()),
                member_label: "Senator".into(),
                sessions: two_year.clone(),
            },
            Body {
                id: known::NY_SENATE.into(),
                name: "NY State Senate".into(),
                location: "New York State".into(),
                url: "https://www.nysenate.gov".into(),
                bicameral: Some(known::NY_ASSEMBLY.into()),
                member_label: "Senator".into(),
                sessions: two_year.clone(),
            },
            Body {
                id: known::NY_ASSEMBLY.into(),
                name: "NY State Assembly".into(),
                location: "New York State".into(),
                url: "https://nyassembly.gov".into(),
                bicameral: Some(known::NY_SENATE.into()),
                member_label: "Assembly Member".into(),
                sessions: two_year,
            },
            Body {
                id: known::NYC_COUNCIL.into(),
                name: "NYC Council".into(),
                location: "New York City".into(),
                url: "https://council.nyc.gov".into(),
                bicameral: None,
                member_label: "Council Member".into(),
                sessions: council,
            },
        ])
    }

    #[must_use]
    pub fn get(&self, id: &BodyId) -> Option<&Body> {
        self.by_id.get(id)
    }

    /// The companion chamber of `id`, if `id` is bicameral and the companion
    /// is in the catalogue.
    #[must_use]
    pub fn companion(&self, id: &BodyId) -> Option<&Body> {
        self.get(id)
            .and_then(|body| body.bicameral.as_ref())
            .and_then(|other| self.get(other))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
