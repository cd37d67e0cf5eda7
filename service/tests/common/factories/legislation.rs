//! `Legislation` and `Member` factories.

use chrono::{DateTime, Duration, Utc};
use lt_core::ids::{CouncilGrammar, NyStateGrammar};
use lt_core::{known, Bodies, IdGrammar, Legislation, LegislationId, Member, Session};

/// The session of `body` that covers today.
///
/// # Panics
///
/// Panics if the built-in calendar does not cover today.
pub fn current_session(body: &str) -> Session {
    Bodies::builtin()
        .get(&body.into())
        .and_then(|b| b.sessions.current())
        .expect("built-in calendar covers today")
}

/// A member identified by slug, with a readable name.
pub fn member(slug: &str) -> Member {
    Member {
        slug: slug.to_string(),
        full_name: format!("Member {slug}"),
        short_name: slug.to_string(),
        ..Default::default()
    }
}

/// Builder for legislation in the current session of a built-in body.
///
/// # Examples
///
/// ```rust
/// // A senate bill last checked two days ago
/// let bill = LegislationFactory::ny_senate(1).stale().build();
///
/// // Its assembly companion
/// let companion = LegislationFactory::ny_assembly(1).build();
/// let bill = LegislationFactory::ny_senate(1).same_as(&companion.id).build();
/// ```
pub struct LegislationFactory {
    bill: Legislation,
}

impl LegislationFactory {
    /// Display id and URL are rendered the way the resolver would.
    fn new(body: &str, id: String, grammar: &dyn IdGrammar) -> Self {
        let now = Utc::now();
        let id = LegislationId::new(id);
        Self {
            bill: Legislation {
                body: body.into(),
                display_id: grammar.display_id(&id).expect("factory id is canonical"),
                url: grammar.url_for(&id).expect("factory id is canonical"),
                kind: grammar.kind(&id).expect("factory id is canonical"),
                id,
                title: "An act to amend the test law".into(),
                status: "In Committee".into(),
                session: current_session(body),
                added: now,
                last_modified: now,
                last_checked: now,
                ..Default::default()
            },
        }
    }

    #[must_use]
    pub fn ny_senate(number: u32) -> Self {
        let session = current_session(known::NY_SENATE);
        Self::new(
            known::NY_SENATE,
            format!("{}-S{number}", session.start_year),
            &NyStateGrammar::senate(),
        )
    }

    #[must_use]
    pub fn ny_assembly(number: u32) -> Self {
        let session = current_session(known::NY_ASSEMBLY);
        Self::new(
            known::NY_ASSEMBLY,
            format!("{}-A{number}", session.start_year),
            &NyStateGrammar::assembly(),
        )
    }

    #[must_use]
    pub fn council(number: u32) -> Self {
        let session = current_session(known::NYC_COUNCIL);
        Self::new(
            known::NYC_COUNCIL,
            format!("{}-{number:04}", session.start_year),
            &CouncilGrammar,
        )
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.bill.title = title.to_string();
        self
    }

    #[must_use]
    pub fn with_sponsors(mut self, sponsors: Vec<Member>) -> Self {
        self.bill.sponsors = sponsors;
        self
    }

    #[must_use]
    pub fn same_as(mut self, id: &LegislationId) -> Self {
        self.bill.same_as = Some(id.clone());
        self
    }

    /// Stamp the bookkeeping as if the bill was last checked at `at`.
    #[must_use]
    pub fn checked_at(mut self, at: DateTime<Utc>) -> Self {
        self.bill.added = at;
        self.bill.last_modified = at;
        self.bill.last_checked = at;
        self
    }

    /// Last checked two days ago.
    #[must_use]
    pub fn stale(self) -> Self {
        self.checked_at(Utc::now() - Duration::days(2))
    }

    #[must_use]
    pub fn build(self) -> Legislation {
        self.bill
    }
}
