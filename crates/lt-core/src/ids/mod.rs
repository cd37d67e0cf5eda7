//! Per-body identifier grammars.
//!
//! Each legislative body spells its bill numbers differently. A grammar
//! validates the canonical [`LegislationId`] form, recognises the body's
//! public URLs, and renders the human display id and canonical URL. These
//! are pure functions; fetching lives with the resolvers.
//!
//! | Body              | Canonical id   | Display      |
//! |-------------------|----------------|--------------|
//! | U.S. Congress     | `118-hr1234`   | `H.R. 1234`  |
//! | NY State          | `2021-S5130`   | `S5130`      |
//! | NYC Council       | `2022-0123`    | `Int 0123-2022` |

use url::Url;

use crate::legislation::{LegislationId, LegislationType};

mod congress;
pub use congress::{CongressBill, CongressBillKind, CongressChamber, CongressGrammar};

mod ny_state;
pub use ny_state::{NyBill, NyChamber, NyStateGrammar};

mod council;
pub use council::{CouncilGrammar, CouncilIntro};

/// A [`LegislationId`] that does not match its body's grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {grammar} identifier {id:?}: {reason}")]
pub struct IdError {
    grammar: &'static str,
    id: String,
    reason: &'static str,
}

impl IdError {
    pub(crate) fn new(grammar: &'static str, id: &str, reason: &'static str) -> Self {
        Self {
            grammar,
            id: id.to_string(),
            reason,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn grammar(&self) -> &'static str {
        self.grammar
    }
}

/// The identifier rules for one body.
pub trait IdGrammar: Send + Sync + std::fmt::Debug {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    /// Check `id` against the grammar.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if `id` is not a canonical identifier of this body.
    fn validate(&self, id: &LegislationId) -> Result<(), IdError>;

    /// Extract a canonical id from one of the body's public URLs.
    ///
    /// Returns `None` for URLs belonging to other bodies.
    fn from_url(&self, url: &Url) -> Option<LegislationId>;

    /// Human-facing id (e.g. `"H.R. 1234"`).
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if `id` is malformed.
    fn display_id(&self, id: &LegislationId) -> Result<String, IdError>;

    /// Canonical public URL of the item.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if `id` is malformed.
    fn url_for(&self, id: &LegislationId) -> Result<String, IdError>;

    /// First calendar year of the session the id belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if `id` is malformed.
    fn session_year(&self, id: &LegislationId) -> Result<i32, IdError>;

    /// Bill or resolution, as encoded in the id.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if `id` is malformed.
    fn kind(&self, id: &LegislationId) -> Result<LegislationType, IdError>;
}

/// Whether `url`'s host is `domain` or `www.domain`.
fn host_is(url: &Url, domain: &str) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == domain || host.strip_prefix("www.") == Some(domain)
    })
}

/// Non-empty path segments of `url`.
fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}
