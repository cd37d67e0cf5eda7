//! Resolvers: one adapter per legislative body.
//!
//! A [`Resolver`] turns a public URL into a canonical [`Legislation`] record
//! and re-fetches records by id. Optional capabilities (member rosters,
//! scorecards) are exposed through accessor methods so callers can ask a
//! resolver what it supports without downcasting.
//!
//! - [`BodyResolver`] - Grammar plus data source for one body
//! - [`Registry`] - Routes URLs and ids to the right resolver

use async_trait::async_trait;
use lt_core::{
    Body, BodyId, IdError, Legislation, LegislationId, Member, Scorable, Scorecard, Session,
};
use thiserror::Error;
use url::Url;

use crate::source::SourceError;

mod body;
mod registry;

pub use body::BodyResolver;
pub use registry::Registry;

/// Optional behaviour a resolver can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Members,
    Scorecard,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Members => write!(f, "members"),
            Self::Scorecard => write!(f, "scorecard"),
        }
    }
}

/// Errors from resolving or refreshing legislation.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no resolver registered for body {0}")]
    UnknownBody(BodyId),

    #[error("resolver for body {0} is already registered")]
    DuplicateBody(BodyId),

    #[error(transparent)]
    MalformedIdentifier(#[from] IdError),

    #[error("{body}: {source}")]
    Remote {
        body: BodyId,
        #[source]
        source: SourceError,
    },

    #[error("{body}: source answered {got} for {requested}")]
    Mismatch {
        body: BodyId,
        requested: LegislationId,
        got: LegislationId,
    },

    #[error("{body} cannot score {item} from {other}")]
    ForeignItem {
        body: BodyId,
        other: BodyId,
        item: LegislationId,
    },

    #[error("{body} does not support {capability}")]
    Unsupported { body: BodyId, capability: Capability },

    #[error("{body} has no session covering {year}")]
    NoSession { body: BodyId, year: i32 },
}

impl ResolveError {
    /// Whether trying again later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

/// Adapter for one legislative body.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Static configuration of the body this resolver serves.
    fn body(&self) -> &Body;

    /// Resolve a public URL. `Ok(None)` when the URL is not one of this
    /// body's, or names an item the source does not know.
    async fn lookup(&self, url: &Url) -> Result<Option<Legislation>, ResolveError>;

    /// Fetch the current snapshot of an item by canonical id.
    async fn refresh(&self, id: &LegislationId) -> Result<Legislation, ResolveError>;

    fn capabilities(&self) -> &[Capability] {
        &[]
    }

    fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    fn as_members(&self) -> Option<&dyn MembersResolver> {
        None
    }

    fn as_scorecard(&self) -> Option<&dyn ScorecardResolver> {
        None
    }
}

/// Roster lookup for a session.
#[async_trait]
pub trait MembersResolver: Send + Sync {
    async fn members(&self, session: Session) -> Result<Vec<Member>, ResolveError>;
}

/// Scorecard assembly for a set of tracked items.
#[async_trait]
pub trait ScorecardResolver: Send + Sync {
    /// Build a scorecard for the body's current session. Columns follow
    /// `items` order.
    async fn scorecard(
        &self,
        items: &[&(dyn Scorable + Sync)],
    ) -> Result<Scorecard, ResolveError>;
}
