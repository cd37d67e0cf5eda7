//! Error type shared by the refresh, reconcile and ingest paths.

use std::fmt;
use std::time::Duration;

use lt_core::{BodyId, LegislationId};

use crate::limiter::LimiterError;
use crate::resolver::ResolveError;
use crate::store::StoreError;

/// Failure of one unit of refresh work.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no refresh slot within {0:?}")]
    CapacityTimeout(Duration),

    #[error("refresh cancelled")]
    Cancelled,

    #[error("refresh task failed: {0}")]
    TaskFailed(String),
}

impl From<LimiterError> for RefreshError {
    fn from(err: LimiterError) -> Self {
        match err {
            LimiterError::Timeout(waited) => Self::CapacityTimeout(waited),
            LimiterError::Closed => Self::Cancelled,
        }
    }
}

impl RefreshError {
    /// Whether the next scheduled run could reasonably succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Resolve(e) => e.is_retryable(),
            Self::Store(StoreError::Unavailable(_) | StoreError::Io(_))
            | Self::CapacityTimeout(_)
            | Self::Cancelled => true,
            Self::Store(_) | Self::TaskFailed(_) => false,
        }
    }
}

/// A failure attributed to one item.
#[derive(Debug)]
pub struct ItemError {
    pub body: BodyId,
    pub id: LegislationId,
    pub error: RefreshError,
}

impl ItemError {
    #[must_use]
    pub const fn new(body: BodyId, id: LegislationId, error: RefreshError) -> Self {
        Self { body, id, error }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.body, self.id, self.error)
    }
}
