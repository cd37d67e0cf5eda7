//! Persistence seam for legislation, sponsor-change logs and bookmarks.
//!
//! The engine only talks to [`LegislationStore`]. [`MemoryStore`] keeps
//! everything in memory and can be snapshotted to a JSON file, which is what
//! the operator CLI uses between runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lt_core::{Bookmark, BodyId, Changes, Legislation, LegislationId, SponsorChange};
use uuid::Uuid;

mod memory;

pub use memory::MemoryStore;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("legislation {body}/{id} not found")]
    NotFound { body: BodyId, id: LegislationId },
    #[error("snapshot encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations the refresh engine and reconciler rely on.
#[async_trait]
pub trait LegislationStore: Send + Sync {
    /// Up to `limit` bills last checked before `checked_before` whose session
    /// is still open in `current_year`, least recently checked first.
    /// A non-empty `bodies` restricts the selection to those bodies.
    async fn get_stale_bills(
        &self,
        limit: usize,
        checked_before: DateTime<Utc>,
        current_year: i32,
        bodies: &[BodyId],
    ) -> Result<Vec<Legislation>, StoreError>;

    async fn get_bill(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Option<Legislation>, StoreError>;

    /// Insert a bill, or overwrite the stored one keeping its `added` stamp.
    ///
    /// Returns whether the bill names a companion that is not stored yet.
    async fn save_bill(&self, bill: &Legislation) -> Result<bool, StoreError>;

    /// Replace `previous` with `updated`.
    ///
    /// Returns whether `updated` names a companion that is not stored yet.
    async fn update_bill(
        &self,
        previous: &Legislation,
        updated: &Legislation,
    ) -> Result<bool, StoreError>;

    async fn get_changes(&self, body: &BodyId, id: &LegislationId)
        -> Result<Changes, StoreError>;

    /// Union `changes` into the stored log. Returns how many were new.
    async fn save_changes(
        &self,
        body: &BodyId,
        id: &LegislationId,
        changes: &[SponsorChange],
    ) -> Result<usize, StoreError>;

    /// Visit every stored bill. The callback runs without holding store locks.
    async fn for_each_bill(
        &self,
        visit: &mut (dyn for<'b> FnMut(&'b Legislation) + Send),
    ) -> Result<(), StoreError>;

    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError>;

    /// A user's bookmarks in one body, oldest first.
    async fn get_bookmarks(&self, user_id: Uuid, body: &BodyId)
        -> Result<Vec<Bookmark>, StoreError>;
}
