//! Per-user scorecards built from bookmarks.

use std::sync::Arc;

use lt_core::{BodyId, Scorable, ScoredBookmark, Scorecard};
use tracing::{info, warn};
use uuid::Uuid;

use crate::resolver::{Capability, Registry, ResolveError};
use crate::store::{LegislationStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ScorecardError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct ScorecardService {
    registry: Arc<Registry>,
    store: Arc<dyn LegislationStore>,
}

impl ScorecardService {
    pub fn new(registry: Arc<Registry>, store: Arc<dyn LegislationStore>) -> Self {
        Self { registry, store }
    }

    /// A user's bookmarks in `body` joined with the stored legislation they
    /// point at. Bookmarks whose legislation is not stored are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn bookmarks_for(
        &self,
        user_id: Uuid,
        body: &BodyId,
    ) -> Result<Vec<ScoredBookmark>, ScorecardError> {
        let mut scored = Vec::new();
        for bookmark in self.store.get_bookmarks(user_id, body).await? {
            match self
                .store
                .get_bill(&bookmark.body, &bookmark.legislation_id)
                .await?
            {
                Some(legislation) => scored.push(ScoredBookmark {
                    bookmark,
                    legislation,
                }),
                None => warn!(
                    body = %bookmark.body,
                    id = %bookmark.legislation_id,
                    "bookmark points at untracked legislation"
                ),
            }
        }
        Ok(scored)
    }

    /// Scorecard of `body`'s current roster against the user's bookmarks.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Unsupported`] if the body's resolver cannot
    /// build scorecards, or any error raised while building one.
    pub async fn for_user(
        &self,
        user_id: Uuid,
        body: &BodyId,
    ) -> Result<Scorecard, ScorecardError> {
        let resolver = self.registry.resolver(body)?;
        let Some(scorer) = resolver.as_scorecard() else {
            return Err(ResolveError::Unsupported {
                body: body.clone(),
                capability: Capability::Scorecard,
            }
            .into());
        };

        let bookmarks = self.bookmarks_for(user_id, body).await?;
        let items: Vec<&(dyn Scorable + Sync)> = bookmarks
            .iter()
            .map(|b| b as &(dyn Scorable + Sync))
            .collect();
        let scorecard = scorer.scorecard(&items).await?;

        info!(
            %body,
            %user_id,
            people = scorecard.people.len(),
            items = scorecard.items.len(),
            "built scorecard"
        );
        Ok(scorecard)
    }
}
