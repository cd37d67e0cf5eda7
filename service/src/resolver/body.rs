//! Generic resolver: an identifier grammar paired with a data source.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use lt_core::{
    Body, IdGrammar, Legislation, LegislationId, Member, MemberKey, Scorable, Scorecard,
    ScorecardItem, Session,
};
use tracing::{debug, instrument};
use url::Url;

use super::{Capability, MembersResolver, ResolveError, Resolver, ScorecardResolver};
use crate::source::{SourceClient, SourceError};

const SPONSOR_POSITION: &str = "Sponsor";

/// Resolver for one body backed by a [`SourceClient`].
///
/// The grammar decides which URLs belong to the body and fills in the
/// display id, canonical URL, session and kind whenever the source leaves
/// them out.
pub struct BodyResolver {
    body: Body,
    grammar: Box<dyn IdGrammar>,
    client: Arc<dyn SourceClient>,
    capabilities: Vec<Capability>,
    scorecard_concurrency: usize,
}

impl BodyResolver {
    pub fn new(
        body: Body,
        grammar: impl IdGrammar + 'static,
        client: Arc<dyn SourceClient>,
    ) -> Self {
        Self {
            body,
            grammar: Box::new(grammar),
            client,
            capabilities: Vec::new(),
            scorecard_concurrency: 5,
        }
    }

    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Bound on per-item fetches while assembling a scorecard.
    #[must_use]
    pub fn with_scorecard_concurrency(mut self, limit: usize) -> Self {
        self.scorecard_concurrency = limit.max(1);
        self
    }

    fn remote(&self, source: SourceError) -> ResolveError {
        ResolveError::Remote {
            body: self.body.id.clone(),
            source,
        }
    }

    /// Pin a fetched record to this body and fill whatever the source omitted.
    fn normalize(
        &self,
        requested: &LegislationId,
        mut legislation: Legislation,
    ) -> Result<Legislation, ResolveError> {
        if legislation.id.is_empty() {
            legislation.id = requested.clone();
        }
        if &legislation.id != requested {
            return Err(ResolveError::Mismatch {
                body: self.body.id.clone(),
                requested: requested.clone(),
                got: legislation.id,
            });
        }

        legislation.body = self.body.id.clone();
        legislation.kind = self.grammar.kind(requested)?;
        if legislation.display_id.is_empty() {
            legislation.display_id = self.grammar.display_id(requested)?;
        }
        if legislation.url.is_empty() {
            legislation.url = self.grammar.url_for(requested)?;
        }
        if legislation.session == Session::default() {
            let year = self.grammar.session_year(requested)?;
            let session = self.body.sessions.find(year);
            legislation.session = session.ok_or_else(|| ResolveError::NoSession {
                body: self.body.id.clone(),
                year,
            })?;
        }

        // Only bicameral bodies have companions
        if !self.body.is_bicameral() || legislation.companion_id().is_none() {
            legislation.same_as = None;
        }

        Ok(legislation)
    }

    async fn scorecard_item(
        &self,
        item: &(dyn Scorable + Sync),
    ) -> Result<ScorecardItem, ResolveError> {
        if item.body() != &self.body.id {
            return Err(ResolveError::ForeignItem {
                body: self.body.id.clone(),
                other: item.body().clone(),
                item: item.legislation_id().clone(),
            });
        }

        let legislation = self.refresh(item.legislation_id()).await?;
        let votes = self
            .client
            .fetch_votes(item.legislation_id())
            .await
            .map_err(|e| self.remote(e))?;

        let mut positions: HashMap<MemberKey, String> = legislation
            .sponsors
            .iter()
            .map(|m| (m.key(), SPONSOR_POSITION.to_string()))
            .collect();
        // A recorded vote outranks sponsorship
        for vote in votes {
            positions.insert(vote.member.key(), vote.status);
        }

        Ok(ScorecardItem {
            legislation,
            oppose: item.oppose(),
            positions,
        })
    }
}

#[async_trait]
impl Resolver for BodyResolver {
    fn body(&self) -> &Body {
        &self.body
    }

    async fn lookup(&self, url: &Url) -> Result<Option<Legislation>, ResolveError> {
        let Some(id) = self.grammar.from_url(url) else {
            return Ok(None);
        };

        match self.refresh(&id).await {
            Ok(legislation) => Ok(Some(legislation)),
            Err(ResolveError::Remote {
                source: SourceError::NotFound(_),
                ..
            }) => {
                debug!(body = %self.body.id, %id, "url matched but source has no such item");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(body = %self.body.id))]
    async fn refresh(&self, id: &LegislationId) -> Result<Legislation, ResolveError> {
        self.grammar.validate(id)?;
        let fetched = self
            .client
            .fetch_legislation(id)
            .await
            .map_err(|e| self.remote(e))?;
        self.normalize(id, fetched)
    }

    fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    fn as_members(&self) -> Option<&dyn MembersResolver> {
        if self.supports(Capability::Members) {
            Some(self)
        } else {
            None
        }
    }

    fn as_scorecard(&self) -> Option<&dyn ScorecardResolver> {
        if self.supports(Capability::Scorecard) {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl MembersResolver for BodyResolver {
    async fn members(&self, session: Session) -> Result<Vec<Member>, ResolveError> {
        self.client
            .fetch_members(session)
            .await
            .map_err(|e| self.remote(e))
    }
}

#[async_trait]
impl ScorecardResolver for BodyResolver {
    #[instrument(skip_all, fields(body = %self.body.id, items = items.len()))]
    async fn scorecard(
        &self,
        items: &[&(dyn Scorable + Sync)],
    ) -> Result<Scorecard, ResolveError> {
        let year = Utc::now().year();
        let session = self
            .body
            .sessions
            .current_at(year)
            .ok_or_else(|| ResolveError::NoSession {
                body: self.body.id.clone(),
                year,
            })?;

        let people = self.members(session).await?;

        let fetches: Vec<_> = items
            .iter()
            .map(|&item| self.scorecard_item(item))
            .collect();
        let columns: Vec<ScorecardItem> = stream::iter(fetches)
            .buffered(self.scorecard_concurrency)
            .try_collect()
            .await?;

        debug!(people = people.len(), columns = columns.len(), "scorecard assembled");
        Ok(Scorecard::build(self.body.id.clone(), session, people, columns))
    }
}
