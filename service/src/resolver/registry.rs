//! Resolver registry: routes URLs and ids to the body that owns them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use lt_core::ids::{CongressGrammar, CouncilGrammar, NyStateGrammar};
use lt_core::{known, Bodies, Body, BodyId, Legislation, LegislationId};
use tracing::{debug, info, warn};
use url::Url;

use super::{BodyResolver, Capability, ResolveError, Resolver};
use crate::config::Config;
use crate::source::{HttpSourceClient, SourceClient};

/// Registered resolvers, in registration order.
#[derive(Default)]
pub struct Registry {
    resolvers: Vec<Arc<dyn Resolver>>,
    by_body: HashMap<BodyId, usize>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::DuplicateBody`] if the body already has one.
    pub fn register(&mut self, resolver: Arc<dyn Resolver>) -> Result<(), ResolveError> {
        let body = resolver.body().id.clone();
        if self.by_body.contains_key(&body) {
            return Err(ResolveError::DuplicateBody(body));
        }
        debug!(%body, capabilities = ?resolver.capabilities(), "registered resolver");
        self.by_body.insert(body, self.resolvers.len());
        self.resolvers.push(resolver);
        Ok(())
    }

    /// Register the built-in resolver of every body in `bodies` for which
    /// `client_for` yields a data source.
    ///
    /// # Errors
    ///
    /// Returns an error if a body is registered twice.
    pub fn builtin<F>(
        bodies: &Bodies,
        scorecard_concurrency: usize,
        client_for: F,
    ) -> Result<Self, ResolveError>
    where
        F: Fn(&Body) -> Option<Arc<dyn SourceClient>>,
    {
        let mut registry = Self::new();
        for body in bodies.iter() {
            let Some(client) = client_for(body) else {
                continue;
            };
            match builtin_resolver(body, client) {
                Some(resolver) => registry.register(Arc::new(
                    resolver.with_scorecard_concurrency(scorecard_concurrency),
                ))?,
                None => warn!(body = %body.id, "no built-in grammar for body, skipping"),
            }
        }
        Ok(registry)
    }

    /// Build the registry from configuration: one HTTP source per configured body.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built or a body is
    /// registered twice.
    pub fn from_config(config: &Config, bodies: &Bodies) -> Result<Self, anyhow::Error> {
        let mut clients: HashMap<BodyId, Arc<dyn SourceClient>> = HashMap::new();
        for body in bodies.iter() {
            let Some(source) = config.source_for(&body.id) else {
                continue;
            };
            let http = reqwest::Client::builder()
                .timeout(Duration::from_secs(source.timeout_secs))
                .build()?;
            clients.insert(
                body.id.clone(),
                Arc::new(HttpSourceClient::with_client(
                    http,
                    source.base_url.clone(),
                    source.api_key.clone(),
                )),
            );
        }

        let registry = Self::builtin(bodies, config.scorecard.concurrency, |body| {
            clients.get(&body.id).cloned()
        })?;
        info!(bodies = registry.len(), "resolver registry ready");
        Ok(registry)
    }

    #[must_use]
    pub fn find(&self, body: &BodyId) -> Option<&Arc<dyn Resolver>> {
        self.by_body.get(body).map(|&i| &self.resolvers[i])
    }

    /// Like [`Registry::find`], but a missing body is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownBody`] if no resolver serves `body`.
    pub fn resolver(&self, body: &BodyId) -> Result<&Arc<dyn Resolver>, ResolveError> {
        self.find(body)
            .ok_or_else(|| ResolveError::UnknownBody(body.clone()))
    }

    /// Resolve a public URL against every registered body in order.
    ///
    /// Unparseable URLs and URLs no body claims resolve to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the first resolver error encountered.
    pub async fn lookup(&self, url: &str) -> Result<Option<Legislation>, ResolveError> {
        let Ok(url) = Url::parse(url.trim()) else {
            debug!(url, "not a url");
            return Ok(None);
        };

        for resolver in &self.resolvers {
            if let Some(found) = resolver.lookup(&url).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Fetch the current snapshot of an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is unknown or the resolver fails.
    pub async fn refresh(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Legislation, ResolveError> {
        self.resolver(body)?.refresh(id).await
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.resolvers.iter().map(|r| r.body())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

fn builtin_resolver(body: &Body, client: Arc<dyn SourceClient>) -> Option<BodyResolver> {
    let body = body.clone();
    let resolver = match body.id.as_str() {
        known::US_HOUSE => BodyResolver::new(body, CongressGrammar::house(), client),
        known::US_SENATE => BodyResolver::new(body, CongressGrammar::senate(), client),
        known::NY_SENATE => BodyResolver::new(body, NyStateGrammar::senate(), client)
            .with_capability(Capability::Scorecard),
        known::NY_ASSEMBLY => BodyResolver::new(body, NyStateGrammar::assembly(), client)
            .with_capability(Capability::Scorecard),
        known::NYC_COUNCIL => BodyResolver::new(body, CouncilGrammar, client)
            .with_capability(Capability::Scorecard),
        _ => return None,
    };
    Some(resolver.with_capability(Capability::Members))
}
