//! Data source client for fetching normalized legislation records.
//!
//! Each legislative body is backed by one source. The trait abstraction
//! enables:
//!
//! - Easy mocking in unit tests
//! - HTTP-level testing with `wiremock` in integration tests
//! - Swapping implementations per body (API, scraper sidecar, fixture file)
//!
//! # Example
//!
//! ```ignore
//! use legtrack::source::{HttpSourceClient, SourceClient};
//!
//! let client = HttpSourceClient::new("https://data.example.org/ny-senate", "my-api-key");
//! let bill = client.fetch_legislation(&"2021-S5130".into()).await?;
//! println!("{}: {}", bill.display_id, bill.title);
//! ```

use async_trait::async_trait;
use lt_core::{Legislation, LegislationId, Member, Session};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::types::{LegislationResponse, MembersResponse, Vote, VotesResponse};

/// Errors that can occur when calling a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Item not found upstream
    #[error("not found upstream: {0}")]
    NotFound(String),

    /// Source returned an error response
    #[error("source error: {status} - {message}")]
    ApiError { status: u16, message: String },
}

impl SourceError {
    /// Whether trying again later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::NotFound(_) => false,
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

/// Operations a legislative data source provides.
///
/// Implementations return records already normalized to the canonical model.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch one item by its canonical id.
    async fn fetch_legislation(&self, id: &LegislationId) -> Result<Legislation, SourceError>;

    /// List the members seated in `session`.
    async fn fetch_members(&self, session: Session) -> Result<Vec<Member>, SourceError>;

    /// Recorded positions on an item. Empty when the item was never voted on.
    async fn fetch_votes(&self, id: &LegislationId) -> Result<Vec<Vote>, SourceError>;
}

/// HTTP-based implementation of `SourceClient`.
pub struct HttpSourceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSourceClient {
    /// Create a new client with the given base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client with a custom `reqwest::Client` (timeouts, proxies).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// GET `url` and decode JSON. A 404 becomes `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, SourceError> {
        let mut request = self.client.get(url);
        if !self.api_key.is_empty() {
            request = request.header("X-API-Key", &self.api_key);
        }
        let response = request.send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch_legislation(&self, id: &LegislationId) -> Result<Legislation, SourceError> {
        let url = format!("{}/legislation/{}", self.base_url, id);
        let response: LegislationResponse = self
            .get_json(&url)
            .await?
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        Ok(response.legislation)
    }

    async fn fetch_members(&self, session: Session) -> Result<Vec<Member>, SourceError> {
        let url = format!("{}/members?session={session}", self.base_url);
        let response: MembersResponse = self
            .get_json(&url)
            .await?
            .ok_or_else(|| SourceError::NotFound(format!("members for {session}")))?;
        Ok(response.members)
    }

    async fn fetch_votes(&self, id: &LegislationId) -> Result<Vec<Vote>, SourceError> {
        let url = format!("{}/legislation/{}/votes", self.base_url, id);
        let response: Option<VotesResponse> = self.get_json(&url).await?;
        Ok(response.map(|r| r.votes).unwrap_or_default())
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{Legislation, LegislationId, Member, Session, SourceClient, SourceError, Vote};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock implementation of `SourceClient` for unit tests.
    ///
    /// Seed records with `set_*`, inject failures with `fail_legislation`,
    /// and verify calls with `fetch_calls()`. `max_in_flight()` reports the
    /// highest number of concurrent `fetch_legislation` calls observed, which
    /// together with `set_delay` makes concurrency bounds observable.
    #[derive(Default)]
    pub struct MockSourceClient {
        legislation: Mutex<HashMap<LegislationId, Legislation>>,
        failures: Mutex<HashMap<LegislationId, (u16, String)>>,
        members: Mutex<HashMap<Session, Vec<Member>>>,
        votes: Mutex<HashMap<LegislationId, Vec<Vote>>>,
        delay: Mutex<Option<Duration>>,
        fetch_calls: Mutex<Vec<LegislationId>>,
        members_calls: Mutex<Vec<Session>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockSourceClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serve `legislation` for its id.
        pub fn set_legislation(&self, legislation: Legislation) {
            self.legislation
                .lock()
                .unwrap()
                .insert(legislation.id.clone(), legislation);
        }

        /// Make `fetch_legislation(id)` fail with an API error.
        pub fn fail_legislation(&self, id: impl Into<LegislationId>, status: u16, message: &str) {
            self.failures
                .lock()
                .unwrap()
                .insert(id.into(), (status, message.to_string()));
        }

        /// Serve `legislation` when asked for `id`, whatever its own id says.
        pub fn serve_as(&self, id: impl Into<LegislationId>, legislation: Legislation) {
            self.legislation.lock().unwrap().insert(id.into(), legislation);
        }

        pub fn set_members(&self, session: Session, members: Vec<Member>) {
            self.members.lock().unwrap().insert(session, members);
        }

        pub fn set_votes(&self, id: impl Into<LegislationId>, votes: Vec<Vote>) {
            self.votes.lock().unwrap().insert(id.into(), votes);
        }

        /// Delay every `fetch_legislation` call.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// All ids passed to `fetch_legislation`, in call order.
        pub fn fetch_calls(&self) -> Vec<LegislationId> {
            self.fetch_calls.lock().unwrap().clone()
        }

        /// All sessions passed to `fetch_members`.
        pub fn members_calls(&self) -> Vec<Session> {
            self.members_calls.lock().unwrap().clone()
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SourceClient for MockSourceClient {
        async fn fetch_legislation(&self, id: &LegislationId) -> Result<Legislation, SourceError> {
            self.fetch_calls.lock().unwrap().push(id.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let failure = self.failures.lock().unwrap().get(id).cloned();
            let result = match failure {
                Some((status, message)) => Err(SourceError::ApiError { status, message }),
                None => self
                    .legislation
                    .lock()
                    .unwrap()
                    .get(id)
                    .cloned()
                    .ok_or_else(|| SourceError::NotFound(id.to_string())),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn fetch_members(&self, session: Session) -> Result<Vec<Member>, SourceError> {
            self.members_calls.lock().unwrap().push(session);
            Ok(self
                .members
                .lock()
                .unwrap()
                .get(&session)
                .cloned()
                .unwrap_or_default())
        }

        async fn fetch_votes(&self, id: &LegislationId) -> Result<Vec<Vote>, SourceError> {
            Ok(self
                .votes
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .unwrap_or_default())
        }
    }
}
