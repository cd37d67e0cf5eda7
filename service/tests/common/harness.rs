//! Engine wired to mock sources and an in-memory store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use legtrack::limiter::Limiter;
use legtrack::reconcile::Reconciler;
use legtrack::refresh::RefreshScheduler;
use legtrack::resolver::Registry;
use legtrack::scorecard::ScorecardService;
use legtrack::source::mock::MockSourceClient;
use legtrack::source::SourceClient;
use legtrack::store::{LegislationStore, MemoryStore, StoreError};
use lt_core::{Bodies, BodyId, Bookmark, Changes, Legislation, LegislationId, SponsorChange};
use uuid::Uuid;

/// Every built-in body backed by its own [`MockSourceClient`].
pub struct Harness {
    pub bodies: Bodies,
    pub memory: Arc<MemoryStore>,
    pub store: Arc<FlakyStore>,
    pub registry: Arc<Registry>,
    pub limiter: Limiter,
    pub reconciler: Reconciler,
    pub scheduler: RefreshScheduler,
    sources: HashMap<BodyId, Arc<MockSourceClient>>,
}

impl Harness {
    /// # Panics
    ///
    /// Panics if the registry cannot be built.
    pub fn new(concurrency: usize) -> Self {
        let bodies = Bodies::builtin();
        let sources: HashMap<BodyId, Arc<MockSourceClient>> = bodies
            .iter()
            .map(|b| (b.id.clone(), Arc::new(MockSourceClient::new())))
            .collect();
        let registry = Arc::new(
            Registry::builtin(&bodies, 5, |b| {
                sources
                    .get(&b.id)
                    .map(|s| Arc::clone(s) as Arc<dyn SourceClient>)
            })
            .expect("builtin registry"),
        );

        let memory = Arc::new(MemoryStore::new(bodies.clone()));
        let store = Arc::new(FlakyStore::new(memory.clone()));
        let engine_store: Arc<dyn LegislationStore> = store.clone();

        let limiter = Limiter::new(concurrency);
        let reconciler = Reconciler::new(
            registry.clone(),
            engine_store.clone(),
            Arc::new(bodies.clone()),
            limiter.clone(),
        );
        let scheduler = RefreshScheduler::new(
            registry.clone(),
            engine_store,
            reconciler.clone(),
            limiter.clone(),
        );

        Self {
            bodies,
            memory,
            store,
            registry,
            limiter,
            reconciler,
            scheduler,
            sources,
        }
    }

    /// Replace the scheduler's acquire timeout.
    #[must_use]
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.scheduler = self.scheduler.clone().with_acquire_timeout(Some(timeout));
        self
    }

    /// # Panics
    ///
    /// Panics for a body the harness does not know.
    pub fn source(&self, body: &str) -> &MockSourceClient {
        self.sources
            .get(&BodyId::new(body))
            .expect("harness has a source for every built-in body")
    }

    pub fn scorecards(&self) -> ScorecardService {
        ScorecardService::new(self.registry.clone(), self.store.clone())
    }

    /// Store `bill` directly, bypassing the engine.
    ///
    /// # Panics
    ///
    /// Panics if the store write fails.
    pub async fn track(&self, bill: &Legislation) {
        self.memory.save_bill(bill).await.expect("seed bill");
    }

    /// # Panics
    ///
    /// Panics if the store read fails.
    pub async fn stored(&self, bill: &Legislation) -> Option<Legislation> {
        self.memory
            .get_bill(&bill.body, &bill.id)
            .await
            .expect("read bill")
    }

    /// # Panics
    ///
    /// Panics if the store read fails.
    pub async fn changes(&self, bill: &Legislation) -> Changes {
        self.memory
            .get_changes(&bill.body, &bill.id)
            .await
            .expect("read changes")
    }
}

/// Store wrapper that fails or panics on chosen items.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    fail_updates: Mutex<HashSet<LegislationId>>,
    panic_updates: Mutex<HashSet<LegislationId>>,
    fail_selection: Mutex<bool>,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            fail_updates: Mutex::new(HashSet::new()),
            panic_updates: Mutex::new(HashSet::new()),
            fail_selection: Mutex::new(false),
        }
    }

    /// Make `update_bill` fail for `id`.
    pub fn fail_update(&self, id: &LegislationId) {
        self.fail_updates.lock().unwrap().insert(id.clone());
    }

    /// Make `update_bill` panic for `id`.
    pub fn panic_on_update(&self, id: &LegislationId) {
        self.panic_updates.lock().unwrap().insert(id.clone());
    }

    /// Make `get_stale_bills` fail.
    pub fn fail_selection(&self) {
        *self.fail_selection.lock().unwrap() = true;
    }
}

#[async_trait]
impl LegislationStore for FlakyStore {
    async fn get_stale_bills(
        &self,
        limit: usize,
        checked_before: DateTime<Utc>,
        current_year: i32,
        bodies: &[BodyId],
    ) -> Result<Vec<Legislation>, StoreError> {
        if *self.fail_selection.lock().unwrap() {
            return Err(StoreError::Unavailable("selection offline".into()));
        }
        self.inner
            .get_stale_bills(limit, checked_before, current_year, bodies)
            .await
    }

    async fn get_bill(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Option<Legislation>, StoreError> {
        self.inner.get_bill(body, id).await
    }

    async fn save_bill(&self, bill: &Legislation) -> Result<bool, StoreError> {
        self.inner.save_bill(bill).await
    }

    async fn update_bill(
        &self,
        previous: &Legislation,
        updated: &Legislation,
    ) -> Result<bool, StoreError> {
        assert!(
            !self.panic_updates.lock().unwrap().contains(&updated.id),
            "update of {} exploded",
            updated.id
        );
        if self.fail_updates.lock().unwrap().contains(&updated.id) {
            return Err(StoreError::Unavailable(format!("cannot write {}", updated.id)));
        }
        self.inner.update_bill(previous, updated).await
    }

    async fn get_changes(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Changes, StoreError> {
        self.inner.get_changes(body, id).await
    }

    async fn save_changes(
        &self,
        body: &BodyId,
        id: &LegislationId,
        changes: &[SponsorChange],
    ) -> Result<usize, StoreError> {
        self.inner.save_changes(body, id, changes).await
    }

    async fn for_each_bill(
        &self,
        visit: &mut (dyn for<'b> FnMut(&'b Legislation) + Send),
    ) -> Result<(), StoreError> {
        self.inner.for_each_bill(visit).await
    }

    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError> {
        self.inner.save_bookmark(bookmark).await
    }

    async fn get_bookmarks(
        &self,
        user_id: Uuid,
        body: &BodyId,
    ) -> Result<Vec<Bookmark>, StoreError> {
        self.inner.get_bookmarks(user_id, body).await
    }
}
