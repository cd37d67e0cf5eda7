//! Refresh scheduler.
//!
//! A run picks the stale bills from the store, refreshes each one as its
//! own task under the shared [`Limiter`], and aggregates what happened into
//! a [`RefreshReport`]. One item failing never aborts the others.
//!
//! Per item the sequence is: fetch the current snapshot, diff sponsors
//! against the stored one, append the diff to the change log, store the new
//! snapshot, then fetch a missing companion if the store says one is
//! needed. The change log is written before the snapshot, so a failed
//! snapshot write is re-diffed on the next run.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use futures::FutureExt;
use lt_core::{diff, BodyId, Legislation, LegislationId, SponsorChange};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ItemError, RefreshError};
use crate::limiter::Limiter;
use crate::reconcile::{CompanionStatus, ReconcileMode, Reconciler};
use crate::resolver::Registry;
use crate::store::LegislationStore;

#[derive(Debug, Clone)]
pub struct RefreshOptions {
    /// Maximum number of stale bills to pick.
    pub batch_size: usize,
    /// Compute everything but write nothing.
    pub dry_run: bool,
    /// Only pick bills from these bodies. Empty means all of them.
    pub bodies: Vec<BodyId>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            dry_run: false,
            bodies: Vec::new(),
        }
    }
}

/// What refreshing one item produced.
#[derive(Debug, Clone)]
pub struct RefreshedItem {
    /// The snapshot that was (or in a dry run, would have been) stored.
    pub legislation: Legislation,
    pub changes: Vec<SponsorChange>,
    /// Content differed from the stored snapshot.
    pub modified: bool,
    pub persisted: bool,
    pub companion: CompanionStatus,
}

/// Result of [`RefreshScheduler::ingest`].
#[derive(Debug, Clone)]
pub struct Ingested {
    pub legislation: Legislation,
    /// First time this item is stored.
    pub created: bool,
    pub changes: Vec<SponsorChange>,
    pub companion: CompanionStatus,
}

#[derive(Debug, Default)]
pub struct RefreshReport {
    pub dry_run: bool,
    /// Stale bills selected for the run.
    pub candidates: usize,
    pub refreshed: Vec<RefreshedItem>,
    /// Items never started because the run was cancelled.
    pub skipped: Vec<(BodyId, LegislationId)>,
    /// Item failures and companion failures.
    pub errors: Vec<ItemError>,
}

impl RefreshReport {
    #[must_use]
    pub fn updated(&self) -> usize {
        self.refreshed.iter().filter(|r| r.modified).count()
    }

    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.refreshed.iter().filter(|r| !r.modified).count()
    }

    #[must_use]
    pub fn sponsor_changes(&self) -> usize {
        self.refreshed.iter().map(|r| r.changes.len()).sum()
    }
}

enum Outcome {
    Refreshed {
        item: RefreshedItem,
        companion_error: Option<ItemError>,
    },
    Skipped,
    Failed(RefreshError),
}

#[derive(Clone)]
pub struct RefreshScheduler {
    registry: Arc<Registry>,
    store: Arc<dyn LegislationStore>,
    reconciler: Reconciler,
    limiter: Limiter,
    freshness_window: Duration,
    acquire_timeout: Option<Duration>,
}

impl RefreshScheduler {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn LegislationStore>,
        reconciler: Reconciler,
        limiter: Limiter,
    ) -> Self {
        Self {
            registry,
            store,
            reconciler,
            limiter,
            freshness_window: Duration::from_secs(6 * 60 * 60),
            acquire_timeout: None,
        }
    }

    #[must_use]
    pub const fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    #[must_use]
    pub const fn with_acquire_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Refresh one batch of stale bills.
    ///
    /// # Errors
    ///
    /// Returns an error only if the candidates cannot be selected. Item
    /// failures are reported in [`RefreshReport::errors`].
    #[instrument(skip_all, fields(batch_size = options.batch_size, dry_run = options.dry_run))]
    pub async fn run(
        &self,
        options: RefreshOptions,
        cancel: &CancellationToken,
    ) -> Result<RefreshReport, RefreshError> {
        let now = Utc::now();
        let window = chrono::Duration::from_std(self.freshness_window)
            .unwrap_or_else(|_| chrono::Duration::hours(6));
        let candidates = self
            .store
            .get_stale_bills(
                options.batch_size,
                now - window,
                now.year(),
                &options.bodies,
            )
            .await?;

        info!(candidates = candidates.len(), "refreshing stale legislation");

        let mut report = RefreshReport {
            dry_run: options.dry_run,
            candidates: candidates.len(),
            ..RefreshReport::default()
        };

        let dry_run = options.dry_run;
        let mut tasks = JoinSet::new();
        for bill in candidates {
            if cancel.is_cancelled() {
                report.skipped.push(bill.identity());
                continue;
            }
            let scheduler = self.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let key = bill.identity();
                let work = scheduler.process(bill, dry_run, &cancel);
                let outcome = AssertUnwindSafe(work).catch_unwind().await.unwrap_or_else(|panic| {
                    Outcome::Failed(RefreshError::TaskFailed(panic_message(&*panic)))
                });
                (key, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(((body, id), outcome)) => report.record(body, id, outcome),
                Err(e) => error!(error = %e, "refresh task aborted"),
            }
        }

        info!(
            updated = report.updated(),
            unchanged = report.unchanged(),
            sponsor_changes = report.sponsor_changes(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            "refresh run finished"
        );
        Ok(report)
    }

    /// Refresh a single stored item outside a batch, still under the limiter.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not stored or the refresh fails.
    pub async fn refresh_one(
        &self,
        body: &BodyId,
        id: &LegislationId,
        dry_run: bool,
    ) -> Result<RefreshedItem, RefreshError> {
        let previous = self
            .store
            .get_bill(body, id)
            .await?
            .ok_or_else(|| crate::store::StoreError::NotFound {
                body: body.clone(),
                id: id.clone(),
            })?;
        let _permit = self.limiter.acquire(self.acquire_timeout).await?;
        let (item, companion_error) = self.refresh_item(&previous, dry_run).await?;
        if let Some(companion_error) = companion_error {
            warn!(error = %companion_error, "companion fetch failed");
        }
        Ok(item)
    }

    /// Resolve a public URL and store what it points at, or refresh the
    /// stored copy if it is already tracked. A missing companion is fetched
    /// right away. `Ok(None)` when no body recognises the URL.
    ///
    /// # Errors
    ///
    /// Returns an error if resolving or storing fails.
    #[instrument(skip(self))]
    pub async fn ingest(&self, url: &str) -> Result<Option<Ingested>, RefreshError> {
        let _permit = self.limiter.acquire(self.acquire_timeout).await?;
        let Some(fetched) = self.registry.lookup(url).await? else {
            return Ok(None);
        };

        if let Some(previous) = self.store.get_bill(&fetched.body, &fetched.id).await? {
            let (item, companion_error) = self.commit(&previous, fetched, false).await?;
            if let Some(error) = companion_error {
                warn!(%error, "companion fetch failed");
            }
            return Ok(Some(Ingested {
                created: false,
                legislation: item.legislation,
                changes: item.changes,
                companion: item.companion,
            }));
        }

        let stored = Legislation::created(fetched, Utc::now());
        let companion_stale = self.store.save_bill(&stored).await?;
        let companion = if companion_stale {
            match self
                .reconciler
                .ensure_companion(&stored, ReconcileMode::Immediate)
                .await
            {
                Ok(status) => status,
                Err(error) => {
                    warn!(%error, "companion fetch failed, leaving for sweep");
                    CompanionStatus::Stale
                }
            }
        } else if self.reconciler.companion_of(&stored).is_some() {
            CompanionStatus::Present
        } else {
            CompanionStatus::NotApplicable
        };
        info!(body = %stored.body, id = %stored.id, "now tracking legislation");

        Ok(Some(Ingested {
            created: true,
            legislation: stored,
            changes: Vec::new(),
            companion,
        }))
    }

    async fn process(
        &self,
        bill: Legislation,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> Outcome {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Outcome::Skipped,
            permit = self.limiter.acquire(self.acquire_timeout) => permit,
        };
        let _permit = match permit {
            Ok(permit) => permit,
            Err(e) => return Outcome::Failed(e.into()),
        };

        match self.refresh_item(&bill, dry_run).await {
            Ok((item, companion_error)) => Outcome::Refreshed {
                item,
                companion_error,
            },
            Err(e) => Outcome::Failed(e),
        }
    }

    #[instrument(skip_all, fields(body = %previous.body, id = %previous.id))]
    async fn refresh_item(
        &self,
        previous: &Legislation,
        dry_run: bool,
    ) -> Result<(RefreshedItem, Option<ItemError>), RefreshError> {
        let incoming = self.registry.refresh(&previous.body, &previous.id).await?;
        self.commit(previous, incoming, dry_run).await
    }

    /// Diff `incoming` against `previous` and store the result.
    async fn commit(
        &self,
        previous: &Legislation,
        incoming: Legislation,
        dry_run: bool,
    ) -> Result<(RefreshedItem, Option<ItemError>), RefreshError> {
        let now = Utc::now();
        let changes = diff(previous, &incoming, now);
        let updated = Legislation::refreshed(previous, incoming, now);
        let modified = updated.last_modified != previous.last_modified;

        if dry_run {
            let companion = self
                .reconciler
                .ensure_companion(&updated, ReconcileMode::Deferred)
                .await?;
            debug!(changes = changes.len(), modified, "dry run, nothing written");
            return Ok((
                RefreshedItem {
                    legislation: updated,
                    changes,
                    modified,
                    persisted: false,
                    companion,
                },
                None,
            ));
        }

        if !changes.is_empty() {
            let added = self
                .store
                .save_changes(&updated.body, &updated.id, &changes)
                .await?;
            debug!(observed = changes.len(), added, "sponsor changes recorded");
        }
        let companion_stale = self.store.update_bill(previous, &updated).await?;

        let mut companion_error = None;
        let companion = if companion_stale {
            match self
                .reconciler
                .ensure_companion(&updated, ReconcileMode::Immediate)
                .await
            {
                Ok(status) => status,
                Err(error) => {
                    warn!(%error, "companion fetch failed, leaving for sweep");
                    if let Some((body, id)) = self.reconciler.companion_of(&updated) {
                        companion_error = Some(ItemError::new(body, id, error));
                    }
                    CompanionStatus::Stale
                }
            }
        } else if self.reconciler.companion_of(&updated).is_some() {
            CompanionStatus::Present
        } else {
            CompanionStatus::NotApplicable
        };

        Ok((
            RefreshedItem {
                legislation: updated,
                changes,
                modified,
                persisted: true,
                companion,
            },
            companion_error,
        ))
    }
}

impl RefreshReport {
    fn record(&mut self, body: BodyId, id: LegislationId, outcome: Outcome) {
        match outcome {
            Outcome::Refreshed {
                item,
                companion_error,
            } => {
                self.refreshed.push(item);
                self.errors.extend(companion_error);
            }
            Outcome::Skipped => self.skipped.push((body, id)),
            Outcome::Failed(error) => {
                warn!(%body, %id, %error, "refresh failed");
                self.errors.push(ItemError::new(body, id, error));
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panicked".to_string())
}
