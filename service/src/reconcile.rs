//! Bicameral reconciliation.
//!
//! A bill in one chamber of a bicameral legislature may name its companion
//! in the other chamber (`same_as`). The reconciler makes sure that
//! companion is stored too, either right away or by a later sweep, and
//! merges the two sponsor histories into one timeline.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use lt_core::{Bodies, BodyId, Legislation, LegislationId, SponsorChange};
use tracing::{debug, info, warn};

use crate::error::{ItemError, RefreshError};
use crate::limiter::Limiter;
use crate::resolver::Registry;
use crate::store::LegislationStore;

/// When to fetch a missing companion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Fetch and store it now.
    Immediate,
    /// Only report it; a sweep picks it up later.
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionStatus {
    /// Unicameral body or no `same_as`.
    NotApplicable,
    /// Companion is already stored.
    Present,
    /// Companion was missing and has just been stored.
    Fetched,
    /// Companion is missing and was left for later.
    Stale,
}

/// One entry of a two-chamber sponsor timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChamberChange {
    pub body: BodyId,
    pub change: SponsorChange,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    /// Distinct companions referenced by stored bills.
    pub referenced: usize,
    /// Referenced companions not stored when the sweep started.
    pub missing: usize,
    pub repaired: Vec<(BodyId, LegislationId)>,
    pub errors: Vec<ItemError>,
}

#[derive(Clone)]
pub struct Reconciler {
    registry: Arc<Registry>,
    store: Arc<dyn LegislationStore>,
    bodies: Arc<Bodies>,
    limiter: Limiter,
}

impl Reconciler {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn LegislationStore>,
        bodies: Arc<Bodies>,
        limiter: Limiter,
    ) -> Self {
        Self {
            registry,
            store,
            bodies,
            limiter,
        }
    }

    /// The `(body, id)` of `bill`'s companion, if its body is bicameral and
    /// it names one.
    #[must_use]
    pub fn companion_of(&self, bill: &Legislation) -> Option<(BodyId, LegislationId)> {
        let id = bill.companion_id()?;
        let partner = self.bodies.get(&bill.body)?.bicameral.clone()?;
        Some((partner, id.clone()))
    }

    /// Make sure `bill`'s companion is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or, in immediate mode, the
    /// companion cannot be fetched.
    pub async fn ensure_companion(
        &self,
        bill: &Legislation,
        mode: ReconcileMode,
    ) -> Result<CompanionStatus, RefreshError> {
        let Some((body, id)) = self.companion_of(bill) else {
            return Ok(CompanionStatus::NotApplicable);
        };

        if self.store.get_bill(&body, &id).await?.is_some() {
            return Ok(CompanionStatus::Present);
        }

        match mode {
            ReconcileMode::Deferred => {
                debug!(%body, %id, of = %bill.id, "companion missing, deferring");
                Ok(CompanionStatus::Stale)
            }
            ReconcileMode::Immediate => {
                self.fetch_companion(&body, &id).await?;
                Ok(CompanionStatus::Fetched)
            }
        }
    }

    async fn fetch_companion(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Legislation, RefreshError> {
        let fetched = self.registry.refresh(body, id).await?;
        let stored = Legislation::created(fetched, Utc::now());
        self.store.save_bill(&stored).await?;
        info!(%body, %id, "stored companion");
        Ok(stored)
    }

    /// Find up to `limit` companions that stored bills reference but that
    /// are not stored, and fetch them. Failures are collected per companion.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be scanned.
    pub async fn sweep(&self, limit: usize) -> Result<SweepReport, RefreshError> {
        let mut referenced: BTreeSet<(BodyId, LegislationId)> = BTreeSet::new();
        self.store
            .for_each_bill(&mut |bill: &Legislation| {
                if let Some(pair) = self.companion_of(bill) {
                    referenced.insert(pair);
                }
            })
            .await?;

        let mut missing = Vec::new();
        for (body, id) in &referenced {
            if self.store.get_bill(body, id).await?.is_none() {
                missing.push((body.clone(), id.clone()));
            }
        }

        let mut report = SweepReport {
            referenced: referenced.len(),
            missing: missing.len(),
            ..SweepReport::default()
        };

        let results: Vec<_> = stream::iter(missing.into_iter().take(limit))
            .map(|(body, id)| async move {
                let outcome = match self.limiter.run(self.fetch_companion(&body, &id)).await {
                    Ok(result) => result,
                    Err(e) => Err(e.into()),
                };
                (body, id, outcome)
            })
            .buffer_unordered(self.limiter.capacity())
            .collect()
            .await;

        for (body, id, outcome) in results {
            match outcome {
                Ok(_) => report.repaired.push((body, id)),
                Err(error) => {
                    warn!(%body, %id, %error, "companion repair failed");
                    report.errors.push(ItemError::new(body, id, error));
                }
            }
        }

        info!(
            referenced = report.referenced,
            missing = report.missing,
            repaired = report.repaired.len(),
            errors = report.errors.len(),
            "companion sweep finished"
        );
        Ok(report)
    }

    /// Sponsor history of `bill` and its companion, oldest first. Fetches
    /// the companion if it is not stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the companion cannot be fetched.
    pub async fn combined_changes(
        &self,
        bill: &Legislation,
    ) -> Result<Vec<ChamberChange>, RefreshError> {
        let own = self.store.get_changes(&bill.body, &bill.id).await?;
        let mut timeline: Vec<ChamberChange> = own
            .sponsors
            .into_iter()
            .map(|change| ChamberChange {
                body: bill.body.clone(),
                change,
            })
            .collect();

        if let Some((body, id)) = self.companion_of(bill) {
            self.ensure_companion(bill, ReconcileMode::Immediate).await?;
            let theirs = self.store.get_changes(&body, &id).await?;
            timeline.extend(theirs.sponsors.into_iter().map(|change| ChamberChange {
                body: body.clone(),
                change,
            }));
        }

        timeline.sort_by_key(|c| c.change.date);
        Ok(timeline)
    }
}
