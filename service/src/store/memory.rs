//! In-memory [`LegislationStore`] with JSON snapshots.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lt_core::{Bodies, BodyId, Bookmark, Changes, Legislation, LegislationId, SponsorChange};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::{LegislationStore, StoreError};

type Key = (BodyId, LegislationId);

#[derive(Default)]
struct Tables {
    bills: BTreeMap<Key, Legislation>,
    changes: HashMap<Key, Changes>,
    bookmarks: Vec<Bookmark>,
}

impl Tables {
    /// Whether `bill` points at a companion we have not stored.
    fn companion_missing(&self, bodies: &Bodies, bill: &Legislation) -> bool {
        let Some(same_as) = bill.companion_id() else {
            return false;
        };
        let Some(companion) = bodies.get(&bill.body).and_then(|b| b.bicameral.as_ref()) else {
            return false;
        };
        !self
            .bills
            .contains_key(&(companion.clone(), same_as.clone()))
    }

    fn upsert(&mut self, bill: &Legislation) {
        let key = bill.identity();
        let mut stored = bill.clone();
        if let Some(existing) = self.bills.get(&key) {
            stored.added = existing.added;
        }
        self.bills.insert(key, stored);
    }
}

#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
    bills: Vec<Legislation>,
    #[serde(default)]
    changes: Vec<ChangeLog>,
    #[serde(default)]
    bookmarks: Vec<Bookmark>,
}

#[derive(Serialize, Deserialize)]
struct ChangeLog {
    body: BodyId,
    id: LegislationId,
    changes: Changes,
}

/// Store backed by in-process maps.
pub struct MemoryStore {
    bodies: Bodies,
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Empty store. `bodies` decides which bills can have companions.
    #[must_use]
    pub fn new(bodies: Bodies) -> Self {
        Self {
            bodies,
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Load a snapshot written by [`MemoryStore::save`]. A missing file
    /// yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub async fn load(path: impl AsRef<Path>, bodies: Bodies) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let store = Self::new(bodies);
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot yet, starting empty");
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot = serde_json::from_slice(&raw)?;
        {
            let mut tables = store.tables.write().await;
            for bill in snapshot.bills {
                tables.bills.insert(bill.identity(), bill);
            }
            for log in snapshot.changes {
                tables.changes.insert((log.body, log.id), log.changes);
            }
            tables.bookmarks = snapshot.bookmarks;
            info!(
                path = %path.display(),
                bills = tables.bills.len(),
                bookmarks = tables.bookmarks.len(),
                "loaded snapshot"
            );
        }
        Ok(store)
    }

    /// Write the whole store to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let encoded = {
            let tables = self.tables.read().await;
            let mut changes: Vec<ChangeLog> = tables
                .changes
                .iter()
                .map(|((body, id), changes)| ChangeLog {
                    body: body.clone(),
                    id: id.clone(),
                    changes: changes.clone(),
                })
                .collect();
            changes.sort_by(|a, b| (&a.body, &a.id).cmp(&(&b.body, &b.id)));
            let snapshot = Snapshot {
                bills: tables.bills.values().cloned().collect(),
                changes,
                bookmarks: tables.bookmarks.clone(),
            };
            serde_json::to_vec_pretty(&snapshot)?
        };
        tokio::fs::write(path.as_ref(), encoded).await?;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.bills.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.bills.is_empty()
    }
}

#[async_trait]
impl LegislationStore for MemoryStore {
    async fn get_stale_bills(
        &self,
        limit: usize,
        checked_before: DateTime<Utc>,
        current_year: i32,
        bodies: &[BodyId],
    ) -> Result<Vec<Legislation>, StoreError> {
        let tables = self.tables.read().await;
        let mut stale: Vec<&Legislation> = tables
            .bills
            .values()
            .filter(|b| bodies.is_empty() || bodies.contains(&b.body))
            .filter(|b| b.last_checked < checked_before && b.session.is_open_at(current_year))
            .collect();
        stale.sort_by_key(|b| b.last_checked);
        Ok(stale.into_iter().take(limit).cloned().collect())
    }

    async fn get_bill(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Option<Legislation>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.bills.get(&(body.clone(), id.clone())).cloned())
    }

    async fn save_bill(&self, bill: &Legislation) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        tables.upsert(bill);
        Ok(tables.companion_missing(&self.bodies, bill))
    }

    async fn update_bill(
        &self,
        previous: &Legislation,
        updated: &Legislation,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if previous.identity() != updated.identity() {
            tables.bills.remove(&previous.identity());
        }
        tables.upsert(updated);
        Ok(tables.companion_missing(&self.bodies, updated))
    }

    async fn get_changes(
        &self,
        body: &BodyId,
        id: &LegislationId,
    ) -> Result<Changes, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .changes
            .get(&(body.clone(), id.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_changes(
        &self,
        body: &BodyId,
        id: &LegislationId,
        changes: &[SponsorChange],
    ) -> Result<usize, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }
        let mut tables = self.tables.write().await;
        let log = tables
            .changes
            .entry((body.clone(), id.clone()))
            .or_default();
        Ok(log.merge(changes.iter().cloned()))
    }

    async fn for_each_bill(
        &self,
        visit: &mut (dyn for<'b> FnMut(&'b Legislation) + Send),
    ) -> Result<(), StoreError> {
        let bills: Vec<Legislation> = self.tables.read().await.bills.values().cloned().collect();
        for bill in &bills {
            visit(bill);
        }
        Ok(())
    }

    async fn save_bookmark(&self, bookmark: &Bookmark) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let existing = tables.bookmarks.iter_mut().find(|b| {
            b.user_id == bookmark.user_id
                && b.body == bookmark.body
                && b.legislation_id == bookmark.legislation_id
        });
        match existing {
            Some(existing) => {
                existing.oppose = bookmark.oppose;
                existing.notes.clone_from(&bookmark.notes);
            }
            None => tables.bookmarks.push(bookmark.clone()),
        }
        Ok(())
    }

    async fn get_bookmarks(
        &self,
        user_id: Uuid,
        body: &BodyId,
    ) -> Result<Vec<Bookmark>, StoreError> {
        let tables = self.tables.read().await;
        let mut found: Vec<Bookmark> = tables
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id && &b.body == body)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created);
        Ok(found)
    }
}
