use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::error::CatalogError;
use crate::formats::ProductRecord;
use crate::resolver::MetadataResolver;
use crate::store::CatalogStore;

/// Immutable view of the catalog at one point in time.
pub type Snapshot = Arc<Vec<ProductRecord>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// The stored catalog replaced the in-memory one.
    Restored(usize),
    /// Nothing was stored yet.
    Empty,
    /// The stored catalog could not be used; the catalog was reset to empty.
    Recovered,
}

/// Sole owner of the product list.
///
/// Every mutation is applied to memory without suspending and then written
/// through to the store. Write failures are logged and never roll back memory.
pub struct CatalogManager {
    store: Arc<dyn CatalogStore>,
    resolver: Arc<dyn MetadataResolver>,
    state: watch::Sender<Snapshot>,
    persist_lock: Mutex<()>,
}

impl CatalogManager {
    pub async fn open(store: Arc<dyn CatalogStore>, resolver: Arc<dyn MetadataResolver>) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        let manager = Self {
            store,
            resolver,
            state,
            persist_lock: Mutex::new(()),
        };
        manager.hydrate().await;
        manager
    }

    /// Loads the stored catalog. Never fails: unreadable data is copied aside
    /// by the store and the catalog resets to empty.
    pub async fn hydrate(&self) -> HydrateOutcome {
        match self.store.load().await {
            Ok(Some(records)) => {
                let count = records.len();
                self.state.send_replace(Arc::new(records));
                tracing::info!(count, "restored catalog");
                HydrateOutcome::Restored(count)
            }
            Ok(None) => {
                tracing::info!("no stored catalog; starting empty");
                HydrateOutcome::Empty
            }
            Err(err) => {
                if err.is_corrupt() {
                    tracing::warn!(?err, "stored catalog is unusable; starting empty");
                } else {
                    tracing::error!(?err, "stored catalog is unusable; starting empty");
                }
                if let Err(err) = self.store.preserve_unusable().await {
                    tracing::error!(?err, "could not keep unusable catalog aside");
                }
                self.state.send_replace(Snapshot::default());
                HydrateOutcome::Recovered
            }
        }
    }

    /// Resolves `link` and appends the result. Blank links are ignored.
    pub async fn add_product(&self, link: &str) -> Option<ProductRecord> {
        if link.trim().is_empty() {
            tracing::debug!("ignoring blank link");
            return None;
        }

        let record = self.resolver.resolve(link).await;
        self.state
            .send_modify(|records| Arc::make_mut(records).push(record.clone()));
        tracing::info!(url = %record.url, title = %record.title, "added product");

        self.persist().await;
        Some(record)
    }

    /// Removes the record at absolute position `index`.
    pub async fn remove_at(&self, index: usize) -> Result<ProductRecord, CatalogError> {
        self.remove_where(|records| {
            if index < records.len() {
                Ok(index)
            } else {
                Err(CatalogError::IndexOutOfRange {
                    index,
                    len: records.len(),
                })
            }
        })
        .await
    }

    /// Removes the record shown at `visible_index` in the view filtered by
    /// `search_term`, mapping it back to its absolute position first.
    pub async fn remove_visible(
        &self,
        search_term: &str,
        visible_index: usize,
    ) -> Result<ProductRecord, CatalogError> {
        let needle = search_term.to_lowercase();
        self.remove_where(|records| {
            let visible: Vec<usize> = records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.title_contains(&needle))
                .map(|(index, _)| index)
                .collect();
            visible
                .get(visible_index)
                .copied()
                .ok_or(CatalogError::IndexOutOfRange {
                    index: visible_index,
                    len: visible.len(),
                })
        })
        .await
    }

    async fn remove_where<F>(&self, locate: F) -> Result<ProductRecord, CatalogError>
    where
        F: FnOnce(&[ProductRecord]) -> Result<usize, CatalogError>,
    {
        let mut outcome = Err(CatalogError::IndexOutOfRange { index: 0, len: 0 });
        self.state.send_if_modified(|records| {
            outcome = locate(records.as_slice())
                .map(|index| Arc::make_mut(records).remove(index));
            outcome.is_ok()
        });

        let removed = outcome.inspect_err(|err| tracing::debug!(%err, "remove rejected"))?;
        tracing::info!(url = %removed.url, title = %removed.title, "removed product");

        self.persist().await;
        Ok(removed)
    }

    /// Records whose title contains `search_term`, ignoring case.
    pub fn query(&self, search_term: &str) -> Query {
        Query::new(self.records(), search_term)
    }

    pub fn records(&self) -> Snapshot {
        Arc::clone(&self.state.borrow())
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    /// Change notifications; the receiver always observes the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        // Snapshot after acquiring the lock so the last write carries every landed change.
        let snapshot = self.records();
        if let Err(err) = self.store.save(&snapshot).await {
            tracing::warn!(
                ?err,
                count = snapshot.len(),
                "persist catalog failed; keeping in-memory state"
            );
        }
    }
}

/// A filtered, restartable view over one catalog snapshot.
#[derive(Debug, Clone)]
pub struct Query {
    records: Snapshot,
    term: String,
    needle: String,
}

impl Query {
    pub fn new(records: Snapshot, term: &str) -> Self {
        Self {
            records,
            term: term.to_owned(),
            needle: term.to_lowercase(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Matching records paired with their absolute catalog position.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &ProductRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.title_contains(&self.needle))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> + '_ {
        self.entries().map(|(_, record)| record)
    }

    pub fn absolute_index(&self, visible_index: usize) -> Option<usize> {
        self.entries().nth(visible_index).map(|(index, _)| index)
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<ProductRecord> {
        self.iter().cloned().collect()
    }
}
