//! # History Store
//!
//! The persistence port of the engine. The engine never talks to a backing
//! service directly; it loads and saves whole [`FiscalHistory`] values
//! through a [`HistoryStore`].
//!
//! [`MemoryHistoryStore`] is the in-process implementation used by the CLI
//! and the tests. It mints record ids, rejects records carrying an id it
//! does not hold, and applies concurrent saves last-write-wins.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;

use fisca_core::{ClientId, RecordId};

use crate::error::StoreError;
use crate::history::FiscalHistory;

/// Persistence port for fiscal histories.
pub trait HistoryStore: Send + Sync {
    /// Load the history of a client for a fiscal year.
    fn load(&self, client_id: ClientId, fiscal_year: i32) -> Result<FiscalHistory, StoreError>;

    /// Persist a new history. Fails if one exists for the client and year.
    fn create(&self, history: FiscalHistory) -> Result<FiscalHistory, StoreError>;

    /// Replace an existing history. Returns the stored value with ids
    /// assigned to new records.
    fn save(&self, history: FiscalHistory) -> Result<FiscalHistory, StoreError>;
}

#[derive(Debug, Default)]
struct Inner {
    histories: BTreeMap<(ClientId, i32), FiscalHistory>,
    last_id: i64,
}

impl Inner {
    fn mint(&mut self) -> RecordId {
        self.last_id += 1;
        RecordId(self.last_id)
    }

    fn assign_ids(&mut self, history: &mut FiscalHistory) {
        if history.id.is_none() {
            history.id = Some(self.mint());
        }
        for record in &mut history.payment_obligations {
            if record.id.is_none() {
                record.id = Some(self.mint());
            }
        }
        for record in &mut history.declaration_obligations {
            if record.id.is_none() {
                record.id = Some(self.mint());
            }
        }
    }
}

/// Thread-safe in-memory [`HistoryStore`].
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored histories.
    pub fn len(&self) -> usize {
        self.inner.read().histories.len()
    }

    /// Whether the store holds no history.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every history of one client, by fiscal year.
    pub fn list(&self, client_id: ClientId) -> Vec<FiscalHistory> {
        self.inner
            .read()
            .histories
            .range((client_id, i32::MIN)..=(client_id, i32::MAX))
            .map(|(_, h)| h.clone())
            .collect()
    }
}

fn first_unknown_id(
    history: &FiscalHistory,
    held: &BTreeSet<RecordId>,
) -> Option<RecordId> {
    history.record_ids().find(|id| !held.contains(id))
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self, client_id: ClientId, fiscal_year: i32) -> Result<FiscalHistory, StoreError> {
        self.inner
            .read()
            .histories
            .get(&(client_id, fiscal_year))
            .cloned()
            .ok_or(StoreError::HistoryNotFound {
                client_id,
                fiscal_year,
            })
    }

    fn create(&self, mut history: FiscalHistory) -> Result<FiscalHistory, StoreError> {
        let key = (history.client_id, history.fiscal_year);
        let mut inner = self.inner.write();
        if inner.histories.contains_key(&key) {
            return Err(StoreError::HistoryExists {
                client_id: key.0,
                fiscal_year: key.1,
            });
        }
        if let Some(id) = first_unknown_id(&history, &BTreeSet::new()) {
            tracing::warn!(%id, client = %key.0, fiscal_year = key.1, "new history references a stored id");
            return Err(StoreError::StalePersistenceId {
                id,
                client_id: key.0,
                fiscal_year: key.1,
            });
        }
        history.id = None;
        inner.assign_ids(&mut history);
        history.recompute_global_status();
        inner.histories.insert(key, history.clone());
        tracing::info!(
            client = %key.0,
            fiscal_year = key.1,
            records = history.record_count(),
            "fiscal history created"
        );
        Ok(history)
    }

    fn save(&self, mut history: FiscalHistory) -> Result<FiscalHistory, StoreError> {
        let key = (history.client_id, history.fiscal_year);
        let mut inner = self.inner.write();
        let Some(current) = inner.histories.get(&key) else {
            return Err(StoreError::HistoryNotFound {
                client_id: key.0,
                fiscal_year: key.1,
            });
        };
        let held: BTreeSet<RecordId> = current.record_ids().collect();
        if let Some(id) = first_unknown_id(&history, &held) {
            tracing::warn!(%id, client = %key.0, fiscal_year = key.1, "rejecting stale record id");
            return Err(StoreError::StalePersistenceId {
                id,
                client_id: key.0,
                fiscal_year: key.1,
            });
        }
        history.id = current.id;
        inner.assign_ids(&mut history);
        history.recompute_global_status();
        inner.histories.insert(key, history.clone());
        tracing::debug!(
            client = %key.0,
            fiscal_year = key.1,
            records = history.record_count(),
            "fiscal history saved"
        );
        Ok(history)
    }
}
