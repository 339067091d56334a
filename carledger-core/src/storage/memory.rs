//! In-memory store backend

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LedgerError, Result};
use crate::transaction::TxInfo;

use super::{
    AssetStore, HistoryItem, HistoryIter, Selector, StateEntry, StateIter, StateIterator,
    VersionedValue,
};

/// Current value of one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredValue {
    value: Vec<u8>,
    version: u64,
}

/// Full contents of an [`InMemoryStore`]: current state plus per-key history
///
/// Serializable so the CLI can carry a ledger between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    state: BTreeMap<String, StoredValue>,
    history: BTreeMap<String, Vec<HistoryItem>>,
}

impl StoreSnapshot {
    /// Number of keys with a current value
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

/// In-memory store backend (default)
///
/// Keys live in a `BTreeMap`, so range scans follow raw byte order. Every
/// write appends to the key's history and bumps its version. Thread-safe via
/// RwLock. Contents are lost on drop unless exported with [`snapshot`].
///
/// Iterators are snapshots taken when the scan starts; the store tracks how
/// many are still open (see [`open_iterators`]).
///
/// [`snapshot`]: InMemoryStore::snapshot
/// [`open_iterators`]: InMemoryStore::open_iterators
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<StoreSnapshot>,
    open_iterators: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from exported contents
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            data: RwLock::new(snapshot),
            open_iterators: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Export the current contents
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        let data = self.data.read().map_err(|_| LedgerError::StorageLocked)?;
        Ok(data.clone())
    }

    /// Number of keys with a current value
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.state.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in byte order
    pub fn keys(&self) -> Vec<String> {
        self.data
            .read()
            .map(|d| d.state.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Iterators handed out and not yet closed
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    /// Remove all state and history
    pub fn clear(&self) {
        if let Ok(mut data) = self.data.write() {
            *data = StoreSnapshot::default();
        }
    }

    fn write(
        &self,
        tx: &TxInfo,
        key: &str,
        value: Vec<u8>,
        expected: Option<Option<u64>>,
    ) -> Result<u64> {
        let mut data = self.data.write().map_err(|_| LedgerError::StorageLocked)?;

        let current = data.state.get(key).map(|v| v.version);
        if let Some(expected) = expected {
            if expected != current {
                return Err(LedgerError::VersionConflict {
                    key: key.to_string(),
                    expected: describe_version(expected),
                    actual: describe_version(current),
                });
            }
        }

        let version = current.map_or(1, |v| v + 1);
        data.history
            .entry(key.to_string())
            .or_default()
            .push(HistoryItem {
                tx_id: tx.tx_id().to_string(),
                timestamp: tx.timestamp(),
                is_delete: false,
                value: value.clone(),
            });
        data.state
            .insert(key.to_string(), StoredValue { value, version });

        tracing::trace!(key, version, tx_id = tx.tx_id(), "state written");
        Ok(version)
    }

    fn lease<T: Send + 'static>(&self, items: Vec<T>) -> Box<dyn StateIterator<Item = T>> {
        self.open_iterators.fetch_add(1, Ordering::SeqCst);
        Box::new(SnapshotIter {
            items: items.into_iter(),
            lease: Some(Arc::clone(&self.open_iterators)),
        })
    }
}

fn describe_version(version: Option<u64>) -> String {
    match version {
        Some(v) => format!("version {}", v),
        None => "absent".to_string(),
    }
}

impl AssetStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        let data = self.data.read().map_err(|_| LedgerError::StorageLocked)?;
        Ok(data.state.get(key).map(|v| VersionedValue {
            value: v.value.clone(),
            version: v.version,
        }))
    }

    fn put(&self, tx: &TxInfo, key: &str, value: Vec<u8>) -> Result<u64> {
        self.write(tx, key, value, None)
    }

    fn put_if_version(
        &self,
        tx: &TxInfo,
        key: &str,
        value: Vec<u8>,
        expected: Option<u64>,
    ) -> Result<u64> {
        self.write(tx, key, value, Some(expected))
    }

    fn range_scan(&self, start_key: &str, end_key: &str) -> Result<StateIter> {
        let entries = {
            let data = self.data.read().map_err(|_| LedgerError::StorageLocked)?;
            if start_key >= end_key {
                Vec::new()
            } else {
                data.state
                    .range(start_key.to_string()..end_key.to_string())
                    .map(|(key, v)| StateEntry {
                        key: key.clone(),
                        value: v.value.clone(),
                    })
                    .collect()
            }
        };
        Ok(self.lease(entries))
    }

    fn predicate_query(&self, selector: &Selector) -> Result<StateIter> {
        let entries = {
            let data = self.data.read().map_err(|_| LedgerError::StorageLocked)?;
            data.state
                .iter()
                .filter(|(_, v)| {
                    serde_json::from_slice::<Value>(&v.value)
                        .map(|doc| selector.matches(&doc))
                        .unwrap_or(false)
                })
                .map(|(key, v)| StateEntry {
                    key: key.clone(),
                    value: v.value.clone(),
                })
                .collect()
        };
        Ok(self.lease(entries))
    }

    fn history(&self, key: &str) -> Result<HistoryIter> {
        let items = {
            let data = self.data.read().map_err(|_| LedgerError::StorageLocked)?;
            data.history.get(key).cloned().unwrap_or_default()
        };
        Ok(self.lease(items))
    }

    fn health_check(&self) -> Result<()> {
        let _data = self.data.read().map_err(|_| LedgerError::StorageLocked)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

/// Iterator over a materialized snapshot
///
/// Holds a lease on the store's open-iterator counter until closed. Dropping
/// without closing keeps the lease, which is how leaks show up in tests.
struct SnapshotIter<T> {
    items: std::vec::IntoIter<T>,
    lease: Option<Arc<AtomicUsize>>,
}

impl<T: Send> StateIterator for SnapshotIter<T> {
    type Item = T;

    fn next(&mut self) -> Result<Option<T>> {
        if self.lease.is_none() {
            return Ok(None);
        }
        Ok(self.items.next())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(counter) = self.lease.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
