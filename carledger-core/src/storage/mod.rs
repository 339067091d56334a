//! Pluggable Asset Store
//!
//! This module provides the key/value + iterator interface the contract runs
//! against. The platform that hosts the contract supplies the real backend;
//! [`InMemoryStore`] is the reference implementation used by the CLI, the
//! HTTP façade and the tests.
//!
//! # Example
//!
//! ```rust
//! use carledger_core::storage::{AssetStore, InMemoryStore};
//! use carledger_core::TxInfo;
//! use chrono::Utc;
//!
//! let store = InMemoryStore::new();
//! let tx = TxInfo::new("tx-1", Utc::now());
//! store.put(&tx, "CAR0", br#"{"make":"Toyota"}"#.to_vec()).unwrap();
//!
//! let value = store.get("CAR0").unwrap().unwrap();
//! assert_eq!(value.version, 1);
//! ```

mod iterator;
mod memory;

pub use iterator::{ScopedIterator, StateIterator};
pub use memory::{InMemoryStore, StoreSnapshot};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::transaction::TxInfo;

/// Boxed iterator over current state entries
pub type StateIter = Box<dyn StateIterator<Item = StateEntry>>;

/// Boxed iterator over the committed versions of one key
pub type HistoryIter = Box<dyn StateIterator<Item = HistoryItem>>;

/// A stored value together with its per-key version counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    /// Raw record bytes
    pub value: Vec<u8>,
    /// Incremented on every write to the key, starting at 1
    pub version: u64,
}

/// One `(key, value)` pair yielded by a range scan or predicate query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub value: Vec<u8>,
}

/// One committed version of a key, as yielded by history replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Transaction that wrote this version
    pub tx_id: String,
    /// Transaction timestamp
    pub timestamp: DateTime<Utc>,
    /// Whether this version is a delete marker
    pub is_delete: bool,
    /// Value as committed (empty for delete markers)
    pub value: Vec<u8>,
}

/// Equality selector for predicate queries
///
/// Matches JSON objects whose top-level fields equal every selector field.
/// Serializes to the CouchDB-style `{"selector": {...}}` query document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    selector: BTreeMap<String, Value>,
}

impl Selector {
    /// Create an empty selector (matches every JSON object)
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`
    pub fn equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.selector.insert(field.into(), value.into());
        self
    }

    /// The field constraints
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.selector
    }

    /// Check a parsed document against the selector
    pub fn matches(&self, document: &Value) -> bool {
        match document {
            Value::Object(map) => self
                .selector
                .iter()
                .all(|(field, expected)| map.get(field) == Some(expected)),
            _ => false,
        }
    }

    /// Render the query document handed to rich-query backends
    pub fn to_query_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Asset store trait
///
/// Implement this trait to run the contract against a different ledger
/// backend. All methods take `&self` to allow for interior mutability.
///
/// Sequence-producing methods hand out a [`StateIterator`] that must be
/// closed; wrap it in a [`ScopedIterator`] so it is released on every path.
pub trait AssetStore: Send + Sync {
    /// Single-key lookup
    fn get(&self, key: &str) -> Result<Option<VersionedValue>>;

    /// Unconditional upsert. Returns the new version of the key.
    fn put(&self, tx: &TxInfo, key: &str, value: Vec<u8>) -> Result<u64>;

    /// Optimistic upsert
    ///
    /// `expected = None` requires the key to be absent; `Some(v)` requires
    /// the current version to be `v`. On mismatch nothing is written and
    /// `LedgerError::VersionConflict` is returned.
    fn put_if_version(
        &self,
        tx: &TxInfo,
        key: &str,
        value: Vec<u8>,
        expected: Option<u64>,
    ) -> Result<u64>;

    /// Keys in `[start_key, end_key)`, ordered by raw byte comparison
    fn range_scan(&self, start_key: &str, end_key: &str) -> Result<StateIter>;

    /// Entries whose JSON value satisfies the selector. Ordering is
    /// backend-defined.
    fn predicate_query(&self, selector: &Selector) -> Result<StateIter>;

    /// Every committed version of `key`, oldest first
    fn history(&self, key: &str) -> Result<HistoryIter>;

    /// Check if backend is healthy
    fn health_check(&self) -> Result<()>;

    /// Get backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}
