//! Per-invocation transaction context
//!
//! Every contract operation runs against a [`TransactionContext`]: the
//! transaction id and the agreed transaction timestamp, plus borrowed
//! handles to the store and the event sink. The contract never reads the
//! local clock; all `createdAt`/`lastModified` values come from
//! [`TxInfo::timestamp`], so replicas executing the same transaction produce
//! identical writes.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::Result;
use crate::events::{EventSink, LedgerEvent};
use crate::storage::{AssetStore, HistoryItem, ScopedIterator, Selector, StateEntry, VersionedValue};

/// Transaction identity: id and agreed timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInfo {
    tx_id: String,
    timestamp: DateTime<Utc>,
}

impl TxInfo {
    /// Create transaction info from values agreed by the caller
    pub fn new(tx_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tx_id: tx_id.into(),
            timestamp,
        }
    }

    /// Mint a fresh transaction at the current time
    ///
    /// The id is the hex SHA-256 of a random nonce and the timestamp, the
    /// same shape ledger platforms use for transaction ids. Only callers
    /// that own the transaction boundary (CLI, HTTP façade) should use this.
    pub fn generate() -> Self {
        let timestamp = Utc::now();
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(timestamp.to_rfc3339().as_bytes());
        Self {
            tx_id: hex::encode(hasher.finalize()),
            timestamp,
        }
    }

    pub fn tx_id(&self) -> &str {
        &self.tx_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Timestamp as ISO-8601 with millisecond precision (`2024-03-01T12:00:00.000Z`)
    pub fn iso_timestamp(&self) -> String {
        iso8601(&self.timestamp)
    }
}

/// Format a timestamp the way records store it
pub fn iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Store and event access scoped to one transaction
pub struct TransactionContext<'a> {
    tx: TxInfo,
    store: &'a dyn AssetStore,
    events: &'a dyn EventSink,
}

impl<'a> TransactionContext<'a> {
    pub fn new(store: &'a dyn AssetStore, events: &'a dyn EventSink, tx: TxInfo) -> Self {
        Self { tx, store, events }
    }

    pub fn tx(&self) -> &TxInfo {
        &self.tx
    }

    pub fn tx_id(&self) -> &str {
        self.tx.tx_id()
    }

    /// Read a key's current value and version
    pub fn get_state(&self, key: &str) -> Result<Option<VersionedValue>> {
        self.store.get(key)
    }

    /// Unconditional write
    pub fn put_state(&self, key: &str, value: Vec<u8>) -> Result<u64> {
        self.store.put(&self.tx, key, value)
    }

    /// Write only if the key is still at `expected` (`None`: still absent)
    pub fn put_state_if_version(
        &self,
        key: &str,
        value: Vec<u8>,
        expected: Option<u64>,
    ) -> Result<u64> {
        self.store.put_if_version(&self.tx, key, value, expected)
    }

    pub fn state_by_range(&self, start_key: &str, end_key: &str) -> Result<ScopedIterator<StateEntry>> {
        Ok(ScopedIterator::new(self.store.range_scan(start_key, end_key)?))
    }

    pub fn query_result(&self, selector: &Selector) -> Result<ScopedIterator<StateEntry>> {
        tracing::debug!(query = %selector.to_query_string(), "predicate query");
        Ok(ScopedIterator::new(self.store.predicate_query(selector)?))
    }

    pub fn history_for_key(&self, key: &str) -> Result<ScopedIterator<HistoryItem>> {
        Ok(ScopedIterator::new(self.store.history(key)?))
    }

    /// Emit an event; the sink neither acknowledges nor fails the transaction
    pub fn set_event(&self, event: LedgerEvent) {
        self.events.emit(self.tx.tx_id(), &event);
    }
}

impl std::fmt::Debug for TransactionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("tx", &self.tx)
            .field("store", &self.store.name())
            .finish()
    }
}
