//! Result collection
//!
//! Drains store iterators into materialized, ordered lists. Values are
//! parsed as JSON where possible and passed through as text otherwise, so a
//! single odd value never fails a listing.

use crate::asset::{HistoryEntry, QueryResult, Record};
use crate::error::Result;
use crate::storage::{HistoryItem, ScopedIterator, StateEntry};
use crate::transaction::iso8601;

/// Collect a range scan or predicate query into `{key, record}` entries
///
/// Keys holding an empty value are skipped.
pub fn collect_states(iter: ScopedIterator<StateEntry>) -> Result<Vec<QueryResult>> {
    let results = iter.drain(|entry| {
        (!entry.value.is_empty()).then(|| QueryResult {
            record: Record::from_bytes(&entry.value),
            key: entry.key,
        })
    })?;
    Ok(results.into_iter().flatten().collect())
}

/// Collect a key's history into entries, oldest first
///
/// Writes of an empty value are skipped; deletes are always kept.
pub fn collect_history(iter: ScopedIterator<HistoryItem>) -> Result<Vec<HistoryEntry>> {
    let entries = iter.drain(|item| {
        if !item.is_delete && item.value.is_empty() {
            return None;
        }
        Some(HistoryEntry {
            transaction_id: item.tx_id,
            timestamp: iso8601(&item.timestamp),
            is_delete: item.is_delete,
            value: if item.is_delete {
                None
            } else {
                Some(Record::from_bytes(&item.value))
            },
        })
    })?;
    Ok(entries.into_iter().flatten().collect())
}
