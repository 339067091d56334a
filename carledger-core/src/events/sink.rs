//! Event sinks

use std::sync::RwLock;

use crate::error::{LedgerError, Result};

use super::event::{EmittedEvent, EventKind, LedgerEvent};

/// Destination for contract events
///
/// Emission is fire-and-forget: a sink must not fail or block the
/// transaction that emits.
pub trait EventSink: Send + Sync {
    fn emit(&self, tx_id: &str, event: &LedgerEvent);
}

/// Sink that discards every event
#[derive(Debug, Default, Clone)]
pub struct NullSink;

impl NullSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for NullSink {
    fn emit(&self, _tx_id: &str, _event: &LedgerEvent) {}
}

/// Recording sink
///
/// Keeps every emitted event in order and optionally forwards each one to a
/// callback (for streaming to subscribers).
pub struct EventLog {
    events: RwLock<Vec<EmittedEvent>>,
    on_emit: Option<Box<dyn Fn(&EmittedEvent) + Send + Sync>>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events)
            .field("on_emit", &self.on_emit.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            on_emit: None,
        }
    }

    /// Create a log with an event callback
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&EmittedEvent) + Send + Sync + 'static,
    {
        self.on_emit = Some(Box::new(callback));
        self
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// Recorded events of one kind
    pub fn events_of(&self, kind: EventKind) -> Vec<EmittedEvent> {
        self.events
            .read()
            .map(|e| e.iter().filter(|ev| ev.name == kind.as_str()).cloned().collect())
            .unwrap_or_default()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<EmittedEvent> {
        self.events.read().ok().and_then(|e| e.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    /// Export recorded events as JSONL
    pub fn export_jsonl(&self) -> Result<String> {
        let events = self.events.read().map_err(|_| LedgerError::StorageLocked)?;
        let lines: std::result::Result<Vec<String>, _> =
            events.iter().map(serde_json::to_string).collect();
        Ok(lines?.join("\n"))
    }
}

impl EventSink for EventLog {
    fn emit(&self, tx_id: &str, event: &LedgerEvent) {
        let payload = match event.payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(event = event.name(), error = %e, "dropping unserializable event");
                return;
            }
        };

        let emitted = EmittedEvent {
            tx_id: tx_id.to_string(),
            name: event.name().to_string(),
            payload,
        };
        tracing::info!(event = %emitted.name, tx_id, payload = %emitted.payload, "event emitted");

        if let Some(ref callback) = self.on_emit {
            callback(&emitted);
        }
        if let Ok(mut events) = self.events.write() {
            events.push(emitted);
        }
    }
}
