//! Ledger event types

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Names of the events the contract emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    CarCreated,
    CarOwnerChanged,
}

impl EventKind {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CarCreated => "CarCreated",
            EventKind::CarOwnerChanged => "CarOwnerChanged",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "CarCreated" => Ok(EventKind::CarCreated),
            "CarOwnerChanged" => Ok(EventKind::CarOwnerChanged),
            _ => Err(format!("Unknown event: {}", s)),
        }
    }
}

/// Payload of `CarCreated`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarCreated {
    pub car_number: String,
    pub owner: String,
    pub make: String,
    pub model: String,
}

/// Payload of `CarOwnerChanged`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarOwnerChanged {
    pub car_number: String,
    pub previous_owner: String,
    pub new_owner: String,
    /// The record's new `lastModified`
    pub timestamp: String,
}

/// A domain event emitted alongside a mutating operation
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    CarCreated(CarCreated),
    CarOwnerChanged(CarOwnerChanged),
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::CarCreated(_) => EventKind::CarCreated,
            LedgerEvent::CarOwnerChanged(_) => EventKind::CarOwnerChanged,
        }
    }

    /// Event name as seen by subscribers
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// JSON payload
    pub fn payload(&self) -> Result<Value> {
        let value = match self {
            LedgerEvent::CarCreated(p) => serde_json::to_value(p)?,
            LedgerEvent::CarOwnerChanged(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// JSON payload as bytes, the form delivered to external subscribers
    pub fn payload_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.payload()?)?)
    }
}

/// An event as recorded by a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedEvent {
    /// Transaction that emitted the event
    pub tx_id: String,
    /// Event name
    pub name: String,
    /// JSON payload
    pub payload: Value,
}
