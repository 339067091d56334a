//! # CarLedger Core
//!
//! A vehicle asset contract for a permissioned ledger:
//!
//! - **Contract**: nine operations over car records (seed, read, create,
//!   list, transfer, update, query by owner or make, history)
//! - **Storage**: a versioned key-value store with ordered range scans,
//!   JSON predicate queries and per-key history
//! - **Events**: `CarCreated` and `CarOwnerChanged`, emitted out-of-band to
//!   any subscriber
//!
//! ## Core Principle
//!
//! > The contract holds no state; the ledger is the only source of truth.
//!
//! Each invocation gets a [`TransactionContext`] carrying the transaction id
//! and agreed timestamp. Replaying the same transaction against the same
//! ledger state produces the same writes.
//!
//! ## Example
//!
//! ```rust
//! use carledger_core::{AssetContract, EventLog, InMemoryStore, TransactionContext, TxInfo};
//!
//! let store = InMemoryStore::new();
//! let events = EventLog::new();
//! let contract = AssetContract::new();
//!
//! let ctx = TransactionContext::new(&store, &events, TxInfo::generate());
//! contract.init_ledger(&ctx).unwrap();
//!
//! let ctx = TransactionContext::new(&store, &events, TxInfo::generate());
//! let car = contract.change_car_owner(&ctx, "CAR0", "Dave").unwrap();
//! assert_eq!(car.owner, "Dave");
//!
//! // Text surface used by the hosting platform
//! let ctx = TransactionContext::new(&store, &events, TxInfo::generate());
//! let json = contract.invoke(&ctx, "queryCarsByOwner", &["Dave".to_string()]).unwrap();
//! assert!(json.contains("CAR0"));
//! ```

pub mod asset;
pub mod collector;
pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod storage;
pub mod transaction;

// Re-export main types
pub use asset::{Car, HistoryEntry, QueryResult, Record};
pub use config::{ContractConfig, ContractConfigBuilder};
pub use contract::{AssetContract, NewCar, FUNCTIONS};
pub use error::{ErrorCategory, ErrorDetail, ErrorResponse, LedgerError, Result};
pub use events::{EmittedEvent, EventKind, EventLog, EventSink, LedgerEvent, NullSink};
pub use storage::{AssetStore, InMemoryStore, ScopedIterator, Selector, StateIterator, StoreSnapshot};
pub use transaction::{TransactionContext, TxInfo};

/// Name the contract is registered under
pub const CONTRACT_NAME: &str = "fabcar";
