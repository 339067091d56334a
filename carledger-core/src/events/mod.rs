//! Contract events
//!
//! Mutating operations announce what they did through an [`EventSink`].
//! Emission is out-of-band: the contract neither waits for nor inspects the
//! outcome, and only external subscribers observe the events.
//!
//! | Event | Payload |
//! |---|---|
//! | `CarCreated` | `{carNumber, owner, make, model}` |
//! | `CarOwnerChanged` | `{carNumber, previousOwner, newOwner, timestamp}` |

mod event;
mod sink;

pub use event::{CarCreated, CarOwnerChanged, EmittedEvent, EventKind, LedgerEvent};
pub use sink::{EventLog, EventSink, NullSink};
