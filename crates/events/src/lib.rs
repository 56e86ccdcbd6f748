//! Domain events and their distribution.
//!
//! Mechanics only: the [`Event`] trait, the tenant-scoped [`EventEnvelope`],
//! the pub/sub [`EventBus`] abstraction with an in-memory implementation, and
//! [`execute`] for running a command against an aggregate in memory.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
