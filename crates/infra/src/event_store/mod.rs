//! Append-only event store boundary.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

use serde_json::Value as JsonValue;

use stockpack_core::{AggregateId, ExpectedVersion, TenantId};
use stockpack_events::{EventBus, EventEnvelope};

/// Adapter that publishes committed events to an `EventBus` after a successful append.
///
/// Publication happens only after the append succeeds. The events are committed
/// at that point, so a publish failure is logged and the append still succeeds.
pub struct PublishingEventStore<S, B> {
    store: S,
    bus: B,
}

impl<S, B> PublishingEventStore<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }

}

impl<S, B> EventStore for PublishingEventStore<S, B>
where
    S: EventStore,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let committed = self.store.append(events, expected_version)?;

        for e in &committed {
            if let Err(err) = self.bus.publish(e.to_envelope()) {
                tracing::warn!(
                    tenant_id = %e.tenant_id,
                    aggregate_id = %e.aggregate_id,
                    event_type = %e.event_type,
                    sequence_number = e.sequence_number,
                    error = ?err,
                    "event committed but not published"
                );
            }
        }

        Ok(committed)
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        self.store.load_stream(tenant_id, aggregate_id)
    }
}
