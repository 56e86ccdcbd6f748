//! Picking persistence: append a new picking stream, rehydrate it on read.

use uuid::Uuid;

use stockpack_core::{Aggregate, ExpectedVersion};
use stockpack_inventory::{Picking, PickingEvent, PickingId};

use crate::context::StockContext;
use crate::error::PackingError;
use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

/// Aggregate type recorded on every picking stream.
pub const PICKING_AGGREGATE_TYPE: &str = "stock.picking";

#[derive(Debug)]
pub struct PickingRepository<S> {
    store: S,
}

impl<S> PickingRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S> PickingRepository<S>
where
    S: EventStore,
{
    /// Fresh read of a picking from its event stream; `None` if it was never committed.
    pub fn load(&self, ctx: &StockContext, picking_id: PickingId) -> Result<Option<Picking>, PackingError> {
        let history = self.store.load_stream(ctx.tenant_id(), picking_id.0)?;
        if history.is_empty() {
            return Ok(None);
        }
        validate_loaded_stream(ctx, picking_id, &history)?;

        let mut picking = Picking::empty(picking_id);
        apply_history(&mut picking, &history)?;
        Ok(Some(picking))
    }

    /// Append the complete event list of a new picking as one batch.
    ///
    /// The stream must not exist yet; the whole batch is committed or nothing is.
    pub fn save_new(
        &self,
        ctx: &StockContext,
        picking_id: PickingId,
        events: &[PickingEvent],
    ) -> Result<Vec<StoredEvent>, PackingError> {
        if let Some(foreign) = events.iter().find(|e| e.tenant_id() != ctx.tenant_id()) {
            return Err(EventStoreError::TenantIsolation(format!(
                "picking event for tenant {} appended in tenant {}",
                foreign.tenant_id(),
                ctx.tenant_id()
            ))
            .into());
        }

        let uncommitted = events
            .iter()
            .map(|ev| {
                UncommittedEvent::from_typed(
                    ctx.tenant_id(),
                    picking_id.0,
                    PICKING_AGGREGATE_TYPE,
                    Uuid::now_v7(),
                    ev,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.store.append(uncommitted, ExpectedVersion::Exact(0))?)
    }
}

fn validate_loaded_stream(
    ctx: &StockContext,
    picking_id: PickingId,
    stream: &[StoredEvent],
) -> Result<(), EventStoreError> {
    // A store must never hand back another tenant's or another stream's events.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.tenant_id != ctx.tenant_id() {
            return Err(EventStoreError::TenantIsolation(format!(
                "loaded stream contains wrong tenant_id at index {idx}"
            )));
        }
        if e.aggregate_id != picking_id.0 {
            return Err(EventStoreError::TenantIsolation(format!(
                "loaded stream contains wrong aggregate_id at index {idx}"
            )));
        }
        if e.aggregate_type != PICKING_AGGREGATE_TYPE {
            return Err(EventStoreError::AggregateTypeMismatch(format!(
                "expected '{PICKING_AGGREGATE_TYPE}', found '{}'",
                e.aggregate_type
            )));
        }
        if e.sequence_number <= last {
            return Err(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            )));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history(picking: &mut Picking, history: &[StoredEvent]) -> Result<(), EventStoreError> {
    for stored in history {
        let ev: PickingEvent = serde_json::from_value(stored.payload.clone())
            .map_err(|e| EventStoreError::Deserialize(e.to_string()))?;
        picking.apply(&ev);
    }
    Ok(())
}
