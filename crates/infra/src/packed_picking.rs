//! Packed picking creation.
//!
//! One call builds a complete picking in memory: header, one move per request
//! (recorded as fully done), optional lots, an optional package on every move
//! line and, on request, confirmation plus reservation. Nothing is written
//! until every step has succeeded; the picking stream is then appended as one
//! batch and the side records (lots, package, quant reservations, name
//! counter) are committed after it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpack_core::DomainError;
use stockpack_events::execute;
use stockpack_inventory::{
    AddMove, ConfirmPicking, CreatePicking, LocationId, Lot, LotId, MoveAvailability, MoveId,
    MoveLineId, PackMoveLines, Package, PackageId, PartnerId, Picking, PickingCommand,
    PickingEvent, PickingId, PickingState, PickingType, ProductId, Quantity, RecordQuantityDone,
    ReservePicking,
};

use crate::config::PackingConfig;
use crate::context::StockContext;
use crate::error::PackingError;
use crate::event_store::EventStore;
use crate::pickings::PickingRepository;
use crate::records::{StagedRecords, StockRecords};

/// One requested movement: product, quantity and optional serial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
    #[serde(default)]
    pub serial: Option<String>,
}

impl MoveRequest {
    pub fn new(product_id: ProductId, quantity: f64, serial: Option<&str>) -> Self {
        Self {
            product_id,
            quantity: Quantity::new(quantity),
            serial: serial.map(str::to_string),
        }
    }

    /// Serial to create a lot for; empty strings count as absent.
    fn lot_name(&self) -> Option<&str> {
        self.serial.as_deref().filter(|s| !s.is_empty())
    }
}

/// Optional inputs of [`PackedPickingService::create_packed_picking`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedPickingOptions {
    /// Owner of the goods (the picking's partner).
    pub owner: Option<PartnerId>,
    /// Source location; the operation type default when `None`.
    pub location: Option<LocationId>,
    /// Destination location; the operation type default when `None`.
    pub location_dest: Option<LocationId>,
    /// Package put on every move line; an empty name means no package.
    pub package_name: Option<String>,
    /// Create one lot per request carrying a serial.
    pub create_lots: bool,
    /// Confirm the picking and reserve stock for it.
    pub set_ready: bool,
}

#[derive(Debug)]
pub struct PackedPickingService<S> {
    pickings: PickingRepository<S>,
    records: Arc<StockRecords>,
    config: PackingConfig,
}

impl<S> PackedPickingService<S> {
    pub fn new(store: S, records: Arc<StockRecords>, config: PackingConfig) -> Self {
        Self {
            pickings: PickingRepository::new(store),
            records,
            config,
        }
    }

    pub fn records(&self) -> &StockRecords {
        &self.records
    }

    pub fn pickings(&self) -> &PickingRepository<S> {
        &self.pickings
    }

}

/// Picking under construction plus the events and records it produced so far.
struct Draft<'a> {
    ctx: &'a StockContext,
    picking: Picking,
    events: Vec<PickingEvent>,
    staged: StagedRecords,
    now: DateTime<Utc>,
}

impl Draft<'_> {
    fn run(&mut self, command: PickingCommand) -> Result<Vec<PickingEvent>, DomainError> {
        let events = execute(&mut self.picking, &command)?;
        self.events.extend(events.iter().cloned());
        Ok(events)
    }

    fn picking_id(&self) -> PickingId {
        self.picking.id_typed()
    }
}

impl<S> PackedPickingService<S>
where
    S: EventStore,
{
    /// Create a picking of `operation_type` with one move per request.
    ///
    /// Fails with a validation error when a requested product does not exist;
    /// in that case nothing of the call is persisted.
    pub fn create_packed_picking(
        &self,
        ctx: &StockContext,
        operation_type: &PickingType,
        moves: &[MoveRequest],
        options: PackedPickingOptions,
    ) -> Result<Picking, PackingError> {
        let tenant_id = ctx.tenant_id();
        let now = Utc::now();

        let location_id = options.location.or(operation_type.default_location_src_id);
        let location_dest_id = options.location_dest.or(operation_type.default_location_dest_id);

        // Held until the side records are committed.
        let _write = self.records.begin_write();
        let number = self.records.next_picking_number(ctx, operation_type.id);
        let mut draft = Draft {
            ctx,
            picking: Picking::empty(PickingId::generate()),
            events: Vec::new(),
            staged: StagedRecords {
                sequence: Some((operation_type.id, number)),
                ..StagedRecords::default()
            },
            now,
        };

        draft.run(PickingCommand::CreatePicking(CreatePicking {
            tenant_id,
            picking_id: draft.picking_id(),
            name: operation_type.picking_name(number, self.config.sequence_padding),
            picking_type_id: operation_type.id,
            location_id,
            location_dest_id,
            partner_id: options.owner,
            occurred_at: now,
        }))?;

        for request in moves {
            self.add_done_move(&mut draft, request, options.create_lots)?;
        }

        if let Some(name) = options.package_name.as_deref().filter(|n| !n.is_empty()) {
            let package = Package {
                id: PackageId::new(),
                name: name.to_string(),
            };
            draft.run(PickingCommand::PackMoveLines(PackMoveLines {
                tenant_id,
                picking_id: draft.picking_id(),
                package_id: package.id,
                occurred_at: now,
            }))?;
            draft.staged.package = Some(package);
        }

        if options.set_ready {
            self.make_ready(&mut draft)?;
        }

        let Draft {
            picking,
            events,
            staged,
            ..
        } = draft;

        let committed = self.pickings.save_new(ctx, picking.id_typed(), &events)?;
        self.records.commit(ctx, staged);

        tracing::info!(
            tenant_id = %tenant_id,
            user_id = %ctx.user_id(),
            picking_id = %picking.id_typed(),
            name = picking.name(),
            moves = picking.moves().len(),
            state = picking.state().as_str(),
            events = committed.len(),
            "packed picking created"
        );

        Ok(picking)
    }

    fn add_done_move(
        &self,
        draft: &mut Draft<'_>,
        request: &MoveRequest,
        create_lots: bool,
    ) -> Result<(), PackingError> {
        let Some(product) = self.records.product(draft.ctx, request.product_id) else {
            tracing::warn!(
                product_id = %request.product_id,
                "packed picking aborted: unknown product"
            );
            return Err(DomainError::validation(format!(
                "product with id {} does not exist",
                request.product_id
            ))
            .into());
        };

        let tenant_id = draft.ctx.tenant_id();
        let picking_id = draft.picking_id();
        let move_id = MoveId::new();

        draft.run(PickingCommand::AddMove(AddMove {
            tenant_id,
            picking_id,
            move_id,
            product_id: product.id,
            name: product.name.clone(),
            uom: product.uom.clone(),
            quantity: request.quantity,
            occurred_at: draft.now,
        }))?;
        draft.run(PickingCommand::RecordQuantityDone(RecordQuantityDone {
            tenant_id,
            picking_id,
            move_id,
            move_line_id: MoveLineId::new(),
            quantity: request.quantity,
            occurred_at: draft.now,
        }))?;

        tracing::debug!(product = %product.name, quantity = %request.quantity, "move added");

        if create_lots {
            if let Some(serial) = request.lot_name() {
                draft.staged.lots.push(Lot {
                    id: LotId::new(),
                    product_id: product.id,
                    name: serial.to_string(),
                });
                tracing::debug!(serial, "lot staged");
            }
        }

        Ok(())
    }

    /// Confirm, then reserve what the source locations can supply.
    fn make_ready(&self, draft: &mut Draft<'_>) -> Result<(), PackingError> {
        let tenant_id = draft.ctx.tenant_id();
        let picking_id = draft.picking_id();

        draft.run(PickingCommand::ConfirmPicking(ConfirmPicking {
            tenant_id,
            picking_id,
            occurred_at: draft.now,
        }))?;

        // Empty pickings stay in draft and have nothing to reserve.
        if draft.picking.state() != PickingState::Confirmed {
            return Ok(());
        }

        let availability = self.availability(draft.ctx, &draft.picking);
        let reserved = draft.run(PickingCommand::ReservePicking(ReservePicking {
            tenant_id,
            picking_id,
            availability,
            occurred_at: draft.now,
        }))?;

        for event in &reserved {
            let PickingEvent::PickingReserved(e) = event else {
                continue;
            };
            for reservation in &e.reservations {
                let Some(mv) = draft.picking.find_move(reservation.move_id) else {
                    continue;
                };
                if self.records.tracks_stock(draft.ctx, mv.location_id) {
                    draft
                        .staged
                        .reservations
                        .push((mv.location_id, mv.product_id, reservation.quantity));
                }
            }
        }

        Ok(())
    }

    /// Reservable quantity per move, in move order.
    ///
    /// Moves leaving a non-counted location get their full remaining demand.
    /// Other moves share the free quantity of their quant; earlier moves are
    /// served first.
    fn availability(&self, ctx: &StockContext, picking: &Picking) -> Vec<MoveAvailability> {
        let mut consumed: HashMap<(LocationId, ProductId), Quantity> = HashMap::new();
        let mut availability = Vec::with_capacity(picking.moves().len());

        for mv in picking.moves() {
            let wanted = mv.remaining_to_reserve();
            let available = if self.records.tracks_stock(ctx, mv.location_id) {
                let used = consumed.entry((mv.location_id, mv.product_id)).or_default();
                let free = self
                    .records
                    .quant(ctx, mv.location_id, mv.product_id)
                    .available()
                    .saturating_sub(*used);
                let take = free.min(wanted);
                *used += take;
                take
            } else {
                wanted
            };

            availability.push(MoveAvailability {
                move_id: mv.id,
                available,
            });
        }

        availability
    }
}
