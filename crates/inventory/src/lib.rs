//! Inventory domain module.
//!
//! Pickings are event-sourced aggregates; the records they reference
//! (locations, operation types, products, lots, packages, quants) are plain
//! entities. Everything here is deterministic domain logic (no IO, no storage).

pub mod picking;
pub mod quantity;
pub mod records;

pub use picking::{
    AddMove, ConfirmPicking, CreatePicking, MoveAdded, MoveAvailability, MoveId, MoveLine,
    MoveLineId, MoveLinesPacked, MoveReservation, PackMoveLines, Picking, PickingCommand,
    PickingConfirmed, PickingCreated, PickingEvent, PickingId, PickingReserved, PickingState,
    QuantityDoneRecorded, RecordQuantityDone, ReservePicking, StockMove,
};
pub use quantity::Quantity;
pub use records::{
    Location, LocationId, LocationUsage, Lot, LotId, Package, PackageId, Partner, PartnerId,
    PickingType, PickingTypeCode, PickingTypeId, Product, ProductId, Quant,
};
