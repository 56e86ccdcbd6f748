//! Inventory record tables (master data, lots, packages, quants, sequences).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use stockpack_core::Entity;
use stockpack_inventory::{
    Location, LocationId, Lot, LotId, Package, PackageId, Partner, PartnerId, PickingType, PickingTypeId,
    Product, ProductId, Quant, Quantity,
};

use crate::context::StockContext;
use crate::store::{InMemoryTenantStore, TenantStore};

type QuantKey = (LocationId, ProductId);

/// Records created by one packed-picking call, written together on commit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StagedRecords {
    pub lots: Vec<Lot>,
    pub package: Option<Package>,
    /// Quantities to add to the reserved quantity of quants.
    pub reservations: Vec<(LocationId, ProductId, Quantity)>,
    /// Consumed picking-name counter.
    pub sequence: Option<(PickingTypeId, u64)>,
}

/// Tenant-isolated tables backing the picking creator.
pub struct StockRecords {
    locations: Box<dyn TenantStore<LocationId, Location>>,
    picking_types: Box<dyn TenantStore<PickingTypeId, PickingType>>,
    products: Box<dyn TenantStore<ProductId, Product>>,
    partners: Box<dyn TenantStore<PartnerId, Partner>>,
    lots: Box<dyn TenantStore<LotId, Lot>>,
    packages: Box<dyn TenantStore<PackageId, Package>>,
    quants: Box<dyn TenantStore<QuantKey, Quant>>,
    sequences: Box<dyn TenantStore<PickingTypeId, u64>>,
    writer: Mutex<()>,
}

impl core::fmt::Debug for StockRecords {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StockRecords").finish_non_exhaustive()
    }
}

impl Default for StockRecords {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StockRecords {
    pub fn in_memory() -> Self {
        Self {
            locations: Box::new(InMemoryTenantStore::new()),
            picking_types: Box::new(InMemoryTenantStore::new()),
            products: Box::new(InMemoryTenantStore::new()),
            partners: Box::new(InMemoryTenantStore::new()),
            lots: Box::new(InMemoryTenantStore::new()),
            packages: Box::new(InMemoryTenantStore::new()),
            quants: Box::new(InMemoryTenantStore::new()),
            sequences: Box::new(InMemoryTenantStore::new()),
            writer: Mutex::new(()),
        }
    }

    /// Exclusive access for one packed-picking call.
    ///
    /// Reading the name counter, computing availability and [`commit`](Self::commit)
    /// must all happen while the guard is held, so concurrent calls cannot share a
    /// picking number or reserve the same free quantity twice.
    pub fn begin_write(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_location(&self, ctx: &StockContext, location: Location) -> LocationId {
        let id = *location.id();
        self.locations.upsert(ctx.tenant_id(), id, location);
        id
    }

    pub fn add_picking_type(&self, ctx: &StockContext, picking_type: PickingType) -> PickingTypeId {
        let id = *picking_type.id();
        self.picking_types.upsert(ctx.tenant_id(), id, picking_type);
        id
    }

    pub fn add_product(&self, ctx: &StockContext, product: Product) -> ProductId {
        let id = *product.id();
        self.products.upsert(ctx.tenant_id(), id, product);
        id
    }

    pub fn add_partner(&self, ctx: &StockContext, partner: Partner) -> PartnerId {
        let id = *partner.id();
        self.partners.upsert(ctx.tenant_id(), id, partner);
        id
    }

    pub fn location(&self, ctx: &StockContext, id: LocationId) -> Option<Location> {
        self.locations.get(ctx.tenant_id(), &id)
    }

    pub fn picking_type(&self, ctx: &StockContext, id: PickingTypeId) -> Option<PickingType> {
        self.picking_types.get(ctx.tenant_id(), &id)
    }

    pub fn product(&self, ctx: &StockContext, id: ProductId) -> Option<Product> {
        self.products.get(ctx.tenant_id(), &id)
    }

    pub fn partner(&self, ctx: &StockContext, id: PartnerId) -> Option<Partner> {
        self.partners.get(ctx.tenant_id(), &id)
    }

    pub fn lots(&self, ctx: &StockContext) -> Vec<Lot> {
        self.lots.list(ctx.tenant_id())
    }

    pub fn lots_named(&self, ctx: &StockContext, name: &str) -> Vec<Lot> {
        self.lots
            .list(ctx.tenant_id())
            .into_iter()
            .filter(|lot| lot.name == name)
            .collect()
    }

    pub fn package(&self, ctx: &StockContext, id: PackageId) -> Option<Package> {
        self.packages.get(ctx.tenant_id(), &id)
    }

    pub fn packages_named(&self, ctx: &StockContext, name: &str) -> Vec<Package> {
        self.packages
            .list(ctx.tenant_id())
            .into_iter()
            .filter(|package| package.name == name)
            .collect()
    }

    /// Set the on-hand quantity of a product at a location (reservations kept).
    pub fn set_on_hand(&self, ctx: &StockContext, location_id: LocationId, product_id: ProductId, quantity: Quantity) {
        let mut quant = self.quant(ctx, location_id, product_id);
        quant.quantity = quantity;
        self.quants.upsert(ctx.tenant_id(), (location_id, product_id), quant);
    }

    /// Stock of a product at a location; an empty quant when none was recorded.
    pub fn quant(&self, ctx: &StockContext, location_id: LocationId, product_id: ProductId) -> Quant {
        self.quants
            .get(ctx.tenant_id(), &(location_id, product_id))
            .unwrap_or_else(|| Quant::empty(location_id, product_id))
    }

    /// Whether stock leaving this location is counted in quants.
    ///
    /// Unknown locations count as internal.
    pub fn tracks_stock(&self, ctx: &StockContext, location_id: LocationId) -> bool {
        self.location(ctx, location_id)
            .map(|l| !l.usage.bypasses_reservation())
            .unwrap_or(true)
    }

    /// Counter the next picking of this operation type will use (not consumed).
    pub fn next_picking_number(&self, ctx: &StockContext, picking_type_id: PickingTypeId) -> u64 {
        self.sequences.get(ctx.tenant_id(), &picking_type_id).unwrap_or(0) + 1
    }

    /// Write everything staged by one call.
    pub fn commit(&self, ctx: &StockContext, staged: StagedRecords) {
        let tenant_id = ctx.tenant_id();

        if !staged.lots.is_empty() {
            self.lots.upsert_many(
                tenant_id,
                staged.lots.into_iter().map(|lot| (lot.id, lot)).collect(),
            );
        }

        if let Some(package) = staged.package {
            self.packages.upsert(tenant_id, package.id, package);
        }

        if !staged.reservations.is_empty() {
            let mut touched: HashMap<QuantKey, Quant> = HashMap::new();
            for (location_id, product_id, quantity) in staged.reservations {
                let quant = touched
                    .entry((location_id, product_id))
                    .or_insert_with(|| self.quant(ctx, location_id, product_id));
                quant.reserved_quantity += quantity;
            }
            self.quants.upsert_many(tenant_id, touched.into_iter().collect());
        }

        if let Some((picking_type_id, number)) = staged.sequence {
            self.sequences.upsert(tenant_id, picking_type_id, number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpack_core::{TenantId, UserId};
    use stockpack_inventory::LocationUsage;

    fn ctx() -> StockContext {
        StockContext::new(TenantId::new(), UserId::new())
    }

    #[test]
    fn commit_writes_lots_package_reservations_and_sequence() {
        let records = StockRecords::in_memory();
        let ctx = ctx();
        let location_id = records.add_location(&ctx, Location::internal("WH/Stock"));
        let product_id = records.add_product(&ctx, Product::new("TEST Product 1"));
        let picking_type_id = PickingTypeId::new();
        records.set_on_hand(&ctx, location_id, product_id, Quantity::new(10.0));

        records.commit(
            &ctx,
            StagedRecords {
                lots: vec![Lot {
                    id: LotId::new(),
                    product_id,
                    name: "TEST_SERIAL_001".to_string(),
                }],
                package: Some(Package {
                    id: PackageId::new(),
                    name: "TEST_PACKAGE_001".to_string(),
                }),
                reservations: vec![
                    (location_id, product_id, Quantity::new(3.0)),
                    (location_id, product_id, Quantity::new(2.0)),
                ],
                sequence: Some((picking_type_id, 1)),
            },
        );

        assert_eq!(records.lots_named(&ctx, "TEST_SERIAL_001").len(), 1);
        assert_eq!(records.packages_named(&ctx, "TEST_PACKAGE_001").len(), 1);
        assert_eq!(records.quant(&ctx, location_id, product_id).available(), Quantity::new(5.0));
        assert_eq!(records.next_picking_number(&ctx, picking_type_id), 2);
    }

    #[test]
    fn supplier_locations_do_not_track_stock() {
        let records = StockRecords::in_memory();
        let ctx = ctx();
        let vendors = records.add_location(&ctx, Location::with_usage("Vendors", LocationUsage::Supplier));
        let stock = records.add_location(&ctx, Location::internal("WH/Stock"));

        assert!(!records.tracks_stock(&ctx, vendors));
        assert!(records.tracks_stock(&ctx, stock));
        assert!(records.tracks_stock(&ctx, LocationId::new()));
    }

    #[test]
    fn records_are_invisible_to_other_tenants() {
        let records = StockRecords::in_memory();
        let ctx_a = ctx();
        let ctx_b = ctx();
        let product_id = records.add_product(&ctx_a, Product::new("TEST Product 1"));

        assert!(records.product(&ctx_a, product_id).is_some());
        assert!(records.product(&ctx_b, product_id).is_none());
    }

    #[test]
    fn partners_are_looked_up_by_id() {
        let records = StockRecords::in_memory();
        let ctx = ctx();
        let owner = records.add_partner(&ctx, Partner::new("Test Owner"));

        assert_eq!(records.partner(&ctx, owner).map(|p| p.name), Some("Test Owner".to_string()));
        assert!(records.partner(&ctx, PartnerId::new()).is_none());
    }

    #[test]
    fn write_guard_is_released_on_drop() {
        let records = StockRecords::in_memory();
        drop(records.begin_write());
        let _again = records.begin_write();
    }
}
