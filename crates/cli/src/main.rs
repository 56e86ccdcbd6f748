//! `stockpack`: run one "pack products" submission against in-memory stores.
//!
//! Usage: `stockpack <input.json>`. The input seeds master data and stock,
//! then submits the wizard; the resulting picking is printed as JSON.

use std::sync::Arc;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockpack_core::{TenantId, UserId};
use stockpack_events::{EventBus, EventEnvelope, InMemoryEventBus};
use stockpack_infra::{
    InMemoryEventStore, PackProductsWizard, PackedPickingService, PackingConfig,
    PublishingEventStore, StockContext, StockRecords,
};
use stockpack_inventory::{
    Location, LocationId, MoveLine, Partner, Picking, PickingType, Product, ProductId, Quantity,
    StockMove,
};

#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    picking_types: Vec<PickingType>,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    partners: Vec<Partner>,
    #[serde(default)]
    stock: Vec<StockEntry>,
}

#[derive(Debug, Deserialize)]
struct StockEntry {
    location_id: LocationId,
    product_id: ProductId,
    quantity: Quantity,
}

#[derive(Debug, Deserialize)]
struct Input {
    #[serde(default)]
    seed: Seed,
    wizard: PackProductsWizard,
}

#[derive(Debug, Serialize)]
struct PickingSummary<'a> {
    id: String,
    name: &'a str,
    state: &'static str,
    owner: Option<String>,
    location_id: Option<LocationId>,
    location_dest_id: Option<LocationId>,
    moves: &'a [StockMove],
    move_lines: &'a [MoveLine],
    lots: Vec<String>,
    package: Option<String>,
    events_published: usize,
}

fn seed(records: &StockRecords, ctx: &StockContext, seed: Seed) {
    for location in seed.locations {
        records.add_location(ctx, location);
    }
    for picking_type in seed.picking_types {
        records.add_picking_type(ctx, picking_type);
    }
    for product in seed.products {
        records.add_product(ctx, product);
    }
    for partner in seed.partners {
        records.add_partner(ctx, partner);
    }
    for entry in seed.stock {
        records.set_on_hand(ctx, entry.location_id, entry.product_id, entry.quantity);
    }
}

fn summarize<'a>(
    picking: &'a Picking,
    records: &StockRecords,
    ctx: &StockContext,
    events_published: usize,
) -> PickingSummary<'a> {
    let package = picking
        .move_lines()
        .iter()
        .find_map(|line| line.result_package_id)
        .and_then(|id| records.package(ctx, id))
        .map(|p| p.name);

    PickingSummary {
        id: picking.id_typed().to_string(),
        name: picking.name(),
        state: picking.state().as_str(),
        owner: picking
            .partner_id()
            .and_then(|id| records.partner(ctx, id))
            .map(|p| p.name),
        location_id: picking.location_id(),
        location_dest_id: picking.location_dest_id(),
        moves: picking.moves(),
        move_lines: picking.move_lines(),
        lots: records.lots(ctx).into_iter().map(|lot| lot.name).collect(),
        package,
        events_published,
    }
}

fn main() -> anyhow::Result<()> {
    let config = PackingConfig::from_env().context("failed to load configuration")?;
    stockpack_observability::init_with_filter(config.log_filter.as_deref());

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: stockpack <input.json>");
    };

    let raw = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let input: Input = serde_json::from_str(&raw).with_context(|| format!("failed to parse {path}"))?;

    let ctx = StockContext::new(TenantId::new(), UserId::new());
    let records = Arc::new(StockRecords::in_memory());
    seed(&records, &ctx, input.seed);

    let bus: Arc<InMemoryEventBus<EventEnvelope<JsonValue>>> = Arc::new(InMemoryEventBus::new());
    let published = bus.subscribe();
    let service = PackedPickingService::new(
        PublishingEventStore::new(InMemoryEventStore::new(), bus),
        records.clone(),
        config,
    );

    tracing::info!(tenant_id = %ctx.tenant_id(), lines = input.wizard.stock_move_data.len(), "submitting pack products");

    let picking = input
        .wizard
        .submit(&service, &ctx)
        .context("pack products submission failed")?;

    let summary = summarize(&picking, &records, &ctx, published.drain().len());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
