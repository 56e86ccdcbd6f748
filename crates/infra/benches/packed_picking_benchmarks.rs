use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use serde_json::Value as JsonValue;
use stockpack_core::{TenantId, UserId};
use stockpack_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use stockpack_infra::{
    InMemoryEventStore, MoveRequest, PackedPickingOptions, PackedPickingService, PackingConfig,
    PublishingEventStore, StockContext, StockRecords,
};
use stockpack_inventory::{
    Location, PickingType, PickingTypeCode, Product, ProductId, Quantity,
};

type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;
type Service = PackedPickingService<PublishingEventStore<InMemoryEventStore, Bus>>;

struct Fixture {
    service: Service,
    ctx: StockContext,
    operation_type: PickingType,
    product: ProductId,
    // Keeps the bus delivering into a live receiver.
    _published: Subscription<EventEnvelope<JsonValue>>,
}

fn setup(on_hand: f64) -> Fixture {
    let bus: Bus = Arc::new(InMemoryEventBus::new());
    let published = bus.subscribe();
    let records = Arc::new(StockRecords::in_memory());
    let ctx = StockContext::new(TenantId::new(), UserId::new());

    let src = records.add_location(&ctx, Location::internal("WH/Stock"));
    let dest = records.add_location(&ctx, Location::internal("WH/Output"));
    let operation_type = PickingType::new("Delivery", PickingTypeCode::Outgoing, "WH/OUT", Some(src), Some(dest));
    records.add_picking_type(&ctx, operation_type.clone());
    let product = records.add_product(&ctx, Product::new("Bench Product"));
    records.set_on_hand(&ctx, src, product, Quantity::new(on_hand));

    let service = PackedPickingService::new(
        PublishingEventStore::new(InMemoryEventStore::new(), bus),
        records,
        PackingConfig::default(),
    );

    Fixture {
        service,
        ctx,
        operation_type,
        product,
        _published: published,
    }
}

fn requests(product: ProductId, count: usize) -> Vec<MoveRequest> {
    (0..count)
        .map(|i| MoveRequest::new(product, 1.0, Some(&format!("SN{i:06}"))))
        .collect()
}

fn bench_create_packed_picking(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_packed_picking");

    for move_count in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*move_count as u64));
        group.bench_with_input(BenchmarkId::new("draft", move_count), move_count, |b, &count| {
            let fixture = setup(0.0);
            let moves = requests(fixture.product, count);
            b.iter(|| {
                black_box(
                    fixture
                        .service
                        .create_packed_picking(
                            &fixture.ctx,
                            &fixture.operation_type,
                            &moves,
                            PackedPickingOptions {
                                package_name: Some("PACK".to_string()),
                                create_lots: true,
                                ..PackedPickingOptions::default()
                            },
                        )
                        .unwrap(),
                );
            });
        });

        group.bench_with_input(BenchmarkId::new("set_ready", move_count), move_count, |b, &count| {
            let fixture = setup(1.0e12);
            let moves = requests(fixture.product, count);
            b.iter(|| {
                black_box(
                    fixture
                        .service
                        .create_packed_picking(
                            &fixture.ctx,
                            &fixture.operation_type,
                            &moves,
                            PackedPickingOptions {
                                set_ready: true,
                                ..PackedPickingOptions::default()
                            },
                        )
                        .unwrap(),
                );
            });
        });
    }

    group.finish();
}

fn bench_picking_rehydration(c: &mut Criterion) {
    let mut group = c.benchmark_group("picking_rehydration");

    for move_count in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*move_count as u64));
        group.bench_with_input(BenchmarkId::new("load", move_count), move_count, |b, &count| {
            let fixture = setup(0.0);
            let picking = fixture
                .service
                .create_packed_picking(
                    &fixture.ctx,
                    &fixture.operation_type,
                    &requests(fixture.product, count),
                    PackedPickingOptions::default(),
                )
                .unwrap();

            b.iter(|| {
                black_box(
                    fixture
                        .service
                        .pickings()
                        .load(&fixture.ctx, picking.id_typed())
                        .unwrap(),
                );
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_packed_picking, bench_picking_rehydration);
criterion_main!(benches);
