use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::NaiveDate;
use pharmatrack_core::PageRequest;
use pharmatrack_infra::InMemoryDrugRepository;
use pharmatrack_inventory::{DrugInventoryService, DrugRepository, FixedClock, NewDrug};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::runtime::Runtime;

type Service = DrugInventoryService<Arc<InMemoryDrugRepository>, FixedClock>;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn drug(i: usize) -> NewDrug {
    NewDrug {
        sku: format!("BENCH-{i:06}"),
        name: format!("Medication {i}"),
        generic_name: format!("generic_{i}"),
        dosage: "10mg".to_string(),
        quantity: (i % 250 + 1) as i64,
        expiration_date: format!("2027-{:02}-15", i % 12 + 1),
        manufacturer: if i % 3 == 0 { "Pfizer" } else { "Novartis" }.to_string(),
        price: Decimal::new(1999, 2),
        category: ["Antibiotics", "Pain Relief", "Vitamins"][i % 3].to_string(),
        description: None,
    }
}

fn seeded(rt: &Runtime, size: usize) -> Service {
    let service = DrugInventoryService::with_clock(
        Arc::new(InMemoryDrugRepository::new()),
        FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()),
    );
    rt.block_on(service.batch_create_drugs((0..size).map(drug).collect()))
        .unwrap();
    service
}

fn bench_create(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("create");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_create_with_uniqueness_check", |b| {
        let service = seeded(&rt, 1_000);
        let mut next = 1_000;
        b.iter(|| {
            next += 1;
            black_box(rt.block_on(service.create_drug(drug(next))).unwrap());
        });
    });

    group.finish();
}

fn bench_batch_create(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("batch_create");

    for batch_size in [10usize, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(
            BenchmarkId::new("batch", batch_size),
            batch_size,
            |b, &size| {
                b.iter(|| {
                    let service = seeded(&rt, 0);
                    let inputs: Vec<NewDrug> = (0..size).map(drug).collect();
                    black_box(rt.block_on(service.batch_create_drugs(inputs)).unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("reads");

    for size in [1_000usize, 10_000].iter() {
        let service = seeded(&rt, *size);

        group.bench_with_input(BenchmarkId::new("search", size), size, |b, _| {
            b.iter(|| black_box(rt.block_on(service.search_drugs("pfizer", Some("Vitamins"))).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("expiring_soon", size), size, |b, _| {
            b.iter(|| black_box(rt.block_on(service.get_expiring_soon_drugs(90)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("paged_listing", size), size, |b, _| {
            let request = PageRequest::new(5, 50).unwrap();
            b.iter(|| black_box(rt.block_on(service.list_drugs_page(None, request)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("check_existing_skus", size), size, |b, _| {
            let skus: Vec<String> = (0..100).map(|i| drug(i * 7).sku).collect();
            b.iter(|| {
                black_box(
                    rt.block_on(service.repository().check_existing_skus(&skus))
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create, bench_batch_create, bench_reads);
criterion_main!(benches);
