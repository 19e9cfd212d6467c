//! Benchmark suite for learntwin-algo
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use learntwin_algo::{BktModel, BktParams, ItemRecord, Recommender};

fn bench_bkt_update(c: &mut Criterion) {
    c.bench_function("BktModel::update", |b| {
        let mut model = BktModel::new(BktParams::default());
        let mut correct = false;
        b.iter(|| {
            correct = !correct;
            black_box(model.update("learner", "skill", correct))
        })
    });
}

fn bench_next_items_full_catalog(c: &mut Criterion) {
    let catalog: Vec<ItemRecord> = (0..1000)
        .map(|i| ItemRecord::new(format!("item-{i:04}"), format!("skill-{}", i % 50)))
        .collect();
    let recommender = Recommender::new(catalog);
    let mut model = BktModel::new(BktParams::default());
    for i in 0..50 {
        model.update("learner", &format!("skill-{i}"), i % 3 == 0);
    }

    c.bench_function("Recommender::next_items/catalog-1000", |b| {
        b.iter(|| black_box(recommender.next_items(&model, "learner", None, 10)))
    });
}

criterion_group!(benches, bench_bkt_update, bench_next_items_full_catalog);
criterion_main!(benches);
