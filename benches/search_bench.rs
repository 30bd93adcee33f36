//! Benchmarks for vector search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vecdb::{CollectionConfig, DistanceMetric, Filter, Metadata, Vector, VectorDatabase};

fn create_random_vectors(n: usize, dim: usize) -> Vec<Vector> {
    (0..n)
        .map(|_| {
            let data: Vec<f32> = (0..dim).map(|_| rand::random::<f32>()).collect();
            Vector::new(data)
        })
        .collect()
}

fn populate(config: CollectionConfig, size: usize, dim: usize) -> VectorDatabase {
    let db = VectorDatabase::new(config).unwrap();
    let vectors = create_random_vectors(size, dim);
    db.add_batch(vectors.into_iter().enumerate().map(|(i, v)| {
        let meta = Metadata::new()
            .with("bucket", (i % 10) as i64)
            .with("even", i % 2 == 0);
        (format!("v{}", i), v, Some(meta))
    }))
    .unwrap();
    db
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 10000].iter() {
        let config = CollectionConfig::new(128)
            .with_metric(DistanceMetric::Euclidean)
            .brute_force();
        let db = populate(config, *size, 128);
        db.rebuild_index();

        let query = Vector::new(vec![0.5; 128]);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| db.search(black_box(&query), black_box(10), None).unwrap());
        });
    }

    group.finish();
}

fn benchmark_filtered_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("filtered_search");
    group.sample_size(20);

    let dim = 64;
    let query = Vector::new(vec![0.5; dim]);
    let selective = Filter::new().eq("bucket", 3);
    let broad = Filter::new().eq("even", true);

    for (name, config) in [
        ("flat", CollectionConfig::new(dim).brute_force()),
        ("hnsw", CollectionConfig::new(dim)),
    ] {
        let db = populate(config.with_metric(DistanceMetric::Euclidean), 10_000, dim);
        group.bench_function(BenchmarkId::new(name, "10pct"), |b| {
            b.iter(|| db.search(black_box(&query), 10, Some(&selective)).unwrap());
        });
        group.bench_function(BenchmarkId::new(name, "50pct"), |b| {
            b.iter(|| db.search(black_box(&query), 10, Some(&broad)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_search_batch(c: &mut Criterion) {
    let dim = 64;
    let db = populate(
        CollectionConfig::new(dim).with_metric(DistanceMetric::Euclidean),
        5_000,
        dim,
    );
    let queries = create_random_vectors(64, dim);

    c.bench_function("search_batch_64", |b| {
        b.iter(|| db.search_batch(black_box(&queries), 10, None).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_search,
    benchmark_filtered_search,
    benchmark_search_batch
);
criterion_main!(benches);
