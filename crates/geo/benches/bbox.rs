//! Benchmarks for bounding box construction and serialization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pinpix_geo::{BoundingBox, Coordinate};

fn create_test_coordinates(count: usize) -> Vec<Coordinate> {
    (0..count)
        .map(|i| {
            // Spread points across the valid ranges, including the clamped edges
            let lat = -89.5 + (i as f64 * 0.37) % 179.0;
            let lng = -179.5 + (i as f64 * 0.73) % 359.0;
            Coordinate::new(lat, lng)
        })
        .collect()
}

fn bench_single_bbox(c: &mut Criterion) {
    let san_francisco = Coordinate::new(37.7749, -122.4194);

    c.bench_function("bbox_around", |b| {
        b.iter(|| BoundingBox::around(black_box(&san_francisco)))
    });

    c.bench_function("bbox_to_query", |b| {
        let bbox = BoundingBox::around(&san_francisco);
        b.iter(|| black_box(&bbox).to_query())
    });
}

fn bench_batch_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("bbox_queries");

    for size in [10, 100, 1000].iter() {
        let coords = create_test_coordinates(*size);

        group.bench_with_input(BenchmarkId::new("validate_and_query", size), size, |b, _| {
            b.iter(|| {
                coords
                    .iter()
                    .filter(|c| c.is_valid())
                    .map(|c| BoundingBox::around(c).to_query())
                    .count()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_bbox, bench_batch_queries);
criterion_main!(benches);
