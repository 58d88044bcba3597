use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use nearthree::{BoundingBox, Coordinates, DistanceMetric, PointSet};

const SIZES: [usize; 5] = [10, 100, 1000, 10_000, 100_000];

fn benchmark_scaling(c: &mut Criterion) {
    let bounds = BoundingBox::new([0.0; 3], [100.0; 3]);
    let query = PointSet::random(1000, &bounds, 2).unwrap();

    let mut group = c.benchmark_group("scaling");
    group.sample_size(10);

    for &size in &SIZES {
        let points = PointSet::random(size, &bounds, 1).unwrap();

        group.bench_with_input(BenchmarkId::new("build_and_query", size), &size, |b, _| {
            b.iter(|| {
                // A fresh container builds its index on the first query
                let coords = Coordinates::new(points.clone());
                coords.find_nearest(&query, 1, DistanceMetric::Euclidean).unwrap()
            })
        });

        let coords = Coordinates::new(points.clone());
        coords.index();
        group.bench_with_input(BenchmarkId::new("query", size), &size, |b, _| {
            b.iter(|| coords.find_nearest(&query, 1, DistanceMetric::Euclidean).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_scaling);
criterion_main!(benches);
