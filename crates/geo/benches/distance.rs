//! Benchmarks for distance calculations and point set matching.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geomatch_geo::{
    haversine_distance, match_closest_points, match_closest_points_sequential, parse_coordinate,
    Coordinate,
};

fn create_grid(count: usize, origin: (f64, f64)) -> Vec<Coordinate> {
    (0..count)
        .map(|i| {
            // Generate points in a grid around the origin
            let lat = origin.0 + (i as f64 * 0.01) % 2.0;
            let lng = origin.1 + (i as f64 * 0.013) % 2.0;
            Coordinate::new(lat, lng)
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let berlin = Coordinate::new(52.5200, 13.4050);
    let paris = Coordinate::new(48.8566, 2.3522);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&berlin), black_box(&paris)))
    });
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_closest_points");

    for size in [10, 100, 1000].iter() {
        let sources = create_grid(*size, (52.0, 13.0));
        let targets = create_grid(*size, (48.0, 2.0));

        group.bench_with_input(BenchmarkId::new("default", size), size, |b, _| {
            b.iter(|| match_closest_points(black_box(&sources), black_box(&targets)))
        });

        group.bench_with_input(BenchmarkId::new("sequential", size), size, |b, _| {
            b.iter(|| match_closest_points_sequential(black_box(&sources), black_box(&targets)))
        });
    }

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinate_parsing");

    group.bench_function("hemisphere", |b| {
        b.iter(|| parse_coordinate(black_box("40.7128° N")))
    });

    group.bench_function("plain", |b| {
        b.iter(|| parse_coordinate(black_box("-74.0060")))
    });

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_matching, bench_parsing);
criterion_main!(benches);
