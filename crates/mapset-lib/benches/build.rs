//! Performance benchmarks for mapset-lib
//!
//! Run with: cargo bench --package mapset-lib
//!
//! Compares a cold intersection scan against querying and reloading a cached feature.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use geo::{Geometry, LineString};
use mapset_lib::{
    BuildOptions, CachedFeature, GeometryRegion, GeometrySource, InMemoryProvider, Resolution,
};

/// Generate a wiggly coastline-like polyline starting at the given position
fn generate_line(num_points: usize, base_lat: f64, base_lon: f64) -> Geometry<f64> {
    let coords: Vec<(f64, f64)> = (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lon = base_lon + t * 0.8 + (t * 50.0).sin() * 0.05;
            let lat = base_lat + t * 0.8 + (t * 30.0).cos() * 0.05;
            (lon, lat)
        })
        .collect();
    Geometry::LineString(LineString::from(coords))
}

/// One line per degree cell over the whole globe
fn generate_global_collection(points_per_line: usize) -> Vec<Geometry<f64>> {
    let mut geometries = Vec::new();
    for lat in -80..80 {
        for lon in -180..180 {
            geometries.push(generate_line(points_per_line, lat as f64, lon as f64));
        }
    }
    geometries
}

// ============================================================================
// Core Benchmarks - Key performance indicators
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(20);

    let collection = generate_global_collection(16);
    let source = GeometrySource::coastline(Resolution::Medium);
    let options = BuildOptions::default();

    group.throughput(Throughput::Elements(collection.len() as u64));
    for (name, region) in [
        ("china_coast", GeometryRegion::new(15.0, 35.0, 110.0, 135.0).unwrap()),
        ("northpac", GeometryRegion::new(-5.0, 70.0, 120.0, 250.0).unwrap()),
        ("global", GeometryRegion::new(-90.0, 90.0, -180.0, 180.0).unwrap()),
    ] {
        group.bench_with_input(BenchmarkId::new("scan", name), &region, |b, region| {
            b.iter(|| {
                CachedFeature::build_from_collection(source.clone(), *region, &collection, &options)
            });
        });
    }

    group.finish();
}

fn bench_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reuse");

    let source = GeometrySource::coastline(Resolution::Medium);
    let provider =
        InMemoryProvider::new().with_collection(source.clone(), generate_global_collection(16));
    let region = GeometryRegion::new(15.0, 35.0, 110.0, 135.0).unwrap();
    let feature = CachedFeature::build(&provider, &source, region, &BuildOptions::default()).unwrap();

    group.bench_function("query", |b| {
        b.iter(|| feature.geometries().len());
    });

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("china_coast.mapset");
    feature.save(&path).unwrap();
    group.bench_function("load", |b| {
        b.iter(|| CachedFeature::load(&path).unwrap());
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_build, bench_reuse);

criterion_main!(benches);
