use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{polygon, MultiPolygon};
use rainraster::models::{Aoi, CrsKind, DailySeries, WeatherQuery};
use rainraster::processors::{AoiRasterizer, RainyDayCounter};
use rainraster::utils::{mercator_forward, mercator_inverse};

// Create test data for benchmarking
fn create_test_aoi() -> Aoi {
    let west = polygon![
        (x: 10.0, y: 50.0),
        (x: 10.2, y: 50.0),
        (x: 10.2, y: 50.5),
        (x: 10.0, y: 50.5),
    ];
    let east = polygon![
        (x: 10.3, y: 50.0),
        (x: 10.5, y: 50.0),
        (x: 10.5, y: 50.5),
        (x: 10.3, y: 50.5),
    ];
    Aoi::new(
        "bench",
        "bench.geojson",
        MultiPolygon(vec![west, east]),
        CrsKind::Geographic,
    )
    .unwrap()
}

fn create_test_series(years: i32) -> DailySeries {
    let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2018 + years - 1, 12, 31).unwrap();
    let query = WeatherQuery::new(50.25, 10.25, start, end);

    let values = start
        .iter_days()
        .take(query.expected_days())
        .enumerate()
        .map(|(i, _)| match i % 7 {
            0 | 3 => Some(6.5),
            5 => None,
            _ => Some(0.4),
        })
        .collect();

    DailySeries::new(query, "precipitation_sum", values).unwrap()
}

fn benchmark_monthly_counting(c: &mut Criterion) {
    let series = create_test_series(2);
    let counter = RainyDayCounter::new();

    c.bench_function("monthly_rainy_day_count", |b| {
        b.iter(|| black_box(counter.count(&series)))
    });
}

fn benchmark_footprint_rasterization(c: &mut Criterion) {
    let aoi = create_test_aoi();
    let mut group = c.benchmark_group("footprint_rasterization");

    for &resolution in &[0.05, 0.01, 0.005] {
        group.bench_with_input(
            BenchmarkId::new("resolution", resolution),
            &resolution,
            |b, &resolution| {
                let rasterizer = AoiRasterizer::new()
                    .with_resolution(resolution)
                    .with_max_workers(2);
                let spec = rasterizer.grid_spec(&aoi).unwrap();

                b.iter(|| {
                    let mask = rasterizer.footprint_mask(&aoi, &spec, None).unwrap();
                    black_box(mask.len())
                })
            },
        );
    }
    group.finish();
}

fn benchmark_burn_month(c: &mut Criterion) {
    let aoi = create_test_aoi();
    let rasterizer = AoiRasterizer::new().with_resolution(0.005);
    let spec = rasterizer.grid_spec(&aoi).unwrap();
    let mask = rasterizer.footprint_mask(&aoi, &spec, None).unwrap();

    c.bench_function("burn_month", |b| {
        b.iter(|| {
            let raster = rasterizer.burn_month(&spec, &mask, 7, 13).unwrap();
            black_box(raster.grid.len())
        })
    });
}

fn benchmark_mercator_roundtrip(c: &mut Criterion) {
    let points: Vec<(f64, f64)> = vec![
        (-0.12, 51.5),
        (10.25, 50.25),
        (151.2, -33.85),
        (-74.0, 40.7),
    ];

    c.bench_function("mercator_roundtrip", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &(lon, lat) in &points {
                let (x, y) = mercator_forward(lon, lat);
                let (lon2, lat2) = mercator_inverse(x, y);
                acc += lon2 + lat2;
            }
            black_box(acc)
        })
    });
}

criterion_group!(
    benches,
    benchmark_monthly_counting,
    benchmark_footprint_rasterization,
    benchmark_burn_month,
    benchmark_mercator_roundtrip
);
criterion_main!(benches);
