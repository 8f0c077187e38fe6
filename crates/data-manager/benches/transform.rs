//! Benchmarks for building chart series from station payloads

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_manager::{build_series, TransformOptions};
use shared_types::{
    AnnualFloodCount, AnnualProjection, FixedClock, FloodSeverity, HistoricalPayload,
    ProjectionPayload, RawStationData, YearRange,
};

fn generate_station(first_observed: i32, current_year: i32, last_year: i32) -> RawStationData {
    let annual_flood_count = (first_observed..current_year)
        .map(|year| AnnualFloodCount {
            stn_id: None,
            stn_name: None,
            year,
            min_count: Some((year % 17) as f64),
            mod_count: Some((year % 5) as f64),
            maj_count: Some(0.0),
            nan_count: None,
        })
        .collect();

    let annual_projection = (current_year..=last_year)
        .map(|year| AnnualProjection {
            stn_id: None,
            project_year: Some(year),
            low: None,
            int_low: Some((year - current_year) as f64),
            intermediate: Some((year - current_year) as f64 * 1.5),
            int_high: None,
            high: None,
        })
        .collect();

    RawStationData {
        floods_historical: HistoricalPayload { annual_flood_count },
        projection: ProjectionPayload { annual_projection },
    }
}

fn bench_build_series(c: &mut Criterion) {
    let data = generate_station(1920, 2024, 2100);
    let options = TransformOptions::new(YearRange::default(), &FixedClock(2024), FloodSeverity::Minor);

    c.bench_function("build_series_default_range", |b| {
        b.iter(|| {
            let series = build_series(black_box(&data), black_box(&options));
            black_box(series)
        });
    });
}

fn bench_build_series_wide_range(c: &mut Criterion) {
    let data = generate_station(1000, 2024, 3000);
    let options = TransformOptions::new(YearRange::new(1000, 3000), &FixedClock(2024), FloodSeverity::Moderate);

    let mut group = c.benchmark_group("build_series_wide");
    group.bench_function("2001_years", |b| {
        b.iter(|| black_box(build_series(black_box(&data), black_box(&options))));
    });
    group.finish();
}

criterion_group!(benches, bench_build_series, bench_build_series_wide_range);
criterion_main!(benches);
