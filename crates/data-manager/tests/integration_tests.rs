//! Integration tests for the data manager

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use config_system::CachePolicy;
use data_manager::{build_series, DataManager, StationSource, TransformOptions};
use shared_types::{
    AnnualFloodCount, AnnualProjection, FixedClock, FloodSeverity, HistoricalPayload,
    ProjectionPayload, RawStationData, Station, WidgetError, WidgetResult, YearRange,
};

const CURRENT_YEAR: i32 = 2024;

fn providence() -> RawStationData {
    let annual_flood_count = (1950..=2016)
        .map(|year| AnnualFloodCount {
            stn_id: Some("8454000".to_string()),
            stn_name: Some("Providence".to_string()),
            year,
            min_count: Some(((year - 1950) % 12) as f64),
            mod_count: Some(0.0),
            maj_count: Some(0.0),
            nan_count: Some(0.0),
        })
        .collect();

    let annual_projection = (CURRENT_YEAR..=2100)
        .map(|year| AnnualProjection {
            stn_id: Some("8454000".to_string()),
            project_year: Some(year),
            low: None,
            int_low: Some((year - CURRENT_YEAR) as f64),
            intermediate: Some((year - CURRENT_YEAR) as f64 * 2.0),
            int_high: None,
            high: None,
        })
        .collect();

    RawStationData {
        floods_historical: HistoricalPayload { annual_flood_count },
        projection: ProjectionPayload { annual_projection },
    }
}

/// Counts round-trips and yields once per request so fetches interleave
struct CountingSource {
    data: RawStationData,
    historical_calls: Cell<usize>,
    projection_calls: Cell<usize>,
    fail: Cell<bool>,
}

impl CountingSource {
    fn new(data: RawStationData) -> Self {
        Self {
            data,
            historical_calls: Cell::new(0),
            projection_calls: Cell::new(0),
            fail: Cell::new(false),
        }
    }
}

#[async_trait(?Send)]
impl StationSource for CountingSource {
    async fn fetch_historical(&self, _station: &Station) -> WidgetResult<HistoricalPayload> {
        self.historical_calls.set(self.historical_calls.get() + 1);
        tokio::task::yield_now().await;
        if self.fail.get() {
            return Err(WidgetError::network("HTTP 503"));
        }
        Ok(self.data.floods_historical.clone())
    }

    async fn fetch_projection(&self, _station: &Station) -> WidgetResult<ProjectionPayload> {
        self.projection_calls.set(self.projection_calls.get() + 1);
        tokio::task::yield_now().await;
        Ok(self.data.projection.clone())
    }
}

fn transform_options() -> TransformOptions {
    TransformOptions::new(YearRange::default(), &FixedClock(CURRENT_YEAR), FloodSeverity::Minor)
}

#[tokio::test]
async fn test_cache_hit_reuses_first_fetch() {
    let source = Rc::new(CountingSource::new(providence()));
    let manager = DataManager::new(source.clone(), CachePolicy::Unbounded);
    let station = Station::new("8454000");

    let first = manager.get_or_fetch(&station).await.unwrap();
    let second = manager.get_or_fetch(&station).await.unwrap();

    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(source.historical_calls.get(), 1);
    assert_eq!(source.projection_calls.get(), 1);

    let stats = manager.cache_stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.fetches, 1);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let source = Rc::new(CountingSource::new(providence()));
    let manager = DataManager::new(source.clone(), CachePolicy::Unbounded);
    let station = Station::new("8454000");

    let (a, b) = futures::join!(manager.get_or_fetch(&station), manager.get_or_fetch(&station));

    assert!(Rc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(source.historical_calls.get(), 1);
    assert_eq!(manager.cache().in_flight(), 0);
    assert_eq!(manager.cache_stats().entries, 1);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let source = Rc::new(CountingSource::new(providence()));
    source.fail.set(true);
    let manager = DataManager::new(source.clone(), CachePolicy::Unbounded);
    let station = Station::new("8454000");

    let result = manager.get_or_fetch(&station).await;
    assert!(matches!(result, Err(WidgetError::Network { .. })));
    assert_eq!(manager.cache_stats().entries, 0);
    assert_eq!(manager.cache().in_flight(), 0);

    source.fail.set(false);
    assert!(manager.get_or_fetch(&station).await.is_ok());
    assert_eq!(source.historical_calls.get(), 2);
}

#[tokio::test]
async fn test_lru_policy_refetches_evicted_station() {
    let source = Rc::new(CountingSource::new(providence()));
    let manager = DataManager::new(source.clone(), CachePolicy::Lru { capacity: 1 });

    manager.get_or_fetch(&Station::new("a")).await.unwrap();
    manager.get_or_fetch(&Station::new("b")).await.unwrap();
    manager.get_or_fetch(&Station::new("a")).await.unwrap();

    assert_eq!(source.historical_calls.get(), 3);
    assert_eq!(manager.cache_stats().evictions, 2);
}

#[tokio::test]
async fn test_providence_series() {
    let manager = DataManager::new(Rc::new(CountingSource::new(providence())), CachePolicy::Unbounded);
    let data = manager.get_or_fetch(&Station::new("8454000")).await.unwrap();
    let series = build_series(&data, &transform_options()).unwrap();

    let labels = series.labels();
    assert_eq!(labels.len(), 181);
    assert_eq!(labels.first().map(String::as_str), Some("1920-01-01"));
    assert_eq!(labels.last().map(String::as_str), Some("2100-01-01"));

    for (year, value) in series.years.iter().zip(&series.historical) {
        assert_eq!(value.is_some(), (1950..=2016).contains(year), "year {year}");
    }
    assert_eq!(series.historical_max, Some(11.0));
    assert_eq!(series.historical_axis_max(), 22.0);

    let cutoff = series.index_of(CURRENT_YEAR).unwrap();
    assert!(series.lower[..cutoff].iter().all(Option::is_none));
    assert_eq!(series.lower[cutoff], Some(0.0));
    assert_eq!(series.higher[cutoff + 1], Some(2.0));
    assert_eq!(series.higher.last().copied().flatten(), Some(152.0));
}

#[test]
fn test_empty_historical_boundary() {
    let mut data = providence();
    data.floods_historical.annual_flood_count.clear();

    let series = build_series(&data, &transform_options()).unwrap();
    assert!(series.historical.iter().all(Option::is_none));
    assert_eq!(series.historical_max, None);
    assert_eq!(series.historical_axis_max(), shared_types::series::DEFAULT_HISTORICAL_Y_MAX);
}

#[test]
fn test_transform_is_deterministic() {
    let data = providence();
    let a = build_series(&data, &transform_options()).unwrap();
    let b = build_series(&data, &transform_options()).unwrap();
    assert_eq!(a, b);
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}

#[test]
fn test_short_projection_names_counts() {
    let mut data = providence();
    data.projection.annual_projection.truncate(10);

    match build_series(&data, &transform_options()) {
        Err(WidgetError::DataShape { message }) => {
            assert!(message.contains("10 entries"), "{message}");
            assert!(message.contains("77 years"), "{message}");
        }
        other => panic!("expected a data shape error, got {other:?}"),
    }
}
