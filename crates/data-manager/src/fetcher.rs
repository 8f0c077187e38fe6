//! Station sources: where the two payloads of a station come from.

use std::collections::HashMap;

use async_trait::async_trait;
use config_system::DataOptions;
use serde::Deserialize;
use shared_types::{
    HistoricalPayload, ProjectionPayload, RawStationData, Station, WidgetError, WidgetResult,
};
use url::Url;

/// Source of the historical and projection payloads of a station.
///
/// Implementations are single-threaded; the browser fetch futures are not
/// `Send`.
#[async_trait(?Send)]
pub trait StationSource {
    async fn fetch_historical(&self, station: &Station) -> WidgetResult<HistoricalPayload>;

    async fn fetch_projection(&self, station: &Station) -> WidgetResult<ProjectionPayload>;
}

/// Issues both requests concurrently and fails if either fails
pub async fn fetch_station(
    source: &dyn StationSource,
    station: &Station,
) -> WidgetResult<RawStationData> {
    let (floods_historical, projection) = futures::try_join!(
        source.fetch_historical(station),
        source.fetch_projection(station)
    )?;

    log::debug!(
        "Fetched station {station}: {} observed years, {} projected years",
        floods_historical.annual_flood_count.len(),
        projection.annual_projection.len()
    );

    Ok(RawStationData {
        floods_historical,
        projection,
    })
}

/// The two endpoint URLs, validated once
#[derive(Debug, Clone, PartialEq)]
pub struct StationEndpoints {
    pub historical: Url,
    pub projection: Url,
}

impl StationEndpoints {
    pub fn new(historical: &str, projection: &str) -> WidgetResult<Self> {
        let parse = |field: &str, raw: &str| {
            Url::parse(raw).map_err(|e| {
                WidgetError::invalid_config(field, format!("Invalid endpoint '{raw}': {e}"))
            })
        };
        Ok(Self {
            historical: parse("data.historical_url", historical)?,
            projection: parse("data.projection_url", projection)?,
        })
    }

    pub fn from_options(options: &DataOptions) -> WidgetResult<Self> {
        Self::new(&options.historical_url, &options.projection_url)
    }

    pub fn historical_url(&self, station: &Station) -> Url {
        with_station(&self.historical, station)
    }

    pub fn projection_url(&self, station: &Station) -> Url {
        with_station(&self.projection, station)
    }
}

fn with_station(base: &Url, station: &Station) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("station", station.as_str());
    url
}

/// One station's documents inside a combined local dataset
#[derive(Debug, Clone, Deserialize)]
struct StaticEntry {
    floods_historical: HistoricalPayload,
    projection: ProjectionPayload,
}

/// Serves every station from one preloaded JSON document keyed by station id.
///
/// Used for the minimal-dataset build and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticStationSource {
    stations: HashMap<Station, RawStationData>,
}

impl StaticStationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(document: &str) -> WidgetResult<Self> {
        let entries: HashMap<String, StaticEntry> = serde_json::from_str(document)?;
        let stations = entries
            .into_iter()
            .map(|(id, entry)| {
                (
                    Station::new(id),
                    RawStationData {
                        floods_historical: entry.floods_historical,
                        projection: entry.projection,
                    },
                )
            })
            .collect();
        Ok(Self { stations })
    }

    pub fn with_station(mut self, station: impl Into<Station>, data: RawStationData) -> Self {
        self.stations.insert(station.into(), data);
        self
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    fn lookup(&self, station: &Station) -> WidgetResult<&RawStationData> {
        self.stations
            .get(station)
            .ok_or_else(|| WidgetError::network(format!("station {station} is not in the dataset")))
    }
}

#[async_trait(?Send)]
impl StationSource for StaticStationSource {
    async fn fetch_historical(&self, station: &Station) -> WidgetResult<HistoricalPayload> {
        Ok(self.lookup(station)?.floods_historical.clone())
    }

    async fn fetch_projection(&self, station: &Station) -> WidgetResult<ProjectionPayload> {
        Ok(self.lookup(station)?.projection.clone())
    }
}
