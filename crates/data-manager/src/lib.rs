//! Data Manager crate for the tidal stations widget
//! Fetches station payloads, memoizes them per station and derives the chart
//! series from them.

pub mod cache;
pub mod fetcher;
pub mod transform;

#[cfg(not(target_arch = "wasm32"))]
pub mod http_client;
#[cfg(target_arch = "wasm32")]
pub mod wasm_fetch;

use std::rc::Rc;

use config_system::{CachePolicy, DataOptions};
use futures::FutureExt;
use shared_types::{RawStationData, Station, WidgetResult};

pub use cache::{CacheStats, StationCache};
pub use fetcher::{fetch_station, StaticStationSource, StationEndpoints, StationSource};
pub use transform::{build_series, TransformOptions};

#[cfg(not(target_arch = "wasm32"))]
pub use http_client::HttpStationSource;
#[cfg(target_arch = "wasm32")]
pub use wasm_fetch::{FetchClient, FetchStationSource};

/// Main data manager: cache lookup or fetch, one in-flight fetch per station
#[derive(Clone)]
pub struct DataManager {
    source: Rc<dyn StationSource>,
    cache: Rc<StationCache>,
}

impl DataManager {
    pub fn new(source: Rc<dyn StationSource>, policy: CachePolicy) -> Self {
        Self {
            source,
            cache: Rc::new(StationCache::new(policy)),
        }
    }

    /// Data manager fetching from the configured endpoints of the platform
    pub fn from_options(options: &DataOptions) -> WidgetResult<Self> {
        let endpoints = StationEndpoints::from_options(options)?;

        #[cfg(not(target_arch = "wasm32"))]
        let source: Rc<dyn StationSource> =
            Rc::new(HttpStationSource::new(endpoints, options.timeout_ms)?);
        #[cfg(target_arch = "wasm32")]
        let source: Rc<dyn StationSource> =
            Rc::new(FetchStationSource::new(endpoints, options.timeout_ms));

        Ok(Self::new(source, options.cache_policy))
    }

    /// Returns the cached payloads of `station`, fetching them on a miss.
    ///
    /// Concurrent callers for the same station share one fetch. Failures are
    /// returned to every waiter and are not cached.
    pub async fn get_or_fetch(&self, station: &Station) -> WidgetResult<Rc<RawStationData>> {
        if let Some(data) = self.cache.get(station) {
            log::debug!("Cache hit for station {station}");
            return Ok(data);
        }

        if let Some(pending) = self.cache.pending(station) {
            log::debug!("Joining in-flight fetch for station {station}");
            return pending.await;
        }

        self.cache.record_miss();
        self.cache.record_fetch();
        log::info!("Fetching station {station}");

        let source = Rc::clone(&self.source);
        let cache = Rc::clone(&self.cache);
        let key = station.clone();
        let fetch = async move {
            let result = fetch_station(source.as_ref(), &key).await;
            cache.clear_pending(&key);
            match result {
                Ok(data) => Ok(cache.insert(&key, Rc::new(data))),
                Err(e) => {
                    log::warn!("Fetch for station {key} failed: {e}");
                    Err(e)
                }
            }
        }
        .boxed_local()
        .shared();

        self.cache.set_pending(station, fetch.clone());
        fetch.await
    }

    pub fn cache(&self) -> &StationCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }
}
