//! Per-station cache of fetched payloads.
//!
//! Single-threaded: interior mutability through `RefCell`/`Cell`, never
//! borrowed across an `.await`. Besides the stored entries it keeps the table
//! of in-flight fetches so concurrent requests for one station share a single
//! round-trip.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use config_system::CachePolicy;
use futures::future::{LocalBoxFuture, Shared};
use serde::Serialize;
use shared_types::{RawStationData, Station, WidgetResult};

/// A fetch in progress; every waiter gets a clone of the same result
pub type PendingFetch = Shared<LocalBoxFuture<'static, WidgetResult<Rc<RawStationData>>>>;

/// Cache entry with access metadata
#[derive(Clone)]
pub struct CacheEntry {
    pub data: Rc<RawStationData>,
    pub last_accessed: u64,
    pub access_count: u32,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
    pub evictions: u64,
}

pub struct StationCache {
    policy: CachePolicy,
    entries: RefCell<HashMap<Station, CacheEntry>>,
    pending: RefCell<HashMap<Station, PendingFetch>>,
    // logical clock for recency; `Instant` is unavailable on wasm32
    tick: Cell<u64>,
    stats: Cell<CacheStats>,
}

impl StationCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: RefCell::new(HashMap::new()),
            pending: RefCell::new(HashMap::new()),
            tick: Cell::new(0),
            stats: Cell::new(CacheStats::default()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn get(&self, station: &Station) -> Option<Rc<RawStationData>> {
        let now = self.next_tick();
        let mut entries = self.entries.borrow_mut();
        let entry = entries.get_mut(station)?;

        entry.last_accessed = now;
        entry.access_count += 1;
        let data = Rc::clone(&entry.data);
        drop(entries);

        self.update_stats(|stats| stats.hits += 1);
        Some(data)
    }

    /// Stores `data` unless the station is already cached, and returns the
    /// value that ended up in the cache.
    pub fn insert(&self, station: &Station, data: Rc<RawStationData>) -> Rc<RawStationData> {
        if let Some(existing) = self.entries.borrow().get(station) {
            return Rc::clone(&existing.data);
        }

        if let CachePolicy::Lru { capacity } = self.policy {
            while self.len() >= capacity && self.len() > 0 {
                self.evict_lru();
            }
        }

        let entry = CacheEntry {
            data: Rc::clone(&data),
            last_accessed: self.next_tick(),
            access_count: 1,
        };
        self.entries.borrow_mut().insert(station.clone(), entry);
        log::debug!("Cached station {station} ({} entries)", self.len());
        data
    }

    fn evict_lru(&self) {
        let oldest = self
            .entries
            .borrow()
            .iter()
            .min_by_key(|(_, entry)| (entry.last_accessed, entry.access_count))
            .map(|(key, _)| key.clone());

        if let Some(station) = oldest {
            self.entries.borrow_mut().remove(&station);
            self.update_stats(|stats| stats.evictions += 1);
            log::debug!("Evicted station {station} from cache");
        }
    }

    pub fn contains(&self, station: &Station) -> bool {
        self.entries.borrow().contains_key(station)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            ..self.stats.get()
        }
    }

    pub(crate) fn pending(&self, station: &Station) -> Option<PendingFetch> {
        self.pending.borrow().get(station).cloned()
    }

    pub(crate) fn set_pending(&self, station: &Station, fetch: PendingFetch) {
        self.pending.borrow_mut().insert(station.clone(), fetch);
    }

    pub(crate) fn clear_pending(&self, station: &Station) {
        self.pending.borrow_mut().remove(station);
    }

    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    pub(crate) fn record_miss(&self) {
        self.update_stats(|stats| stats.misses += 1);
    }

    pub(crate) fn record_fetch(&self) {
        self.update_stats(|stats| stats.fetches += 1);
    }

    fn next_tick(&self) -> u64 {
        let tick = self.tick.get() + 1;
        self.tick.set(tick);
        tick
    }

    fn update_stats(&self, f: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl Default for StationCache {
    fn default() -> Self {
        Self::new(CachePolicy::Unbounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{HistoricalPayload, ProjectionPayload};

    fn data() -> Rc<RawStationData> {
        Rc::new(RawStationData {
            floods_historical: HistoricalPayload {
                annual_flood_count: vec![],
            },
            projection: ProjectionPayload {
                annual_projection: vec![],
            },
        })
    }

    #[test]
    fn test_insert_keeps_first_entry() {
        let cache = StationCache::default();
        let station = Station::new("8454000");
        let first = cache.insert(&station, data());
        let second = cache.insert(&station, data());

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hits_are_counted() {
        let cache = StationCache::default();
        let station = Station::new("8454000");
        assert!(cache.get(&station).is_none());
        cache.insert(&station, data());
        assert!(cache.get(&station).is_some());

        let stats = cache.get_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let cache = StationCache::new(CachePolicy::Unbounded);
        for id in 0..50 {
            cache.insert(&Station::new(format!("84{id:05}")), data());
        }
        assert_eq!(cache.len(), 50);
        assert_eq!(cache.get_stats().evictions, 0);
    }

    #[test]
    fn test_lru_evicts_least_recently_used() {
        let cache = StationCache::new(CachePolicy::Lru { capacity: 2 });
        let a = Station::new("a");
        let b = Station::new("b");
        let c = Station::new("c");

        cache.insert(&a, data());
        cache.insert(&b, data());
        // touch a so b becomes the oldest
        cache.get(&a);
        cache.insert(&c, data());

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.get_stats().evictions, 1);
    }
}
