//! Caching layer for live market series

use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::candles::ChartSeries;

/// Thread-safe TTL cache of chart series keyed by `coin/currency`
pub struct SeriesCache {
    cache: Arc<RwLock<TimedCache<String, ChartSeries>>>,
}

impl SeriesCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a series from the cache
    pub async fn get(&self, key: &str) -> Option<ChartSeries> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a series into the cache
    pub async fn insert(&self, key: impl Into<String>, series: ChartSeries) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key.into(), series);
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }
}

impl Clone for SeriesCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}
