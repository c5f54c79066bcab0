//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use screener_core::{DataCache, FundamentalSnapshot, LookbackWindow, PriceSeries, Result, Symbol};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for snapshot cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SnapshotKey {
    provider: String,
    symbol: Symbol,
}

/// Key for price cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PricesKey {
    provider: String,
    symbol: Symbol,
    window: LookbackWindow,
}

/// Simple in-memory cache for testing and development.
///
/// Data is stored in `RwLock`-protected `HashMap`s and is lost when the cache
/// is dropped. Snapshots and series are cloned on get/put operations.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    snapshots: RwLock<HashMap<SnapshotKey, CacheEntry<FundamentalSnapshot>>>,
    prices: RwLock<HashMap<PricesKey, CacheEntry<PriceSeries>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataCache for InMemoryCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<FundamentalSnapshot>> {
        let key = SnapshotKey {
            provider: provider.to_string(),
            symbol: symbol.clone(),
        };

        let cache = self.snapshots.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for snapshot");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for snapshot");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, snapshot), fields(provider = %provider, symbol = %symbol))]
    async fn put_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
        snapshot: &FundamentalSnapshot,
    ) -> Result<()> {
        let key = SnapshotKey {
            provider: provider.to_string(),
            symbol: symbol.clone(),
        };

        let mut cache = self.snapshots.write().await;
        cache.insert(key, CacheEntry::new(snapshot.clone()));
        debug!("Cached snapshot");
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol, window = %window))]
    async fn get_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        window: LookbackWindow,
    ) -> Result<Option<PriceSeries>> {
        let key = PricesKey {
            provider: provider.to_string(),
            symbol: symbol.clone(),
            window,
        };

        let cache = self.prices.read().await;
        match cache.get(&key) {
            Some(entry) => {
                debug!("Cache hit for prices");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for prices");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, series), fields(provider = %provider, symbol = %symbol, window = %window))]
    async fn put_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        window: LookbackWindow,
        series: &PriceSeries,
    ) -> Result<()> {
        let key = PricesKey {
            provider: provider.to_string(),
            symbol: symbol.clone(),
            window,
        };

        let mut cache = self.prices.write().await;
        cache.insert(key, CacheEntry::new(series.clone()));
        debug!("Cached {} closes", series.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.snapshots.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.prices.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale cache entries", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.snapshots.write().await.clear();
        self.prices.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_snapshot() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("TCS.NS");

        // Initially no data
        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());

        let snapshot = FundamentalSnapshot {
            return_on_equity: Some(0.45),
            ..FundamentalSnapshot::new(&symbol)
        };
        cache.put_snapshot("test", &symbol, &snapshot).await.unwrap();

        let retrieved = cache.get_snapshot("test", &symbol).await.unwrap();
        assert_eq!(retrieved, Some(snapshot));

        // Keyed by provider too
        assert!(cache.get_snapshot("other", &symbol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_prices_keyed_by_window() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("INFY.NS");
        let series = PriceSeries::new(vec![100.0, 101.0, 99.5]).unwrap();

        cache
            .put_prices("test", &symbol, LookbackWindow::TEN_YEARS, &series)
            .await
            .unwrap();

        let hit = cache
            .get_prices("test", &symbol, LookbackWindow::TEN_YEARS)
            .await
            .unwrap();
        assert_eq!(hit, Some(series));

        let miss = cache
            .get_prices("test", &symbol, LookbackWindow::FIVE_YEARS)
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_stale() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("ITC.NS");
        cache
            .put_snapshot("test", &symbol, &FundamentalSnapshot::new(&symbol))
            .await
            .unwrap();
        cache
            .put_prices("test", &symbol, LookbackWindow::TEN_YEARS, &PriceSeries::empty())
            .await
            .unwrap();

        assert_eq!(cache.invalidate_stale(Duration::from_secs(3600)).await.unwrap(), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.invalidate_stale(Duration::from_millis(5)).await.unwrap(), 2);
        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("ITC.NS");
        cache
            .put_snapshot("test", &symbol, &FundamentalSnapshot::new(&symbol))
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());
    }
}
