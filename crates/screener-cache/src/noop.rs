//! Cache that keeps nothing.

use async_trait::async_trait;
use screener_core::{DataCache, FundamentalSnapshot, LookbackWindow, PriceSeries, Result, Symbol};
use std::time::Duration;
use tracing::trace;

/// Every lookup misses and every write is dropped, so each screen goes
/// to the providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create the cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataCache for NoopCache {
    async fn get_snapshot(
        &self,
        _provider: &str,
        _symbol: &Symbol,
    ) -> Result<Option<FundamentalSnapshot>> {
        trace!("NoopCache: get_snapshot called, returning None");
        Ok(None)
    }

    async fn put_snapshot(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _snapshot: &FundamentalSnapshot,
    ) -> Result<()> {
        trace!("NoopCache: put_snapshot called, doing nothing");
        Ok(())
    }

    async fn get_prices(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _window: LookbackWindow,
    ) -> Result<Option<PriceSeries>> {
        trace!("NoopCache: get_prices called, returning None");
        Ok(None)
    }

    async fn put_prices(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _window: LookbackWindow,
        _series: &PriceSeries,
    ) -> Result<()> {
        trace!("NoopCache: put_prices called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_stores_nothing() {
        let cache = NoopCache::new();
        let symbol = Symbol::new("TCS.NS");
        let series = PriceSeries::new(vec![1.0, 2.0]).unwrap();

        cache
            .put_snapshot("test", &symbol, &FundamentalSnapshot::new(&symbol))
            .await
            .unwrap();
        cache
            .put_prices("test", &symbol, LookbackWindow::TEN_YEARS, &series)
            .await
            .unwrap();

        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());
        assert!(
            cache
                .get_prices("test", &symbol, LookbackWindow::TEN_YEARS)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_noop_cache_management() {
        let cache = NoopCache::new();

        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        assert!(cache.clear().await.is_ok());
    }
}
