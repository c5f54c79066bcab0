//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use screener_core::{
    DataCache, FundamentalSnapshot, LookbackWindow, PriceSeries, Result, ScreenerError, Symbol,
};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, instrument};

fn cache_err(e: impl std::fmt::Display) -> ScreenerError {
    ScreenerError::Cache(e.to_string())
}

/// Fixed-width UTC timestamp, so `cached_at` compares correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite-based cache for snapshots and close series.
///
/// Each entry is one row holding a JSON payload and the time it was cached.
/// Data persists across runs, so repeated screens of the same universe hit
/// the network only for tickers that were never fetched or whose rows were
/// evicted by [`DataCache::invalidate_stale`].
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(cache_err)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(cache_err)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(cache_err)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS snapshot_cache (
                provider TEXT NOT NULL,
                symbol TEXT NOT NULL,
                data_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, symbol)
            )",
            [],
        )
        .map_err(cache_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prices_cache (
                provider TEXT NOT NULL,
                symbol TEXT NOT NULL,
                window_years INTEGER NOT NULL,
                data_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (provider, symbol, window_years)
            )",
            [],
        )
        .map_err(cache_err)?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl DataCache for SqliteCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<FundamentalSnapshot>> {
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT data_json FROM snapshot_cache
                 WHERE provider = ?1 AND symbol = ?2",
                params![provider, symbol.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(cache_err)?;

        match result {
            Some(json) => {
                let snapshot: FundamentalSnapshot =
                    serde_json::from_str(&json).map_err(|e| ScreenerError::Parse(e.to_string()))?;
                debug!("Found cached snapshot");
                Ok(Some(snapshot))
            }
            None => {
                debug!("No cached snapshot found");
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
        let cached_at = timestamp(Utc::now());
        let data_json =
            serde_json::to_string(snapshot).map_err(|e| ScreenerError::Parse(e.to_string()))?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO snapshot_cache
             (provider, symbol, data_json, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![provider, symbol.as_str(), data_json, cached_at],
        )
        .map_err(cache_err)?;

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
        let conn = self.lock()?;

        let result = conn
            .query_row(
                "SELECT data_json FROM prices_cache
                 WHERE provider = ?1 AND symbol = ?2 AND window_years = ?3",
                params![provider, symbol.as_str(), window.as_years()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(cache_err)?;

        match result {
            Some(json) => {
                let series: PriceSeries =
                    serde_json::from_str(&json).map_err(|e| ScreenerError::Parse(e.to_string()))?;
                debug!("Found {} cached closes", series.len());
                Ok(Some(series))
            }
            None => {
                debug!("No cached prices found");
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
        let cached_at = timestamp(Utc::now());
        let data_json =
            serde_json::to_string(series).map_err(|e| ScreenerError::Parse(e.to_string()))?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO prices_cache
             (provider, symbol, window_years, data_json, cached_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                provider,
                symbol.as_str(),
                window.as_years(),
                data_json,
                cached_at
            ],
        )
        .map_err(cache_err)?;

        debug!("Cached {} closes", series.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl)
                .map_err(|e| ScreenerError::Cache(format!("Invalid TTL duration: {}", e)))?;
        let cutoff_str = timestamp(cutoff);

        let conn = self.lock()?;
        let mut total_deleted = 0usize;

        total_deleted += conn
            .execute(
                "DELETE FROM snapshot_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(cache_err)?;

        total_deleted += conn
            .execute(
                "DELETE FROM prices_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(cache_err)?;

        if total_deleted > 0 {
            debug!("Invalidated {} stale cache entries", total_deleted);
        }

        Ok(total_deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM snapshot_cache", [])
            .map_err(cache_err)?;
        conn.execute("DELETE FROM prices_cache", [])
            .map_err(cache_err)?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_cache_initialization() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        let symbol = Symbol::new("TCS.NS");

        // Initially no data
        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());

        let snapshot = FundamentalSnapshot {
            sector: Some("Technology".to_string()),
            trailing_pe: Some(29.4),
            net_income: Some(4.8e11),
            ..FundamentalSnapshot::new(&symbol)
        };
        cache.put_snapshot("test", &symbol, &snapshot).await.unwrap();

        let retrieved = cache.get_snapshot("test", &symbol).await.unwrap();
        assert_eq!(retrieved, Some(snapshot));
    }

    #[tokio::test]
    async fn test_prices_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        let symbol = Symbol::new("INFY.NS");
        let series = PriceSeries::new(vec![1500.0, 1512.5, 1498.25]).unwrap();

        cache
            .put_prices("test", &symbol, LookbackWindow::FIVE_YEARS, &series)
            .await
            .unwrap();

        let hit = cache
            .get_prices("test", &symbol, LookbackWindow::FIVE_YEARS)
            .await
            .unwrap();
        assert_eq!(hit, Some(series));

        let miss = cache
            .get_prices("test", &symbol, LookbackWindow::TEN_YEARS)
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing() {
        let cache = SqliteCache::in_memory().unwrap();
        let symbol = Symbol::new("ITC.NS");

        let first = FundamentalSnapshot {
            beta: Some(0.6),
            ..FundamentalSnapshot::new(&symbol)
        };
        let second = FundamentalSnapshot {
            beta: Some(0.8),
            ..FundamentalSnapshot::new(&symbol)
        };
        cache.put_snapshot("test", &symbol, &first).await.unwrap();
        cache.put_snapshot("test", &symbol, &second).await.unwrap();

        let retrieved = cache.get_snapshot("test", &symbol).await.unwrap().unwrap();
        assert_eq!(retrieved.beta, Some(0.8));
    }

    #[tokio::test]
    async fn test_invalidate_stale() {
        let cache = SqliteCache::in_memory().unwrap();
        let symbol = Symbol::new("ITC.NS");
        cache
            .put_snapshot("test", &symbol, &FundamentalSnapshot::new(&symbol))
            .await
            .unwrap();

        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_stale_evicts_old_rows() {
        let cache = SqliteCache::in_memory().unwrap();
        let symbol = Symbol::new("ITC.NS");
        cache
            .put_snapshot("test", &symbol, &FundamentalSnapshot::new(&symbol))
            .await
            .unwrap();
        cache
            .put_prices("test", &symbol, LookbackWindow::TEN_YEARS, &PriceSeries::empty())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        let removed = cache
            .invalidate_stale(Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = DateTime::parse_from_rfc3339("2026-01-01T00:00:05.5Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2026-01-01T00:00:05.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(earlier > later);
        assert!(timestamp(earlier) > timestamp(later));
        assert_eq!(timestamp(later), "2026-01-01T00:00:05.123456Z");
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let cache = SqliteCache::in_memory().unwrap();
        let symbol = Symbol::new("ITC.NS");
        let series = PriceSeries::new(vec![400.0, 401.0]).unwrap();

        cache
            .put_snapshot("test", &symbol, &FundamentalSnapshot::new(&symbol))
            .await
            .unwrap();
        cache
            .put_prices("test", &symbol, LookbackWindow::TEN_YEARS, &series)
            .await
            .unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get_snapshot("test", &symbol).await.unwrap().is_none());
        assert!(
            cache
                .get_prices("test", &symbol, LookbackWindow::TEN_YEARS)
                .await
                .unwrap()
                .is_none()
        );
    }
}
