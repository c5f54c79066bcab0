//! Cache trait for storing fetched screener inputs.
//!
//! This module defines the [`DataCache`] trait that provides a unified interface
//! for caching fundamentals snapshots and daily close series between runs.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::Result,
    types::{FundamentalSnapshot, PriceSeries, Symbol},
    window::LookbackWindow,
};

/// Trait for caching fetched screener inputs.
///
/// Implementations can store data in various backends (SQLite, in-memory, etc.)
/// to avoid repeated API calls when a universe is screened more than once.
#[async_trait]
pub trait DataCache: Send + Sync {
    /// Retrieves a cached fundamentals snapshot.
    ///
    /// Returns `Ok(Some(snapshot))` if cached, `Ok(None)` if not cached.
    async fn get_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
    ) -> Result<Option<FundamentalSnapshot>>;

    /// Stores a fundamentals snapshot in the cache.
    async fn put_snapshot(
        &self,
        provider: &str,
        symbol: &Symbol,
        snapshot: &FundamentalSnapshot,
    ) -> Result<()>;

    /// Retrieves a cached close series for a lookback window.
    ///
    /// Returns `Ok(Some(series))` if cached, `Ok(None)` if not cached.
    async fn get_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        window: LookbackWindow,
    ) -> Result<Option<PriceSeries>>;

    /// Stores a close series for a lookback window.
    async fn put_prices(
        &self,
        provider: &str,
        symbol: &Symbol,
        window: LookbackWindow,
        series: &PriceSeries,
    ) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
