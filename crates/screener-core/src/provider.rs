//! Provider traits for fetching screener inputs.
//!
//! This module defines the collaborator traits that feed the scoring core:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`FundamentalsProvider`] - Point-in-time fundamentals snapshots
//! - [`PriceHistoryProvider`] - Daily OHLCV history and close series
//! - [`UniverseProvider`] - Named lists of tickers to screen

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::{Result, ScreenerError},
    types::{FundamentalSnapshot, PriceSeries, Symbol},
    window::LookbackWindow,
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for fundamentals snapshots.
#[async_trait]
pub trait FundamentalsProvider: DataProvider {
    /// Fetches the current fundamentals snapshot for a symbol.
    ///
    /// Fields the provider does not report are left absent; the scoring core
    /// applies its own defaults.
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<FundamentalSnapshot>;
}

/// Provider for daily price history.
#[async_trait]
pub trait PriceHistoryProvider: DataProvider {
    /// Fetches daily OHLCV data for a single symbol.
    ///
    /// Returns a DataFrame with columns: symbol, date, open, high, low, close,
    /// volume, adjusted_close, sorted by date.
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DataFrame>;

    /// Fetches the daily close series covering `window`, ending today.
    ///
    /// Default implementation calls `fetch_ohlcv` and extracts the adjusted
    /// close column. An empty history is reported as
    /// [`ScreenerError::DataNotAvailable`].
    async fn fetch_closes(&self, symbol: &Symbol, window: LookbackWindow) -> Result<PriceSeries> {
        let (start, end) = window.date_range(Utc::now().date_naive());
        let df = self.fetch_ohlcv(symbol, start, end).await?;
        let series = PriceSeries::from_ohlcv(&df)?;

        if series.is_empty() {
            return Err(ScreenerError::DataNotAvailable(symbol.to_string()));
        }

        Ok(series)
    }
}

/// Provider for ticker universes.
#[async_trait]
pub trait UniverseProvider: DataProvider {
    /// Returns the universe identifiers this provider can resolve.
    fn universes(&self) -> &[&str];

    /// Fetches the symbols in a named universe (e.g., "nse-core").
    async fn universe(&self, universe_id: &str) -> Result<Vec<Symbol>>;
}
