//! Screener orchestrating providers, cache and the scoring core.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use screener_core::{
    DataCache, FundamentalSnapshot, FundamentalsProvider, PriceHistoryProvider, PriceSeries,
    Result, ScreenerError, Symbol, UniverseProvider,
};
use screener_scoring::Report;

use crate::config::ScreenerConfig;

/// A ticker that could not be scored during a batch screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScreenFailure {
    /// Ticker that failed.
    pub symbol: Symbol,
    /// Upstream error message.
    pub error: String,
}

/// Result of a batch screen.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScreenOutcome {
    /// Reports at or above the threshold, highest TD Score first. Ties keep
    /// universe order.
    pub reports: Vec<Report>,
    /// Tickers whose inputs could not be fetched.
    pub failures: Vec<ScreenFailure>,
    /// Tickers processed before completion or cancellation.
    pub scanned: usize,
    /// True when the screen stopped early on cancellation.
    pub cancelled: bool,
}

/// Orchestrates data collaborators around the scoring core.
///
/// Fundamentals and price providers are tried in registration order until
/// one succeeds. If a cache is configured it is consulted first and filled
/// on success; entries older than [`ScreenerConfig::cache_ttl`] are evicted
/// before every lookup.
///
/// # Example
///
/// ```rust,ignore
/// use screener::{Screener, ScreenerConfig, Symbol};
///
/// let screener = Screener::new(ScreenerConfig::default()).with_yahoo()?;
/// let report = screener.score_ticker(&Symbol::new("TCS.NS")).await?;
/// println!("{}: {}%", report.ticker().unwrap_or("?"), report.score_percentage());
/// ```
#[derive(Default)]
pub struct Screener {
    fundamentals_providers: Vec<Arc<dyn FundamentalsProvider>>,
    price_providers: Vec<Arc<dyn PriceHistoryProvider>>,
    universe_providers: Vec<Arc<dyn UniverseProvider>>,
    cache: Option<Arc<dyn DataCache>>,
    config: ScreenerConfig,
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field(
                "fundamentals_providers",
                &self
                    .fundamentals_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "price_providers",
                &self
                    .price_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "universe_providers",
                &self
                    .universe_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .finish()
    }
}

impl Screener {
    /// Create a screener with no providers.
    #[must_use]
    pub fn new(config: ScreenerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the cache for this screener.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn DataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Register a fundamentals provider.
    pub fn register_fundamentals(&mut self, provider: Arc<dyn FundamentalsProvider>) {
        debug!(
            provider = provider.name(),
            "Registering fundamentals provider"
        );
        self.fundamentals_providers.push(provider);
    }

    /// Register a price history provider.
    pub fn register_prices(&mut self, provider: Arc<dyn PriceHistoryProvider>) {
        debug!(provider = provider.name(), "Registering price provider");
        self.price_providers.push(provider);
    }

    /// Register a universe provider.
    pub fn register_universe(&mut self, provider: Arc<dyn UniverseProvider>) {
        debug!(provider = provider.name(), "Registering universe provider");
        self.universe_providers.push(provider);
    }

    /// The cache, after evicting entries older than the configured TTL.
    ///
    /// A cache that cannot be pruned is skipped for reads.
    async fn fresh_cache(&self) -> Option<&Arc<dyn DataCache>> {
        let cache = self.cache.as_ref()?;
        match cache.invalidate_stale(self.config.cache_ttl).await {
            Ok(evicted) => {
                if evicted > 0 {
                    debug!(evicted, "Evicted stale cache entries");
                }
                Some(cache)
            }
            Err(e) => {
                warn!(error = %e, "Failed to evict stale cache entries, bypassing cache");
                None
            }
        }
    }

    /// Fetch a fundamentals snapshot, trying providers in order until one succeeds.
    ///
    /// # Errors
    /// Returns [`ScreenerError::ProviderNotConfigured`] when no provider is
    /// registered, otherwise the last provider error.
    pub async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<FundamentalSnapshot> {
        if self.fundamentals_providers.is_empty() {
            return Err(ScreenerError::ProviderNotConfigured(
                "No fundamentals providers registered".to_string(),
            ));
        }

        if let Some(cache) = self.fresh_cache().await {
            for provider in &self.fundamentals_providers {
                if let Ok(Some(cached)) = cache.get_snapshot(provider.name(), symbol).await {
                    debug!(
                        provider = provider.name(),
                        symbol = %symbol,
                        "Cache hit for snapshot"
                    );
                    return Ok(cached);
                }
            }
        }

        let mut last_error = None;
        for provider in &self.fundamentals_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching snapshot"
            );

            match provider.fetch_snapshot(symbol).await {
                Ok(snapshot) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.put_snapshot(provider.name(), symbol, &snapshot).await
                        {
                            warn!(
                                provider = provider.name(),
                                error = %e,
                                "Failed to cache snapshot"
                            );
                        }
                    }
                    return Ok(snapshot);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ScreenerError::Other("All providers failed with no error".to_string())
        }))
    }

    /// Fetch the close series for the configured window, trying providers in
    /// order until one succeeds.
    ///
    /// # Errors
    /// Returns [`ScreenerError::ProviderNotConfigured`] when no provider is
    /// registered, otherwise the last provider error. An empty history is
    /// [`ScreenerError::DataNotAvailable`].
    pub async fn fetch_closes(&self, symbol: &Symbol) -> Result<PriceSeries> {
        if self.price_providers.is_empty() {
            return Err(ScreenerError::ProviderNotConfigured(
                "No price providers registered".to_string(),
            ));
        }

        let window = self.config.window;

        if let Some(cache) = self.fresh_cache().await {
            for provider in &self.price_providers {
                if let Ok(Some(cached)) = cache.get_prices(provider.name(), symbol, window).await {
                    debug!(
                        provider = provider.name(),
                        symbol = %symbol,
                        "Cache hit for prices"
                    );
                    return Ok(cached);
                }
            }
        }

        let mut last_error = None;
        for provider in &self.price_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                window = %window,
                "Fetching closes"
            );

            match provider.fetch_closes(symbol, window).await {
                Ok(series) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache
                            .put_prices(provider.name(), symbol, window, &series)
                            .await
                        {
                            warn!(
                                provider = provider.name(),
                                error = %e,
                                "Failed to cache prices"
                            );
                        }
                    }
                    return Ok(series);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ScreenerError::Other("All providers failed with no error".to_string())
        }))
    }

    /// Fetch both inputs for a ticker concurrently and score them.
    ///
    /// The scoring core only runs when both inputs are available.
    ///
    /// # Errors
    /// Returns the first fetch error.
    pub async fn score_ticker(&self, symbol: &Symbol) -> Result<Report> {
        let (mut snapshot, series) =
            futures::try_join!(self.fetch_snapshot(symbol), self.fetch_closes(symbol))?;

        if snapshot.symbol.is_none() {
            snapshot.symbol = Some(symbol.to_string());
        }

        Ok(screener_scoring::score(&snapshot, &series))
    }

    /// Universe identifiers offered by the registered universe providers.
    #[must_use]
    pub fn available_universes(&self) -> Vec<&str> {
        self.universe_providers
            .iter()
            .flat_map(|p| p.universes().iter().copied())
            .collect()
    }

    /// Resolve a named universe through the first provider that offers it.
    ///
    /// # Errors
    /// Returns [`ScreenerError::NotSupported`] for an unknown identifier.
    pub async fn universe(&self, universe_id: &str) -> Result<Vec<Symbol>> {
        let provider = self
            .universe_providers
            .iter()
            .find(|p| p.universes().contains(&universe_id))
            .ok_or_else(|| ScreenerError::NotSupported(format!("Unknown universe: {universe_id}")))?;

        provider.universe(universe_id).await
    }

    /// Score every symbol and keep the reports scoring at least
    /// `min_score_pct`.
    ///
    /// Tickers are processed sequentially with a randomized pause from the
    /// configured delay range between them. A ticker whose inputs cannot be
    /// fetched is recorded as a failure and skipped. Cancelling `cancel`
    /// stops the screen at the next ticker boundary or mid-pause; reports
    /// gathered so far are kept.
    pub async fn screen(
        &self,
        symbols: &[Symbol],
        min_score_pct: f64,
        cancel: CancellationToken,
    ) -> ScreenOutcome {
        let total = symbols.len();
        let mut outcome = ScreenOutcome::default();

        info!(
            count = total,
            min_score_pct,
            window = %self.config.window,
            "Screening universe"
        );

        for (i, symbol) in symbols.iter().enumerate() {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                break;
            }

            info!(progress = %format!("{}/{}", i + 1, total), symbol = %symbol, "Analyzing");

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    outcome.cancelled = true;
                    break;
                }
                result = self.score_ticker(symbol) => result,
            };
            outcome.scanned += 1;

            match result {
                Ok(report) if report.score_percentage() >= min_score_pct => {
                    info!(
                        symbol = %symbol,
                        score_pct = report.score_percentage(),
                        "High score found"
                    );
                    outcome.reports.push(report);
                }
                Ok(report) => {
                    debug!(symbol = %symbol, score_pct = report.score_percentage(), "Below threshold");
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Failed to score ticker");
                    outcome.failures.push(ScreenFailure {
                        symbol: symbol.clone(),
                        error: e.to_string(),
                    });
                }
            }

            if i + 1 < total {
                let delay = self.next_delay();
                if !delay.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            outcome.cancelled = true;
                            break;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        outcome
            .reports
            .sort_by(|a, b| b.total_score().cmp(&a.total_score()));

        info!(
            scanned = outcome.scanned,
            matches = outcome.reports.len(),
            failures = outcome.failures.len(),
            cancelled = outcome.cancelled,
            "Screen finished"
        );

        outcome
    }

    /// Uniformly random pause within the configured range.
    fn next_delay(&self) -> Duration {
        let min = self.config.min_delay.as_millis() as u64;
        let max = self.config.max_delay.as_millis() as u64;
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    // Builder methods for easy setup with specific providers

    /// Add the Yahoo Finance provider for fundamentals and prices.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    #[cfg(feature = "yahoo")]
    pub fn with_yahoo(mut self) -> Result<Self> {
        let config = screener_yahoo::YahooConfig {
            retry: self.config.retry,
            ..Default::default()
        };
        let provider = Arc::new(screener_yahoo::YahooProvider::from_config(&config)?);
        self.register_fundamentals(provider.clone());
        self.register_prices(provider);
        Ok(self)
    }

    /// Add the built-in `nse-core` list and the downloadable `nse-all` list.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_nse_universes(mut self) -> Result<Self> {
        self.register_universe(Arc::new(screener_universe::StaticUniverse::new()));
        let exchange = screener_universe::ExchangeListUniverse::new()?
            .with_retry_policy(self.config.retry);
        self.register_universe(Arc::new(exchange));
        Ok(self)
    }
}
