//! Screener configuration.

use std::time::Duration;

use screener_core::{LookbackWindow, Result, RetryPolicy, ScreenerError};

/// Settings shared by single-ticker scoring and batch screening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenerConfig {
    /// Price history span fed to the Sharpe calculation.
    pub window: LookbackWindow,
    /// Lower bound of the pause between tickers in a batch screen.
    pub min_delay: Duration,
    /// Upper bound of the pause between tickers in a batch screen.
    pub max_delay: Duration,
    /// Retry policy handed to HTTP collaborators built by the screener.
    pub retry: RetryPolicy,
    /// Age after which a cached snapshot or close series is refetched.
    pub cache_ttl: Duration,
}

/// Default [`ScreenerConfig::cache_ttl`]: one day.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

impl ScreenerConfig {
    /// Sets the lookback window.
    #[must_use]
    pub const fn with_window(mut self, window: LookbackWindow) -> Self {
        self.window = window;
        self
    }

    /// Sets the inter-request delay range.
    ///
    /// # Errors
    /// Returns [`ScreenerError::InvalidParameter`] if `min` exceeds `max`.
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(ScreenerError::InvalidParameter(format!(
                "minimum delay {}ms exceeds maximum delay {}ms",
                min.as_millis(),
                max.as_millis()
            )));
        }
        self.min_delay = min;
        self.max_delay = max;
        Ok(self)
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets how long cached inputs stay fresh.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// No pause between tickers and no retries.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            window: LookbackWindow::TEN_YEARS,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            retry: RetryPolicy::none(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            window: LookbackWindow::default(),
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1500),
            retry: RetryPolicy::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreenerConfig::default();
        assert_eq!(config.window, LookbackWindow::TEN_YEARS);
        assert_eq!(config.min_delay, Duration::from_millis(500));
        assert_eq!(config.max_delay, Duration::from_millis(1500));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn test_with_delay_rejects_inverted_range() {
        let result =
            ScreenerConfig::default().with_delay(Duration::from_secs(2), Duration::from_secs(1));
        assert!(matches!(result, Err(ScreenerError::InvalidParameter(_))));
    }

    #[test]
    fn test_builders() {
        let config = ScreenerConfig::default()
            .with_window(LookbackWindow::FIVE_YEARS)
            .with_retry(RetryPolicy::none())
            .with_delay(Duration::ZERO, Duration::from_millis(10))
            .unwrap()
            .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(config.window.as_years(), 5);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.max_delay, Duration::from_millis(10));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }
}
