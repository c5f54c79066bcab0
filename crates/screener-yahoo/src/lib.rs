#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance data provider that implements the
//! [`DataProvider`], [`FundamentalsProvider`], and [`PriceHistoryProvider`]
//! traits from `screener-core`.
//!
//! # Features
//!
//! - Fundamentals snapshot from the quote summary API, authenticated with a
//!   session cookie and crumb that are refreshed when Yahoo rejects them
//! - Daily OHLCV data from the chart API
//! - Built-in rate limiting (1 request per second by default)
//! - Bounded retry with exponential backoff on transport errors and 429/5xx
//!
//! # Example
//!
//! ```no_run
//! use screener_yahoo::YahooProvider;
//! use screener_core::{FundamentalsProvider, PriceHistoryProvider, LookbackWindow, Symbol};
//!
//! # async fn example() -> screener_core::Result<()> {
//! let provider = YahooProvider::new()?;
//! let symbol = Symbol::new("TCS.NS");
//!
//! let snapshot = provider.fetch_snapshot(&symbol).await?;
//! let closes = provider.fetch_closes(&symbol, LookbackWindow::TEN_YEARS).await?;
//! println!("{:?}: {} closes", snapshot.short_name, closes.len());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use polars::prelude::*;
use screener_core::{
    DataProvider, FundamentalSnapshot, FundamentalsProvider, PriceHistoryProvider, Result,
    RetryPolicy, ScreenerError, Symbol,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance quote summary API base URL.
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Host that sets the session cookie the crumb endpoint requires.
const CONSENT_URL: &str = "https://fc.yahoo.com";

/// Crumb endpoint; the crumb must accompany every quote summary request.
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

/// Quote summary modules needed for a full snapshot.
const SNAPSHOT_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData,price";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

const PROVIDER_NAME: &str = "Yahoo Finance";

/// Settings for a [`YahooProvider`] built with its own HTTP client.
#[derive(Clone, Debug)]
pub struct YahooConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Minimum spacing between requests.
    pub rate_limit: Duration,
    /// Retry policy for transport errors, 429 and 5xx responses.
    pub retry: RetryPolicy,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            rate_limit: Duration::from_millis(DEFAULT_RATE_LIMIT_MS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`], [`FundamentalsProvider`], and [`PriceHistoryProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
    retry: RetryPolicy,
    chart_url: String,
    quote_summary_url: String,
    consent_url: String,
    crumb_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::from_config(&YahooConfig::default())
    }

    /// Create a provider with its own HTTPS-only client.
    ///
    /// Certificate verification is always on.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &YahooConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .https_only(true)
            .cookie_store(true)
            .build()
            .map_err(|e| ScreenerError::Network(e.to_string()))?;

        Ok(Self::with_client(client)
            .with_rate_limit(config.rate_limit)
            .with_retry_policy(config.retry))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting and the
    /// default retry policy still apply. The client needs a cookie store
    /// (`cookie_store(true)`), or Yahoo rejects the crumb.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
            retry: RetryPolicy::default(),
            chart_url: CHART_API_URL.to_string(),
            quote_summary_url: QUOTE_SUMMARY_URL.to_string(),
            consent_url: CONSENT_URL.to_string(),
            crumb_url: CRUMB_URL.to_string(),
            crumb: Mutex::new(None),
        }
    }

    /// Set the minimum spacing between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit_ms = rate_limit.as_millis() as u64;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Point the provider at alternative chart and quote summary endpoints.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        chart_url: impl Into<String>,
        quote_summary_url: impl Into<String>,
    ) -> Self {
        self.chart_url = chart_url.into();
        self.quote_summary_url = quote_summary_url.into();
        self
    }

    /// Point the session handshake at alternative cookie and crumb endpoints.
    #[must_use]
    pub fn with_session_endpoints(
        mut self,
        consent_url: impl Into<String>,
        crumb_url: impl Into<String>,
    ) -> Self {
        self.consent_url = consent_url.into();
        self.crumb_url = crumb_url.into();
        self
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Build the daily chart API URL for a symbol and date range.
    fn build_chart_url(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            self.chart_url,
            symbol.as_str(),
            start_ts,
            end_ts,
        )
    }

    /// Build the quote summary URL for a symbol.
    fn build_quote_summary_url(&self, symbol: &Symbol, crumb: &str) -> Result<String> {
        let base = format!("{}/{}", self.quote_summary_url, symbol.as_str());
        reqwest::Url::parse_with_params(&base, &[("modules", SNAPSHOT_MODULES), ("crumb", crumb)])
            .map(String::from)
            .map_err(|e| ScreenerError::InvalidParameter(format!("{base}: {e}")))
    }

    /// Session crumb, requested on first use.
    async fn crumb(&self) -> Result<String> {
        let mut crumb = self.crumb.lock().await;
        if let Some(value) = crumb.as_ref() {
            return Ok(value.clone());
        }
        let fresh = self.request_crumb().await?;
        *crumb = Some(fresh.clone());
        Ok(fresh)
    }

    /// Discard the held crumb and request a new one.
    async fn refresh_crumb(&self) -> Result<String> {
        let mut crumb = self.crumb.lock().await;
        *crumb = None;
        let fresh = self.request_crumb().await?;
        *crumb = Some(fresh.clone());
        Ok(fresh)
    }

    /// Cookie and crumb handshake.
    ///
    /// The consent host answers with an error status but still sets the
    /// session cookie, so only transport failures count there.
    async fn request_crumb(&self) -> Result<String> {
        let crumb_url = self.crumb_url.as_str();
        self.retry
            .run(crumb_url, move || async move {
                self.apply_rate_limit().await;
                debug!("Requesting session cookie from {}", self.consent_url);
                self.client
                    .get(&self.consent_url)
                    .send()
                    .await
                    .map_err(|e| ScreenerError::Network(e.to_string()))?;

                self.apply_rate_limit().await;
                let response = self
                    .client
                    .get(crumb_url)
                    .send()
                    .await
                    .map_err(|e| ScreenerError::Network(e.to_string()))?;
                let response = check_transient(response)?;
                if !response.status().is_success() {
                    return Err(ScreenerError::Unauthorized(PROVIDER_NAME.to_string()));
                }

                let body = response
                    .text()
                    .await
                    .map_err(|e| ScreenerError::Network(e.to_string()))?;
                parse_crumb(&body)
            })
            .await
    }

    /// Fetch the quote summary document with the given crumb.
    async fn get_quote_summary(
        &self,
        symbol: &Symbol,
        crumb: &str,
    ) -> Result<QuoteSummaryResponse> {
        let url = self.build_quote_summary_url(symbol, crumb)?;
        self.get_json(&url, symbol).await
    }

    /// GET a JSON document, retrying transient failures.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &str, symbol: &Symbol) -> Result<T> {
        self.retry
            .run(url, move || async move {
                self.apply_rate_limit().await;
                debug!("Fetching {}", url);

                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| ScreenerError::Network(e.to_string()))?;

                let response = check_status(response, symbol)?;

                response
                    .json::<T>()
                    .await
                    .map_err(|e| ScreenerError::Parse(e.to_string()))
            })
            .await
    }

    /// Parse Yahoo Finance chart response into a DataFrame.
    fn parse_chart_response(&self, symbol: &Symbol, response: ChartResponse) -> Result<DataFrame> {
        let result = response
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();

        if timestamps.is_empty() {
            return Err(ScreenerError::DataNotAvailable(symbol.to_string()));
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::Parse("Missing quote data".to_string()))?;

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        // Days since the Unix epoch, the physical representation of a polars Date
        let dates: Vec<i32> = timestamps
            .iter()
            .map(|&ts| ts.div_euclid(86_400) as i32)
            .collect();

        let symbols: Vec<&str> = vec![symbol.as_str(); dates.len()];
        let closes: Vec<Option<f64>> = quote.close;

        // Pad adjusted close if needed
        let adj_closes: Vec<Option<f64>> = if adj_close.len() == dates.len() {
            adj_close
        } else {
            closes.clone()
        };

        let date_col = Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| ScreenerError::Other(e.to_string()))?;

        let df = DataFrame::new(vec![
            Column::new("symbol".into(), symbols),
            date_col,
            Column::new("open".into(), quote.open),
            Column::new("high".into(), quote.high),
            Column::new("low".into(), quote.low),
            Column::new("close".into(), closes),
            Column::new("volume".into(), quote.volume),
            Column::new("adjusted_close".into(), adj_closes),
        ])
        .map_err(|e| ScreenerError::Other(e.to_string()))?;

        Ok(df)
    }
}

/// A crumb is a short opaque token; anything else means the session failed.
fn parse_crumb(body: &str) -> Result<String> {
    let crumb = body.trim();
    if crumb.is_empty()
        || crumb.len() > 64
        || crumb.contains(char::is_whitespace)
        || crumb.starts_with(['<', '{'])
    {
        return Err(ScreenerError::Unauthorized(PROVIDER_NAME.to_string()));
    }
    Ok(crumb.to_string())
}

/// Map rate limiting and server errors onto retryable screener errors.
fn check_transient(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));
        return Err(ScreenerError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: Some(retry_after),
        });
    }

    if status.is_server_error() {
        return Err(ScreenerError::Network(format!(
            "HTTP {status} from {}",
            response.url()
        )));
    }

    Ok(response)
}

/// Map HTTP status codes onto screener errors.
fn check_status(response: reqwest::Response, symbol: &Symbol) -> Result<reqwest::Response> {
    let response = check_transient(response)?;
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ScreenerError::Unauthorized(PROVIDER_NAME.to_string()));
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScreenerError::SymbolNotFound(symbol.to_string()));
    }

    if !status.is_success() {
        return Err(ScreenerError::Other(format!("HTTP {status} for {symbol}")));
    }

    Ok(response)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn description(&self) -> &str {
        "Yahoo Finance provider for fundamentals snapshots and daily price history"
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooProvider {
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DataFrame> {
        // Validate date range
        if start > end {
            return Err(ScreenerError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        let url = self.build_chart_url(symbol, start, end);
        let chart_response: ChartResponse = self.get_json(&url, symbol).await?;

        // Check for API-level errors
        if let Some(error) = chart_response.chart.error.as_ref() {
            if error.code == "Not Found" {
                return Err(ScreenerError::SymbolNotFound(symbol.to_string()));
            }
            return Err(ScreenerError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        self.parse_chart_response(symbol, chart_response)
    }
}

#[async_trait]
impl FundamentalsProvider for YahooProvider {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<FundamentalSnapshot> {
        let crumb = self.crumb().await?;
        let summary = match self.get_quote_summary(symbol, &crumb).await {
            Err(ScreenerError::Unauthorized(_)) => {
                warn!(symbol = %symbol, "Yahoo Finance rejected the crumb, refreshing session");
                let crumb = self.refresh_crumb().await?;
                self.get_quote_summary(symbol, &crumb).await?
            }
            other => other?,
        };

        if let Some(error) = summary.quote_summary.error {
            if error.code == "Not Found" {
                return Err(ScreenerError::SymbolNotFound(symbol.to_string()));
            }
            return Err(ScreenerError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let data = summary
            .quote_summary
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ScreenerError::DataNotAvailable(symbol.to_string()))?;

        Ok(data.into_snapshot(symbol))
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

/// Quote Summary API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    result: Option<Vec<QuoteSummaryData>>,
    error: Option<ApiError>,
}

/// Numeric field wrapper: `{"raw": 0.12, "fmt": "12.00%"}` or `{}`.
#[derive(Debug, Default, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    asset_profile: Option<AssetProfile>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialData>,
    price: Option<PriceModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    beta: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    held_percent_insiders: Option<RawValue>,
    price_to_book: Option<RawValue>,
    trailing_eps: Option<RawValue>,
    net_income_to_common: Option<RawValue>,
    beta: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    current_price: Option<RawValue>,
    return_on_equity: Option<RawValue>,
    debt_to_equity: Option<RawValue>,
    free_cashflow: Option<RawValue>,
    operating_cashflow: Option<RawValue>,
    total_cash: Option<RawValue>,
    total_debt: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    symbol: Option<String>,
    short_name: Option<String>,
    market_cap: Option<RawValue>,
    regular_market_price: Option<RawValue>,
}

impl QuoteSummaryData {
    fn into_snapshot(self, requested: &Symbol) -> FundamentalSnapshot {
        let profile = self.asset_profile.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let stats = self.default_key_statistics.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let price = self.price.unwrap_or_default();

        FundamentalSnapshot {
            symbol: price.symbol.or_else(|| Some(requested.to_string())),
            short_name: price.short_name,
            sector: profile.sector,
            long_business_summary: profile.long_business_summary,
            market_cap: raw(price.market_cap).or(raw(detail.market_cap)),
            current_price: raw(financial.current_price).or(raw(price.regular_market_price)),
            held_percent_insiders: raw(stats.held_percent_insiders),
            return_on_equity: raw(financial.return_on_equity),
            debt_to_equity: raw(financial.debt_to_equity),
            free_cashflow: raw(financial.free_cashflow),
            operating_cashflow: raw(financial.operating_cashflow),
            net_income: raw(stats.net_income_to_common),
            total_cash: raw(financial.total_cash),
            total_debt: raw(financial.total_debt),
            trailing_pe: raw(detail.trailing_pe),
            price_to_book: raw(stats.price_to_book),
            beta: raw(detail.beta).or(raw(stats.beta)),
            trailing_eps: raw(stats.trailing_eps),
        }
    }
}
