//! NSE equity list download.

use std::time::Duration;

use async_trait::async_trait;
use screener_core::{DataProvider, Result, RetryPolicy, ScreenerError, Symbol, UniverseProvider};
use serde::Deserialize;
use tracing::{debug, info};

/// Identifier of the full NSE equity universe.
pub const NSE_ALL: &str = "nse-all";

/// Published list of every security traded in the NSE capital market segment.
pub const NSE_EQUITY_LIST_URL: &str = "https://archives.nseindia.com/content/equities/EQUITY_L.csv";

/// Exchange suffix Yahoo Finance uses for NSE listings.
const NSE_SUFFIX: &str = ".NS";

/// Series code for ordinary rolling-settlement equity.
const EQUITY_SERIES: &str = "EQ";

/// User agent for HTTP requests. The archive rejects requests without one.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// One row of the equity list. Headers carry stray whitespace, so the reader trims them.
#[derive(Debug, Deserialize)]
struct EquityRow {
    #[serde(rename = "SYMBOL")]
    symbol: String,
    #[serde(rename = "SERIES", default)]
    series: Option<String>,
}

/// Universe built from the exchange's own equity list.
#[derive(Debug)]
pub struct ExchangeListUniverse {
    client: reqwest::Client,
    url: String,
    retry: RetryPolicy,
}

impl ExchangeListUniverse {
    /// Create a provider with its own HTTPS-only client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .https_only(true)
            .build()
            .map_err(|e| ScreenerError::Network(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Create a provider with a caller-supplied HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            url: NSE_EQUITY_LIST_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Download the list from a different location.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn download(&self) -> Result<String> {
        let url = self.url.as_str();
        let client = &self.client;

        self.retry
            .run(url, move || async move {
                debug!("Fetching {}", url);
                let response = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| ScreenerError::Network(e.to_string()))?;

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(ScreenerError::RateLimited {
                        provider: "NSE".to_string(),
                        retry_after: None,
                    });
                }
                if status.is_server_error() {
                    return Err(ScreenerError::Network(format!("HTTP {status}")));
                }
                if !status.is_success() {
                    return Err(ScreenerError::Other(format!(
                        "HTTP {status} fetching equity list"
                    )));
                }

                response
                    .text()
                    .await
                    .map_err(|e| ScreenerError::Network(e.to_string()))
            })
            .await
    }
}

/// Parse the equity list CSV into Yahoo symbols.
///
/// Rows whose series is not `EQ` are skipped; a missing series column keeps
/// every row.
fn parse_equity_list(body: &str) -> Result<Vec<Symbol>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut symbols = Vec::new();
    for row in reader.deserialize::<EquityRow>() {
        let row = row.map_err(|e| ScreenerError::Parse(e.to_string()))?;
        if row.symbol.is_empty() {
            continue;
        }
        if row
            .series
            .as_deref()
            .is_some_and(|series| series != EQUITY_SERIES)
        {
            continue;
        }
        symbols.push(Symbol::new(format!("{}{}", row.symbol, NSE_SUFFIX)));
    }

    Ok(symbols)
}

impl DataProvider for ExchangeListUniverse {
    fn name(&self) -> &str {
        "NSE"
    }

    fn description(&self) -> &str {
        "National Stock Exchange of India equity list"
    }
}

#[async_trait]
impl UniverseProvider for ExchangeListUniverse {
    fn universes(&self) -> &[&str] {
        &[NSE_ALL]
    }

    async fn universe(&self, universe_id: &str) -> Result<Vec<Symbol>> {
        if universe_id != NSE_ALL {
            return Err(ScreenerError::NotSupported(format!(
                "Unknown universe: {universe_id}"
            )));
        }

        let body = self.download().await?;
        let symbols = parse_equity_list(&body)?;
        if symbols.is_empty() {
            return Err(ScreenerError::DataNotAvailable(universe_id.to_string()));
        }

        info!(
            universe = universe_id,
            count = symbols.len(),
            "Resolved exchange universe"
        );
        Ok(symbols)
    }
}
