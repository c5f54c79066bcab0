//! Built-in universe that needs no network access.

use async_trait::async_trait;
use screener_core::{DataProvider, Result, ScreenerError, Symbol, UniverseProvider};
use tracing::debug;

/// Identifier of the built-in NSE list.
pub const NSE_CORE: &str = "nse-core";

/// Built-in NSE tickers, grouped by large cap, mid cap, small cap, recent
/// strong performers and quality compounders.
pub const NSE_CORE_TICKERS: [&str; 50] = [
    // Large cap
    "RELIANCE.NS",
    "TCS.NS",
    "HDFCBANK.NS",
    "ICICIBANK.NS",
    "INFY.NS",
    "BHARTIARTL.NS",
    "ITC.NS",
    "LT.NS",
    "HINDUNILVR.NS",
    "SBIN.NS",
    // Mid cap
    "NAUKRI.NS",
    "MPHASIS.NS",
    "TATACOMM.NS",
    "PERSISTENT.NS",
    "LTIM.NS",
    "TRENT.NS",
    "ABBOTINDIA.NS",
    "PGHL.NS",
    "SUPREMEIND.NS",
    "ASTRAL.NS",
    // Small cap
    "CDSL.NS",
    "ALKYLAMINE.NS",
    "RELAXO.NS",
    "TASTYBITE.NS",
    "GRINDWELL.NS",
    "VMART.NS",
    "VIPIND.NS",
    "SAFARI.NS",
    "APOLLOHOSP.NS",
    "LALPATHLAB.NS",
    // Recent strong performers
    "TITAGARH.NS",
    "OLECTRA.NS",
    "TATAMOTORS.NS",
    "ZEEL.NS",
    "PNB.NS",
    "TVSMOTOR.NS",
    "M&M.NS",
    "BAJFINANCE.NS",
    "VBL.NS",
    "HAL.NS",
    // Quality and growth
    "DMART.NS",
    "PIDILITIND.NS",
    "BAJAJFINSV.NS",
    "HDFCLIFE.NS",
    "TITAN.NS",
    "ASIANPAINT.NS",
    "MARICO.NS",
    "NESTLEIND.NS",
    "COLPAL.NS",
    "PAGEIND.NS",
];

/// Universe backed by compiled-in ticker lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticUniverse;

impl StaticUniverse {
    /// Create a new static universe provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DataProvider for StaticUniverse {
    fn name(&self) -> &str {
        "static"
    }

    fn description(&self) -> &str {
        "Built-in NSE core ticker list"
    }
}

#[async_trait]
impl UniverseProvider for StaticUniverse {
    fn universes(&self) -> &[&str] {
        &[NSE_CORE]
    }

    async fn universe(&self, universe_id: &str) -> Result<Vec<Symbol>> {
        if universe_id != NSE_CORE {
            return Err(ScreenerError::NotSupported(format!(
                "Unknown universe: {universe_id}"
            )));
        }

        debug!(
            universe = universe_id,
            count = NSE_CORE_TICKERS.len(),
            "Resolved static universe"
        );
        Ok(NSE_CORE_TICKERS.iter().copied().map(Symbol::new).collect())
    }
}
