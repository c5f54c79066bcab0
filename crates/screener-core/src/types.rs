//! Core data types for the screener.
//!
//! This module defines the inputs of the scoring core:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`FundamentalSnapshot`] - Point-in-time company fundamentals
//! - [`PriceSeries`] - Chronological daily closing prices

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ScreenerError};

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Point-in-time fundamentals for one company.
///
/// Every field is optional and absence is distinct from a present zero. The
/// scoring rules never read the raw fields directly; they go through the
/// `*_or_default` accessors, each paired with an associated `DEFAULT_*`
/// constant. The defaults are deliberately conservative so that a missing
/// value fails the rule it feeds.
///
/// Serialized keys follow the Yahoo Finance field names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalSnapshot {
    // Identity
    /// Ticker symbol as reported by the provider.
    pub symbol: Option<String>,
    /// Display name.
    pub short_name: Option<String>,
    /// Business sector.
    pub sector: Option<String>,
    /// Long-form business description.
    pub long_business_summary: Option<String>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Current share price.
    pub current_price: Option<f64>,

    // Management
    /// Fraction of shares held by insiders (0.12 = 12%).
    pub held_percent_insiders: Option<f64>,
    /// Return on equity (0.18 = 18%).
    pub return_on_equity: Option<f64>,

    // Balance sheet and cash flow
    /// Debt-to-equity ratio as reported by the provider.
    pub debt_to_equity: Option<f64>,
    /// Free cash flow.
    pub free_cashflow: Option<f64>,
    /// Operating cash flow.
    pub operating_cashflow: Option<f64>,
    /// Net income attributable to common shareholders.
    pub net_income: Option<f64>,
    /// Total cash.
    pub total_cash: Option<f64>,
    /// Total debt.
    pub total_debt: Option<f64>,

    // Valuation and risk
    /// Trailing price-to-earnings ratio.
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    /// Price-to-book ratio.
    pub price_to_book: Option<f64>,
    /// Beta against the market.
    pub beta: Option<f64>,
    /// Trailing earnings per share.
    pub trailing_eps: Option<f64>,
}

impl FundamentalSnapshot {
    /// Insider ownership used when the field is absent.
    pub const DEFAULT_HELD_PERCENT_INSIDERS: f64 = 0.0;
    /// Return on equity used when the field is absent.
    pub const DEFAULT_RETURN_ON_EQUITY: f64 = 0.0;
    /// Debt-to-equity used when the field is absent.
    pub const DEFAULT_DEBT_TO_EQUITY: f64 = 100.0;
    /// Free cash flow used when the field is absent.
    pub const DEFAULT_FREE_CASHFLOW: f64 = 0.0;
    /// Operating cash flow used when the field is absent.
    pub const DEFAULT_OPERATING_CASHFLOW: f64 = 1.0;
    /// Net income used when the field is absent.
    pub const DEFAULT_NET_INCOME: f64 = 1.0;
    /// Total cash used when the field is absent.
    pub const DEFAULT_TOTAL_CASH: f64 = 0.0;
    /// Total debt used when the field is absent.
    pub const DEFAULT_TOTAL_DEBT: f64 = 0.0;
    /// Trailing P/E used when the field is absent.
    pub const DEFAULT_TRAILING_PE: f64 = 50.0;
    /// Price-to-book used when the field is absent.
    pub const DEFAULT_PRICE_TO_BOOK: f64 = 10.0;
    /// Beta used when the field is absent.
    pub const DEFAULT_BETA: f64 = 1.2;
    /// Trailing EPS used when the field is absent.
    pub const DEFAULT_TRAILING_EPS: f64 = 0.0;

    /// Creates an empty snapshot for a symbol.
    #[must_use]
    pub fn new(symbol: &Symbol) -> Self {
        Self {
            symbol: Some(symbol.to_string()),
            ..Default::default()
        }
    }

    /// Returns true if a non-empty business description is present.
    #[must_use]
    pub fn has_business_description(&self) -> bool {
        self.long_business_summary
            .as_deref()
            .is_some_and(|s| !s.is_empty())
    }

    /// Insider ownership fraction, or [`Self::DEFAULT_HELD_PERCENT_INSIDERS`].
    #[must_use]
    pub fn held_percent_insiders_or_default(&self) -> f64 {
        self.held_percent_insiders
            .unwrap_or(Self::DEFAULT_HELD_PERCENT_INSIDERS)
    }

    /// Return on equity, or [`Self::DEFAULT_RETURN_ON_EQUITY`].
    #[must_use]
    pub fn return_on_equity_or_default(&self) -> f64 {
        self.return_on_equity
            .unwrap_or(Self::DEFAULT_RETURN_ON_EQUITY)
    }

    /// Debt-to-equity, or [`Self::DEFAULT_DEBT_TO_EQUITY`].
    #[must_use]
    pub fn debt_to_equity_or_default(&self) -> f64 {
        self.debt_to_equity.unwrap_or(Self::DEFAULT_DEBT_TO_EQUITY)
    }

    /// Free cash flow, or [`Self::DEFAULT_FREE_CASHFLOW`].
    #[must_use]
    pub fn free_cashflow_or_default(&self) -> f64 {
        self.free_cashflow.unwrap_or(Self::DEFAULT_FREE_CASHFLOW)
    }

    /// Operating cash flow, or [`Self::DEFAULT_OPERATING_CASHFLOW`].
    #[must_use]
    pub fn operating_cashflow_or_default(&self) -> f64 {
        self.operating_cashflow
            .unwrap_or(Self::DEFAULT_OPERATING_CASHFLOW)
    }

    /// Net income, or [`Self::DEFAULT_NET_INCOME`].
    #[must_use]
    pub fn net_income_or_default(&self) -> f64 {
        self.net_income.unwrap_or(Self::DEFAULT_NET_INCOME)
    }

    /// Total cash, or [`Self::DEFAULT_TOTAL_CASH`].
    #[must_use]
    pub fn total_cash_or_default(&self) -> f64 {
        self.total_cash.unwrap_or(Self::DEFAULT_TOTAL_CASH)
    }

    /// Total debt, or [`Self::DEFAULT_TOTAL_DEBT`].
    #[must_use]
    pub fn total_debt_or_default(&self) -> f64 {
        self.total_debt.unwrap_or(Self::DEFAULT_TOTAL_DEBT)
    }

    /// Trailing P/E, or [`Self::DEFAULT_TRAILING_PE`].
    #[must_use]
    pub fn trailing_pe_or_default(&self) -> f64 {
        self.trailing_pe.unwrap_or(Self::DEFAULT_TRAILING_PE)
    }

    /// Price-to-book, or [`Self::DEFAULT_PRICE_TO_BOOK`].
    #[must_use]
    pub fn price_to_book_or_default(&self) -> f64 {
        self.price_to_book.unwrap_or(Self::DEFAULT_PRICE_TO_BOOK)
    }

    /// Beta, or [`Self::DEFAULT_BETA`].
    #[must_use]
    pub fn beta_or_default(&self) -> f64 {
        self.beta.unwrap_or(Self::DEFAULT_BETA)
    }

    /// Trailing EPS, or [`Self::DEFAULT_TRAILING_EPS`].
    #[must_use]
    pub fn trailing_eps_or_default(&self) -> f64 {
        self.trailing_eps.unwrap_or(Self::DEFAULT_TRAILING_EPS)
    }
}

/// Chronological daily closing prices.
///
/// Every close is finite. The series may be empty when no history is
/// available; at least two closes are needed for a return series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Creates a series from chronological closes.
    ///
    /// # Errors
    /// Returns [`ScreenerError::InvalidParameter`] if any close is NaN or infinite.
    pub fn new(closes: Vec<f64>) -> Result<Self> {
        if let Some(pos) = closes.iter().position(|c| !c.is_finite()) {
            return Err(ScreenerError::InvalidParameter(format!(
                "non-finite close {} at index {pos}",
                closes[pos]
            )));
        }
        Ok(Self { closes })
    }

    /// Creates an empty series.
    #[must_use]
    pub const fn empty() -> Self {
        Self { closes: Vec::new() }
    }

    /// Builds a series from an OHLCV DataFrame.
    ///
    /// Uses the `adjusted_close` column when present, otherwise `close`. Null
    /// rows are skipped; the frame is assumed to be sorted by date.
    ///
    /// # Errors
    /// Returns [`ScreenerError::Parse`] if neither column exists or is not `f64`.
    pub fn from_ohlcv(df: &DataFrame) -> Result<Self> {
        let column = df
            .column("adjusted_close")
            .or_else(|_| df.column("close"))
            .map_err(|e| ScreenerError::Parse(e.to_string()))?;
        let closes = column
            .f64()
            .map_err(|e| ScreenerError::Parse(e.to_string()))?
            .into_iter()
            .flatten()
            .filter(|c| c.is_finite())
            .collect();
        Ok(Self { closes })
    }

    /// Returns the closes as a slice.
    #[must_use]
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Returns the number of closes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Returns true if there are no closes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = ScreenerError;

    fn try_from(closes: Vec<f64>) -> Result<Self> {
        Self::new(closes)
    }
}

impl From<PriceSeries> for Vec<f64> {
    fn from(series: PriceSeries) -> Self {
        series.closes
    }
}
