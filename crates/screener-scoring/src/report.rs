//! The assembled per-ticker report.

use screener_core::FundamentalSnapshot;
use serde::Serialize;

use crate::category::{MAX_SCORE, ScoreBreakdown};
use crate::forensic::ForensicAssessment;

/// Decimal places kept for `score_percentage` and `sharpe_ratio`.
pub const REPORT_PRECISION: i32 = 2;

/// Immutable scoring result for one (snapshot, series) pair.
///
/// Identity fields are copied from the snapshot as-is; an absent field stays
/// absent and serializes as `null`. Currency and locale formatting belong to
/// the presentation layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    ticker: Option<String>,
    name: Option<String>,
    sector: Option<String>,
    market_cap: Option<f64>,
    price: Option<f64>,
    total_score: u32,
    score_percentage: f64,
    breakdown: ScoreBreakdown,
    sharpe_ratio: f64,
    forensic_ratio: f64,
    forensic_red_flag: bool,
    return_on_equity: Option<f64>,
    debt_to_equity: Option<f64>,
}

impl Report {
    /// Ticker symbol.
    #[must_use]
    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Business sector.
    #[must_use]
    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    /// Market capitalization.
    #[must_use]
    pub const fn market_cap(&self) -> Option<f64> {
        self.market_cap
    }

    /// Current share price.
    #[must_use]
    pub const fn price(&self) -> Option<f64> {
        self.price
    }

    /// TD Score, 0 to 80.
    #[must_use]
    pub const fn total_score(&self) -> u32 {
        self.total_score
    }

    /// TD Score as a percentage of 80, rounded to two decimals.
    #[must_use]
    pub const fn score_percentage(&self) -> f64 {
        self.score_percentage
    }

    /// Per-category points.
    #[must_use]
    pub const fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    /// Annualized Sharpe ratio, rounded to two decimals.
    #[must_use]
    pub const fn sharpe_ratio(&self) -> f64 {
        self.sharpe_ratio
    }

    /// Operating cash flow over floored net income.
    #[must_use]
    pub const fn forensic_ratio(&self) -> f64 {
        self.forensic_ratio
    }

    /// True when operating cash flow trails net income.
    #[must_use]
    pub const fn forensic_red_flag(&self) -> bool {
        self.forensic_red_flag
    }

    /// Return on equity as reported, for display.
    #[must_use]
    pub const fn return_on_equity(&self) -> Option<f64> {
        self.return_on_equity
    }

    /// Debt-to-equity as reported, for display.
    #[must_use]
    pub const fn debt_to_equity(&self) -> Option<f64> {
        self.debt_to_equity
    }
}

/// Rounds to `places` decimals, ties to even (`0.125` becomes `0.12`).
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

/// `total / 80 * 100`, rounded to [`REPORT_PRECISION`] decimals.
#[must_use]
pub fn score_percentage(total: u32) -> f64 {
    round_to(f64::from(total) / f64::from(MAX_SCORE) * 100.0, REPORT_PRECISION)
}

/// Merges the scoring outputs into a [`Report`].
///
/// This is the only place the total and percentage are derived, so
/// `total_score == breakdown.total()` holds for every report.
#[must_use]
pub fn assemble(
    snapshot: &FundamentalSnapshot,
    breakdown: ScoreBreakdown,
    sharpe: f64,
    forensic: ForensicAssessment,
) -> Report {
    let total_score = breakdown.total();
    Report {
        ticker: snapshot.symbol.clone(),
        name: snapshot.short_name.clone(),
        sector: snapshot.sector.clone(),
        market_cap: snapshot.market_cap,
        price: snapshot.current_price,
        total_score,
        score_percentage: score_percentage(total_score),
        breakdown,
        sharpe_ratio: round_to(sharpe, REPORT_PRECISION),
        forensic_ratio: forensic.ratio,
        forensic_red_flag: forensic.red_flag,
        return_on_equity: snapshot.return_on_equity,
        debt_to_equity: snapshot.debt_to_equity,
    }
}
