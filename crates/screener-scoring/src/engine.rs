//! Rule evaluation for the eight TD Score categories.
//!
//! Every rule compares one snapshot field against a fixed threshold with a
//! strict operator. Absent fields take the conservative defaults declared on
//! [`FundamentalSnapshot`], so incomplete data fails a rule instead of passing
//! it. The thresholds and defaults are part of the scoring contract.

use screener_core::FundamentalSnapshot;

use crate::category::{Category, ScoreBreakdown};
use crate::forensic::forensic_ratio_and_flag;

/// Sectors that never earn the moat sector award.
pub const EXCLUDED_SECTORS: [&str; 2] = ["Financial Services", "Cyclicals"];

/// Fixed award for the Conviction & Temperament category.
pub const CONVICTION_AWARD: u32 = 5;

/// Award for a Sharpe ratio above [`QUANT_SHARPE_THRESHOLD`].
pub const QUANT_EDGE_AWARD: u32 = 4;

/// Annualized Sharpe ratio the Quant Edge rule must exceed.
pub const QUANT_SHARPE_THRESHOLD: f64 = 1.0;

/// Evaluates a fundamentals snapshot into a [`ScoreBreakdown`].
///
/// The engine never reads the price series. The Quant Edge category takes the
/// annualized Sharpe ratio already derived from it.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    /// Creates a new engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Scores every category for `snapshot`.
    ///
    /// `sharpe` is the unrounded annualized Sharpe ratio of the price history.
    #[must_use]
    pub fn evaluate(&self, snapshot: &FundamentalSnapshot, sharpe: f64) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();
        for category in Category::ALL {
            let points = match category {
                Category::BusinessQuality => business_quality(snapshot),
                Category::ManagementQuality => management_quality(snapshot),
                Category::FinancialStrength => financial_strength(snapshot),
                Category::ForensicAccounting => forensic_accounting(snapshot),
                Category::Valuation => valuation(snapshot),
                Category::RiskProfile => risk_profile(snapshot),
                Category::Conviction => CONVICTION_AWARD,
                Category::QuantEdge => quant_edge(sharpe),
            };
            debug_assert!(points <= category.cap());
            breakdown.set(category, points);
        }
        breakdown
    }
}

const fn award(passed: bool, points: u32) -> u32 {
    if passed { points } else { 0 }
}

fn business_quality(s: &FundamentalSnapshot) -> u32 {
    // An absent sector is not in the excluded set.
    let sector_ok = !s
        .sector
        .as_deref()
        .is_some_and(|sector| EXCLUDED_SECTORS.contains(&sector));
    award(s.has_business_description(), 6) + award(sector_ok, 4)
}

fn management_quality(s: &FundamentalSnapshot) -> u32 {
    award(s.held_percent_insiders_or_default() > 0.10, 5)
        + award(s.return_on_equity_or_default() > 0.15, 5)
}

fn financial_strength(s: &FundamentalSnapshot) -> u32 {
    award(s.debt_to_equity_or_default() < 1.0, 5) + award(s.free_cashflow_or_default() > 0.0, 5)
}

fn forensic_accounting(s: &FundamentalSnapshot) -> u32 {
    let forensic = forensic_ratio_and_flag(s);
    award(forensic.ratio > 1.0, 6) + award(s.total_cash_or_default() > s.total_debt_or_default(), 4)
}

fn valuation(s: &FundamentalSnapshot) -> u32 {
    award(s.trailing_pe_or_default() < 30.0, 5) + award(s.price_to_book_or_default() < 5.0, 5)
}

fn risk_profile(s: &FundamentalSnapshot) -> u32 {
    award(s.beta_or_default() < 1.2, 5) + award(s.trailing_eps_or_default() > 0.0, 5)
}

fn quant_edge(sharpe: f64) -> u32 {
    award(sharpe > QUANT_SHARPE_THRESHOLD, QUANT_EDGE_AWARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_snapshot() -> FundamentalSnapshot {
        FundamentalSnapshot {
            long_business_summary: Some("Builds software.".to_string()),
            sector: Some("Technology".to_string()),
            held_percent_insiders: Some(0.15),
            return_on_equity: Some(0.20),
            debt_to_equity: Some(0.5),
            free_cashflow: Some(100.0),
            operating_cashflow: Some(200.0),
            net_income: Some(100.0),
            total_cash: Some(500.0),
            total_debt: Some(100.0),
            trailing_pe: Some(15.0),
            price_to_book: Some(2.0),
            beta: Some(0.9),
            trailing_eps: Some(5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let breakdown = ScoringEngine::new().evaluate(&FundamentalSnapshot::default(), 0.0);

        assert_eq!(breakdown.get(Category::BusinessQuality), 4);
        assert_eq!(breakdown.get(Category::ManagementQuality), 0);
        assert_eq!(breakdown.get(Category::FinancialStrength), 0);
        assert_eq!(breakdown.get(Category::ForensicAccounting), 0);
        assert_eq!(breakdown.get(Category::Valuation), 0);
        assert_eq!(breakdown.get(Category::RiskProfile), 0);
        assert_eq!(breakdown.get(Category::Conviction), 5);
        assert_eq!(breakdown.get(Category::QuantEdge), 0);
        assert_eq!(breakdown.total(), 9);
    }

    #[test]
    fn test_strong_snapshot() {
        let breakdown = ScoringEngine::new().evaluate(&strong_snapshot(), 1.5);

        let expected = [10, 10, 10, 10, 10, 10, 5, 4];
        for (category, points) in Category::ALL.iter().zip(expected) {
            assert_eq!(breakdown.get(*category), points, "{category}");
        }
        assert_eq!(breakdown.total(), 69);
    }

    #[test]
    fn test_excluded_sectors() {
        for sector in EXCLUDED_SECTORS {
            let snapshot = FundamentalSnapshot {
                sector: Some(sector.to_string()),
                ..Default::default()
            };
            let breakdown = ScoringEngine::new().evaluate(&snapshot, 0.0);
            assert_eq!(breakdown.get(Category::BusinessQuality), 0, "{sector}");
        }
    }

    #[test]
    fn test_return_on_equity_threshold_only_moves_management() {
        let engine = ScoringEngine::new();
        let mut snapshot = strong_snapshot();
        snapshot.return_on_equity = Some(0.10);
        let before = engine.evaluate(&snapshot, 1.5);

        snapshot.return_on_equity = Some(0.16);
        let after = engine.evaluate(&snapshot, 1.5);

        for category in Category::ALL {
            let delta = after.get(category) as i64 - before.get(category) as i64;
            let expected = if category == Category::ManagementQuality { 5 } else { 0 };
            assert_eq!(delta, expected, "{category}");
        }
    }

    #[test]
    fn test_boundaries_are_strict() {
        let snapshot = FundamentalSnapshot {
            held_percent_insiders: Some(0.10),
            return_on_equity: Some(0.15),
            debt_to_equity: Some(1.0),
            free_cashflow: Some(0.0),
            trailing_pe: Some(30.0),
            price_to_book: Some(5.0),
            beta: Some(1.2),
            trailing_eps: Some(0.0),
            total_cash: Some(100.0),
            total_debt: Some(100.0),
            operating_cashflow: Some(100.0),
            net_income: Some(100.0),
            ..Default::default()
        };
        let breakdown = ScoringEngine::new().evaluate(&snapshot, 1.0);

        assert_eq!(breakdown.get(Category::ManagementQuality), 0);
        assert_eq!(breakdown.get(Category::FinancialStrength), 0);
        assert_eq!(breakdown.get(Category::ForensicAccounting), 0);
        assert_eq!(breakdown.get(Category::Valuation), 0);
        assert_eq!(breakdown.get(Category::RiskProfile), 0);
        assert_eq!(breakdown.get(Category::QuantEdge), 0);
    }

    #[test]
    fn test_percent_scaled_debt_to_equity_fails_rule() {
        // Yahoo reports debt-to-equity in percent, so 45.0 means 0.45x.
        let snapshot = FundamentalSnapshot {
            debt_to_equity: Some(45.0),
            ..Default::default()
        };
        let breakdown = ScoringEngine::new().evaluate(&snapshot, 0.0);
        assert_eq!(breakdown.get(Category::FinancialStrength), 0);

        let ratio = FundamentalSnapshot {
            debt_to_equity: Some(0.45),
            ..Default::default()
        };
        let breakdown = ScoringEngine::new().evaluate(&ratio, 0.0);
        assert_eq!(breakdown.get(Category::FinancialStrength), 5);
    }

    #[test]
    fn test_forensic_uses_net_income_floor() {
        let snapshot = FundamentalSnapshot {
            operating_cashflow: Some(2.0),
            net_income: Some(-500.0),
            ..Default::default()
        };
        let breakdown = ScoringEngine::new().evaluate(&snapshot, 0.0);
        assert_eq!(breakdown.get(Category::ForensicAccounting), 6);
    }
}
