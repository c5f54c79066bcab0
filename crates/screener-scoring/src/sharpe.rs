//! Annualized Sharpe ratio from daily closes.
//!
//! The ratio is `mean(r) / sd(r) * sqrt(252)` over simple daily returns, with
//! no risk-free rate and the sample standard deviation (n - 1). Series that
//! cannot produce a finite ratio are reported as [`DegenerateSeries`] by
//! [`try_annualized_sharpe`] and saturate to `0.0` in [`annualized_sharpe`].

use screener_core::PriceSeries;
use thiserror::Error;
use tracing::debug;

/// Trading days per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Why a price series has no meaningful Sharpe ratio.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateSeries {
    /// Fewer than three closes, so fewer than two returns.
    #[error("need at least 3 closes for a sample deviation, got {0}")]
    TooShort(usize),
    /// Every daily return is identical.
    #[error("daily returns have zero variance")]
    ZeroVariance,
    /// A zero close produced an infinite or undefined return.
    #[error("daily returns are not finite")]
    NonFinite,
}

/// Simple daily returns `p[t] / p[t-1] - 1`, first undefined return dropped.
#[must_use]
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Annualized Sharpe ratio, or the reason there is none.
///
/// # Errors
/// Returns [`DegenerateSeries`] when the series is too short, has constant
/// returns, or yields a non-finite result.
pub fn try_annualized_sharpe(series: &PriceSeries) -> Result<f64, DegenerateSeries> {
    let returns = daily_returns(series.closes());
    if returns.len() < 2 {
        return Err(DegenerateSeries::TooShort(series.len()));
    }
    if returns.iter().any(|r| !r.is_finite()) {
        return Err(DegenerateSeries::NonFinite);
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return Err(DegenerateSeries::ZeroVariance);
    }

    let sharpe = mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt();
    if sharpe.is_finite() {
        Ok(sharpe)
    } else {
        Err(DegenerateSeries::NonFinite)
    }
}

/// Annualized Sharpe ratio, saturating degenerate series to `0.0`.
#[must_use]
pub fn annualized_sharpe(series: &PriceSeries) -> f64 {
    try_annualized_sharpe(series).unwrap_or_else(|reason| {
        debug!(closes = series.len(), %reason, "Sharpe ratio saturated to zero");
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new(closes.to_vec()).unwrap()
    }

    #[test]
    fn test_short_series_saturate() {
        assert_eq!(annualized_sharpe(&PriceSeries::empty()), 0.0);
        assert_eq!(annualized_sharpe(&series(&[100.0])), 0.0);
        assert_eq!(annualized_sharpe(&series(&[100.0, 105.0])), 0.0);
        assert_eq!(
            try_annualized_sharpe(&series(&[100.0, 105.0])),
            Err(DegenerateSeries::TooShort(2))
        );
    }

    #[test]
    fn test_constant_series_saturates() {
        let flat = series(&[50.0; 30]);
        assert_eq!(try_annualized_sharpe(&flat), Err(DegenerateSeries::ZeroVariance));
        assert_eq!(annualized_sharpe(&flat), 0.0);
    }

    #[test]
    fn test_zero_close_is_non_finite() {
        let broken = series(&[0.0, 10.0, 11.0]);
        assert_eq!(try_annualized_sharpe(&broken), Err(DegenerateSeries::NonFinite));
        assert_eq!(annualized_sharpe(&broken), 0.0);
    }

    #[test]
    fn test_computed_zero_is_not_degenerate() {
        let closes = series(&[100.0, 110.0, 99.0]);
        let returns = daily_returns(closes.closes());
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 0.1).abs() < 1e-12);
        let sharpe = try_annualized_sharpe(&closes).unwrap();
        assert!(sharpe.abs() < 1e-9);
    }

    #[test]
    fn test_known_value() {
        let closes = series(&[100.0, 101.0, 103.02]);
        let expected = 0.015 / (0.005 * 2f64.sqrt()) * 252f64.sqrt();
        let sharpe = annualized_sharpe(&closes);
        assert!((sharpe - expected).abs() < 1e-6, "{sharpe} vs {expected}");
    }

    #[test]
    fn test_steady_uptrend_is_strong() {
        let mut closes = vec![100.0];
        for i in 0..252 {
            let last = closes[closes.len() - 1];
            closes.push(if i % 2 == 0 { last * 1.01 } else { last });
        }
        assert!(annualized_sharpe(&series(&closes)) > 1.0);
    }

    #[test]
    fn test_downtrend_is_negative() {
        let mut closes = vec![100.0];
        for i in 0..100 {
            let last = closes[closes.len() - 1];
            closes.push(if i % 2 == 0 { last * 0.99 } else { last * 1.001 });
        }
        assert!(annualized_sharpe(&series(&closes)) < 0.0);
    }
}
