//! Operating cash flow to net income check.

use screener_core::FundamentalSnapshot;
use serde::Serialize;

/// Floor applied to net income before dividing.
pub const NET_INCOME_FLOOR: f64 = 1.0;

/// Cash-conversion ratio and the red flag derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ForensicAssessment {
    /// `operating_cashflow / max(net_income, 1)`.
    pub ratio: f64,
    /// True iff `ratio < 1`.
    pub red_flag: bool,
}

/// Computes the OCF / net income ratio and the forensic red flag.
///
/// Net income is floored at [`NET_INCOME_FLOOR`], so a loss-making company is
/// measured against a denominator of 1 and its ratio is simply its operating
/// cash flow. This is a known approximation kept for score compatibility.
#[must_use]
pub fn forensic_ratio_and_flag(snapshot: &FundamentalSnapshot) -> ForensicAssessment {
    let ratio = snapshot.operating_cashflow_or_default()
        / snapshot.net_income_or_default().max(NET_INCOME_FLOOR);
    ForensicAssessment {
        ratio,
        red_flag: ratio < 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ocf: Option<f64>, net_income: Option<f64>) -> FundamentalSnapshot {
        FundamentalSnapshot {
            operating_cashflow: ocf,
            net_income,
            ..Default::default()
        }
    }

    #[test]
    fn test_absent_fields_do_not_flag() {
        let f = forensic_ratio_and_flag(&FundamentalSnapshot::default());
        assert_eq!(f.ratio, 1.0);
        assert!(!f.red_flag);
    }

    #[test]
    fn test_cash_below_earnings_flags() {
        let f = forensic_ratio_and_flag(&snapshot(Some(80.0), Some(100.0)));
        assert_eq!(f.ratio, 0.8);
        assert!(f.red_flag);
    }

    #[test]
    fn test_cash_above_earnings_is_clean() {
        let f = forensic_ratio_and_flag(&snapshot(Some(200.0), Some(100.0)));
        assert_eq!(f.ratio, 2.0);
        assert!(!f.red_flag);
    }

    #[test]
    fn test_net_income_floor() {
        let f = forensic_ratio_and_flag(&snapshot(Some(0.5), Some(0.0)));
        assert_eq!(f.ratio, 0.5);
        assert!(f.red_flag);

        let f = forensic_ratio_and_flag(&snapshot(Some(-40.0), Some(-10.0)));
        assert_eq!(f.ratio, -40.0);
        assert!(f.red_flag);
    }

    #[test]
    fn test_flag_matches_ratio() {
        for (ocf, ni) in [(1.0, 1.0), (0.99, 1.0), (5.0, 4.0), (3.0, 0.2), (-1.0, 7.0)] {
            let f = forensic_ratio_and_flag(&snapshot(Some(ocf), Some(ni)));
            assert_eq!(f.red_flag, ocf / ni.max(1.0) < 1.0);
        }
    }
}
