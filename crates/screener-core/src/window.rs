//! Price-history lookback window.
//!
//! The annualized Sharpe ratio, and with it the Quant Edge category, depends on
//! how much daily history is fetched. [`LookbackWindow`] makes that choice
//! explicit instead of leaving it to each caller.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ScreenerError};

/// Number of calendar years of daily closes to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookbackWindow {
    years: u32,
}

impl LookbackWindow {
    /// Ten years of history, the screener default.
    pub const TEN_YEARS: Self = Self { years: 10 };
    /// Five years of history.
    pub const FIVE_YEARS: Self = Self { years: 5 };

    /// Creates a window of the given number of years.
    ///
    /// # Errors
    /// Returns [`ScreenerError::InvalidParameter`] if `years` is zero or above 50.
    pub fn years(years: u32) -> Result<Self> {
        if years == 0 || years > 50 {
            return Err(ScreenerError::InvalidParameter(format!(
                "lookback must be between 1 and 50 years, got {years}"
            )));
        }
        Ok(Self { years })
    }

    /// Returns the window length in years.
    #[must_use]
    pub const fn as_years(&self) -> u32 {
        self.years
    }

    /// Returns the inclusive `(start, end)` date range ending at `end`.
    #[must_use]
    pub fn date_range(&self, end: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = end
            .checked_sub_months(Months::new(self.years * 12))
            .unwrap_or(NaiveDate::MIN);
        (start, end)
    }
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self::TEN_YEARS
    }
}

impl fmt::Display for LookbackWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Y", self.years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ten_years() {
        assert_eq!(LookbackWindow::default(), LookbackWindow::TEN_YEARS);
        assert_eq!(LookbackWindow::default().to_string(), "10Y");
    }

    #[test]
    fn test_date_range() {
        let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let (start, to) = LookbackWindow::FIVE_YEARS.date_range(end);
        assert_eq!(to, end);
        assert_eq!(start, NaiveDate::from_ymd_opt(2019, 2, 28).unwrap());
    }

    #[test]
    fn test_years_validation() {
        assert!(LookbackWindow::years(0).is_err());
        assert!(LookbackWindow::years(51).is_err());
        assert_eq!(LookbackWindow::years(3).unwrap().as_years(), 3);
    }
}
