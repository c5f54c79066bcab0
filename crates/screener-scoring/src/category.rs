//! Score categories and the per-category breakdown.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Maximum TD Score: eight categories capped at ten points each.
pub const MAX_SCORE: u32 = 80;

/// One of the eight rule categories, in evaluation and display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Business description and sector exclusion.
    BusinessQuality,
    /// Insider ownership and return on equity.
    ManagementQuality,
    /// Leverage and free cash flow.
    FinancialStrength,
    /// Cash conversion and net cash.
    ForensicAccounting,
    /// Earnings and book multiples.
    Valuation,
    /// Beta and earnings sign.
    RiskProfile,
    /// Manual-override placeholder.
    Conviction,
    /// Risk-adjusted return from price history.
    QuantEdge,
}

impl Category {
    /// All categories in evaluation order.
    pub const ALL: [Self; 8] = [
        Self::BusinessQuality,
        Self::ManagementQuality,
        Self::FinancialStrength,
        Self::ForensicAccounting,
        Self::Valuation,
        Self::RiskProfile,
        Self::Conviction,
        Self::QuantEdge,
    ];

    /// Display label, also used as the JSON key.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessQuality => "Business Quality & Moat",
            Self::ManagementQuality => "Management Quality",
            Self::FinancialStrength => "Financial Strength",
            Self::ForensicAccounting => "Forensic Accounting",
            Self::Valuation => "Valuation",
            Self::RiskProfile => "Risk Profile",
            Self::Conviction => "Conviction & Temperament",
            Self::QuantEdge => "Quant Edge",
        }
    }

    /// Declared point cap.
    #[must_use]
    pub const fn cap(self) -> u32 {
        10
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Points awarded per category.
///
/// Values are clamped to each category's cap on insertion, so the invariant
/// `0 <= points <= cap` holds for every category and the total never exceeds
/// [`MAX_SCORE`]. Serializes as an ordered JSON object keyed by label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScoreBreakdown {
    points: [u32; 8],
}

impl ScoreBreakdown {
    pub(crate) fn set(&mut self, category: Category, points: u32) {
        self.points[category.index()] = points.min(category.cap());
    }

    /// Points awarded to `category`.
    #[must_use]
    pub const fn get(&self, category: Category) -> u32 {
        self.points[category.index()]
    }

    /// Sum over all categories.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.points.iter().sum()
    }

    /// Iterates `(category, points)` in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL.iter().map(|&c| (c, self.get(c)))
    }
}

impl Serialize for ScoreBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (category, points) in self.iter() {
            map.serialize_entry(category.label(), &points)?;
        }
        map.end()
    }
}
