#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Deterministic TD scoring.
//!
//! The pipeline is a single stateless pass:
//!
//! 1. [`annualized_sharpe`] derives the risk-adjusted return from the closes
//! 2. [`ScoringEngine::evaluate`] scores the eight categories from the snapshot
//! 3. [`forensic_ratio_and_flag`] derives the cash-conversion red flag
//! 4. [`assemble`] merges everything into a [`Report`]
//!
//! # Example
//!
//! ```
//! use screener_core::{FundamentalSnapshot, PriceSeries};
//!
//! let report = screener_scoring::score(&FundamentalSnapshot::default(), &PriceSeries::empty());
//! assert_eq!(report.total_score(), 9);
//! assert_eq!(report.score_percentage(), 11.25);
//! ```

/// Score categories and breakdown.
pub mod category;
/// Category rule evaluation.
pub mod engine;
/// Cash-conversion red flag.
pub mod forensic;
/// Report assembly.
pub mod report;
/// Annualized Sharpe ratio.
pub mod sharpe;

pub use category::{Category, MAX_SCORE, ScoreBreakdown};
pub use engine::ScoringEngine;
pub use forensic::{ForensicAssessment, forensic_ratio_and_flag};
pub use report::{Report, assemble};
pub use sharpe::{DegenerateSeries, annualized_sharpe, try_annualized_sharpe};

use screener_core::{FundamentalSnapshot, PriceSeries};

/// Scores one snapshot against its price history.
///
/// Pure and idempotent: identical inputs always produce equal reports.
#[must_use]
pub fn score(snapshot: &FundamentalSnapshot, series: &PriceSeries) -> Report {
    let sharpe = annualized_sharpe(series);
    let breakdown = ScoringEngine::new().evaluate(snapshot, sharpe);
    let forensic = forensic_ratio_and_flag(snapshot);
    assemble(snapshot, breakdown, sharpe, forensic)
}
