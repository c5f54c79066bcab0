#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! TD investment screener.
//!
//! This crate re-exports the core types, the scoring pipeline and the data
//! collaborators, and provides a [`Screener`] that wires them together with
//! provider fallback, caching and throttled batch screening.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance provider for fundamentals and price history
//! - `cache-sqlite` - SQLite-based caching
//!
//! # Example
//!
//! ```rust,ignore
//! use screener::{Screener, ScreenerConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> screener::Result<()> {
//!     let screener = Screener::new(ScreenerConfig::default())
//!         .with_yahoo()?
//!         .with_nse_universes()?;
//!
//!     let symbols = screener.universe("nse-core").await?;
//!     let outcome = screener.screen(&symbols, 90.0, CancellationToken::new()).await;
//!     for report in &outcome.reports {
//!         println!("{:?} {}", report.ticker(), report.score_percentage());
//!     }
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use screener_core::*;

// Scoring core
pub use screener_scoring::{
    Category, MAX_SCORE, Report, ScoreBreakdown, ScoringEngine, annualized_sharpe, score,
};

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use screener_cache::SqliteCache;
pub use screener_cache::{InMemoryCache, NoopCache};

// Universes
pub use screener_universe::{ExchangeListUniverse, NSE_ALL, NSE_CORE, StaticUniverse};

// Providers
#[cfg(feature = "yahoo")]
pub use screener_yahoo::{YahooConfig, YahooProvider};

mod config;
mod screener;
pub use config::{DEFAULT_CACHE_TTL, ScreenerConfig};
pub use screener::{ScreenFailure, ScreenOutcome, Screener};
