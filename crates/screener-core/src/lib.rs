#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the TD investment screener.
//!
//! This crate provides the foundational abstractions shared by the scoring core
//! and its data collaborators:
//!
//! - [`FundamentalSnapshot`](types::FundamentalSnapshot) - Typed fundamentals with per-field defaults
//! - [`PriceSeries`](types::PriceSeries) - Chronological daily closes
//! - [`FundamentalsProvider`](provider::FundamentalsProvider) - Snapshot source
//! - [`PriceHistoryProvider`](provider::PriceHistoryProvider) - Daily price history source
//! - [`UniverseProvider`](provider::UniverseProvider) - Ticker universe source
//! - [`DataCache`](cache::DataCache) - Caching abstraction
//! - [`RetryPolicy`](retry::RetryPolicy) - Bounded retry with exponential backoff

/// Cache trait for storing fetched snapshots and price series.
pub mod cache;
/// Error types for screener operations.
pub mod error;
/// Provider traits for fetching fundamentals, prices and universes.
pub mod provider;
/// Retry policy for upstream requests.
pub mod retry;
/// Core data types (Symbol, FundamentalSnapshot, PriceSeries).
pub mod types;
/// Price-history lookback window.
pub mod window;

// Re-export commonly used items at crate root
pub use cache::DataCache;
pub use error::{Result, ScreenerError};
pub use provider::{DataProvider, FundamentalsProvider, PriceHistoryProvider, UniverseProvider};
pub use retry::RetryPolicy;
pub use types::{FundamentalSnapshot, PriceSeries, Symbol};
pub use window::LookbackWindow;
