#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Ticker universe providers.
//!
//! This crate provides implementations of the [`UniverseProvider`] trait from
//! `screener-core`:
//!
//! - [`StaticUniverse`] - Built-in NSE core list, no network access
//! - [`ExchangeListUniverse`] - Full NSE equity list downloaded from the exchange

/// Exchange equity-list download.
pub mod exchange;
/// Built-in ticker lists.
pub mod static_list;

// Re-export the trait for convenience
pub use screener_core::UniverseProvider;

pub use exchange::{ExchangeListUniverse, NSE_ALL, NSE_EQUITY_LIST_URL};
pub use static_list::{NSE_CORE, NSE_CORE_TICKERS, StaticUniverse};
