#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Stores for fetched fundamentals snapshots and close series.
//!
//! Entries are keyed by provider name and ticker; price series also carry
//! the lookback window they were fetched for, so a five-year series never
//! answers a ten-year request. Staleness is decided by the caller through
//! [`DataCache::invalidate_stale`].
//!
//! | Store | Lifetime |
//! |---|---|
//! | [`SqliteCache`] | On disk, survives restarts (`sqlite` feature, on by default) |
//! | [`InMemoryCache`] | Process lifetime |
//! | [`NoopCache`] | Never stores |

/// Process-local store.
pub mod memory;
/// Store that keeps nothing.
pub mod noop;

/// SQLite-backed store.
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryCache;
pub use noop::NoopCache;
pub use screener_core::DataCache;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;
