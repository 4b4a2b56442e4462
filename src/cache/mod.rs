//! Per-group persistent event cache.
//!
//! This module provides the `CacheStore`: one TTL-bounded entry per group,
//! persisted through the `Storage` trait so it survives restarts. Expired and
//! unreadable entries are treated as absent and evicted lazily on read.

pub mod store;

pub use store::{CacheEntry, CacheStore, DEFAULT_TTL_MS};
