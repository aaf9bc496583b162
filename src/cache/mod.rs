//! Offline asset cache with versioned generations.
//!
//! This module keeps server assets available without network access:
//! - Named cache generations, exactly one current at a time
//! - Install/activate lifecycle with total eviction of stale generations
//! - Network-first fetches for catalog data, cache-first for everything else

pub mod manager;
pub mod storage;

pub use manager::{generation_name, FetchSource, Fetched, OfflineCache};
pub use storage::{AssetStore, CachedAsset, RequestKey, SqliteAssetStore};
