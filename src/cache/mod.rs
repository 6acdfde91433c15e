//! On-disk snapshots of API responses
//!
//! The listing keeps its last successful place collection here so a later
//! failed load can still show real data instead of the built-in fallback set.
//! Expired entries are still returned, flagged with `is_expired`.

mod manager;

pub use manager::{CacheManager, CachedData, PLACES_SNAPSHOT_KEY};
