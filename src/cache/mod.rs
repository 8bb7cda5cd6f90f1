//! In-memory document cache
//!
//! One store is shared by the read path and the save path. Both treat
//! `set` as an atomic replace.

mod store;

pub use store::{CacheEntry, CacheStats, DocumentCache, DEFAULT_CAPACITY};
