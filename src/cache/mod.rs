//! Asynchronous cache of linked records.
//!
//! Widgets that reference other records by id read them through
//! [`RecordCache`]. Rendering uses `get`, which schedules a fetch on a miss;
//! validation only gets a [`RecordLookup`], which cannot fetch.

mod error;
mod key;
mod lookup;
mod store;

pub use error::CacheError;
pub use key::{CacheKey, CachedRecord};
pub use lookup::{EntryState, RecordLookup};
pub use store::{CacheEvent, CacheStats, RecordCache, Subscription};
