use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use serde_json::Value;

use super::key::{CacheKey, CachedRecord};

/// Observable state of one cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    /// Never requested, or invalidated since.
    Absent,
    /// A fetch is in flight.
    Loading,
    Present(Arc<Value>),
    /// The store answered that no such record exists.
    NotFound,
    /// The fetch failed. Stays a miss until invalidated.
    Failed,
}

impl EntryState {
    pub fn value(&self) -> Option<&Arc<Value>> {
        match self {
            EntryState::Present(value) => Some(value),
            _ => None,
        }
    }

    /// True once a fetch has finished, whatever its outcome.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            EntryState::Present(_) | EntryState::NotFound | EntryState::Failed
        )
    }
}

/// Read-only view of cached records, the only cache access validators get.
///
/// `peek` never schedules a fetch.
pub trait RecordLookup {
    fn peek(&self, key: &CacheKey) -> EntryState;
}

impl dyn RecordLookup + '_ {
    /// Decodes the cached `T` with `id`, if present.
    pub fn peek_record<T: CachedRecord>(&self, id: &str) -> Option<T> {
        let key = CacheKey::of::<T>(id);
        self.peek(&key).value().and_then(|value| decode(&key, value))
    }
}

/// Fixed lookups, handy for validating against a known set of records.
impl<S: BuildHasher> RecordLookup for HashMap<CacheKey, EntryState, S> {
    fn peek(&self, key: &CacheKey) -> EntryState {
        self.get(key).cloned().unwrap_or(EntryState::Absent)
    }
}

pub(crate) fn decode<T: CachedRecord>(key: &CacheKey, value: &Value) -> Option<T> {
    match T::deserialize(value) {
        Ok(record) => Some(record),
        Err(error) => {
            tracing::debug!(%key, error = %error, "Cached record does not decode");
            None
        }
    }
}
