use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{ClientError, RecordClient};

type Key = (String, String);

#[derive(Default)]
struct MemoryState {
    records: HashMap<Key, Value>,
    fetches: HashMap<Key, usize>,
    latency: Duration,
    failing: bool,
}

/// In-process record store.
///
/// Counts fetches per key and can simulate latency and outages. A fetch
/// answers with the record as it was when the request was made.
#[derive(Default)]
pub struct MemoryClient {
    state: Mutex<MemoryState>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store from `(entity, id, record)` triples.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = (String, String, Value)>,
    {
        let client = Self::new();
        for (entity, id, record) in records {
            client.insert(entity, id, record);
        }
        client
    }

    pub fn insert(&self, entity: impl Into<String>, id: impl Into<String>, record: Value) {
        self.state
            .lock()
            .records
            .insert((entity.into(), id.into()), record);
    }

    pub fn remove(&self, entity: &str, id: &str) -> Option<Value> {
        self.state
            .lock()
            .records
            .remove(&(entity.to_string(), id.to_string()))
    }

    pub fn record(&self, entity: &str, id: &str) -> Option<Value> {
        self.state
            .lock()
            .records
            .get(&(entity.to_string(), id.to_string()))
            .cloned()
    }

    /// Number of `fetch_by_id` calls made for the key so far.
    pub fn fetch_count(&self, entity: &str, id: &str) -> usize {
        self.state
            .lock()
            .fetches
            .get(&(entity.to_string(), id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Delay applied to every request.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = latency;
    }

    /// When set, every request fails with [`ClientError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    fn begin(&self) -> (Duration, bool) {
        let state = self.state.lock();
        (state.latency, state.failing)
    }
}

#[async_trait]
impl RecordClient for MemoryClient {
    async fn fetch_by_id(&self, entity: &str, id: &str) -> Result<Option<Value>, ClientError> {
        let key = (entity.to_string(), id.to_string());
        let record = {
            let mut state = self.state.lock();
            *state.fetches.entry(key.clone()).or_default() += 1;
            state.records.get(&key).cloned()
        };

        let (latency, failing) = self.begin();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(ClientError::Unavailable("memory store is failing".into()));
        }
        Ok(record)
    }

    async fn store_record(&self, entity: &str, id: &str, record: Value) -> Result<(), ClientError> {
        let (latency, failing) = self.begin();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(ClientError::Unavailable("memory store is failing".into()));
        }
        self.insert(entity, id, record);
        Ok(())
    }
}
