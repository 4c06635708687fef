use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};

use super::error::CacheError;
use super::key::{CacheKey, CachedRecord};
use super::lookup::{decode, EntryState, RecordLookup};
use crate::client::RecordClient;
use crate::config::CacheConfig;

type Listener = Arc<dyn Fn(&CacheKey, &EntryState) + Send + Sync>;

enum Entry {
    InFlight {
        generation: u64,
        waiters: Vec<oneshot::Sender<EntryState>>,
        /// Invalidated while in flight. The result goes to the waiters
        /// only and the key is fetched once more.
        stale: bool,
    },
    Settled(EntryState),
}

/// What a finished fetch does to its entry.
enum Completion {
    Settled(Vec<Listener>),
    /// The entry was invalidated while loading; a new fetch replaces it.
    Refetch(u64),
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, Entry>,
    listeners: HashMap<CacheKey, Vec<(u64, Listener)>>,
    next_listener: u64,
    next_generation: u64,
    fetches_started: u64,
}

impl CacheInner {
    fn state_of(&self, key: &CacheKey) -> EntryState {
        match self.entries.get(key) {
            None => EntryState::Absent,
            Some(Entry::InFlight { .. }) => EntryState::Loading,
            Some(Entry::Settled(state)) => state.clone(),
        }
    }

    /// Marks `key` in flight under a new generation.
    fn begin_fetch(&mut self, key: &CacheKey) -> u64 {
        self.next_generation += 1;
        self.fetches_started += 1;
        let generation = self.next_generation;
        self.entries.insert(
            key.clone(),
            Entry::InFlight {
                generation,
                waiters: Vec::new(),
                stale: false,
            },
        );
        generation
    }

    fn listeners_for(&self, key: &CacheKey) -> Vec<Listener> {
        self.listeners
            .get(key)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }
}

/// A change to one cache entry, as seen by [`RecordCache::subscribe_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub key: CacheKey,
    pub state: EntryState,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub settled: usize,
    pub in_flight: usize,
    pub fetches_started: u64,
}

/// Shared memoizing cache of linked records.
///
/// Cloning is cheap and every clone sees the same entries. At most one
/// fetch per key is in flight at a time. A fetch that completes after its
/// entry was invalidated is handed to its waiters but not stored, and the
/// key is fetched once more.
#[derive(Clone)]
pub struct RecordCache {
    inner: Arc<Mutex<CacheInner>>,
    client: Arc<dyn RecordClient>,
    runtime: Handle,
    fetch_timeout: Duration,
    events: broadcast::Sender<CacheEvent>,
}

impl RecordCache {
    /// Creates a cache that fetches on the current Tokio runtime.
    pub fn new(client: Arc<dyn RecordClient>, config: &CacheConfig) -> Result<Self, CacheError> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        Ok(Self::with_runtime(client, config, runtime))
    }

    pub fn with_runtime(client: Arc<dyn RecordClient>, config: &CacheConfig, runtime: Handle) -> Self {
        let (events, _) = broadcast::channel(config.subscriber_buffer.max(1));
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            client,
            runtime,
            fetch_timeout: Duration::from_millis(config.fetch_timeout_ms),
            events,
        }
    }

    /// Returns the cached value, scheduling a fetch if there is none.
    ///
    /// Returns `None` while loading and for records that are missing or
    /// failed to load. Never blocks on the fetch.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        let (generation, listeners) = {
            let mut inner = self.inner.lock();
            match inner.entries.get(key) {
                Some(Entry::Settled(state)) => return state.value().cloned(),
                Some(Entry::InFlight { .. }) => return None,
                None => {}
            }
            let generation = inner.begin_fetch(key);
            (generation, inner.listeners_for(key))
        };

        self.publish(key, &EntryState::Loading, listeners);
        self.spawn_fetch(key.clone(), generation);
        None
    }

    /// Decodes the `T` with `id`, scheduling a fetch if it is not cached.
    pub fn get_record<T: CachedRecord>(&self, id: &str) -> Option<T> {
        let key = CacheKey::of::<T>(id);
        self.get(&key).and_then(|value| decode(&key, &value))
    }

    /// Like [`get_record`](Self::get_record) but never fetches.
    pub fn peek_record<T: CachedRecord>(&self, id: &str) -> Option<T> {
        (self as &dyn RecordLookup).peek_record(id)
    }

    /// Waits until `key` has settled, fetching it if necessary.
    pub async fn resolve(&self, key: &CacheKey) -> EntryState {
        let (receiver, generation) = {
            let mut inner = self.inner.lock();
            let pending = match inner.entries.get(key) {
                Some(Entry::Settled(state)) => return state.clone(),
                Some(Entry::InFlight { .. }) => true,
                None => false,
            };
            let generation = if pending {
                None
            } else {
                Some(inner.begin_fetch(key))
            };
            let (sender, receiver) = oneshot::channel();
            if let Some(Entry::InFlight { waiters, .. }) = inner.entries.get_mut(key) {
                waiters.push(sender);
            }
            (receiver, generation)
        };

        if let Some(generation) = generation {
            let listeners = self.inner.lock().listeners_for(key);
            self.publish(key, &EntryState::Loading, listeners);
            self.spawn_fetch(key.clone(), generation);
        }

        receiver.await.unwrap_or(EntryState::Absent)
    }

    /// Resolves and decodes the `T` with `id`.
    pub async fn resolve_record<T: CachedRecord>(&self, id: &str) -> Option<T> {
        let key = CacheKey::of::<T>(id);
        let state = self.resolve(&key).await;
        state.value().and_then(|value| decode(&key, value))
    }

    /// Drops the entry for `key`. The next `get` fetches again.
    ///
    /// An entry still loading stays loading: its fetch is repeated once it
    /// completes, so there is never more than one fetch per key.
    pub fn invalidate(&self, key: &CacheKey) {
        let listeners = {
            let mut inner = self.inner.lock();
            match inner.entries.get_mut(key) {
                Some(Entry::InFlight { stale, .. }) => {
                    *stale = true;
                    tracing::debug!(%key, "Invalidated entry while loading");
                    return;
                }
                Some(Entry::Settled(_)) => {}
                None => return,
            }
            inner.entries.remove(key);
            inner.listeners_for(key)
        };

        tracing::debug!(%key, "Invalidated cache entry");
        self.publish(key, &EntryState::Absent, listeners);
    }

    /// Invalidates every entry of `entity`.
    pub fn invalidate_entity(&self, entity: &str) {
        let keys: Vec<CacheKey> = self
            .inner
            .lock()
            .entries
            .keys()
            .filter(|key| key.entity == entity)
            .cloned()
            .collect();
        for key in keys {
            self.invalidate(&key);
        }
    }

    /// Calls `listener` on every state change of `key` until the returned
    /// guard is dropped. Listeners run on the thread that caused the change.
    pub fn subscribe(
        &self,
        key: CacheKey,
        listener: impl Fn(&CacheKey, &EntryState) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.inner.lock();
        inner.next_listener += 1;
        let id = inner.next_listener;
        inner
            .listeners
            .entry(key.clone())
            .or_default()
            .push((id, Arc::new(listener)));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            key,
            id,
        }
    }

    /// Stream of every entry change. Lagging receivers lose old events.
    pub fn subscribe_all(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let in_flight = inner
            .entries
            .values()
            .filter(|entry| matches!(entry, Entry::InFlight { .. }))
            .count();
        CacheStats {
            settled: inner.entries.len() - in_flight,
            in_flight,
            fetches_started: inner.fetches_started,
        }
    }

    fn spawn_fetch(&self, key: CacheKey, generation: u64) {
        tracing::debug!(%key, generation, "Fetching record");
        let cache = self.clone();
        self.runtime.spawn(async move {
            let outcome = cache.fetch(&key).await;
            cache.complete(&key, generation, outcome);
        });
    }

    async fn fetch(&self, key: &CacheKey) -> EntryState {
        let request = self.client.fetch_by_id(&key.entity, &key.id);
        match tokio::time::timeout(self.fetch_timeout, request).await {
            Ok(Ok(Some(value))) => EntryState::Present(Arc::new(value)),
            Ok(Ok(None)) => EntryState::NotFound,
            Ok(Err(error)) => {
                tracing::warn!(%key, error = %error, "Record fetch failed");
                EntryState::Failed
            }
            Err(_) => {
                tracing::warn!(
                    %key,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "Record fetch timed out"
                );
                EntryState::Failed
            }
        }
    }

    fn complete(&self, key: &CacheKey, generation: u64, outcome: EntryState) {
        let (waiters, next) = {
            let mut inner = self.inner.lock();
            match inner.entries.remove(key) {
                Some(Entry::InFlight {
                    generation: current,
                    waiters,
                    stale,
                }) if current == generation => {
                    if stale {
                        (waiters, Completion::Refetch(inner.begin_fetch(key)))
                    } else {
                        inner
                            .entries
                            .insert(key.clone(), Entry::Settled(outcome.clone()));
                        (waiters, Completion::Settled(inner.listeners_for(key)))
                    }
                }
                Some(other) => {
                    inner.entries.insert(key.clone(), other);
                    tracing::debug!(%key, generation, "Discarding result of an unknown fetch");
                    return;
                }
                None => return,
            }
        };

        match next {
            Completion::Settled(listeners) => self.publish(key, &outcome, listeners),
            Completion::Refetch(refetch) => {
                tracing::debug!(%key, generation, "Refetching entry invalidated while loading");
                self.spawn_fetch(key.clone(), refetch);
            }
        }
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Notifies listeners. Must be called without holding the lock.
    fn publish(&self, key: &CacheKey, state: &EntryState, listeners: Vec<Listener>) {
        for listener in listeners {
            listener(key, state);
        }
        let _ = self.events.send(CacheEvent {
            key: key.clone(),
            state: state.clone(),
        });
    }
}

impl RecordLookup for RecordCache {
    fn peek(&self, key: &CacheKey) -> EntryState {
        self.inner.lock().state_of(key)
    }
}

/// Keeps a [`RecordCache::subscribe`] listener registered while alive.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    inner: Weak<Mutex<CacheInner>>,
    key: CacheKey,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.lock();
        let emptied = match inner.listeners.get_mut(&self.key) {
            Some(list) => {
                list.retain(|(id, _)| *id != self.id);
                list.is_empty()
            }
            None => false,
        };
        if emptied {
            inner.listeners.remove(&self.key);
        }
    }
}
