mod common;

use clay_widgets::cache::{CacheKey, EntryState, RecordCache, RecordLookup};
use clay_widgets::client::{MemoryClient, RecordClient};
use clay_widgets::config::CacheConfig;
use clay_widgets::estimate::Rate;
use common::{memory_cache, rate_json, seeded_client};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn paint() -> CacheKey {
    CacheKey::new("rate", "paint")
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let client = seeded_client();
    client.set_latency(Duration::from_millis(20));
    let cache = memory_cache(&client);

    assert!(cache.get(&paint()).is_none());
    assert!(cache.get(&paint()).is_none());

    let (key_a, key_b) = (paint(), paint());
    let (first, second) = tokio::join!(cache.resolve(&key_a), cache.resolve(&key_b));

    assert_eq!(client.fetch_count("rate", "paint"), 1);
    assert_eq!(first, second);
    let value = cache.get(&paint()).unwrap();
    assert_eq!(value["hours_ratio"], json!(0.25));
    assert_eq!(first.value(), Some(&value));
}

#[tokio::test]
async fn test_typed_access_decodes_records() {
    let client = seeded_client();
    let cache = memory_cache(&client);

    assert!(cache.peek_record::<Rate>("tile").is_none());
    let rate = cache.resolve_record::<Rate>("tile").await.unwrap();
    assert_eq!(rate.hours_ratio, 1.5);
    assert_eq!(cache.get_record::<Rate>("tile"), Some(rate.clone()));
    assert_eq!(cache.peek_record::<Rate>("tile"), Some(rate));
}

#[tokio::test]
async fn test_invalidate_triggers_refetch() {
    let client = seeded_client();
    let cache = memory_cache(&client);

    cache.resolve(&paint()).await;
    client.insert("rate", "paint", rate_json("paint", 0.75, 0.4, 0.5));
    assert_eq!(
        cache.get(&paint()).unwrap()["hours_ratio"],
        json!(0.25),
        "cached value is served until invalidated"
    );

    cache.invalidate(&paint());
    assert_eq!(cache.peek(&paint()), EntryState::Absent);

    let state = cache.resolve(&paint()).await;
    assert_eq!(state.value().unwrap()["hours_ratio"], json!(0.75));
    assert_eq!(client.fetch_count("rate", "paint"), 2);
}

#[tokio::test]
async fn test_failure_is_a_persistent_miss() {
    let client = seeded_client();
    client.set_failing(true);
    let cache = memory_cache(&client);

    assert_eq!(cache.resolve(&paint()).await, EntryState::Failed);
    assert!(cache.get(&paint()).is_none());
    assert_eq!(cache.resolve(&paint()).await, EntryState::Failed);
    assert_eq!(client.fetch_count("rate", "paint"), 1);

    client.set_failing(false);
    cache.invalidate(&paint());
    assert!(cache.resolve(&paint()).await.value().is_some());
    assert_eq!(client.fetch_count("rate", "paint"), 2);
}

#[tokio::test]
async fn test_slow_fetch_times_out() {
    let client = seeded_client();
    client.set_latency(Duration::from_millis(200));
    let config = CacheConfig {
        fetch_timeout_ms: 20,
        subscriber_buffer: 4,
    };
    let cache = RecordCache::new(Arc::clone(&client) as Arc<dyn RecordClient>, &config).unwrap();

    assert_eq!(cache.resolve(&paint()).await, EntryState::Failed);
}

#[tokio::test]
async fn test_invalidate_during_fetch_repeats_the_fetch() {
    let client = seeded_client();
    client.set_latency(Duration::from_millis(50));
    let cache = memory_cache(&client);

    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.resolve(&paint()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.invalidate(&paint());

    let seen = waiter.await.unwrap();
    assert!(seen.value().is_some(), "waiters still get the result");
    assert_eq!(cache.peek(&paint()), EntryState::Loading);
    assert_eq!(cache.stats().settled, 0);

    assert!(cache.resolve(&paint()).await.value().is_some());
    assert_eq!(client.fetch_count("rate", "paint"), 2);
}

#[tokio::test]
async fn test_invalidated_fetch_is_never_overlapped() {
    let client = seeded_client();
    client.set_latency(Duration::from_millis(40));
    let cache = memory_cache(&client);

    assert!(cache.get(&paint()).is_none());
    tokio::time::sleep(Duration::from_millis(10)).await;
    cache.invalidate(&paint());
    client.insert("rate", "paint", rate_json("paint", 0.9, 0.4, 0.5));

    assert!(cache.get(&paint()).is_none());
    assert_eq!(cache.stats().in_flight, 1);
    assert_eq!(client.fetch_count("rate", "paint"), 1, "no second fetch while one runs");

    let joined = cache.resolve(&paint()).await;
    assert_eq!(
        joined.value().unwrap()["hours_ratio"],
        json!(0.25),
        "a caller joining the running fetch gets its result"
    );

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(cache.get(&paint()).unwrap()["hours_ratio"], json!(0.9));
    assert_eq!(client.fetch_count("rate", "paint"), 2);
}

#[tokio::test]
async fn test_peek_agrees_with_published_state() {
    let client = seeded_client();
    client.set_latency(Duration::from_millis(20));
    let cache = memory_cache(&client);
    let events = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&events);
    let observer = cache.clone();
    let _subscription = cache.subscribe(paint(), move |key, state| {
        sink.lock().push((state.clone(), observer.peek(key)));
    });

    assert!(cache.get(&paint()).is_none());
    cache.invalidate(&paint());
    assert_eq!(cache.peek(&paint()), EntryState::Loading);
    assert!(cache.get(&paint()).is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    cache.invalidate(&paint());

    let events = events.lock().clone();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].0, EntryState::Loading);
    assert!(events[1].0.value().is_some());
    assert_eq!(events[2].0, EntryState::Absent);
    for (published, peeked) in &events {
        assert_eq!(published, peeked);
    }
    assert_eq!(client.fetch_count("rate", "paint"), 2);
}

#[tokio::test]
async fn test_subscribers_see_every_transition() {
    let client = seeded_client();
    let cache = memory_cache(&client);
    let events = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&events);
    let _subscription = cache.subscribe(paint(), move |key, state| {
        sink.lock().push((key.id.clone(), state.clone()));
    });

    let mut all = cache.subscribe_all();
    cache.resolve(&paint()).await;
    cache.resolve(&CacheKey::new("rate", "tile")).await;
    cache.invalidate(&paint());

    let seen: Vec<EntryState> = events.lock().iter().map(|(_, s)| s.clone()).collect();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], EntryState::Loading);
    assert!(seen[1].value().is_some());
    assert_eq!(seen[2], EntryState::Absent);
    assert!(events.lock().iter().all(|(id, _)| id == "paint"));

    let mut broadcast = Vec::new();
    while let Ok(event) = all.try_recv() {
        broadcast.push(event.key.id);
    }
    assert_eq!(broadcast, vec!["paint", "paint", "tile", "tile", "paint"]);
}

#[tokio::test]
async fn test_invalidate_entity_clears_all_of_kind() {
    let client = Arc::new(MemoryClient::new());
    client.insert("rate", "a", json!({"id": "a"}));
    client.insert("supplier", "s", json!({"id": "s"}));
    let cache = memory_cache(&client);

    cache.resolve(&CacheKey::new("rate", "a")).await;
    cache.resolve(&CacheKey::new("rate", "missing")).await;
    cache.resolve(&CacheKey::new("supplier", "s")).await;
    assert_eq!(cache.stats().settled, 3);

    cache.invalidate_entity("rate");
    assert_eq!(cache.peek(&CacheKey::new("rate", "a")), EntryState::Absent);
    assert_eq!(cache.peek(&CacheKey::new("rate", "missing")), EntryState::Absent);
    assert!(cache.peek(&CacheKey::new("supplier", "s")).is_settled());
}

#[tokio::test]
async fn test_lookup_view_cannot_fetch() {
    let client = seeded_client();
    let cache = memory_cache(&client);
    let lookup: &dyn RecordLookup = &cache;

    assert_eq!(lookup.peek(&paint()), EntryState::Absent);
    assert!(lookup.peek_record::<Rate>("paint").is_none());
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(client.fetch_count("rate", "paint"), 0);
}
