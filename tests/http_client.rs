mod common;

use clay_widgets::cache::{CacheKey, EntryState, RecordCache};
use clay_widgets::client::{ClientError, HttpClient, RecordClient};
use clay_widgets::config::ClientConfig;
use clay_widgets::estimate::Rate;
use common::mock_server::{CapturedRequest, MockRecordService};
use common::{cache_config, rate_json};
use serde_json::json;
use std::sync::Arc;

fn client_for(server: &MockRecordService) -> HttpClient {
    let config = ClientConfig {
        base_url: server.base_url(),
        timeout_seconds: 5,
        connect_timeout_seconds: 2,
    };
    HttpClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_existing_record() {
    let server = MockRecordService::start().await;
    server.insert("rate", "paint", rate_json("paint", 0.25, 0.4, 0.5)).await;
    let client = client_for(&server);

    let record = client.fetch_by_id("rate", "paint").await.unwrap().unwrap();
    assert_eq!(record["hours_ratio"], json!(0.25));

    let requests = server.captured_requests().await;
    assert_eq!(
        requests,
        vec![CapturedRequest {
            method: "GET".into(),
            path: "/api/rate/paint".into(),
            body: None,
        }]
    );
}

#[tokio::test]
async fn test_missing_record_is_none() {
    let server = MockRecordService::start().await;
    let client = client_for(&server);

    assert!(client.fetch_by_id("rate", "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_reported_with_status() {
    let server = MockRecordService::start().await;
    server.insert("rate", "paint", rate_json("paint", 0.25, 0.4, 0.5)).await;
    server.fail_with(Some(503)).await;
    let client = client_for(&server);

    match client.fetch_by_id("rate", "paint").await {
        Err(ClientError::Status { url, status }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/api/rate/paint"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }

    let err = client
        .store_record("estimate", "e1", json!({"name": "x"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503, .. }));
    assert!(server.record("estimate", "e1").await.is_none());
}

#[tokio::test]
async fn test_store_puts_json_body() {
    let server = MockRecordService::start().await;
    let client = client_for(&server);
    let record = json!({"name": "Kitchen", "items": []});

    client.store_record("estimate", "e1", record.clone()).await.unwrap();

    assert_eq!(server.record("estimate", "e1").await, Some(record.clone()));
    let requests = server.captured_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path, "/api/estimate/e1");
    assert_eq!(requests[0].body, Some(record));
}

#[tokio::test]
async fn test_cache_over_http_client() {
    let server = MockRecordService::start().await;
    server.insert("rate", "tile", rate_json("tile", 1.5, 2.0, 1.0)).await;
    let client: Arc<dyn RecordClient> = Arc::new(client_for(&server));
    let cache = RecordCache::new(client, &cache_config()).unwrap();

    let rate = cache.resolve_record::<Rate>("tile").await.unwrap();
    assert_eq!(rate.name, "TILE");
    assert_eq!(
        cache.resolve(&CacheKey::new("rate", "gone")).await,
        EntryState::NotFound
    );

    server.fail_with(Some(500)).await;
    let key = CacheKey::new("rate", "other");
    assert_eq!(cache.resolve(&key).await, EntryState::Failed);

    let gets = server
        .captured_requests()
        .await
        .into_iter()
        .filter(|r| r.method == "GET")
        .count();
    assert_eq!(gets, 3);
}
