//! Mock record service for testing the HTTP client.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// A captured request for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct MockState {
    records: Arc<Mutex<HashMap<(String, String), Value>>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    fail_with: Arc<Mutex<Option<u16>>>,
}

/// In-process record service serving `/api/{entity}/{id}`.
pub struct MockRecordService {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockRecordService {
    /// Start a new mock record service.
    pub async fn start() -> Self {
        let state = MockState::default();
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/api/{entity}/{id}", get(get_record).put(put_record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    /// Base URL to put in `ClientConfig::base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub async fn insert(&self, entity: &str, id: &str, record: Value) {
        self.state
            .records
            .lock()
            .await
            .insert((entity.to_string(), id.to_string()), record);
    }

    pub async fn record(&self, entity: &str, id: &str) -> Option<Value> {
        self.state
            .records
            .lock()
            .await
            .get(&(entity.to_string(), id.to_string()))
            .cloned()
    }

    /// Answer every request with `status` until cleared with `None`.
    pub async fn fail_with(&self, status: Option<u16>) {
        *self.state.fail_with.lock().await = status;
    }

    /// Get all captured requests.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }
}

impl Drop for MockRecordService {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn get_record(
    State(state): State<MockState>,
    Path((entity, id)): Path<(String, String)>,
) -> Response {
    state.requests.lock().await.push(CapturedRequest {
        method: "GET".to_string(),
        path: format!("/api/{}/{}", entity, id),
        body: None,
    });

    if let Some(status) = *state.fail_with.lock().await {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "mock failure").into_response();
    }

    match state.records.lock().await.get(&(entity, id)) {
        Some(record) => Json(record.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_record(
    State(state): State<MockState>,
    Path((entity, id)): Path<(String, String)>,
    Json(record): Json<Value>,
) -> Response {
    state.requests.lock().await.push(CapturedRequest {
        method: "PUT".to_string(),
        path: format!("/api/{}/{}", entity, id),
        body: Some(record.clone()),
    });

    if let Some(status) = *state.fail_with.lock().await {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "mock failure").into_response();
    }

    state.records.lock().await.insert((entity, id), record);
    StatusCode::NO_CONTENT.into_response()
}
