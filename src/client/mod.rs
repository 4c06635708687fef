//! Record persistence clients.
//!
//! The cache fetches linked records and the form stores edited ones through
//! [`RecordClient`]. [`HttpClient`] talks to a JSON record service;
//! [`MemoryClient`] keeps everything in process.

mod http;
mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpClient;
pub use memory::MemoryClient;

/// Errors returned by record clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request never produced a response
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with an unexpected status
    #[error("Request to '{url}' returned {status}")]
    Status { url: String, status: u16 },

    /// The response body is not a JSON record
    #[error("Invalid record payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client refuses requests, e.g. a store that is offline
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Fetches and stores records by `(entity, id)`.
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// Returns the record, or `None` when it does not exist.
    async fn fetch_by_id(&self, entity: &str, id: &str) -> Result<Option<Value>, ClientError>;

    /// Creates or replaces the record.
    async fn store_record(&self, entity: &str, id: &str, record: Value) -> Result<(), ClientError>;
}
