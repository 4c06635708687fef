use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::{ClientError, RecordClient};
use crate::config::ClientConfig;

/// Record client for a JSON service laid out as `{base_url}/{entity}/{id}`.
///
/// `GET` fetches a record, `PUT` stores one. A `404` on fetch means the
/// record does not exist.
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn record_url(&self, entity: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, entity, id)
    }
}

#[async_trait]
impl RecordClient for HttpClient {
    async fn fetch_by_id(&self, entity: &str, id: &str) -> Result<Option<Value>, ClientError> {
        let url = self.record_url(entity, id);
        tracing::debug!(url = %url, "GET record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Request { url, source })?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn store_record(&self, entity: &str, id: &str, record: Value) -> Result<(), ClientError> {
        let url = self.record_url(entity, id);
        tracing::debug!(url = %url, "PUT record");

        let response = self
            .client
            .put(&url)
            .json(&record)
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
