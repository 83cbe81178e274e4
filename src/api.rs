//! RemoteFetcher capability: the authenticated status-endpoint client.

use crate::error::WatchError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Source of raw status payloads. The watcher only ever talks to this
/// trait, which keeps the polling pipeline testable without a network.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch submissions updated since `from_date` (epoch seconds).
    async fn fetch(&self, from_date: i64) -> Result<Value, WatchError>;
}

/// Practicum homework-status API client.
pub struct PracticumApi {
    endpoint: String,
    /// Pre-computed `Authorization` header value (avoids `format!` per request).
    auth_header: String,
    client: Client,
}

impl PracticumApi {
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string() + "/",
            auth_header: format!("OAuth {token}"),
            client: build_api_client(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn build_api_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[async_trait]
impl StatusSource for PracticumApi {
    async fn fetch(&self, from_date: i64) -> Result<Value, WatchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Authorization", &self.auth_header)
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));

        if !status.is_success() {
            return Err(WatchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| WatchError::MalformedResponse(format!("body is not JSON: {e}")))
    }
}
