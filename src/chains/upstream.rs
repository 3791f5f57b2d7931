//! Shared HTTP client for upstream chain and price services.
//!
//! # Responsibilities
//! - Hold one connection-pooled `reqwest::Client` with a transport timeout
//! - Issue single-attempt JSON GET/POST calls
//! - Classify failures (status, transport, payload, JSON-RPC)

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    /// Connection, timeout or body transfer failure.
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The body was not the expected JSON shape.
    #[error("invalid upstream payload: {0}")]
    Decode(String),

    /// A JSON-RPC endpoint answered with an error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl UpstreamError {
    /// HTTP status of the failure, if the upstream answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Upstream HTTP client shared by every strategy and the price feed.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    /// Create a client whose calls give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-aggregator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Transport)?;
        Ok(Self { http })
    }

    /// GET `url` with query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        read_json(self.http.get(url).query(query)).await
    }

    /// POST a JSON body to `url` and decode the JSON reply.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        read_json(self.http.post(url).json(body)).await
    }
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, UpstreamError> {
    let response = request.send().await.map_err(UpstreamError::Transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status));
    }
    let body = response.bytes().await.map_err(UpstreamError::Transport)?;
    serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Join a base URL and a path without doubling or dropping slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
