use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("External API error: {} {}", status.as_u16(), reason)]
    Status { status: StatusCode, reason: String },
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned undecodable json: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the external search service's `/query` endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/query", self.base_url)
    }

    /// Runs `query` against the upstream. A POST is tried first; any failure
    /// there falls back to a GET with the query in the url. Only the GET's
    /// failure is reported.
    pub async fn query(&self, query: &str) -> Result<Value, UpstreamError> {
        match self.query_post(query).await {
            Ok(payload) => {
                info!(method = "POST", "upstream answered");
                return Ok(payload);
            }
            Err(error) => {
                debug!(%error, "upstream POST failed, falling back to GET");
            }
        }

        let payload = self.query_get(query).await?;
        info!(method = "GET", "upstream answered");
        Ok(payload)
    }

    async fn query_post(&self, query: &str) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&json!({ "query": query }))
            .send()
            .await?;
        decode(response).await
    }

    async fn query_get(&self, query: &str) -> Result<Value, UpstreamError> {
        let url = Url::parse_with_params(&self.endpoint(), &[("query", query)])?;
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode(response: reqwest::Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }
    response.json().await.map_err(UpstreamError::Decode)
}
