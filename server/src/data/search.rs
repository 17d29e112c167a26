//! Search backend contract and Elasticsearch client
//!
//! The domain layer only sees [`SearchExecutor`]: one request in, one raw JSON
//! response out. [`ElasticsearchClient`] is the HTTP implementation used by the
//! binary; tests substitute scripted executors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::error::SearchError;
use crate::core::config::ElasticsearchConfig;

/// The only method this crate issues against the backend
pub const SEARCH_METHOD: &str = "search";

/// One search request: target index pattern plus request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub body: Value,
}

/// Executes search requests against a backend
///
/// Implementations must not retry on their own; retry policy belongs to the
/// caller of the whole fetch.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Run `method` with `request` and return the raw response body
    async fn execute(&self, method: &str, request: &SearchRequest) -> Result<Value, SearchError>;

    /// Backend name for debugging/logging
    fn backend_name(&self) -> &'static str;
}

/// Elasticsearch executor over HTTP
pub struct ElasticsearchClient {
    client: reqwest::Client,
    url: String,
    user: Option<String>,
    password: Option<String>,
}

impl ElasticsearchClient {
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            url = %config.url,
            timeout_secs = config.timeout_secs,
            auth = config.user.is_some(),
            "Elasticsearch client initialized"
        );

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// Search endpoint: {url}/{index}/_search
    fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.url, index)
    }
}

#[async_trait]
impl SearchExecutor for ElasticsearchClient {
    async fn execute(&self, method: &str, request: &SearchRequest) -> Result<Value, SearchError> {
        if method != SEARCH_METHOD {
            return Err(SearchError::UnsupportedMethod(method.to_string()));
        }

        let url = self.search_url(&request.index);
        tracing::trace!(url = %url, body = %request.body, "Executing search");

        let mut builder = self.client.post(&url).json(&request.body);
        if let Some(ref user) = self.user {
            builder = builder.basic_auth(user, self.password.as_deref());
        }

        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::status(status.as_u16(), body));
        }

        Ok(resp.json().await?)
    }

    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }
}
