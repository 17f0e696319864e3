//! Alist HTTP Client
//!
//! Pure HTTP client for the Alist file-listing API. The discovery engine
//! only needs `fs/other` (video preview queries) and `fs/get` (direct
//! links), both POST endpoints returning the standard Alist envelope.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Client,
};
use serde_json::{json, Value};

use super::error::AlistError;
use super::types::{AlistResp, FsGetResp, FsOtherReply};
use super::AlistFs;

/// Shared HTTP client for all Alist requests (connection pooling).
/// Redirects stay enabled: `fs/get` raw links are often served through one.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .build()
        .expect("Failed to build Alist shared HTTP client")
});

/// Alist HTTP Client
pub struct AlistClient {
    host: String,
    token: Option<String>,
    client: Client,
}

impl AlistClient {
    /// Create a new Alist client (reuses the shared connection pool)
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            token: None,
            client: SHARED_CLIENT.clone(),
        }
    }

    /// Create a new Alist client with an authentication token
    pub fn with_token(host: impl Into<String>, token: impl Into<String>) -> Self {
        let mut client = Self::new(host);
        client.token = Some(token.into());
        client
    }

    /// Get current host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check if client has a token
    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build request headers
    fn build_headers(&self) -> Result<HeaderMap, AlistError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        if let Some(ref token) = self.token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(token)?);
        }

        Ok(headers)
    }

    /// POST a JSON body to an Alist API endpoint and decode the envelope
    async fn post_api<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Value,
    ) -> Result<AlistResp<T>, AlistError> {
        let url = format!("{}{}", self.host, endpoint);

        let response = self
            .client
            .post(&url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AlistFs for AlistClient {
    /// Get file information, including the storage backend's direct link
    async fn fs_get(&self, path: &str) -> Result<FsGetResp, AlistError> {
        let body = json!({
            "path": path,
            "password": "",
        });

        let resp: AlistResp<FsGetResp> = self.post_api("/api/fs/get", body).await?;

        if resp.code != 200 {
            return Err(AlistError::Api {
                code: resp.code,
                message: resp.message,
            });
        }

        resp.data
            .ok_or_else(|| AlistError::Parse("fs/get returned no data".to_string()))
    }

    /// Query video preview information for a path.
    ///
    /// Returns the raw `(code, document)` envelope instead of failing on
    /// non-200: the caller distinguishes 403 from other misses.
    async fn fs_other(&self, path: &str) -> Result<FsOtherReply, AlistError> {
        let body = json!({
            "path": path,
            "method": "video_preview",
            "password": "",
        });

        let resp: AlistResp<Value> = self.post_api("/api/fs/other", body).await?;
        tracing::debug!(path, code = resp.code, "alist fs/other");

        Ok(resp.into())
    }
}
