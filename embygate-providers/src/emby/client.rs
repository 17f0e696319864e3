//! Emby HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::Value;

use super::error::EmbyError;
use super::types::EmbyReply;
use super::EmbyApi;

/// Shared HTTP client for all Emby requests (connection pooling).
/// Redirects are disabled so the gateway sees upstream redirects itself.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build Emby shared HTTP client")
});

/// Emby HTTP Client
///
/// Forwards relative request URIs (path and query, credential included) to
/// the configured Emby host. Authentication rides in the `api_key` query
/// parameter of the forwarded URI, the way Emby clients send it.
pub struct EmbyClient {
    host: String,
    client: Client,
}

impl EmbyClient {
    /// Create a new Emby client (reuses the shared connection pool)
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_string(),
            client: SHARED_CLIENT.clone(),
        }
    }

    /// Get current host
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}

#[async_trait]
impl EmbyApi for EmbyClient {
    async fn fetch(
        &self,
        uri: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<EmbyReply, EmbyError> {
        let url = format!("{}{}", self.host, uri);

        let mut request = self
            .client
            .request(method, &url)
            .headers(Self::build_headers());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let code = response.status().as_u16();

        if !(200..300).contains(&code) {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(uri, code, "emby request failed");
            return Ok(EmbyReply {
                code,
                message,
                data: Value::Null,
            });
        }

        let data: Value = response.json().await?;
        Ok(EmbyReply {
            code,
            message: String::new(),
            data,
        })
    }
}
