//! Emby Provider Client
//!
//! Pure HTTP client for the Emby API, consumed by the resolution engine
//! through the [`EmbyApi`] trait.

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

mod client;
pub mod error;
pub mod types;

pub use client::EmbyClient;
pub use error::EmbyError;
pub use types::EmbyReply;

/// Upstream fetch seam for the Emby API.
///
/// `uri` is the relative path and query to forward (the credential is
/// already part of it); the host is the implementation's concern.
#[async_trait]
pub trait EmbyApi: Send + Sync {
    async fn fetch(
        &self,
        uri: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<EmbyReply, EmbyError>;
}
