//! Alist Provider Client
//!
//! Pure HTTP client for the Alist API, independent of the resolution
//! engine. The engine consumes it through the [`AlistFs`] trait so tests
//! can substitute a mock.

use async_trait::async_trait;

mod client;
pub mod error;
pub mod types;

pub use client::AlistClient;
pub use error::AlistError;
pub use types::{AlistResp, FsGetResp, FsOtherReply};

/// File-system operations the gateway needs from an Alist backend.
#[async_trait]
pub trait AlistFs: Send + Sync {
    /// Fetch file information (`/api/fs/get`), failing on non-200 codes.
    async fn fs_get(&self, path: &str) -> Result<FsGetResp, AlistError>;

    /// Query video preview information (`/api/fs/other`), surfacing the
    /// raw envelope code untouched.
    async fn fs_other(&self, path: &str) -> Result<FsOtherReply, AlistError>;
}
