// Embygate Provider Clients
//
// Pure HTTP client implementations for the media server (Emby) and the
// cloud-storage file listing backend (Alist). These clients are
// independent of the resolution engine; embygate-core consumes them
// through the `EmbyApi` and `AlistFs` trait seams.

pub mod alist;
pub mod emby;

// Re-export client types for convenience
pub use alist::{AlistClient, AlistError, AlistFs, FsGetResp, FsOtherReply};
pub use emby::{EmbyApi, EmbyClient, EmbyError, EmbyReply};
