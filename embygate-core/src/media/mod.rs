// Media-Source Resolution Engine
//
// Pipeline, leaf-first:
//
//   source_id  - compound MediaSource identifier codec
//   item_info  - per-request context (item id, credential, selection,
//                PlaybackInfo fetch URI)
//   service    - MediaGateway: storage-path resolution, transcoding
//                discovery, naming, direct links

pub mod error;
pub mod item_info;
pub mod service;
pub mod source_id;

pub use error::MediaError;
pub use item_info::{ItemInfo, QUERY_API_KEY, QUERY_TOKEN};
pub use service::{find_media_source_name, MediaGateway};
pub use source_id::{compound_source_id, resolve_media_source_id, MsInfo, SOURCE_ID_SEGMENT};
