// Media Resolution Error Types

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the resolution layer.
///
/// Discovery never produces these: absence of transcoded renditions is an
/// expected outcome and degrades to an empty result instead.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no item id found in request uri: {uri}")]
    ItemIdNotFound { uri: String },

    #[error("failed to resolve media source, uri: {uri}")]
    MediaSourceResolution {
        uri: String,
        #[source]
        source: Box<MediaError>,
    },

    #[error("malformed media source id: {0}")]
    MalformedSourceId(String),

    #[error("failed to build playback info uri: {0}")]
    UriBuild(String),

    #[error("emby playback info request failed: {0}")]
    UpstreamFetch(String),

    #[error("MediaSources missing from playback info, raw response: {document}")]
    MediaSourcesNotFound { document: Value },

    #[error("no usable Path in playback info, raw response: {document}")]
    PathNotFound { document: Value },

    #[error("no direct link for {path}: {reason}")]
    DirectLinkUnavailable { path: String, reason: String },
}
