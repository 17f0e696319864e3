//! Per-request item resolution
//!
//! Pulls the item id and MediaSource selection out of an inbound playback
//! request and pre-builds the upstream PlaybackInfo URI, so everything
//! downstream works from one immutable context.

use std::sync::LazyLock;

use bytes::Bytes;
use http::Request;
use regex::Regex;
use serde_json::Value;
use url::form_urlencoded;

use super::error::MediaError;
use super::source_id::{resolve_media_source_id, MsInfo};

/// Query parameter Emby clients use for the access credential
pub const QUERY_API_KEY: &str = "api_key";
/// Token alias some clients put in the query instead of `api_key`
pub const QUERY_TOKEN: &str = "X-Emby-Token";

/// Matches the numeric item id in playback-related request paths, with or
/// without the optional `/emby` prefix.
static ITEM_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/emby)?/.*/(\d+)(?:/|\?)?").expect("item id regex"));

/// Resolved per-request state, immutable after construction.
#[derive(Debug, Clone)]
pub struct ItemInfo {
    /// Numeric Emby item id from the request path
    pub id: String,
    /// Access credential accompanying the request
    pub api_key: String,
    /// Decoded MediaSource selection
    pub ms_info: MsInfo,
    /// Relative URI for the upstream PlaybackInfo fetch; carries the
    /// credential and, for non-empty selections, the origin source id
    pub playback_info_uri: String,
}

impl ItemInfo {
    /// Resolve an inbound request into an [`ItemInfo`].
    ///
    /// `default_api_key` is the process-wide credential used when the
    /// request itself carries none.
    pub fn from_request(
        request: &Request<Bytes>,
        default_api_key: &str,
    ) -> Result<Self, MediaError> {
        let uri = request.uri().to_string();

        let id = ITEM_ID_REGEX
            .captures(&uri)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| MediaError::ItemIdNotFound { uri: uri.clone() })?;

        let api_key = query_param(request, QUERY_TOKEN)
            .or_else(|| query_param(request, QUERY_API_KEY))
            .unwrap_or_else(|| default_api_key.to_string());

        let media_source_id = request_media_source_id(request);
        let ms_info = resolve_media_source_id(&media_source_id).map_err(|err| {
            MediaError::MediaSourceResolution {
                uri: uri.clone(),
                source: Box::new(err),
            }
        })?;

        let playback_info_uri = build_playback_info_uri(&id, &api_key, &ms_info)?;

        Ok(Self {
            id,
            api_key,
            ms_info,
            playback_info_uri,
        })
    }
}

/// First non-empty value of a query parameter, percent-decoded.
fn query_param(request: &Request<Bytes>, name: &str) -> Option<String> {
    let query = request.uri().query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// MediaSource id from the query, falling back to the JSON request body.
///
/// The body is borrowed, never consumed, so downstream consumers still see
/// the original bytes. An unreadable body means "no selection", not an
/// error.
fn request_media_source_id(request: &Request<Bytes>) -> String {
    if let Some(id) = query_param(request, "MediaSourceId") {
        return id;
    }

    let Ok(body) = serde_json::from_slice::<Value>(request.body()) else {
        return String::new();
    };
    body.get("MediaSourceId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn build_playback_info_uri(
    id: &str,
    api_key: &str,
    ms_info: &MsInfo,
) -> Result<String, MediaError> {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair(QUERY_API_KEY, api_key);
    if !ms_info.empty {
        query.append_pair("MediaSourceId", &ms_info.origin_id);
    }

    let uri = format!("/Items/{id}/PlaybackInfo?{}", query.finish());
    uri.parse::<http::Uri>()
        .map_err(|err| MediaError::UriBuild(err.to_string()))?;
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::source_id::SOURCE_ID_SEGMENT;

    fn request(uri: &str, body: &str) -> Request<Bytes> {
        Request::builder()
            .method(http::Method::POST)
            .uri(uri)
            .body(Bytes::from(body.to_string()))
            .expect("test request")
    }

    #[test]
    fn test_item_id_from_path() {
        let req = request("/emby/Items/12345/PlaybackInfo?api_key=abc", "");
        let info = ItemInfo::from_request(&req, "fallback").unwrap();
        assert_eq!(info.id, "12345");
    }

    #[test]
    fn test_item_id_without_emby_prefix() {
        let req = request("/Items/98765/PlaybackInfo?api_key=abc", "");
        let info = ItemInfo::from_request(&req, "fallback").unwrap();
        assert_eq!(info.id, "98765");
    }

    #[test]
    fn test_missing_item_id_fails() {
        let req = request("/emby/System/Info?api_key=abc", "");
        let err = ItemInfo::from_request(&req, "fallback").unwrap_err();
        assert!(matches!(err, MediaError::ItemIdNotFound { .. }));
    }

    #[test]
    fn test_api_key_precedence() {
        // alias beats the standard parameter
        let req = request(
            "/emby/Items/1/PlaybackInfo?api_key=standard&X-Emby-Token=alias",
            "",
        );
        let info = ItemInfo::from_request(&req, "default").unwrap();
        assert_eq!(info.api_key, "alias");

        let req = request("/emby/Items/1/PlaybackInfo?api_key=standard", "");
        let info = ItemInfo::from_request(&req, "default").unwrap();
        assert_eq!(info.api_key, "standard");

        let req = request("/emby/Items/1/PlaybackInfo", "");
        let info = ItemInfo::from_request(&req, "default").unwrap();
        assert_eq!(info.api_key, "default");
    }

    #[test]
    fn test_empty_query_value_falls_through() {
        let req = request("/emby/Items/1/PlaybackInfo?X-Emby-Token=&api_key=standard", "");
        let info = ItemInfo::from_request(&req, "default").unwrap();
        assert_eq!(info.api_key, "standard");
    }

    #[test]
    fn test_media_source_id_from_query() {
        let id = "5a8c3f0e9d2b41c6a7e8f90123456789";
        let req = request(
            &format!("/emby/Items/1/PlaybackInfo?MediaSourceId={id}"),
            "",
        );
        let info = ItemInfo::from_request(&req, "key").unwrap();
        assert_eq!(info.ms_info.origin_id, id);
        assert!(!info.ms_info.empty);
    }

    #[test]
    fn test_media_source_id_from_body() {
        let id = "5a8c3f0e9d2b41c6a7e8f90123456789";
        let body = format!(r#"{{"MediaSourceId":"{id}","MaxStreamingBitrate":42}}"#);
        let req = request("/emby/Items/1/PlaybackInfo?api_key=k", &body);

        let info = ItemInfo::from_request(&req, "key").unwrap();
        assert_eq!(info.ms_info.origin_id, id);

        // body bytes are still intact for downstream consumers
        assert_eq!(req.body(), &Bytes::from(body));
    }

    #[test]
    fn test_garbage_body_means_no_selection() {
        let req = request("/emby/Items/1/PlaybackInfo?api_key=k", "not json at all");
        let info = ItemInfo::from_request(&req, "key").unwrap();
        assert!(info.ms_info.empty);
    }

    #[test]
    fn test_malformed_compound_id_is_fatal() {
        let bad = format!("{}{}{}", "a".repeat(33), SOURCE_ID_SEGMENT, "half");
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("MediaSourceId", &bad)
            .finish();
        let req = request(&format!("/emby/Items/1/PlaybackInfo?{query}"), "");
        let err = ItemInfo::from_request(&req, "key").unwrap_err();
        assert!(matches!(
            err,
            MediaError::MediaSourceResolution { .. }
        ));
    }

    #[test]
    fn test_playback_uri_shape() {
        let req = request("/emby/Items/7/PlaybackInfo?api_key=secret", "");
        let info = ItemInfo::from_request(&req, "unused").unwrap();
        assert_eq!(info.playback_info_uri, "/Items/7/PlaybackInfo?api_key=secret");

        let id = "5a8c3f0e9d2b41c6a7e8f90123456789";
        let req = request(
            &format!("/emby/Items/7/PlaybackInfo?api_key=secret&MediaSourceId={id}"),
            "",
        );
        let info = ItemInfo::from_request(&req, "unused").unwrap();
        assert_eq!(
            info.playback_info_uri,
            format!("/Items/7/PlaybackInfo?api_key=secret&MediaSourceId={id}")
        );
        assert_eq!(info.playback_info_uri.matches("api_key").count(), 1);
    }
}
