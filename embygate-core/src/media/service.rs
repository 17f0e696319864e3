//! Media-source resolution and transcoding discovery
//!
//! `MediaGateway` owns the full pipeline: resolve the inbound request,
//! fetch (or recall) the PlaybackInfo document, pick the storage path the
//! client actually asked for, and discover pre-rendered transcodings of a
//! source on the storage backend.
//!
//! Resolution failures are surfaced as [`MediaError`]. Discovery failures
//! are not errors at all: a source without transcoded renditions is
//! normal, so every discovery failure mode collapses to an empty result.

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request};
use percent_encoding::percent_decode_str;
use serde_json::{json, Value};
use url::form_urlencoded;

use embygate_providers::{AlistClient, AlistFs, EmbyApi, EmbyClient};

use crate::cache::PlaybackInfoCache;
use crate::config::Config;
use crate::path::PathMapper;

use super::error::MediaError;
use super::item_info::{ItemInfo, QUERY_API_KEY};
use super::source_id::compound_source_id;

/// Field that carries the transcoding task list inside an `fs/other` reply
const TASK_LIST_POINTER: &str = "/video_preview_play_info/live_transcoding_task_list";

pub struct MediaGateway {
    emby: Arc<dyn EmbyApi>,
    alist: Arc<dyn AlistFs>,
    mapper: PathMapper,
    cache: PlaybackInfoCache,
    api_key: String,
}

impl MediaGateway {
    pub fn new(
        emby: Arc<dyn EmbyApi>,
        alist: Arc<dyn AlistFs>,
        mapper: PathMapper,
        cache: PlaybackInfoCache,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            emby,
            alist,
            mapper,
            cache,
            api_key: api_key.into(),
        }
    }

    /// Wire up concrete HTTP clients from configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(EmbyClient::new(&config.emby.host)),
            Arc::new(AlistClient::with_token(
                &config.alist.host,
                &config.alist.token,
            )),
            PathMapper::new(config.path.clone()),
            PlaybackInfoCache::new(&config.cache),
            config.emby.api_key.clone(),
        )
    }

    /// Resolve an inbound request into its per-request context.
    pub fn resolve_item_info(&self, request: &Request<Bytes>) -> Result<ItemInfo, MediaError> {
        ItemInfo::from_request(request, &self.api_key)
    }

    /// Find the Emby library path backing the requested media source.
    ///
    /// Prefers the source the request selected; a stale or unknown
    /// selection silently degrades to the first available source rather
    /// than failing the request.
    pub async fn resolve_storage_path(&self, item_info: &ItemInfo) -> Result<String, MediaError> {
        let body = match self.cache.get(item_info).await {
            Some(cached) => cached,
            None => {
                let reply = self
                    .emby
                    .fetch(&item_info.playback_info_uri, Method::POST, None)
                    .await
                    .map_err(|err| MediaError::UpstreamFetch(err.to_string()))?;
                if !reply.is_success() {
                    return Err(MediaError::UpstreamFetch(reply.message));
                }
                let document = Arc::new(reply.data);
                self.cache.insert(item_info, document.clone()).await;
                document
            }
        };

        let sources = body
            .get("MediaSources")
            .and_then(Value::as_array)
            .ok_or_else(|| MediaError::MediaSourcesNotFound {
                document: (*body).clone(),
            })?;

        let requested_id = url_decode(&item_info.ms_info.raw_id);
        let mut path: Option<String> = None;
        let mut default_path: Option<String> = None;

        for source in sources {
            if default_path.is_none() {
                default_path = source
                    .get("Path")
                    .and_then(Value::as_str)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
            }
            if item_info.ms_info.empty {
                // no selection: the first source wins
                break;
            }

            let current_id = source
                .get("Id")
                .and_then(Value::as_str)
                .map(url_decode)
                .unwrap_or_default();
            if current_id == requested_id {
                path = source
                    .get("Path")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                break;
            }
        }

        if let Some(path) = path.filter(|p| !p.is_empty()) {
            return Ok(path);
        }
        if let Some(path) = default_path {
            return Ok(path);
        }
        Err(MediaError::PathNotFound {
            document: (*body).clone(),
        })
    }

    /// Discover all pre-rendered transcodings of `source`, synthesizing one
    /// playable MediaSource descriptor per rendition.
    ///
    /// Always yields exactly one result per call; the result is empty
    /// whenever the backend has nothing to offer (or refuses to say).
    pub async fn find_video_preview_infos(
        &self,
        source: &Value,
        display_name: &str,
    ) -> Vec<Value> {
        if !source.is_object() {
            return Vec::new();
        }

        let emby_path = source.get("Path").and_then(Value::as_str).unwrap_or_default();
        let translation = match self.mapper.translate(emby_path) {
            Ok(translation) => translation,
            Err(err) => {
                tracing::warn!(%err, path = emby_path, "storage path translation failed");
                return Vec::new();
            }
        };

        let mut task_list: Option<Value> = None;
        let mut first_fetch_success = false;

        match self.alist.fs_other(&translation.path).await {
            Ok(reply) if reply.code == 200 => {
                if let Some(list) = reply.data.pointer(TASK_LIST_POINTER) {
                    first_fetch_success = true;
                    task_list = Some(list.clone());
                }
            }
            // 403 is conclusive for this file; alternate roots are not consulted
            Ok(reply) if reply.code == 403 => {
                tracing::debug!(path = %translation.path, "preview query forbidden");
                return Vec::new();
            }
            Ok(reply) => {
                tracing::debug!(path = %translation.path, code = reply.code, "preview query missed");
            }
            Err(err) => {
                tracing::debug!(%err, path = %translation.path, "preview query failed");
            }
        }

        if !first_fetch_success {
            let candidates = match self.mapper.alternates(&translation) {
                Ok(candidates) => candidates,
                Err(err) => {
                    tracing::warn!(%err, "cannot enumerate alternate storage roots");
                    return Vec::new();
                }
            };

            for candidate in candidates {
                match self.alist.fs_other(&candidate).await {
                    Ok(reply) if reply.code == 200 => {
                        if let Some(list) = reply.data.pointer(TASK_LIST_POINTER) {
                            task_list = Some(list.clone());
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::debug!(%err, path = %candidate, "fallback preview query failed");
                    }
                }
            }
        }

        let tasks = match task_list.as_ref().and_then(Value::as_array) {
            Some(tasks) if !tasks.is_empty() => tasks.clone(),
            _ => return Vec::new(),
        };

        let origin_id = source
            .get("Id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // one task per rendition, one output slot per task; awaiting the
        // handles in input order keeps the result ordering deterministic
        // while the synthesis itself runs concurrently
        let handles: Vec<_> = tasks
            .into_iter()
            .map(|task| {
                let source = source.clone();
                let origin_id = origin_id.clone();
                let alist_path = translation.path.clone();
                let api_key = self.api_key.clone();
                let display_name = display_name.to_string();
                tokio::spawn(async move {
                    synthesize_preview_source(
                        &source,
                        &task,
                        &origin_id,
                        &alist_path,
                        &api_key,
                        &display_name,
                    )
                })
            })
            .collect();

        futures::future::join_all(handles)
            .await
            .into_iter()
            .filter_map(Result::ok)
            .collect()
    }

    /// Resolve the storage backend's direct download link for a path.
    pub async fn resolve_direct_url(&self, alist_path: &str) -> Result<String, MediaError> {
        let info = self.alist.fs_get(alist_path).await.map_err(|err| {
            MediaError::DirectLinkUnavailable {
                path: alist_path.to_string(),
                reason: err.to_string(),
            }
        })?;

        if info.raw_url.is_empty() {
            return Err(MediaError::DirectLinkUnavailable {
                path: alist_path.to_string(),
                reason: "backend returned no raw link".to_string(),
            });
        }
        Ok(info.raw_url)
    }
}

/// Derive a human-readable label for a MediaSource descriptor, e.g.
/// "1080p HEVC": the display title of its first video stream, falling back
/// to the source's own name.
#[must_use]
pub fn find_media_source_name(source: &Value) -> String {
    if !source.is_object() {
        return String::new();
    }

    let own_name = source
        .get("Name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let Some(streams) = source.get("MediaStreams").and_then(Value::as_array) else {
        return own_name;
    };

    streams
        .iter()
        .find(|stream| stream.get("Type").and_then(Value::as_str) == Some("Video"))
        .and_then(|stream| stream.get("DisplayTitle").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or(own_name)
}

/// Build one synthesized descriptor for a transcoding task.
///
/// The copy keeps every upstream field it does not rewrite; the new id must
/// decode back to the original source and rendition (see `source_id`).
fn synthesize_preview_source(
    source: &Value,
    task: &Value,
    origin_id: &str,
    alist_path: &str,
    api_key: &str,
    display_name: &str,
) -> Value {
    let mut copy = source.clone();

    let template_id = task
        .get("template_id")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let width = task
        .get("template_width")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    let height = task
        .get("template_height")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    let playlist_url = task.get("url").and_then(Value::as_str).unwrap_or_default();
    let format = format!("{width}x{height}");

    let new_id = compound_source_id(origin_id, template_id, &format, alist_path);

    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("alist_path", alist_path);
    query.append_pair("template_id", template_id);
    query.append_pair(QUERY_API_KEY, api_key);
    query.append_pair("remote", playlist_url);
    let transcoding_url = format!("/videos/proxy_playlist?{}", query.finish());

    if let Some(fields) = copy.as_object_mut() {
        fields.insert(
            "Name".to_string(),
            json!(format!("({template_id}_{format}) {display_name}")),
        );
        fields.insert("Id".to_string(), json!(new_id));
        fields.insert("SupportsTranscoding".to_string(), json!(true));
        fields.insert("TranscodingContainer".to_string(), json!("ts"));
        fields.insert("TranscodingSubProtocol".to_string(), json!("hls"));
        fields.insert("TranscodingUrl".to_string(), json!(transcoding_url));
        fields.remove("DirectStreamUrl");
        fields.insert("SupportsDirectPlay".to_string(), json!(false));
        fields.insert("SupportsDirectStream".to_string(), json!(false));
    }
    copy
}

fn url_decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
