//! End-to-end resolution pipeline tests
//!
//! Drives an inbound playback request through context resolution, storage
//! path lookup, and transcoding discovery against mocked provider clients.
//!
//! Run with: cargo test --test media_resolution

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request};
use mockall::mock;
use serde_json::{json, Value};

use embygate_core::{
    cache::PlaybackInfoCache,
    config::CacheConfig,
    find_media_source_name,
    media::resolve_media_source_id,
    path::{PathConfig, PathMapper, PathRule},
    MediaGateway,
};
use embygate_providers::{
    alist::{AlistError, AlistFs, FsGetResp, FsOtherReply},
    emby::{EmbyApi, EmbyError, EmbyReply},
};

mock! {
    pub Emby {}

    #[async_trait]
    impl EmbyApi for Emby {
        async fn fetch(
            &self,
            uri: &str,
            method: Method,
            body: Option<Value>,
        ) -> Result<EmbyReply, EmbyError>;
    }
}

mock! {
    pub Alist {}

    #[async_trait]
    impl AlistFs for Alist {
        async fn fs_get(&self, path: &str) -> Result<FsGetResp, AlistError>;
        async fn fs_other(&self, path: &str) -> Result<FsOtherReply, AlistError>;
    }
}

const ORIGIN_ID: &str = "5a8c3f0e9d2b41c6a7e8f90123456789";

fn playback_document() -> Value {
    json!({
        "MediaSources": [
            {
                "Id": ORIGIN_ID,
                "Name": "Movie",
                "Path": "/mnt/aliyun/movies/film.mkv",
                "Container": "mkv",
                "DirectStreamUrl": "/emby/videos/42/stream",
                "MediaStreams": [
                    { "Type": "Audio", "DisplayTitle": "AAC stereo" },
                    { "Type": "Video", "DisplayTitle": "1080p HEVC" }
                ]
            }
        ]
    })
}

fn gateway(emby: MockEmby, alist: MockAlist) -> MediaGateway {
    MediaGateway::new(
        Arc::new(emby),
        Arc::new(alist),
        PathMapper::new(PathConfig {
            rules: vec![PathRule {
                emby: "/mnt/aliyun".to_string(),
                alist: "/aliyun".to_string(),
            }],
            alist_roots: vec!["/aliyun".to_string()],
        }),
        PlaybackInfoCache::new(&CacheConfig::default()),
        "server-key",
    )
}

#[tokio::test]
async fn test_full_resolution_pipeline() {
    let mut emby = MockEmby::new();
    emby.expect_fetch()
        .times(1)
        .withf(|uri, method, body| {
            uri == "/Items/42/PlaybackInfo?api_key=client-key"
                && *method == Method::POST
                && body.is_none()
        })
        .returning(|_, _, _| {
            Ok(EmbyReply {
                code: 200,
                message: String::new(),
                data: playback_document(),
            })
        });

    let mut alist = MockAlist::new();
    alist
        .expect_fs_other()
        .times(1)
        .withf(|path| path == "/aliyun/movies/film.mkv")
        .returning(|_| {
            Ok(FsOtherReply {
                code: 200,
                message: String::new(),
                data: json!({
                    "video_preview_play_info": {
                        "live_transcoding_task_list": [
                            { "template_id": "FHD", "template_width": 1920,
                              "template_height": 1080,
                              "url": "https://cdn.example.com/fhd.m3u8" },
                            { "template_id": "HD", "template_width": 1280,
                              "template_height": 720,
                              "url": "https://cdn.example.com/hd.m3u8" }
                        ]
                    }
                }),
            })
        });

    let gw = gateway(emby, alist);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/emby/Items/42/PlaybackInfo?api_key=client-key")
        .body(Bytes::new())
        .expect("request");

    let item_info = gw.resolve_item_info(&request).unwrap();
    assert_eq!(item_info.id, "42");
    assert_eq!(item_info.api_key, "client-key");
    assert!(item_info.ms_info.empty);

    let emby_path = gw.resolve_storage_path(&item_info).await.unwrap();
    assert_eq!(emby_path, "/mnt/aliyun/movies/film.mkv");

    let document = playback_document();
    let source = &document["MediaSources"][0];
    let display_name = find_media_source_name(source);
    assert_eq!(display_name, "1080p HEVC");

    let previews = gw.find_video_preview_infos(source, &display_name).await;
    assert_eq!(previews.len(), 2);

    // synthesized descriptors decode back to their origin and rendition
    for (preview, expected_template) in previews.iter().zip(["FHD", "HD"]) {
        let id = preview.get("Id").and_then(Value::as_str).unwrap();
        let decoded = resolve_media_source_id(id).unwrap();
        assert!(decoded.transcode);
        assert_eq!(decoded.origin_id, ORIGIN_ID);
        assert_eq!(decoded.template_id, expected_template);
        assert_eq!(decoded.alist_path, "/aliyun/movies/film.mkv");
    }

    // and a re-resolved request selecting the synthesized id still lands on
    // the origin source's path
    let compound_id = previews[0].get("Id").and_then(Value::as_str).unwrap();
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("api_key", "client-key")
        .append_pair("MediaSourceId", compound_id)
        .finish();
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/emby/Items/42/PlaybackInfo?{query}"))
        .body(Bytes::new())
        .expect("request");

    let reselected = gw.resolve_item_info(&request).unwrap();
    assert!(reselected.ms_info.transcode);
    assert_eq!(reselected.ms_info.origin_id, ORIGIN_ID);
}

#[tokio::test]
async fn test_pipeline_surfaces_upstream_failures() {
    let mut emby = MockEmby::new();
    emby.expect_fetch().times(1).returning(|_, _, _| {
        Ok(EmbyReply {
            code: 502,
            message: "bad gateway".to_string(),
            data: Value::Null,
        })
    });

    let gw = gateway(emby, MockAlist::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/emby/Items/42/PlaybackInfo?api_key=k")
        .body(Bytes::new())
        .expect("request");

    let item_info = gw.resolve_item_info(&request).unwrap();
    let err = gw.resolve_storage_path(&item_info).await.unwrap_err();
    assert!(err.to_string().contains("bad gateway"));
}
