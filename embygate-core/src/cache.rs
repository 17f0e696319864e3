//! Playback-info response cache
//!
//! PlaybackInfo documents are expensive round trips to Emby and stable for
//! the lifetime of a playback session, so resolved documents are held in
//! an in-memory moka cache keyed by the fully-qualified fetch URI (which
//! already encodes item, source selection, and credential).

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::CacheConfig;
use crate::media::ItemInfo;

#[derive(Clone)]
pub struct PlaybackInfoCache {
    inner: moka::future::Cache<String, Arc<Value>>,
}

impl PlaybackInfoCache {
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        let inner = moka::future::CacheBuilder::new(config.max_capacity)
            .time_to_live(Duration::from_secs(config.playback_ttl_seconds))
            .build();
        Self { inner }
    }

    fn key(item_info: &ItemInfo) -> &str {
        &item_info.playback_info_uri
    }

    pub async fn get(&self, item_info: &ItemInfo) -> Option<Arc<Value>> {
        self.inner.get(Self::key(item_info)).await
    }

    pub async fn insert(&self, item_info: &ItemInfo, document: Arc<Value>) {
        self.inner
            .insert(Self::key(item_info).to_string(), document)
            .await;
    }
}
