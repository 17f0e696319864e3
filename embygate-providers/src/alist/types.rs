//! Alist HTTP API Types

use serde::Deserialize;
use serde_json::Value;

/// Generic Alist API response wrapper.
///
/// Alist answers HTTP 200 even for application-level failures; the real
/// status lives in `code`. `data` is `null` on most failures, so it is
/// optional here and checked after the code.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct AlistResp<T> {
    pub code: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// File/folder information from `fs/get`
#[derive(Debug, Clone, Deserialize)]
pub struct FsGetResp {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "is_dir", default)]
    pub is_dir: bool,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(rename = "type", default)]
    pub r#type: u64,
    #[serde(default)]
    pub raw_url: String,
    #[serde(default)]
    pub provider: String,
}

/// Raw `fs/other` envelope.
///
/// The discovery engine interprets the code itself (200 vs 403 vs anything
/// else), so this is deliberately not collapsed into an error on non-200.
/// `data` keeps the backend's document shape untouched.
#[derive(Debug)]
pub struct FsOtherReply {
    pub code: u64,
    pub message: String,
    pub data: Value,
}

impl From<AlistResp<Value>> for FsOtherReply {
    fn from(resp: AlistResp<Value>) -> Self {
        Self {
            code: resp.code,
            message: resp.message,
            data: resp.data.unwrap_or(Value::Null),
        }
    }
}
