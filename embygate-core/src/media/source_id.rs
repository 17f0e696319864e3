//! Compound media-source identifier codec
//!
//! A synthesized MediaSource id has to survive a round trip through Emby
//! clients untouched, stay distinguishable from Emby's own ids, and carry
//! everything needed to reconstruct the rendition it names. Four fields,
//! joined by a fixed separator:
//!
//! `<origin id><SEP><template id><SEP><width>x<height><SEP><encoded alist path>`

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

use super::error::MediaError;

/// Separator token inside synthesized MediaSource ids. Long and unusual
/// enough that neither a native id nor a percent-encoded path contains it.
pub const SOURCE_ID_SEGMENT: &str = "[[_]]";

/// Longest id Emby itself hands out. Anything longer must be compound;
/// upstream compatibility depends on this exact threshold.
const NATIVE_ID_MAX_LEN: usize = 32;

/// Decoded form of a client-supplied MediaSource id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsInfo {
    /// No id was supplied at all
    pub empty: bool,
    /// The id as received, undecoded
    pub raw_id: String,
    /// Emby's native MediaSource id
    pub origin_id: String,
    /// Whether the id names a transcoded rendition
    pub transcode: bool,
    pub template_id: String,
    /// Rendition format, e.g. "1920x1080"
    pub format: String,
    /// Storage backend path of the source file
    pub alist_path: String,
    /// Display prefix, e.g. "FHD_1920x1080"
    pub source_name_prefix: String,
}

impl MsInfo {
    /// Selector for requests that carry no MediaSource id
    #[must_use]
    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Self::default()
        }
    }
}

/// Build the compound id for a transcoded rendition.
///
/// The storage path is percent-encoded so it can never collide with the
/// separator; [`resolve_media_source_id`] undoes the encoding.
#[must_use]
pub fn compound_source_id(
    origin_id: &str,
    template_id: &str,
    format: &str,
    alist_path: &str,
) -> String {
    format!(
        "{origin_id}{sep}{template_id}{sep}{format}{sep}{path}",
        sep = SOURCE_ID_SEGMENT,
        path = utf8_percent_encode(alist_path, NON_ALPHANUMERIC),
    )
}

/// Decode a client-supplied MediaSource id.
///
/// Empty ids mean "no selection"; ids within the native length are Emby's
/// own; anything longer must split into exactly four fields or the id is
/// rejected outright.
pub fn resolve_media_source_id(id: &str) -> Result<MsInfo, MediaError> {
    if id.is_empty() {
        return Ok(MsInfo::empty());
    }

    let mut info = MsInfo {
        raw_id: id.to_string(),
        ..MsInfo::default()
    };

    if id.len() <= NATIVE_ID_MAX_LEN {
        info.origin_id = id.to_string();
        return Ok(info);
    }

    let segments: Vec<&str> = id.split(SOURCE_ID_SEGMENT).collect();
    if segments.len() != 4 {
        return Err(MediaError::MalformedSourceId(id.to_string()));
    }

    info.transcode = true;
    info.origin_id = segments[0].to_string();
    info.template_id = segments[1].to_string();
    info.format = segments[2].to_string();
    info.alist_path = percent_decode_str(segments[3])
        .decode_utf8_lossy()
        .into_owned();
    info.source_name_prefix = format!("{}_{}", info.template_id, info.format);
    Ok(info)
}
