pub mod cache;
pub mod config;
pub mod logging;
pub mod media;
pub mod path;

pub use cache::PlaybackInfoCache;
pub use config::Config;
pub use media::{find_media_source_name, ItemInfo, MediaError, MediaGateway, MsInfo};
pub use path::{PathMapper, PathTranslation};
