use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::path::PathConfig;

/// Gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub emby: EmbyConfig,
    pub alist: AlistConfig,
    pub path: PathConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbyConfig {
    /// Emby server origin, e.g. "http://emby:8096"
    pub host: String,
    /// Process-wide credential used when a request carries none
    pub api_key: String,
}

impl Default for EmbyConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8096".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlistConfig {
    /// Alist server origin, e.g. "http://alist:5244"
    pub host: String,
    /// Alist API token
    pub token: String,
}

impl Default for AlistConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:5244".to_string(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached PlaybackInfo documents
    pub max_capacity: u64,
    /// PlaybackInfo time-to-live in seconds
    pub playback_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1024,
            playback_ttl_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (EMBYGATE_EMBY_HOST, etc.)
        builder = builder.add_source(
            Environment::with_prefix("EMBYGATE")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathRule;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.emby.host, "http://localhost:8096");
        assert_eq!(config.alist.host, "http://localhost:5244");
        assert!(config.path.rules.is_empty());
        assert!(config.cache.max_capacity > 0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_path_rules_round_trip() {
        let config = Config {
            path: PathConfig {
                rules: vec![PathRule {
                    emby: "/mnt/aliyun".to_string(),
                    alist: "/aliyun".to_string(),
                }],
                alist_roots: vec!["/aliyun".to_string()],
            },
            ..Config::default()
        };

        let serialized = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.path.rules[0].emby, "/mnt/aliyun");
        assert_eq!(parsed.path.alist_roots, vec!["/aliyun"]);
    }
}
