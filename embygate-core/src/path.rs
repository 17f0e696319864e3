//! Emby → Alist path translation
//!
//! Emby sees library files under its own mount points; Alist addresses the
//! same files under storage-specific roots. Translation applies the first
//! matching configured prefix rule. When the primary translated path turns
//! out not to exist on the backend, discovery retries the same sub-path
//! under every configured Alist root, in configuration order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("no mapping rule matches path: {0}")]
    NoRuleMatches(String),

    #[error("no alternate alist roots configured")]
    NoRootsConfigured,
}

/// One prefix mapping rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRule {
    /// Path prefix as Emby reports it
    pub emby: String,
    /// Replacement prefix on the Alist side
    pub alist: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Prefix rules, tried in order
    pub rules: Vec<PathRule>,
    /// Alist mount roots used as fallback candidates
    pub alist_roots: Vec<String>,
}

/// A successful translation, keeping the sub-path for fallback candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslation {
    /// Primary Alist path for the file
    pub path: String,
    /// Sub-path below the matched rule, always `/`-prefixed
    pub suffix: String,
}

pub struct PathMapper {
    config: PathConfig,
}

impl PathMapper {
    #[must_use]
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }

    /// Translate an Emby library path into the primary Alist path.
    ///
    /// Windows separators are normalized first; Emby servers on Windows
    /// report backslashed paths.
    pub fn translate(&self, emby_path: &str) -> Result<PathTranslation, PathError> {
        let normalized = emby_path.replace('\\', "/");

        for rule in &self.config.rules {
            let prefix = rule.emby.trim_end_matches('/');
            if let Some(rest) = normalized.strip_prefix(prefix) {
                let suffix = format!("/{}", rest.trim_start_matches('/'));
                return Ok(PathTranslation {
                    path: format!("{}{}", rule.alist.trim_end_matches('/'), suffix),
                    suffix,
                });
            }
        }

        Err(PathError::NoRuleMatches(normalized))
    }

    /// Ordered fallback candidates: the translation's sub-path under every
    /// configured Alist root.
    pub fn alternates(&self, translation: &PathTranslation) -> Result<Vec<String>, PathError> {
        if self.config.alist_roots.is_empty() {
            return Err(PathError::NoRootsConfigured);
        }

        Ok(self
            .config
            .alist_roots
            .iter()
            .map(|root| format!("{}{}", root.trim_end_matches('/'), translation.suffix))
            .collect())
    }
}
