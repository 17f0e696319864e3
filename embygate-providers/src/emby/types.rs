//! Emby HTTP API Types

use serde_json::Value;

/// Outcome of a forwarded Emby API call.
///
/// Mirrors what the upstream actually sent: the HTTP status, the body text
/// when the call failed, and the parsed JSON document when it succeeded.
/// Callers decide what a non-200 means for them.
#[derive(Debug)]
pub struct EmbyReply {
    pub code: u16,
    pub message: String,
    pub data: Value,
}

impl EmbyReply {
    /// Whether the upstream answered with a success status
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        let ok = EmbyReply {
            code: 200,
            message: String::new(),
            data: Value::Null,
        };
        let missing = EmbyReply {
            code: 404,
            message: "Not Found".to_string(),
            data: Value::Null,
        };

        assert!(ok.is_success());
        assert!(!missing.is_success());
    }
}
