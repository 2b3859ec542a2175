//! Batch encoder configuration.

use serde::{Deserialize, Serialize};

/// Largest topic length a signed one-byte prefix can carry.
pub const SIGNED_BYTE_TOPIC_LIMIT: usize = i8::MAX as usize;

/// Tunables for [`BatchEncoder`](crate::BatchEncoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderConfig {
    /// Topics longer than this many bytes are logged as a warning.
    /// They are still encoded unchanged.
    #[serde(default = "default_topic_warn_len")]
    pub topic_warn_len: usize,
}

fn default_topic_warn_len() -> usize {
    SIGNED_BYTE_TOPIC_LIMIT
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            topic_warn_len: default_topic_warn_len(),
        }
    }
}

impl EncoderConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
