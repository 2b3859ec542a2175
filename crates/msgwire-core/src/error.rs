//! Error types for the msgwire encode pipeline.

use thiserror::Error;

/// Errors a codec can raise while encoding a single record.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Topic too long: {len} bytes does not fit a one-byte length prefix")]
    TopicTooLong { len: usize },

    #[error("Body too large: {len} bytes")]
    BodyTooLarge { len: usize },

    #[error("Properties too long: {len} bytes does not fit a two-byte length prefix")]
    PropertiesTooLong { len: usize },

    #[error("Invalid property '{key}': key or value contains a reserved separator")]
    InvalidProperty { key: String },

    #[error("Host family mismatch for {field}: sys flag expects {expected}")]
    HostFamilyMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Store size mismatch: record declares {declared}, encoding needs {computed}")]
    StoreSizeMismatch { declared: i32, computed: usize },

    #[error("Body compression requested but no compressor is available")]
    CompressionUnsupported,

    #[error("{0}")]
    Other(String),
}

impl EncodeError {
    /// Short, stable label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            EncodeError::TopicTooLong { .. } => "topic_too_long",
            EncodeError::BodyTooLarge { .. } => "body_too_large",
            EncodeError::PropertiesTooLong { .. } => "properties_too_long",
            EncodeError::InvalidProperty { .. } => "invalid_property",
            EncodeError::HostFamilyMismatch { .. } => "host_family_mismatch",
            EncodeError::StoreSizeMismatch { .. } => "store_size_mismatch",
            EncodeError::CompressionUnsupported => "compression_unsupported",
            EncodeError::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = EncodeError::StoreSizeMismatch {
            declared: 999,
            computed: 120,
        };
        assert_eq!(
            err.to_string(),
            "Store size mismatch: record declares 999, encoding needs 120"
        );
        assert_eq!(err.kind(), "store_size_mismatch");
    }

    #[test]
    fn other_is_passthrough() {
        let err = EncodeError::Other("unsupported charset".into());
        assert_eq!(err.to_string(), "unsupported charset");
        assert_eq!(err.kind(), "other");
    }
}
