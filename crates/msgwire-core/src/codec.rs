//! The `MessageCodec` trait: the boundary between the batch encoder and a
//! concrete single-record wire layout.
//!
//! The trait is object-safe so codecs can be stored as
//! `Arc<dyn MessageCodec>` inside the batch encoder and shared across
//! threads without additional locking.

use crate::error::EncodeError;
use crate::message::MessageRecord;

/// Converts one record into its exact byte representation.
///
/// # Contract
/// - Reads `topic`, `body` and any other record field it needs.
/// - A `store_size` of `0` means "recompute"; a positive value is taken as
///   already computed.
/// - May fail for malformed input; the failure concerns this record only.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`.
pub trait MessageCodec: Send + Sync {
    /// Encode a single record. `compress` asks the codec to compress the
    /// body when the record's sys flag marks it compressible.
    fn encode(&self, record: &MessageRecord, compress: bool) -> Result<Vec<u8>, EncodeError>;

    /// Identifier used in diagnostics and metrics.
    fn name(&self) -> &'static str {
        "custom"
    }
}
