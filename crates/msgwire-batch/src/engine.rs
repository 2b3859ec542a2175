//! `BatchEncoder` — encodes records one by one and packs the successes into
//! a single buffer.

use crate::config::EncoderConfig;
use msgwire_commitlog::CommitLogCodec;
use msgwire_core::{error::EncodeError, message::MessageRecord, MessageCodec};
use msgwire_observability::EncoderMetrics;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

static SHARED: OnceLock<BatchEncoder> = OnceLock::new();

/// A record that was dropped from a batch.
#[derive(Debug)]
pub struct EncodeFailure {
    /// Position of the record in the input
    pub index: usize,
    pub topic: String,
    pub error: EncodeError,
}

/// Result of a batch encode job.
#[derive(Debug)]
pub struct BatchEncodeResult {
    /// Concatenated encodings of every successful record, in input order
    pub buffer: Vec<u8>,
    /// Records left out of `buffer`, in input order
    pub failures: Vec<EncodeFailure>,
    /// Total records submitted
    pub total_input: usize,
}

impl BatchEncodeResult {
    pub fn encoded_count(&self) -> usize {
        self.total_input - self.failures.len()
    }
}

/// Stateless batch encoder.
///
/// Immutable after construction, so one instance can serve any number of
/// threads by shared reference.
pub struct BatchEncoder {
    codec: Arc<dyn MessageCodec>,
    config: EncoderConfig,
    metrics: Option<EncoderMetrics>,
}

impl BatchEncoder {
    pub fn new(codec: Arc<dyn MessageCodec>) -> Self {
        Self::with_config(codec, EncoderConfig::default())
    }

    pub fn with_config(codec: Arc<dyn MessageCodec>, config: EncoderConfig) -> Self {
        Self {
            codec,
            config,
            metrics: None,
        }
    }

    /// Attach OpenTelemetry counters.
    pub fn with_metrics(mut self, metrics: EncoderMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Process-wide encoder over [`CommitLogCodec`] with default config.
    ///
    /// Built on first call; every caller, concurrent or not, gets the same
    /// instance.
    pub fn shared() -> &'static BatchEncoder {
        SHARED.get_or_init(|| BatchEncoder::new(Arc::new(CommitLogCodec::new())))
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }

    /// Encode a single record.
    ///
    /// Resets `record.store_size` to `0` before handing it to the codec so
    /// the size is always recomputed. The reset is visible to the caller.
    /// A topic longer than `topic_warn_len` is logged but encoded as is.
    /// The codec is always asked for the uncompressed, whole-record form.
    pub fn encode_one(&self, record: &mut MessageRecord) -> Result<Vec<u8>, EncodeError> {
        record.store_size = 0;

        if record.topic.len() > self.config.topic_warn_len {
            warn!(topic = %record.topic, len = record.topic.len(), "topic length is too long");
            if let Some(m) = &self.metrics {
                m.record_oversized_topic();
            }
        }

        self.codec.encode(record, false)
    }

    /// Encode `records` and concatenate the results in input order.
    ///
    /// Records that fail to encode are logged and left out; the call itself
    /// never fails. An empty slice yields an empty buffer.
    pub fn encode_batch(&self, records: &mut [MessageRecord]) -> Vec<u8> {
        self.encode_batch_report(records).buffer
    }

    /// Same as [`encode_batch`](Self::encode_batch), also returning which
    /// records were dropped and why.
    pub fn encode_batch_report(&self, records: &mut [MessageRecord]) -> BatchEncodeResult {
        let total_input = records.len();
        let codec = self.codec.name();

        let mut slots: Vec<Result<Vec<u8>, EncodeFailure>> = Vec::with_capacity(total_input);
        let mut total_bytes = 0usize;

        for (index, record) in records.iter_mut().enumerate() {
            let slot = match self.encode_one(record) {
                Ok(bytes) => {
                    total_bytes += bytes.len();
                    if let Some(m) = &self.metrics {
                        m.record_encoded(codec);
                    }
                    Ok(bytes)
                }
                Err(err) => {
                    error!(topic = %record.topic, index, error = %err, "failed to encode message, dropping it from batch");
                    if let Some(m) = &self.metrics {
                        m.record_dropped(codec, err.kind());
                    }
                    Err(EncodeFailure {
                        index,
                        topic: record.topic.clone(),
                        error: err,
                    })
                }
            };
            slots.push(slot);
        }

        let mut buffer = Vec::with_capacity(total_bytes);
        let mut failures = Vec::new();
        for slot in slots {
            match slot {
                Ok(bytes) => buffer.extend_from_slice(&bytes),
                Err(failure) => failures.push(failure),
            }
        }
        debug_assert_eq!(buffer.len(), total_bytes);

        if let Some(m) = &self.metrics {
            m.record_batch(buffer.len(), codec);
        }
        debug!(
            "BatchEncoder: {} of {} records encoded into {} bytes",
            total_input - failures.len(),
            total_input,
            buffer.len()
        );

        BatchEncodeResult {
            buffer,
            failures,
            total_input,
        }
    }
}
