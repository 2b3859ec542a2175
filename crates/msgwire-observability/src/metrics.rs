//! msgwire metrics definitions.
//!
//! All metrics use OpenTelemetry conventions and can be exported through
//! whatever meter provider the host application installs.

use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Central metrics handle for the batch encoder.
#[derive(Clone)]
pub struct EncoderMetrics {
    pub records_encoded: Counter<u64>,
    pub records_dropped: Counter<u64>,
    pub oversized_topics: Counter<u64>,
    pub batch_bytes: Histogram<u64>,
}

impl EncoderMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            records_encoded: meter
                .u64_counter("msgwire.records_encoded")
                .with_description("Records successfully encoded")
                .init(),
            records_dropped: meter
                .u64_counter("msgwire.records_dropped")
                .with_description("Records dropped from a batch after an encode failure")
                .init(),
            oversized_topics: meter
                .u64_counter("msgwire.oversized_topics")
                .with_description("Records whose topic exceeds the warning length")
                .init(),
            batch_bytes: meter
                .u64_histogram("msgwire.batch_bytes")
                .with_description("Size of each encoded batch buffer in bytes")
                .init(),
        }
    }

    pub fn record_encoded(&self, codec: &str) {
        self.records_encoded
            .add(1, &[KeyValue::new("codec", codec.to_string())]);
    }

    pub fn record_dropped(&self, codec: &str, error_type: &str) {
        self.records_dropped.add(
            1,
            &[
                KeyValue::new("codec", codec.to_string()),
                KeyValue::new("error_type", error_type.to_string()),
            ],
        );
    }

    pub fn record_oversized_topic(&self) {
        self.oversized_topics.add(1, &[]);
    }

    pub fn record_batch(&self, bytes: usize, codec: &str) {
        self.batch_bytes
            .record(bytes as u64, &[KeyValue::new("codec", codec.to_string())]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_against_noop_meter() {
        let meter = opentelemetry::global::meter("msgwire-test");
        let metrics = EncoderMetrics::new(&meter);
        metrics.record_encoded("commitlog");
        metrics.record_dropped("commitlog", "topic_too_long");
        metrics.record_oversized_topic();
        metrics.record_batch(1024, "commitlog");
    }
}
