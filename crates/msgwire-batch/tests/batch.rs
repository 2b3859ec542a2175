//! Integration tests for the batch encoder: failure isolation, logging,
//! the shared instance, and agreement with the commit-log codec.

use msgwire_batch::{BatchEncoder, EncoderConfig};
use msgwire_commitlog::CommitLogCodec;
use msgwire_core::{EncodeError, MessageCodec, MessageRecord};
use msgwire_observability::EncoderMetrics;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, prelude::*, Layer};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// `topic ++ body`, failing for any topic listed in `reject`.
struct ConcatCodec {
    reject: Vec<&'static str>,
}

impl ConcatCodec {
    fn new() -> Self {
        Self { reject: Vec::new() }
    }

    fn rejecting(reject: &[&'static str]) -> Self {
        Self {
            reject: reject.to_vec(),
        }
    }
}

impl MessageCodec for ConcatCodec {
    fn encode(&self, record: &MessageRecord, _compress: bool) -> Result<Vec<u8>, EncodeError> {
        if self.reject.contains(&record.topic.as_str()) {
            return Err(EncodeError::Other(format!("unsupported encoding in {}", record.topic)));
        }
        let mut out = record.topic.as_bytes().to_vec();
        out.extend_from_slice(&record.body);
        Ok(out)
    }
}

/// Counts events at one level.
struct LevelCounter {
    level: Level,
    count: Arc<AtomicUsize>,
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == self.level {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Run `f` with a subscriber that counts events at `level`.
fn count_events<T>(level: Level, f: impl FnOnce() -> T) -> (T, usize) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(LevelCounter {
        level,
        count: Arc::clone(&count),
    });
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, count.load(Ordering::SeqCst))
}

fn abc() -> Vec<MessageRecord> {
    vec![
        MessageRecord::new("A", b"x".to_vec()),
        MessageRecord::new("B", b"yy".to_vec()),
        MessageRecord::new("C", b"zzz".to_vec()),
    ]
}

// ─── Failure isolation ────────────────────────────────────────────────────────

#[test]
fn middle_failure_is_dropped_and_logged_once() {
    let encoder = BatchEncoder::new(Arc::new(ConcatCodec::rejecting(&["B"])));
    let mut records = abc();

    let (out, errors) = count_events(Level::ERROR, || encoder.encode_batch(&mut records));

    assert_eq!(out, b"AxCzzz");
    assert_eq!(out.len(), 6);
    assert_eq!(errors, 1);
}

#[test]
fn report_lists_dropped_records() {
    let encoder = BatchEncoder::new(Arc::new(ConcatCodec::rejecting(&["A", "C"])));
    let mut records = abc();

    let result = encoder.encode_batch_report(&mut records);

    assert_eq!(result.buffer, b"Byy");
    assert_eq!(result.total_input, 3);
    assert_eq!(result.encoded_count(), 1);
    let dropped: Vec<(usize, &str)> = result
        .failures
        .iter()
        .map(|f| (f.index, f.topic.as_str()))
        .collect();
    assert_eq!(dropped, vec![(0, "A"), (2, "C")]);
    assert!(matches!(result.failures[0].error, EncodeError::Other(_)));
}

#[test]
fn all_failures_yield_empty_buffer() {
    let encoder = BatchEncoder::new(Arc::new(ConcatCodec::rejecting(&["A", "B", "C"])));
    let mut records = abc();
    assert!(encoder.encode_batch(&mut records).is_empty());
}

#[test]
fn batch_equals_concatenated_singles() {
    let encoder = BatchEncoder::new(Arc::new(ConcatCodec::new()));
    let mut singles = abc();
    let expected: Vec<u8> = singles
        .iter_mut()
        .flat_map(|r| encoder.encode_one(r).unwrap())
        .collect();

    let mut records = abc();
    assert_eq!(encoder.encode_batch(&mut records), expected);
}

// ─── Oversized topics ─────────────────────────────────────────────────────────

#[test]
fn long_topic_warns_but_is_encoded() {
    let encoder = BatchEncoder::new(Arc::new(ConcatCodec::new()));
    let mut records = vec![
        MessageRecord::new("t".repeat(128), b"1".to_vec()),
        MessageRecord::new("t".repeat(127), b"2".to_vec()),
    ];

    let (out, warnings) = count_events(Level::WARN, || encoder.encode_batch(&mut records));

    assert_eq!(out.len(), 129 + 128);
    assert_eq!(warnings, 1);
}

#[test]
fn warning_threshold_is_configurable() {
    let config = EncoderConfig { topic_warn_len: 4 };
    let encoder = BatchEncoder::with_config(Arc::new(ConcatCodec::new()), config);
    let mut record = MessageRecord::new("orders", Vec::new());

    let (out, warnings) = count_events(Level::WARN, || encoder.encode_one(&mut record));

    assert!(out.is_ok());
    assert_eq!(warnings, 1);
}

// ─── Commit-log codec ─────────────────────────────────────────────────────────

#[test]
fn commitlog_batch_length_is_sum_of_singles() {
    let codec = CommitLogCodec::new();
    let encoder = BatchEncoder::new(Arc::new(codec));
    let mut records: Vec<MessageRecord> = (0..10)
        .map(|i| {
            MessageRecord::new(format!("Topic{i}"), vec![i as u8; i * 3])
                .with_property("KEYS", format!("k{i}"))
        })
        .collect();

    let expected: usize = records.iter().map(|r| codec.encoded_len(r).unwrap()).sum();
    assert_eq!(encoder.encode_batch(&mut records).len(), expected);
}

#[test]
fn stale_store_size_is_recomputed() {
    let encoder = BatchEncoder::new(Arc::new(CommitLogCodec::new()));
    let mut record = MessageRecord::new("TopicTest", b"body".to_vec());
    record.store_size = 999;

    // The codec alone refuses the stale size; through the encoder it is reset.
    assert!(CommitLogCodec::new().encode(&record, false).is_err());
    let bytes = encoder.encode_one(&mut record).unwrap();

    assert_eq!(record.store_size, 0);
    assert_eq!(i32::from_be_bytes(bytes[0..4].try_into().unwrap()) as usize, bytes.len());
}

#[test]
fn codec_errors_drop_only_the_bad_record() {
    let encoder = BatchEncoder::new(Arc::new(CommitLogCodec::new()));
    let mut records = vec![
        MessageRecord::new("ok-1", b"a".to_vec()),
        MessageRecord::new("x".repeat(300), b"b".to_vec()),
        MessageRecord::new("ok-2", b"c".to_vec()),
    ];
    let first = CommitLogCodec::new().encode(&records[0], false).unwrap();
    let third = CommitLogCodec::new().encode(&records[2], false).unwrap();

    let result = encoder.encode_batch_report(&mut records);

    assert_eq!(result.buffer, [first, third].concat());
    assert_eq!(result.failures.len(), 1);
    assert!(matches!(
        result.failures[0].error,
        EncodeError::TopicTooLong { len: 300 }
    ));
}

// ─── Shared instance ──────────────────────────────────────────────────────────

#[test]
fn shared_instance_encodes_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let mut records = vec![MessageRecord::new(format!("T{i}"), b"payload".to_vec())];
                BatchEncoder::shared().encode_batch(&mut records).len()
            })
        })
        .collect();

    let expected = CommitLogCodec::new()
        .encoded_len(&MessageRecord::new("T0", b"payload".to_vec()))
        .unwrap();
    for h in handles {
        assert_eq!(h.join().unwrap(), expected);
    }
}

// ─── Metrics ──────────────────────────────────────────────────────────────────

#[test]
fn metrics_hook_does_not_change_output() {
    let meter = opentelemetry::global::meter("msgwire-batch-test");
    let encoder = BatchEncoder::new(Arc::new(ConcatCodec::rejecting(&["B"])))
        .with_metrics(EncoderMetrics::new(&meter));
    let mut records = abc();
    assert_eq!(encoder.encode_batch(&mut records), b"AxCzzz");
}
