//! `msgwire encode` — pack a JSON record file into one batch buffer.

use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use msgwire_batch::{BatchEncodeResult, BatchEncoder, EncoderConfig};
use msgwire_commitlog::CommitLogCodec;
use msgwire_core::MessageRecord;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// One record as written in the input file. The body is given either as
/// UTF-8 text (`body`) or hex (`body_hex`).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordSpec {
    pub topic: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_hex: Option<String>,
    #[serde(default)]
    pub queue_id: i32,
    #[serde(default)]
    pub flag: i32,
    #[serde(default)]
    pub queue_offset: i64,
    #[serde(default)]
    pub commit_log_offset: i64,
    #[serde(default)]
    pub born_timestamp: i64,
    #[serde(default)]
    pub store_timestamp: i64,
    #[serde(default)]
    pub born_host: Option<SocketAddr>,
    #[serde(default)]
    pub store_host: Option<SocketAddr>,
    #[serde(default)]
    pub reconsume_times: i32,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

impl RecordSpec {
    pub fn into_record(self) -> Result<MessageRecord> {
        let body = match (self.body, self.body_hex) {
            (Some(_), Some(_)) => bail!("record '{}': give either body or body_hex, not both", self.topic),
            (Some(text), None) => text.into_bytes(),
            (None, Some(h)) => hex::decode(h.strip_prefix("0x").unwrap_or(&h))
                .with_context(|| format!("record '{}': invalid body_hex", self.topic))?,
            (None, None) => Vec::new(),
        };

        let mut record = MessageRecord::new(self.topic, body);
        record.queue_id = self.queue_id;
        record.flag = self.flag;
        record.queue_offset = self.queue_offset;
        record.commit_log_offset = self.commit_log_offset;
        record.born_timestamp = self.born_timestamp;
        record.store_timestamp = self.store_timestamp;
        record.reconsume_times = self.reconsume_times;
        record.properties = self.properties;
        if let Some(addr) = self.born_host {
            record = record.with_born_host(addr);
        }
        if let Some(addr) = self.store_host {
            record = record.with_store_host(addr);
        }
        Ok(record)
    }
}

/// Parse the input document into records.
pub fn parse_records(json: &str) -> Result<Vec<MessageRecord>> {
    let specs: Vec<RecordSpec> =
        serde_json::from_str(json).context("input must be a JSON array of records")?;
    specs.into_iter().map(RecordSpec::into_record).collect()
}

/// One-line report printed after every encode.
pub fn summary(result: &BatchEncodeResult) -> String {
    format!(
        "Encoded {}/{} records into {} bytes",
        result.encoded_count(),
        result.total_input,
        result.buffer.len()
    )
}

pub fn run(input: &str, output: Option<&str>, print_hex: bool, config: Option<&str>) -> Result<()> {
    let content = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
    let mut records = parse_records(&content)?;

    let owned;
    let encoder = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            let config = EncoderConfig::from_json_str(&text)
                .map_err(|e| anyhow!("invalid encoder config {path}: {e}"))?;
            owned = BatchEncoder::with_config(Arc::new(CommitLogCodec::new()), config);
            &owned
        }
        None => BatchEncoder::shared(),
    };

    let result = encoder.encode_batch_report(&mut records);

    for failure in &result.failures {
        eprintln!("✗ record {} ({}): {}", failure.index, failure.topic, failure.error);
    }
    if !result.failures.is_empty() {
        warn!(dropped = result.failures.len(), input, "some records were left out of the batch");
    }
    info!(
        input,
        encoded = result.encoded_count(),
        total = result.total_input,
        bytes = result.buffer.len(),
        "batch encoded"
    );
    eprintln!("{}", summary(&result));

    if let Some(path) = output {
        std::fs::write(path, &result.buffer).with_context(|| format!("writing {path}"))?;
    }
    if output.is_none() || print_hex {
        println!("{}", hex::encode(&result.buffer));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgwire_core::sys_flag;

    #[test]
    fn parses_text_and_hex_bodies() {
        let records = parse_records(
            r#"[
                { "topic": "A", "body": "x" },
                { "topic": "B", "body_hex": "0x7979" },
                { "topic": "C" }
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].body, b"x");
        assert_eq!(records[1].body, b"yy");
        assert!(records[2].body.is_empty());
    }

    #[test]
    fn ipv6_host_sets_sys_flag() {
        let records = parse_records(
            r#"[{ "topic": "A", "body": "x", "store_host": "[::1]:10911", "queue_id": 2 }]"#,
        )
        .unwrap();
        assert!(records[0].has_sys_flag(sys_flag::STOREHOST_V6));
        assert!(!records[0].has_sys_flag(sys_flag::BORNHOST_V6));
        assert_eq!(records[0].queue_id, 2);
    }

    #[test]
    fn properties_keep_file_order() {
        let records = parse_records(
            r#"[{ "topic": "A", "properties": { "TAGS": "t", "KEYS": "k" } }]"#,
        )
        .unwrap();
        let keys: Vec<&str> = records[0].properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["TAGS", "KEYS"]);
    }

    #[test]
    fn summary_counts_dropped_records() {
        let mut records = parse_records(
            r#"[
                { "topic": "A", "body": "x" },
                { "topic": "B", "body": "y", "store_host": "[::1]:10911" }
            ]"#,
        )
        .unwrap();
        records[1].sys_flag = 0;

        let result = BatchEncoder::shared().encode_batch_report(&mut records);
        let expected_len = CommitLogCodec::new().encoded_len(&records[0]).unwrap();
        assert_eq!(
            summary(&result),
            format!("Encoded 1/2 records into {expected_len} bytes")
        );
    }

    #[test]
    fn rejects_ambiguous_body() {
        assert!(parse_records(r#"[{ "topic": "A", "body": "x", "body_hex": "78" }]"#).is_err());
    }

    #[test]
    fn rejects_bad_hex_and_unknown_fields() {
        assert!(parse_records(r#"[{ "topic": "A", "body_hex": "zz" }]"#).is_err());
        assert!(parse_records(r#"[{ "topic": "A", "colour": "red" }]"#).is_err());
    }
}
