//! # msgwire-batch
//!
//! Turns a list of stored messages into one response body.
//!
//! ## Features
//! - Single-record encode with store-size recomputation
//! - Best-effort batches: a record that fails to encode is logged and
//!   dropped, the rest are packed contiguously in input order
//! - Output buffer allocated once, sized to the exact sum of encodings
//! - Process-wide shared encoder for call sites without injection
//!
//! ## Usage
//! ```
//! use msgwire_batch::BatchEncoder;
//! use msgwire_core::MessageRecord;
//!
//! let mut records = vec![
//!     MessageRecord::new("TopicTest", b"first".to_vec()),
//!     MessageRecord::new("TopicTest", b"second".to_vec()),
//! ];
//! let body = BatchEncoder::shared().encode_batch(&mut records);
//! assert!(!body.is_empty());
//! ```

pub mod config;
pub mod engine;

pub use config::EncoderConfig;
pub use engine::{BatchEncodeResult, BatchEncoder, EncodeFailure};
