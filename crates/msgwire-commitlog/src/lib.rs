//! # msgwire-commitlog
//!
//! Reference [`MessageCodec`](msgwire_core::MessageCodec) producing the
//! commit-log message layout: a fixed header of offsets, timestamps and
//! host addresses followed by length-prefixed body, topic and properties.
//!
//! ## Usage
//! ```
//! use msgwire_commitlog::CommitLogCodec;
//! use msgwire_core::{MessageCodec, MessageRecord};
//!
//! let record = MessageRecord::new("TopicTest", b"hello".to_vec());
//! let bytes = CommitLogCodec::new().encode(&record, false).unwrap();
//! assert_eq!(bytes.len(), 75 + 16 + 5 + 9);
//! ```

pub mod codec;

pub use codec::{CommitLogCodec, FIXED_LEN, MESSAGE_MAGIC_CODE};
