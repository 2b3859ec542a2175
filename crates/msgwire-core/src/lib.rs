//! # msgwire-core
//!
//! Core types shared across all msgwire crates: the in-memory
//! [`MessageRecord`], the [`MessageCodec`] boundary every wire codec
//! implements, and the [`EncodeError`] a codec reports for a single record.
//! The batch encoder and the commit-log codec are both built on top of the
//! interfaces defined here.

pub mod codec;
pub mod error;
pub mod message;

pub use codec::MessageCodec;
pub use error::EncodeError;
pub use message::{sys_flag, MessageRecord, NAME_VALUE_SEPARATOR, PROPERTY_SEPARATOR};
