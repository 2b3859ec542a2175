//! Commit-log layout codec: the single-record encoder behind the default
//! batch encoder.
//!
//! All integers are big-endian. Host width depends on the record's
//! `BORNHOST_V6` / `STOREHOST_V6` sys flags.

use bytes::BufMut;
use msgwire_core::{
    error::EncodeError,
    message::{sys_flag, MessageRecord, NAME_VALUE_SEPARATOR, PROPERTY_SEPARATOR},
    MessageCodec,
};
use std::net::{IpAddr, SocketAddr};

/// Magic code identifying a v1 commit-log record.
pub const MESSAGE_MAGIC_CODE: i32 = -626_843_481;

/// IPv4 address (4) + port (4).
pub const IPV4_HOST_LEN: usize = 8;
/// IPv6 address (16) + port (4).
pub const IPV6_HOST_LEN: usize = 20;

/// Bytes taken by every field whose width does not depend on the record,
/// length prefixes included.
pub const FIXED_LEN: usize = 4 // total size
    + 4 // magic code
    + 4 // body crc
    + 4 // queue id
    + 4 // flag
    + 8 // queue offset
    + 8 // physical offset
    + 4 // sys flag
    + 8 // born timestamp
    + 8 // store timestamp
    + 4 // reconsume times
    + 8 // prepared transaction offset
    + 4 // body length
    + 1 // topic length
    + 2; // properties length

/// Encodes records into the commit-log layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitLogCodec;

impl CommitLogCodec {
    pub fn new() -> Self {
        Self
    }

    /// The number of bytes `encode` would produce for `record`, ignoring
    /// its current `store_size`.
    pub fn encoded_len(&self, record: &MessageRecord) -> Result<usize, EncodeError> {
        Layout::of(record).map(|l| l.total)
    }
}

/// Sizes resolved once per record before anything is written.
struct Layout {
    properties: String,
    total: usize,
}

impl Layout {
    fn of(record: &MessageRecord) -> Result<Self, EncodeError> {
        let topic_len = record.topic.len();
        if topic_len > u8::MAX as usize {
            return Err(EncodeError::TopicTooLong { len: topic_len });
        }

        let body_len = record.body.len();
        if body_len > i32::MAX as usize {
            return Err(EncodeError::BodyTooLarge { len: body_len });
        }

        for (name, value) in &record.properties {
            if contains_separator(name) || contains_separator(value) {
                return Err(EncodeError::InvalidProperty { key: name.clone() });
            }
        }
        let properties = record.properties_string();
        if properties.len() > i16::MAX as usize {
            return Err(EncodeError::PropertiesTooLong {
                len: properties.len(),
            });
        }

        let born = host_len(record, sys_flag::BORNHOST_V6, &record.born_host, "born_host")?;
        let store = host_len(record, sys_flag::STOREHOST_V6, &record.store_host, "store_host")?;

        let total = FIXED_LEN + born + store + body_len + topic_len + properties.len();
        if total > i32::MAX as usize {
            return Err(EncodeError::BodyTooLarge { len: body_len });
        }

        Ok(Self { properties, total })
    }
}

fn contains_separator(s: &str) -> bool {
    s.contains(NAME_VALUE_SEPARATOR) || s.contains(PROPERTY_SEPARATOR)
}

fn host_len(
    record: &MessageRecord,
    flag: i32,
    addr: &SocketAddr,
    field: &'static str,
) -> Result<usize, EncodeError> {
    let v6 = record.has_sys_flag(flag);
    if v6 != addr.is_ipv6() {
        return Err(EncodeError::HostFamilyMismatch {
            field,
            expected: if v6 { "ipv6" } else { "ipv4" },
        });
    }
    Ok(if v6 { IPV6_HOST_LEN } else { IPV4_HOST_LEN })
}

fn put_host(buf: &mut Vec<u8>, addr: &SocketAddr) {
    match addr.ip() {
        IpAddr::V4(ip) => buf.put_slice(&ip.octets()),
        IpAddr::V6(ip) => buf.put_slice(&ip.octets()),
    }
    buf.put_i32(i32::from(addr.port()));
}

impl MessageCodec for CommitLogCodec {
    fn encode(&self, record: &MessageRecord, compress: bool) -> Result<Vec<u8>, EncodeError> {
        if compress && record.has_sys_flag(sys_flag::COMPRESSED) {
            return Err(EncodeError::CompressionUnsupported);
        }

        let layout = Layout::of(record)?;
        if record.store_size > 0 && record.store_size as usize != layout.total {
            return Err(EncodeError::StoreSizeMismatch {
                declared: record.store_size,
                computed: layout.total,
            });
        }

        let mut buf = Vec::with_capacity(layout.total);
        // Layout::of has bounded every length below to its prefix width.
        buf.put_i32(layout.total as i32);
        buf.put_i32(MESSAGE_MAGIC_CODE);
        buf.put_i32(record.body_crc);
        buf.put_i32(record.queue_id);
        buf.put_i32(record.flag);
        buf.put_i64(record.queue_offset);
        buf.put_i64(record.commit_log_offset);
        buf.put_i32(record.sys_flag);
        buf.put_i64(record.born_timestamp);
        put_host(&mut buf, &record.born_host);
        buf.put_i64(record.store_timestamp);
        put_host(&mut buf, &record.store_host);
        buf.put_i32(record.reconsume_times);
        buf.put_i64(record.prepared_transaction_offset);
        buf.put_i32(record.body.len() as i32);
        buf.put_slice(&record.body);
        buf.put_u8(record.topic.len() as u8);
        buf.put_slice(record.topic.as_bytes());
        buf.put_i16(layout.properties.len() as i16);
        buf.put_slice(layout.properties.as_bytes());

        debug_assert_eq!(buf.len(), layout.total);
        Ok(buf)
    }

    fn name(&self) -> &'static str {
        "commitlog"
    }
}
