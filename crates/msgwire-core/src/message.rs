//! The in-memory message record consumed by every codec.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Separates a property name from its value in the serialized form.
pub const NAME_VALUE_SEPARATOR: char = '\u{1}';
/// Terminates each name/value pair in the serialized form.
pub const PROPERTY_SEPARATOR: char = '\u{2}';

/// Bits carried in [`MessageRecord::sys_flag`].
pub mod sys_flag {
    /// Body is (or should be) compressed.
    pub const COMPRESSED: i32 = 0x1;
    /// `born_host` is an IPv6 address.
    pub const BORNHOST_V6: i32 = 0x1 << 4;
    /// `store_host` is an IPv6 address.
    pub const STOREHOST_V6: i32 = 0x1 << 5;
}

/// One logical message unit to be serialized.
///
/// `store_size` is a derived length: a codec treats `0` as "recompute" and
/// any positive value as "already computed". Encoders reset it before each
/// encode, so it should not be relied on to survive an encode call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Destination topic
    pub topic: String,
    /// Opaque payload
    pub body: Vec<u8>,
    /// Total encoded length, `0` when not yet computed
    #[serde(default)]
    pub store_size: i32,
    #[serde(default)]
    pub body_crc: i32,
    #[serde(default)]
    pub queue_id: i32,
    /// User-defined flag
    #[serde(default)]
    pub flag: i32,
    /// Logical offset within the queue
    #[serde(default)]
    pub queue_offset: i64,
    /// Physical offset within the commit log
    #[serde(default)]
    pub commit_log_offset: i64,
    /// See [`sys_flag`]
    #[serde(default)]
    pub sys_flag: i32,
    /// Producer-side timestamp (ms)
    #[serde(default)]
    pub born_timestamp: i64,
    #[serde(default = "unspecified_host")]
    pub born_host: SocketAddr,
    /// Broker-side timestamp (ms)
    #[serde(default)]
    pub store_timestamp: i64,
    #[serde(default = "unspecified_host")]
    pub store_host: SocketAddr,
    #[serde(default)]
    pub reconsume_times: i32,
    #[serde(default)]
    pub prepared_transaction_offset: i64,
    /// User and system properties in insertion order
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}

fn unspecified_host() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
}

impl MessageRecord {
    pub fn new(topic: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
            store_size: 0,
            body_crc: 0,
            queue_id: 0,
            flag: 0,
            queue_offset: 0,
            commit_log_offset: 0,
            sys_flag: 0,
            born_timestamp: 0,
            born_host: unspecified_host(),
            store_timestamp: 0,
            store_host: unspecified_host(),
            reconsume_times: 0,
            prepared_transaction_offset: 0,
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the producer address, keeping `BORNHOST_V6` in step with its family.
    pub fn with_born_host(mut self, addr: SocketAddr) -> Self {
        self.sys_flag = toggle(self.sys_flag, sys_flag::BORNHOST_V6, addr.is_ipv6());
        self.born_host = addr;
        self
    }

    /// Set the broker address, keeping `STOREHOST_V6` in step with its family.
    pub fn with_store_host(mut self, addr: SocketAddr) -> Self {
        self.sys_flag = toggle(self.sys_flag, sys_flag::STOREHOST_V6, addr.is_ipv6());
        self.store_host = addr;
        self
    }

    /// Serialize the properties as `name 0x01 value 0x02` pairs.
    pub fn properties_string(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.properties {
            out.push_str(name);
            out.push(NAME_VALUE_SEPARATOR);
            out.push_str(value);
            out.push(PROPERTY_SEPARATOR);
        }
        out
    }

    pub fn has_sys_flag(&self, flag: i32) -> bool {
        self.sys_flag & flag == flag
    }
}

fn toggle(flags: i32, bit: i32, on: bool) -> i32 {
    if on {
        flags | bit
    } else {
        flags & !bit
    }
}
