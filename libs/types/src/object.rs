//! Object identifiers and references
//!
//! Every on-ledger entity (pool, coin, factory, clock) is an object addressed
//! by a 32-byte id. Owned objects are referenced by `(id, version, digest)`;
//! shared objects by `(id, initial_shared_version, mutable)`.

use crate::error::TypeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 32-byte ledger object id, rendered as `0x` + 64 lowercase hex chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    pub const LENGTH: usize = 32;

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse `0x`-prefixed hex; short forms such as `0x6` are left-padded
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidObjectId {
            input: input.to_string(),
        };

        let hex_part = input.strip_prefix("0x").ok_or_else(invalid)?;
        if hex_part.is_empty() || hex_part.len() > Self::LENGTH * 2 {
            return Err(invalid());
        }

        let padded = format!("{:0>64}", hex_part);
        let decoded = hex::decode(padded).map_err(|_| invalid())?;

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ObjectId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Reference to a specific version of an owned object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: String,
}

/// Shared object input (pools, factory, clock)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedObject {
    pub object_id: ObjectId,
    pub initial_shared_version: u64,
    pub mutable: bool,
}

impl SharedObject {
    /// The ledger's system clock, shared and read-only
    pub fn clock() -> Self {
        Self {
            object_id: ObjectId::from_bytes(clock_id_bytes()),
            initial_shared_version: 1,
            mutable: false,
        }
    }
}

const fn clock_id_bytes() -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[31] = 0x06;
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_is_left_padded() {
        let id = ObjectId::parse("0x6").unwrap();
        assert_eq!(id, SharedObject::clock().object_id);
        assert_eq!(
            id.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000006"
        );
    }

    #[test]
    fn test_rejects_malformed_ids() {
        assert!(ObjectId::parse("6").is_err());
        assert!(ObjectId::parse("0x").is_err());
        assert!(ObjectId::parse("0xzz").is_err());
        assert!(ObjectId::parse(&format!("0x{}", "a".repeat(65))).is_err());
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let id = ObjectId::parse("0xabc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.starts_with("\"0x0000"));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
