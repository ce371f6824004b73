//! Coin types, owned coin objects and coin metadata

use crate::error::TypeError;
use crate::object::{ObjectId, ObjectRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified type tag of the network's native gas asset
pub const NATIVE_COIN_TYPE: &str = "0x2::sui::SUI";

/// Move type tag of a fungible asset, e.g. `0x2::sui::SUI`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinType(String);

impl CoinType {
    /// Validate `<address>::<module>::<name>` and keep the original spelling
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let mut parts = input.splitn(3, "::");
        let (address, module, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(m), Some(n)) if !m.is_empty() && !n.is_empty() => (a, m, n),
            _ => {
                return Err(TypeError::InvalidCoinType {
                    input: input.to_string(),
                })
            }
        };
        ObjectId::parse(address).map_err(|_| TypeError::InvalidCoinType {
            input: input.to_string(),
        })?;
        Ok(Self(format!("{}::{}::{}", address, module, name)))
    }

    pub fn native() -> Self {
        Self(NATIVE_COIN_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against the native asset regardless of short/long address form
    pub fn is_native(&self) -> bool {
        self.normalized() == CoinType::native().normalized()
    }

    /// Address part expanded to 64 hex chars, for comparisons and pair keys
    pub fn normalized(&self) -> String {
        match self.0.split_once("::") {
            Some((address, rest)) => match ObjectId::parse(address) {
                Ok(id) => format!("{}::{}", id, rest),
                Err(_) => self.0.clone(),
            },
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for CoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owned coin object with its raw balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub coin_type: CoinType,
    pub object_ref: ObjectRef,
    pub balance: u64,
}

/// Display metadata for one side of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinMetadata {
    pub coin_type: CoinType,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}
