//! Ledger RPC interface
//!
//! The execution layer only depends on [`LedgerRpc`]; the JSON-RPC transport in
//! [`crate::json_rpc`] is one implementation and test doubles are another.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use types::{CoinObject, CoinType, ObjectId, ObjectRef, SignedTransaction, TransactionBlock, TransactionDigest};

/// An object as read from the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerObject {
    pub object_ref: ObjectRef,
    /// Fully qualified Move type, `0x..::pool::Pool<A, B>`
    pub object_type: Option<String>,
    /// Present when the object is shared
    pub initial_shared_version: Option<u64>,
    /// Move struct fields as JSON
    pub fields: serde_json::Value,
}

#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Read an object with its type, owner and content
    async fn get_object(&self, object_id: &ObjectId) -> Result<LedgerObject>;

    /// Total balance of one coin type held by `owner`
    async fn get_balance(&self, owner: &ObjectId, coin_type: &CoinType) -> Result<u128>;

    /// Every coin object of `coin_type` owned by `owner`, all pages
    async fn get_coins(&self, owner: &ObjectId, coin_type: &CoinType) -> Result<Vec<CoinObject>>;

    /// Submit a signed transaction, returning its digest
    async fn execute_transaction(&self, signed: &SignedTransaction) -> Result<TransactionDigest>;

    /// Look up a submitted transaction with effects and events
    async fn get_transaction(&self, digest: &TransactionDigest) -> Result<TransactionBlock>;
}

/// Read an integer the ledger may encode as a JSON string or number
///
/// Wrapper structs such as `Balance` and `Supply` nest the value under
/// `value` or `fields.value`.
pub fn json_u128(value: &serde_json::Value) -> Option<u128> {
    match value {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_u64().map(u128::from),
        serde_json::Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("fields"))
            .and_then(json_u128),
        _ => None,
    }
}
