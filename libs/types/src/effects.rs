//! Transaction effects and events as reported by the ledger

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base58 transaction digest returned on submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionDigest(pub String);

impl TransactionDigest {
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal execution status from transaction effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub gas_used: Option<u64>,
}

/// Event emitted by a Move module during execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    /// Fully qualified event struct type, `0x..::pool::LiquidityAdded<..>`
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: serde_json::Value,
}

impl LedgerEvent {
    /// Event struct name without address, module or type parameters
    pub fn name(&self) -> &str {
        let without_generics = self
            .event_type
            .split_once('<')
            .map(|(head, _)| head)
            .unwrap_or(&self.event_type);
        without_generics
            .rsplit("::")
            .next()
            .unwrap_or(without_generics)
    }
}

/// Transaction as returned by a by-digest lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBlock {
    pub digest: TransactionDigest,
    pub effects: TransactionEffects,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

impl TransactionBlock {
    /// First event whose struct name matches `name`
    pub fn find_event(&self, name: &str) -> Option<&LedgerEvent> {
        self.events.iter().find(|event| event.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_strips_path_and_generics() {
        let event = LedgerEvent {
            event_type: "0xabc::pool::LiquidityAdded<0x2::sui::SUI, 0xdef::usdc::USDC>"
                .to_string(),
            parsed_json: serde_json::Value::Null,
        };
        assert_eq!(event.name(), "LiquidityAdded");
    }

    #[test]
    fn test_status_deserializes_from_rpc_shape() {
        let ok: ExecutionStatus = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.is_success());

        let failed: ExecutionStatus =
            serde_json::from_str(r#"{"status":"failure","error":"MoveAbort(..)"}"#).unwrap();
        assert_eq!(
            failed,
            ExecutionStatus::Failure {
                error: "MoveAbort(..)".to_string()
            }
        );
    }
}
