//! Error types for the adapters module

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Message fragment the ledger returns for a digest it has not indexed yet
pub const NOT_YET_INDEXED: &str = "Could not find the referenced transaction";

/// Errors from the ledger JSON-RPC endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Digest lookup raced the indexer; the same request may succeed later
    #[error("Transaction not yet indexed: {detail}")]
    NotYetIndexed { detail: String },

    /// Any other error object in a JSON-RPC response
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Object id does not exist or was deleted
    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: String },

    /// Request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response arrived but is missing data this client needs
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response body is not the expected JSON
    #[error("Failed to parse JSON: {0}")]
    JsonParse(String),
}

impl LedgerError {
    /// Classify a JSON-RPC error object
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(NOT_YET_INDEXED) {
            LedgerError::NotYetIndexed { detail: message }
        } else {
            LedgerError::Rpc { code, message }
        }
    }

    /// Only "not yet indexed" lookups are worth polling again
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::NotYetIndexed { .. })
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        LedgerError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::JsonParse(err.to_string())
    }
}

/// Errors raised by the wallet while signing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The user declined in the wallet
    #[error("Signing rejected: {0}")]
    Rejected(String),

    /// No wallet connected or the wallet failed
    #[error("Wallet unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the pool/coin metadata service
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Invalid metadata URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Metadata request failed: {0}")]
    Transport(String),

    #[error("Metadata service returned status {status}")]
    Status { status: u16 },

    #[error("Failed to parse metadata: {0}")]
    JsonParse(String),
}

impl From<reqwest::Error> for MetadataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MetadataError::JsonParse(err.to_string())
        } else {
            MetadataError::Transport(err.to_string())
        }
    }
}

/// Errors from the activity-flag endpoint
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivityError {
    /// Non-2xx status other than 409
    #[error("Activity endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Activity request failed: {0}")]
    Transport(String),

    #[error("Invalid activity URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ActivityError {
    /// Every failure here is worth another attempt except a bad URL
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ActivityError::InvalidUrl { .. })
    }
}

impl From<reqwest::Error> for ActivityError {
    fn from(err: reqwest::Error) -> Self {
        ActivityError::Transport(err.to_string())
    }
}
