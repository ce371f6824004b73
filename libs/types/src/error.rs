//! Error types for identifier and type-tag validation

use thiserror::Error;

/// Errors raised while parsing ledger identifiers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Object id is not `0x`-prefixed hex of at most 32 bytes
    #[error("Invalid object id: '{input}'")]
    InvalidObjectId { input: String },

    /// Coin type is not of the form `<address>::<module>::<name>`
    #[error("Invalid coin type: '{input}'")]
    InvalidCoinType { input: String },
}
