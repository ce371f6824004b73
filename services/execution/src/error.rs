//! Error types for building, submitting and confirming transactions

use crate::abort::AbortInfo;
use sluice_adapters::{LedgerError, SignerError};
use sluice_amm::{AmountError, Decimal, QuoteError};
use thiserror::Error;
use types::TransactionDigest;

/// Result type alias for execution operations
pub type Result<T> = std::result::Result<T, ExecutionError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Bad user input, caught before anything touches the network
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// No combination of owned coin objects covers the payment
    #[error("Insufficient {coin_type}: required {required}, available {available}")]
    InsufficientFunds {
        coin_type: String,
        required: u128,
        available: u128,
    },

    #[error("Slippage too high: minimum output is {min_out}")]
    SlippageTooHigh { min_out: u128 },

    #[error("Price impact {impact_pct}% exceeds the {limit_pct}% limit")]
    PriceImpactTooHigh { impact_pct: Decimal, limit_pct: Decimal },

    /// Quote failed for a reason other than the confirmation gate
    #[error("Quote failed: {0}")]
    Quote(QuoteError),

    /// Reading pools or coins before building failed
    #[error("Ledger read failed: {0}")]
    Ledger(LedgerError),

    /// A status lookup failed with something other than "not yet indexed"
    #[error("Lookup for {digest} failed: {source}")]
    FatalLookup {
        digest: TransactionDigest,
        source: LedgerError,
    },

    /// The transaction executed and failed on chain
    #[error("Transaction {digest} failed: {message}")]
    ContractAbort {
        digest: TransactionDigest,
        abort: Option<AbortInfo>,
        message: String,
    },

    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The node refused the signed transaction
    #[error("Submission failed: {0}")]
    Submission(LedgerError),

    /// Payload could not be assembled from the given values
    #[error("Failed to build transaction: {0}")]
    Build(String),
}

impl From<QuoteError> for ExecutionError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::Amount(amount) => ExecutionError::from(amount),
            QuoteError::SlippageTooHigh { min_out } => ExecutionError::SlippageTooHigh { min_out },
            QuoteError::PriceImpactTooHigh {
                impact_pct,
                limit_pct,
            } => ExecutionError::PriceImpactTooHigh {
                impact_pct,
                limit_pct,
            },
            other => ExecutionError::Quote(other),
        }
    }
}

impl From<AmountError> for ExecutionError {
    fn from(err: AmountError) -> Self {
        ExecutionError::InvalidAmount(err.to_string())
    }
}

impl From<LedgerError> for ExecutionError {
    fn from(err: LedgerError) -> Self {
        ExecutionError::Ledger(err)
    }
}

impl ExecutionError {
    /// Rejected locally, before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ExecutionError::InvalidAmount(_)
                | ExecutionError::SlippageTooHigh { .. }
                | ExecutionError::PriceImpactTooHigh { .. }
                | ExecutionError::Quote(_)
        )
    }
}
