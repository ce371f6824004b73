//! Error types for amount parsing and quote validation

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias for quote operations
pub type Result<T> = std::result::Result<T, QuoteError>;

/// Errors from converting between display strings and raw integer amounts
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// User input is not a non-negative decimal number
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: &'static str },

    /// Scaled value does not fit the raw integer type
    #[error("Amount overflow while scaling to {decimals} decimals")]
    Overflow { decimals: u8 },

    /// Arithmetic attempted between amounts of different precision
    #[error("Decimals mismatch: {left} vs {right}")]
    DecimalsMismatch { left: u8, right: u8 },
}

impl AmountError {
    pub(crate) fn invalid(input: &str, reason: &'static str) -> Self {
        AmountError::InvalidAmount {
            input: input.to_string(),
            reason,
        }
    }
}

/// Errors raised by quote computation or the confirmation gate
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Slippage tolerance leaves nothing to receive
    #[error("Slippage too high: minimum output is {min_out}")]
    SlippageTooHigh { min_out: u128 },

    /// Trade moves the price past the blocking threshold
    #[error("Price impact {impact_pct}% exceeds the {limit_pct}% limit")]
    PriceImpactTooHigh { impact_pct: Decimal, limit_pct: Decimal },

    /// Requested output or LP burn exceeds what the pool holds
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u128, available: u128 },

    /// Total fee leaves no input to trade with
    #[error("Fee of {fee_bps} bps leaves no tradable input")]
    FeeTooHigh { fee_bps: u32 },

    /// Result does not fit in 128 bits
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },
}
