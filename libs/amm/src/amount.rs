//! Conversion between display decimal strings and raw integer amounts
//!
//! Tokens carry heterogeneous decimal counts (6 for USDC, 9 for SUI, ...).
//! Parsing truncates extra fractional digits instead of rounding; display
//! truncates to the requested precision. Nothing in between rounds.

use crate::error::AmountError;
use crate::pool::BPS_DENOMINATOR;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Raw integer amount tagged with the token's decimal count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: u128,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: u128, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Parse a user-typed decimal string
    pub fn parse(input: &str, decimals: u8) -> Result<Self, AmountError> {
        Ok(Self::new(to_raw_amount(input, decimals)?, decimals))
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn checked_add(self, other: TokenAmount) -> Result<TokenAmount, AmountError> {
        self.ensure_same_decimals(&other)?;
        self.raw
            .checked_add(other.raw)
            .map(|raw| TokenAmount::new(raw, self.decimals))
            .ok_or(AmountError::Overflow {
                decimals: self.decimals,
            })
    }

    /// Saturates at zero
    pub fn saturating_sub(self, other: TokenAmount) -> Result<TokenAmount, AmountError> {
        self.ensure_same_decimals(&other)?;
        Ok(TokenAmount::new(
            self.raw.saturating_sub(other.raw),
            self.decimals,
        ))
    }

    /// Re-express in another precision; scaling down floors
    pub fn rescale(self, decimals: u8) -> Result<TokenAmount, AmountError> {
        if decimals == self.decimals {
            return Ok(self);
        }
        let raw = if decimals > self.decimals {
            let factor = pow10(decimals - self.decimals)?;
            self.raw
                .checked_mul(factor)
                .ok_or(AmountError::Overflow { decimals })?
        } else {
            self.raw / pow10(self.decimals - decimals)?
        };
        Ok(TokenAmount::new(raw, decimals))
    }

    /// Display string truncated to `precision` fractional digits
    pub fn display(&self, precision: Option<u8>) -> String {
        to_display_amount(self.raw, self.decimals, precision)
    }

    fn ensure_same_decimals(&self, other: &TokenAmount) -> Result<(), AmountError> {
        if self.decimals != other.decimals {
            return Err(AmountError::DecimalsMismatch {
                left: self.decimals,
                right: other.decimals,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(None))
    }
}

fn pow10(exponent: u8) -> Result<u128, AmountError> {
    10u128
        .checked_pow(u32::from(exponent))
        .ok_or(AmountError::Overflow { decimals: exponent })
}

/// Parse a non-negative decimal string into raw units
///
/// Accepts `"12"`, `"12.5"`, `".5"` and `"12."`. Fractional digits beyond
/// `decimals` are dropped.
pub fn to_raw_amount(input: &str, decimals: u8) -> Result<u128, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::invalid(input, "empty"));
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::invalid(input, "negative"));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (trimmed, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::invalid(input, "no digits"));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(AmountError::invalid(input, "not a decimal number"));
    }

    let kept_frac = if frac_part.len() > decimals as usize {
        debug!(
            "Truncating '{}' to {} fractional digits",
            trimmed, decimals
        );
        &frac_part[..decimals as usize]
    } else {
        frac_part
    };

    let scale = pow10(decimals)?;
    let overflow = || AmountError::Overflow { decimals };

    let whole = if int_part.is_empty() {
        0
    } else {
        int_part.parse::<u128>().map_err(|_| overflow())?
    };

    let frac = if kept_frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", kept_frac, width = decimals as usize);
        padded.parse::<u128>().map_err(|_| overflow())?
    };

    whole
        .checked_mul(scale)
        .and_then(|value| value.checked_add(frac))
        .ok_or_else(overflow)
}

/// Render raw units as a decimal string
///
/// Trailing zeros are stripped. With `Some(precision)` the fraction is
/// truncated (never rounded) to at most that many digits.
pub fn to_display_amount(raw: u128, decimals: u8, precision: Option<u8>) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);

    let frac_part = match precision {
        Some(precision) if (precision as usize) < frac_part.len() => {
            &frac_part[..precision as usize]
        }
        _ => frac_part,
    };
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Slippage percent string to basis points: `round(percent * 100)`
pub fn parse_slippage_bps(percent: &str) -> Result<u32, AmountError> {
    let trimmed = percent.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|_| AmountError::invalid(percent, "not a decimal number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::invalid(percent, "negative"));
    }

    let bps = (value * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .ok_or_else(|| AmountError::invalid(percent, "out of range"))?;

    if bps > BPS_DENOMINATOR {
        debug!("Slippage {}% exceeds 100%, minimums will be zero", trimmed);
    }
    Ok(bps)
}
