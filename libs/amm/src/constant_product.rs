//! Constant-product (x*y=k) math with exact integer calculations
//!
//! All inputs and outputs are raw token units. Products are evaluated in
//! arbitrary precision and every division floors, matching the contract.

use crate::error::{QuoteError, Result};
use crate::math::{apply_bps_haircut, mul_div, mul_div_ceil};
use crate::pool::BPS_DENOMINATOR;
use num_bigint::BigUint;
use num_traits::Zero;
use rust_decimal::Decimal;

/// Fractional digits carried by price-impact percentages
pub const IMPACT_SCALE: u32 = 6;

/// Constant-product formulas with zero precision loss
pub struct ConstantProduct;

impl ConstantProduct {
    /// Input left after fees: `amount_in * (10000 - fee_bps) / 10000`
    ///
    /// Total fees of 100% or more clamp to zero instead of going negative.
    pub fn effective_input(amount_in: u128, fee_bps: u32) -> u128 {
        apply_bps_haircut(amount_in, fee_bps)
    }

    /// Exact output for an already fee-discounted input
    ///
    /// `effective_in * reserve_out / (reserve_in + effective_in)`, using the
    /// raw reserves. An empty side or zero input quotes zero.
    pub fn amount_out(effective_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128> {
        if effective_in == 0 || reserve_in == 0 || reserve_out == 0 {
            return Ok(0);
        }

        let numerator = BigUint::from(effective_in) * BigUint::from(reserve_out);
        let denominator = BigUint::from(reserve_in) + BigUint::from(effective_in);

        // Bounded by reserve_out, so it always fits
        u128::try_from(numerator / denominator).map_err(|_| QuoteError::Overflow {
            operation: "amount_out",
        })
    }

    /// Output at the current ratio, ignoring the trade's own price movement
    pub fn no_impact_out(effective_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128> {
        if reserve_in == 0 {
            return Ok(0);
        }
        mul_div(effective_in, reserve_out, reserve_in).ok_or(QuoteError::Overflow {
            operation: "no_impact_out",
        })
    }

    /// Price impact as a percentage with [`IMPACT_SCALE`] fractional digits
    ///
    /// `(no_impact_out - amount_out) / no_impact_out * 100`. Returns zero when
    /// either reserve or the effective input is zero.
    pub fn price_impact_pct(effective_in: u128, reserve_in: u128, reserve_out: u128) -> Decimal {
        if reserve_in == 0 || reserve_out == 0 || effective_in == 0 {
            return Decimal::ZERO;
        }

        let no_impact =
            BigUint::from(effective_in) * BigUint::from(reserve_out) / BigUint::from(reserve_in);
        if no_impact.is_zero() {
            return Decimal::ZERO;
        }

        let actual = BigUint::from(effective_in) * BigUint::from(reserve_out)
            / (BigUint::from(reserve_in) + BigUint::from(effective_in));
        let shortfall = if actual > no_impact {
            BigUint::zero()
        } else {
            &no_impact - actual
        };

        // percent * 10^IMPACT_SCALE, never above 100 * 10^IMPACT_SCALE
        let scaled = shortfall * BigUint::from(100u32) * BigUint::from(10u32).pow(IMPACT_SCALE)
            / no_impact;
        match i64::try_from(scaled) {
            Ok(value) => Decimal::new(value, IMPACT_SCALE),
            Err(_) => Decimal::ONE_HUNDRED,
        }
    }

    /// Minimum acceptable output: `amount_out * (10000 - slippage_bps) / 10000`
    pub fn min_out(amount_out: u128, slippage_bps: u32) -> u128 {
        apply_bps_haircut(amount_out, slippage_bps)
    }

    /// Input needed to receive exactly `amount_out` (reverse calculation)
    ///
    /// Rounds up at both steps so the resulting input always suffices.
    pub fn required_input(
        amount_out: u128,
        reserve_in: u128,
        reserve_out: u128,
        fee_bps: u32,
    ) -> Result<u128> {
        if amount_out == 0 {
            return Ok(0);
        }
        if amount_out >= reserve_out || reserve_in == 0 {
            return Err(QuoteError::InsufficientLiquidity {
                requested: amount_out,
                available: reserve_out,
            });
        }
        if fee_bps >= BPS_DENOMINATOR {
            return Err(QuoteError::FeeTooHigh { fee_bps });
        }

        let effective_in = mul_div_ceil(amount_out, reserve_in, reserve_out - amount_out)
            .ok_or(QuoteError::Overflow {
                operation: "required_input",
            })?;

        mul_div_ceil(
            effective_in,
            u128::from(BPS_DENOMINATOR),
            u128::from(BPS_DENOMINATOR - fee_bps),
        )
        .ok_or(QuoteError::Overflow {
            operation: "required_input",
        })
    }
}
