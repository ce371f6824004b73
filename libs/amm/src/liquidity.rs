//! Liquidity quotes: add, paired deposit and remove
//!
//! LP amounts are proportional to the smaller side of a deposit relative to
//! current reserves. A pool with no LP supply or an empty reserve has no ratio
//! to protect, so its minimums are zero.

use crate::constant_product::ConstantProduct;
use crate::error::{QuoteError, Result};
use crate::math::mul_div;
use crate::pool::PoolSnapshot;
use crate::quote::QuoteEngine;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One side of a pool's reserve pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSide {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityQuote {
    pub expected_lp_out: u128,
    pub min_lp_out: u128,
    /// Pool had no prior ratio; `min_lp_out` is zero
    pub first_deposit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveLiquidityQuote {
    pub lp_amount: u128,
    pub amount_a_out: u128,
    pub amount_b_out: u128,
    pub min_a_out: u128,
    pub min_b_out: u128,
}

fn lp_overflow() -> QuoteError {
    QuoteError::Overflow {
        operation: "liquidity",
    }
}

impl QuoteEngine {
    /// Quote the LP tokens minted for a two-sided deposit
    pub fn quote_add_liquidity(
        pool: &PoolSnapshot,
        deposit_a: u128,
        deposit_b: u128,
        slippage_bps: u32,
    ) -> Result<LiquidityQuote> {
        if pool.lp_supply == 0 || pool.reserve_a == 0 || pool.reserve_b == 0 {
            // Estimate only; the contract decides the initial mint
            let product = BigUint::from(deposit_a) * BigUint::from(deposit_b);
            let expected_lp_out = u128::try_from(product.sqrt()).map_err(|_| lp_overflow())?;
            debug!(
                "First deposit into pool {}: no LP minimum enforced",
                pool.pool_id
            );
            return Ok(LiquidityQuote {
                expected_lp_out,
                min_lp_out: 0,
                first_deposit: true,
            });
        }

        let lp_from_a = mul_div(pool.lp_supply, deposit_a, pool.reserve_a).ok_or_else(lp_overflow)?;
        let lp_from_b = mul_div(pool.lp_supply, deposit_b, pool.reserve_b).ok_or_else(lp_overflow)?;
        let expected_lp_out = lp_from_a.min(lp_from_b);

        Ok(LiquidityQuote {
            expected_lp_out,
            min_lp_out: ConstantProduct::min_out(expected_lp_out, slippage_bps),
            first_deposit: false,
        })
    }

    /// Counter-side amount that keeps a deposit at the current reserve ratio
    ///
    /// `None` when the pool has an empty reserve and any ratio is accepted.
    pub fn quote_paired_deposit(
        pool: &PoolSnapshot,
        side: PoolSide,
        amount: u128,
    ) -> Result<Option<u128>> {
        let (reserve_this, reserve_other) = match side {
            PoolSide::A => (pool.reserve_a, pool.reserve_b),
            PoolSide::B => (pool.reserve_b, pool.reserve_a),
        };
        if reserve_this == 0 || reserve_other == 0 {
            return Ok(None);
        }
        mul_div(amount, reserve_other, reserve_this)
            .map(Some)
            .ok_or_else(lp_overflow)
    }

    /// Quote the reserves returned for burning `lp_amount` LP tokens
    pub fn quote_remove_liquidity(
        pool: &PoolSnapshot,
        lp_amount: u128,
        slippage_bps: u32,
    ) -> Result<RemoveLiquidityQuote> {
        if lp_amount > pool.lp_supply || pool.lp_supply == 0 {
            return Err(QuoteError::InsufficientLiquidity {
                requested: lp_amount,
                available: pool.lp_supply,
            });
        }

        let amount_a_out = mul_div(pool.reserve_a, lp_amount, pool.lp_supply).ok_or_else(lp_overflow)?;
        let amount_b_out = mul_div(pool.reserve_b, lp_amount, pool.lp_supply).ok_or_else(lp_overflow)?;

        Ok(RemoveLiquidityQuote {
            lp_amount,
            amount_a_out,
            amount_b_out,
            min_a_out: ConstantProduct::min_out(amount_a_out, slippage_bps),
            min_b_out: ConstantProduct::min_out(amount_b_out, slippage_bps),
        })
    }
}
