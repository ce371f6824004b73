//! Swap quotes and the pre-submission confirmation gate

use crate::constant_product::ConstantProduct;
use crate::error::{QuoteError, Result};
use crate::policy::{ImpactLevel, ImpactPolicy};
use crate::pool::{PoolSnapshot, SwapDirection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Preview of a swap against one snapshot; recomputed on every input change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub direction: SwapDirection,
    pub amount_in: u128,
    pub effective_in: u128,
    pub amount_out: u128,
    pub no_impact_out: u128,
    pub price_impact_pct: Decimal,
    pub slippage_bps: u32,
    pub min_out: u128,
}

impl SwapQuote {
    /// Gate run when the user confirms, before anything touches the network
    ///
    /// Returns the impact level so callers can surface a warning.
    pub fn confirm(&self, policy: &ImpactPolicy) -> Result<ImpactLevel> {
        if self.min_out == 0 {
            return Err(QuoteError::SlippageTooHigh {
                min_out: self.min_out,
            });
        }

        match policy.classify(self.price_impact_pct) {
            ImpactLevel::Blocked => Err(QuoteError::PriceImpactTooHigh {
                impact_pct: self.price_impact_pct,
                limit_pct: policy.block_pct,
            }),
            level => Ok(level),
        }
    }
}

/// Pure quote functions over a [`PoolSnapshot`]
pub struct QuoteEngine;

impl QuoteEngine {
    /// Quote an exact-input swap
    pub fn quote_swap(
        pool: &PoolSnapshot,
        direction: SwapDirection,
        amount_in: u128,
        slippage_bps: u32,
    ) -> Result<SwapQuote> {
        let (reserve_in, reserve_out) = pool.reserves_for(direction);
        let effective_in = ConstantProduct::effective_input(amount_in, pool.total_fee_bps());
        let amount_out = ConstantProduct::amount_out(effective_in, reserve_in, reserve_out)?;
        let no_impact_out = ConstantProduct::no_impact_out(effective_in, reserve_in, reserve_out)?;
        let price_impact_pct =
            ConstantProduct::price_impact_pct(effective_in, reserve_in, reserve_out);
        let min_out = ConstantProduct::min_out(amount_out, slippage_bps);

        debug!(
            "Quoted pool {} {:?}: in={} effective={} out={} impact={}% min_out={}",
            pool.pool_id, direction, amount_in, effective_in, amount_out, price_impact_pct, min_out
        );

        Ok(SwapQuote {
            direction,
            amount_in,
            effective_in,
            amount_out,
            no_impact_out,
            price_impact_pct,
            slippage_bps,
            min_out,
        })
    }

    /// Quote an exact-output swap: find the input, then quote it forward
    ///
    /// The forward quote may deliver slightly more than `amount_out` because
    /// the input is rounded up.
    pub fn quote_exact_output(
        pool: &PoolSnapshot,
        direction: SwapDirection,
        amount_out: u128,
        slippage_bps: u32,
    ) -> Result<SwapQuote> {
        let (reserve_in, reserve_out) = pool.reserves_for(direction);
        let amount_in = ConstantProduct::required_input(
            amount_out,
            reserve_in,
            reserve_out,
            pool.total_fee_bps(),
        )?;
        Self::quote_swap(pool, direction, amount_in, slippage_bps)
    }
}
