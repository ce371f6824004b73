//! # Sluice AMM Library - Off-chain Quote Engine
//!
//! ## Purpose
//!
//! Mirrors the on-chain constant-product-with-fees math so a client can
//! preview swap output, slippage minimums, LP minimums and price impact before
//! spending gas. The contract remains the source of truth; this crate only
//! reproduces its formulas exactly enough to warn or block ahead of time.
//!
//! ## Integration Points
//!
//! - **Input Sources**: user-typed decimal strings, pool snapshots fetched by
//!   the ledger adapter
//! - **Output Destinations**: transaction builder arguments (`min_out`,
//!   `min_lp_out`), quote HTTP endpoint, UI previews
//! - **Precision**: raw integer units end to end; intermediate products are
//!   carried in arbitrary-precision `BigUint`, never floating point
//!
//! ## Formula Summary
//!
//! ```text
//! fee_bps        = 100 + lp_builder + burn + creator_royalty + rewards
//! effective_in   = amount_in * (10000 - fee_bps) / 10000      (0 if fee_bps >= 10000)
//! amount_out     = effective_in * reserve_out / (reserve_in + effective_in)
//! no_impact_out  = effective_in * reserve_out / reserve_in
//! impact_pct     = (no_impact_out - amount_out) / no_impact_out * 100
//! min_out        = amount_out * (10000 - slippage_bps) / 10000
//! ```

pub mod amount;
pub mod constant_product;
pub mod error;
pub mod liquidity;
pub mod math;
pub mod policy;
pub mod pool;
pub mod quote;

pub use amount::{parse_slippage_bps, to_display_amount, to_raw_amount, TokenAmount};
pub use constant_product::ConstantProduct;
pub use error::{AmountError, QuoteError, Result};
pub use liquidity::{LiquidityQuote, PoolSide, RemoveLiquidityQuote};
pub use policy::{ImpactLevel, ImpactPolicy};
pub use pool::{FeeSchedule, PoolSnapshot, SwapDirection, BASE_FEE_BPS, BPS_DENOMINATOR};
pub use quote::{QuoteEngine, SwapQuote};

/// Common types for quote consumers
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
