//! Protocol constants and tuning defaults
//!
//! Module names fixed by the deployed package, plus client-side timing
//! defaults.

/// Move modules of the AMM package
pub mod modules {
    pub const POOL: &str = "pool";
    pub const FACTORY: &str = "factory";
}

/// Event struct names emitted on success
pub mod events {
    pub const LIQUIDITY_ADDED: &str = "LiquidityAdded";
    pub const LIQUIDITY_REMOVED: &str = "LiquidityRemoved";
    pub const POOL_CREATED: &str = "PoolCreated";
}

/// Confirmation polling
pub mod confirmation {
    pub const INITIAL_DELAY_MS: u64 = 3_000;
    pub const POLL_INTERVAL_MS: u64 = 5_000;
    pub const MAX_ATTEMPTS: u32 = 10;
    /// Accepted range for `max_attempts`
    pub const MIN_ATTEMPTS: u32 = 8;
    pub const MAX_ATTEMPTS_CEILING: u32 = 20;
    /// Single wait before re-fetching a transaction whose event is missing
    pub const EVENT_REFETCH_DELAY_MS: u64 = 5_000;
}

/// Activity-flag reconciliation
pub mod activity {
    /// One initial attempt plus three retries
    pub const MAX_ATTEMPTS: u32 = 4;
    pub const BASE_DELAY_MS: u64 = 2_000;
    pub const MAX_DELAY_MS: u64 = 8_000;

    /// Reward-balance thresholds in display units, keyed by reserve symbol
    pub const DEFAULT_THRESHOLDS: &[(&str, u64)] = &[("SUI", 1_000), ("USDC", 2_500), ("USDT", 2_500)];
}

/// Quote previews
pub mod quote {
    pub const DEBOUNCE_MS: u64 = 300;
    pub const DEFAULT_SLIPPAGE_BPS: u32 = 50;
    pub const WARN_IMPACT_PCT: u32 = 5;
    pub const BLOCK_IMPACT_PCT: u32 = 15;
}

/// Default gas budget in raw native units (0.05 SUI)
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;
