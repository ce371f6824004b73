//! Pool snapshot and fee schedule

use serde::{Deserialize, Serialize};

/// Basis-point denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Protocol fee charged on every swap on top of the pool's configurable fees
pub const BASE_FEE_BPS: u32 = 100;

/// Configurable per-pool fees, all in basis points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub lp_builder_bps: u32,
    pub burn_bps: u32,
    pub creator_royalty_bps: u32,
    pub rewards_bps: u32,
}

impl FeeSchedule {
    /// Total fee including the implicit base fee
    pub fn total_bps(&self) -> u32 {
        BASE_FEE_BPS
            .saturating_add(self.lp_builder_bps)
            .saturating_add(self.burn_bps)
            .saturating_add(self.creator_royalty_bps)
            .saturating_add(self.rewards_bps)
    }
}

/// Which reserve the user pays into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    AToB,
    BToA,
}

impl SwapDirection {
    pub fn from_a_to_b(a_to_b: bool) -> Self {
        if a_to_b {
            SwapDirection::AToB
        } else {
            SwapDirection::BToA
        }
    }

    /// Entry function name on the pool module
    pub fn function_name(&self) -> &'static str {
        match self {
            SwapDirection::AToB => "swap_a_for_b",
            SwapDirection::BToA => "swap_b_for_a",
        }
    }
}

/// Immutable view of a pool's on-chain state at fetch time, raw units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: String,
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub fees: FeeSchedule,
    pub lp_supply: u128,
    pub locked_lp: u128,
    pub burned_lp: u128,
    pub reward_balance: u128,
    pub creator_royalty_wallet: String,
}

impl PoolSnapshot {
    /// `(reserve_in, reserve_out)` for a trade direction
    pub fn reserves_for(&self, direction: SwapDirection) -> (u128, u128) {
        match direction {
            SwapDirection::AToB => (self.reserve_a, self.reserve_b),
            SwapDirection::BToA => (self.reserve_b, self.reserve_a),
        }
    }

    pub fn total_fee_bps(&self) -> u32 {
        self.fees.total_bps()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_fee_includes_base() {
        let fees = FeeSchedule {
            lp_builder_bps: 20,
            burn_bps: 10,
            creator_royalty_bps: 5,
            rewards_bps: 15,
        };
        assert_eq!(fees.total_bps(), 150);
        assert_eq!(FeeSchedule::default().total_bps(), BASE_FEE_BPS);
    }

    #[test]
    fn test_reserves_follow_direction() {
        let pool = PoolSnapshot {
            reserve_a: 1,
            reserve_b: 2,
            ..Default::default()
        };
        assert_eq!(pool.reserves_for(SwapDirection::AToB), (1, 2));
        assert_eq!(pool.reserves_for(SwapDirection::BToA), (2, 1));
    }
}
