//! Price-impact thresholds applied before a swap is submitted

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Impact at or above which a non-blocking warning is shown
pub const DEFAULT_WARN_IMPACT_PCT: Decimal = dec!(5);

/// Impact at or above which submission is refused
pub const DEFAULT_BLOCK_IMPACT_PCT: Decimal = dec!(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Acceptable,
    Warning,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactPolicy {
    pub warn_pct: Decimal,
    pub block_pct: Decimal,
}

impl Default for ImpactPolicy {
    fn default() -> Self {
        Self {
            warn_pct: DEFAULT_WARN_IMPACT_PCT,
            block_pct: DEFAULT_BLOCK_IMPACT_PCT,
        }
    }
}

impl ImpactPolicy {
    pub fn classify(&self, impact_pct: Decimal) -> ImpactLevel {
        if impact_pct >= self.block_pct {
            ImpactLevel::Blocked
        } else if impact_pct >= self.warn_pct {
            ImpactLevel::Warning
        } else {
            ImpactLevel::Acceptable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_inclusive() {
        let policy = ImpactPolicy::default();
        assert_eq!(policy.classify(dec!(4.999999)), ImpactLevel::Acceptable);
        assert_eq!(policy.classify(dec!(5)), ImpactLevel::Warning);
        assert_eq!(policy.classify(dec!(14.99)), ImpactLevel::Warning);
        assert_eq!(policy.classify(dec!(15)), ImpactLevel::Blocked);
        assert_eq!(policy.classify(dec!(80)), ImpactLevel::Blocked);
    }
}
