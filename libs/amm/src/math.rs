//! Arbitrary-precision helpers
//!
//! Reserve products exceed 128 bits for large pools, so every
//! multiply-then-divide goes through `BigUint` and is checked back into `u128`.

use num_bigint::BigUint;
use num_traits::Zero;

/// `floor(a * b / c)`; `None` when `c == 0` or the result exceeds `u128`
pub fn mul_div(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    let product = BigUint::from(a) * BigUint::from(b);
    u128::try_from(product / BigUint::from(c)).ok()
}

/// `ceil(a * b / c)`; `None` when `c == 0` or the result exceeds `u128`
pub fn mul_div_ceil(a: u128, b: u128, c: u128) -> Option<u128> {
    if c == 0 {
        return None;
    }
    let divisor = BigUint::from(c);
    let product = BigUint::from(a) * BigUint::from(b);
    let quotient = &product / &divisor;
    let rounded = if (product % &divisor).is_zero() {
        quotient
    } else {
        quotient + 1u32
    };
    u128::try_from(rounded).ok()
}

/// Scale a basis-point fraction: `floor(value * (10000 - bps) / 10000)`, 0 when `bps >= 10000`
pub fn apply_bps_haircut(value: u128, bps: u32) -> u128 {
    if bps >= crate::pool::BPS_DENOMINATOR {
        return 0;
    }
    let keep = u128::from(crate::pool::BPS_DENOMINATOR - bps);
    // Result never exceeds `value`, so the conversion cannot fail
    mul_div(value, keep, u128::from(crate::pool::BPS_DENOMINATOR)).unwrap_or(0)
}
