//! Pool object decoding
//!
//! Turns the ledger's view of a shared `Pool<A, B>` object into the quote
//! engine's [`PoolSnapshot`] plus what the transaction builder needs to
//! reference it.

use crate::error::{LedgerError, Result};
use crate::ledger::{json_u128, LedgerObject, LedgerRpc};
use serde_json::Value;
use sluice_amm::{FeeSchedule, PoolSnapshot};
use tracing::debug;
use types::{CoinType, ObjectId, SharedObject};

/// A pool read from the ledger at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct PoolObject {
    pub snapshot: PoolSnapshot,
    pub coin_a: CoinType,
    pub coin_b: CoinType,
    pub shared: SharedObject,
}

impl PoolObject {
    pub fn from_ledger_object(object: &LedgerObject) -> Result<Self> {
        let object_id = object.object_ref.object_id;
        let object_type = object
            .object_type
            .as_deref()
            .ok_or_else(|| invalid(&object_id, "missing type"))?;
        let (coin_a, coin_b) = pool_type_arguments(object_type)
            .ok_or_else(|| invalid(&object_id, "type is not Pool<A, B>"))?;
        let initial_shared_version = object
            .initial_shared_version
            .ok_or_else(|| invalid(&object_id, "pool is not shared"))?;

        let fields = &object.fields;
        let amount = |name: &str| -> Result<u128> {
            fields
                .get(name)
                .and_then(json_u128)
                .ok_or_else(|| invalid(&object_id, &format!("missing field {}", name)))
        };
        let fee = |name: &str| -> Result<u32> {
            u32::try_from(amount(name)?).map_err(|_| invalid(&object_id, &format!("{} out of range", name)))
        };
        // Optional balances default to zero on pools created before they existed
        let optional = |name: &str| fields.get(name).and_then(json_u128).unwrap_or(0);

        let snapshot = PoolSnapshot {
            pool_id: object_id.to_string(),
            reserve_a: amount("balance_a")?,
            reserve_b: amount("balance_b")?,
            fees: FeeSchedule {
                lp_builder_bps: fee("lp_builder_fee")?,
                burn_bps: fee("burn_fee")?,
                creator_royalty_bps: fee("creator_royalty_fee")?,
                rewards_bps: fee("rewards_fee")?,
            },
            lp_supply: amount("lp_supply")?,
            locked_lp: optional("locked_lp_balance"),
            burned_lp: optional("burn_balance"),
            reward_balance: optional("reward_balance"),
            creator_royalty_wallet: fields
                .get("creator_royalty_wallet")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };

        Ok(Self {
            snapshot,
            coin_a,
            coin_b,
            shared: SharedObject {
                object_id,
                initial_shared_version,
                mutable: true,
            },
        })
    }
}

/// Read a pool fresh from the ledger
pub async fn fetch_pool<L: LedgerRpc + ?Sized>(ledger: &L, pool_id: &ObjectId) -> Result<PoolObject> {
    let object = ledger.get_object(pool_id).await?;
    let pool = PoolObject::from_ledger_object(&object)?;
    debug!(
        "Fetched pool {} v{}: reserves {}/{}, lp supply {}",
        pool_id,
        object.object_ref.version,
        pool.snapshot.reserve_a,
        pool.snapshot.reserve_b,
        pool.snapshot.lp_supply
    );
    Ok(pool)
}

fn invalid(object_id: &ObjectId, reason: &str) -> LedgerError {
    LedgerError::InvalidResponse(format!("pool {}: {}", object_id, reason))
}

/// `(A, B)` from `0x..::pool::Pool<A, B>`, respecting nested generics
fn pool_type_arguments(object_type: &str) -> Option<(CoinType, CoinType)> {
    let open = object_type.find('<')?;
    let inner = object_type.get(open + 1..object_type.len().checked_sub(1)?)?;
    if !object_type.ends_with('>') {
        return None;
    }

    let mut depth = 0usize;
    let mut split_at = None;
    for (index, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                if split_at.is_some() {
                    return None;
                }
                split_at = Some(index);
            }
            _ => {}
        }
    }

    let (a, b) = inner.split_at(split_at?);
    let coin_a = CoinType::parse(a.trim()).ok()?;
    let coin_b = CoinType::parse(b[1..].trim()).ok()?;
    Some((coin_a, coin_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use types::ObjectRef;

    fn pool_object() -> LedgerObject {
        LedgerObject {
            object_ref: ObjectRef {
                object_id: ObjectId::parse("0xfeed").unwrap(),
                version: 42,
                digest: "Dg".to_string(),
            },
            object_type: Some(
                "0xabc::pool::Pool<0x2::sui::SUI, 0xdef::usdc::USDC>".to_string(),
            ),
            initial_shared_version: Some(7),
            fields: json!({
                "balance_a": "1000000000000",
                "balance_b": "2000000000000",
                "lp_supply": { "fields": { "value": "1414213562" } },
                "lp_builder_fee": "20",
                "burn_fee": "10",
                "creator_royalty_fee": "5",
                "rewards_fee": "15",
                "reward_balance": "2500000000",
                "creator_royalty_wallet": "0xc0ffee"
            }),
        }
    }

    #[test]
    fn test_pool_snapshot_from_object() {
        let pool = PoolObject::from_ledger_object(&pool_object()).unwrap();

        assert_eq!(pool.snapshot.reserve_a, 1_000_000_000_000);
        assert_eq!(pool.snapshot.lp_supply, 1_414_213_562);
        assert_eq!(pool.snapshot.total_fee_bps(), 150);
        assert_eq!(pool.snapshot.reward_balance, 2_500_000_000);
        assert_eq!(pool.snapshot.locked_lp, 0);
        assert!(pool.coin_a.is_native());
        assert_eq!(pool.coin_b.as_str(), "0xdef::usdc::USDC");
        assert_eq!(pool.shared.initial_shared_version, 7);
        assert!(pool.shared.mutable);
    }

    #[test]
    fn test_owned_pool_is_rejected() {
        let mut object = pool_object();
        object.initial_shared_version = None;
        assert!(PoolObject::from_ledger_object(&object).is_err());
    }

    #[test]
    fn test_type_arguments_handle_nested_generics() {
        let (a, b) =
            pool_type_arguments("0x1::pool::Pool<0x2::wrap::W<0x3::c::C>, 0x4::d::D>").unwrap();
        assert_eq!(a.as_str(), "0x2::wrap::W<0x3::c::C>");
        assert_eq!(b.as_str(), "0x4::d::D");

        assert!(pool_type_arguments("0x1::pool::Pool").is_none());
        assert!(pool_type_arguments("0x1::pool::Pool<0x2::a::A>").is_none());
    }
}
