//! Funding-source selection
//!
//! The ledger needs an object reference for every coin spent, including gas.
//! [`CoinSelector::plan`] decides, for all payments of one transaction at
//! once, which owned objects fund each payment and which pay for gas:
//!
//! - native payment, one native object: the amount is split from the gas
//!   coin and that object pays gas (`balance >= amount + gas_budget`)
//! - native payment, several objects: the largest pays gas and the rest are
//!   merged and split; if the rest cannot cover the amount, every object
//!   becomes gas payment and the amount is split from the gas coin
//! - other payments: objects are accumulated largest first, merged, split
//! - gas for a transaction without a native payment: the largest native
//!   object covering the budget, else all native objects if they add up

use crate::error::{ExecutionError, Result};
use futures::future::try_join_all;
use sluice_adapters::LedgerRpc;
use std::collections::HashMap;
use tracing::debug;
use types::{CoinObject, CoinType, ObjectId, ObjectRef};

/// One coin amount the transaction must spend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub coin_type: CoinType,
    pub amount: u64,
}

impl PaymentRequest {
    pub fn new(coin_type: CoinType, amount: u64) -> Self {
        Self { coin_type, amount }
    }
}

/// Where a payment's coin comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingSource {
    /// Split from the gas coin
    GasCoin,
    /// Merge `extras` into `primary`, then split
    Owned {
        primary: ObjectRef,
        extras: Vec<ObjectRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinPayment {
    pub coin_type: CoinType,
    pub amount: u64,
    pub source: FundingSource,
}

/// Every payment plus the gas objects, in request order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingPlan {
    pub payments: Vec<CoinPayment>,
    pub gas_payment: Vec<ObjectRef>,
}

/// Owned coin objects grouped by normalized coin type
#[derive(Debug, Clone, Default)]
pub struct OwnedCoins {
    by_type: HashMap<String, Vec<CoinObject>>,
}

impl OwnedCoins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coin_type: &CoinType, mut coins: Vec<CoinObject>) {
        coins.sort_by(|a, b| b.balance.cmp(&a.balance));
        self.by_type.insert(coin_type.normalized(), coins);
    }

    /// Objects of `coin_type`, largest balance first
    pub fn of(&self, coin_type: &CoinType) -> &[CoinObject] {
        self.by_type
            .get(&coin_type.normalized())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total(&self, coin_type: &CoinType) -> u128 {
        self.of(coin_type).iter().map(|c| u128::from(c.balance)).sum()
    }

    /// Load the owner's coins for each payment type plus the native asset
    pub async fn fetch<L: LedgerRpc + ?Sized>(
        ledger: &L,
        owner: &ObjectId,
        requests: &[PaymentRequest],
    ) -> Result<Self> {
        let native = CoinType::native();
        let mut wanted: Vec<&CoinType> = Vec::new();
        for coin_type in requests.iter().map(|r| &r.coin_type).chain(std::iter::once(&native)) {
            if !wanted.iter().any(|seen| seen.normalized() == coin_type.normalized()) {
                wanted.push(coin_type);
            }
        }

        let fetched = try_join_all(wanted.iter().map(|coin_type| ledger.get_coins(owner, coin_type))).await?;

        let mut owned = Self::new();
        for (coin_type, coins) in wanted.into_iter().zip(fetched) {
            debug!("Owner {} holds {} {} objects", owner, coins.len(), coin_type);
            owned.insert(coin_type, coins);
        }
        Ok(owned)
    }
}

pub struct CoinSelector {
    gas_budget: u64,
}

impl CoinSelector {
    pub fn new(gas_budget: u64) -> Self {
        Self { gas_budget }
    }

    pub fn plan(&self, requests: &[PaymentRequest], owned: &OwnedCoins) -> Result<FundingPlan> {
        let mut seen = Vec::with_capacity(requests.len());
        for request in requests {
            if request.amount == 0 {
                return Err(ExecutionError::InvalidAmount(format!(
                    "payment of {} must be greater than zero",
                    request.coin_type
                )));
            }
            let key = request.coin_type.normalized();
            if seen.contains(&key) {
                return Err(ExecutionError::Build(format!(
                    "coin type {} requested twice",
                    request.coin_type
                )));
            }
            seen.push(key);
        }

        let native_request = requests.iter().find(|r| r.coin_type.is_native());
        let (native_source, gas_payment) = match native_request {
            Some(request) => {
                let (source, gas) = self.plan_native(request.amount, owned)?;
                (Some(source), gas)
            }
            None => (None, self.plan_gas_only(owned)?),
        };

        let mut payments = Vec::with_capacity(requests.len());
        for request in requests {
            let source = if request.coin_type.is_native() {
                native_source.clone().ok_or_else(|| {
                    ExecutionError::Build("native funding source missing".to_string())
                })?
            } else {
                accumulate(&request.coin_type, request.amount, owned.of(&request.coin_type))?
            };
            payments.push(CoinPayment {
                coin_type: request.coin_type.clone(),
                amount: request.amount,
                source,
            });
        }

        Ok(FundingPlan {
            payments,
            gas_payment,
        })
    }

    fn plan_native(&self, amount: u64, owned: &OwnedCoins) -> Result<(FundingSource, Vec<ObjectRef>)> {
        let native = CoinType::native();
        let coins = owned.of(&native);
        let required = u128::from(amount) + u128::from(self.gas_budget);
        let total = owned.total(&native);
        let all_refs = || coins.iter().map(|c| c.object_ref.clone()).collect::<Vec<_>>();

        match coins {
            [] => Err(insufficient(&native, required, 0)),
            [single] => {
                if u128::from(single.balance) >= required {
                    Ok((FundingSource::GasCoin, vec![single.object_ref.clone()]))
                } else {
                    Err(insufficient(&native, required, u128::from(single.balance)))
                }
            }
            [largest, rest @ ..] => {
                if largest.balance >= self.gas_budget {
                    if let Ok(source) = accumulate(&native, amount, rest) {
                        return Ok((source, vec![largest.object_ref.clone()]));
                    }
                }
                if total >= required {
                    debug!("Paying {} from the merged gas coin", amount);
                    Ok((FundingSource::GasCoin, all_refs()))
                } else {
                    Err(insufficient(&native, required, total))
                }
            }
        }
    }

    fn plan_gas_only(&self, owned: &OwnedCoins) -> Result<Vec<ObjectRef>> {
        let native = CoinType::native();
        let coins = owned.of(&native);
        match coins.first() {
            Some(largest) if largest.balance >= self.gas_budget => Ok(vec![largest.object_ref.clone()]),
            _ => {
                let total = owned.total(&native);
                if !coins.is_empty() && total >= u128::from(self.gas_budget) {
                    Ok(coins.iter().map(|c| c.object_ref.clone()).collect())
                } else {
                    Err(insufficient(&native, u128::from(self.gas_budget), total))
                }
            }
        }
    }
}

/// Largest-first accumulation over `coins` (already sorted descending)
fn accumulate(coin_type: &CoinType, amount: u64, coins: &[CoinObject]) -> Result<FundingSource> {
    let mut covered: u128 = 0;
    let mut picked = Vec::new();
    for coin in coins {
        picked.push(coin.object_ref.clone());
        covered += u128::from(coin.balance);
        if covered >= u128::from(amount) {
            let primary = picked.remove(0);
            return Ok(FundingSource::Owned {
                primary,
                extras: picked,
            });
        }
    }
    Err(insufficient(coin_type, u128::from(amount), covered))
}

fn insufficient(coin_type: &CoinType, required: u128, available: u128) -> ExecutionError {
    ExecutionError::InsufficientFunds {
        coin_type: coin_type.to_string(),
        required,
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: u64 = 50_000_000;

    fn usdc() -> CoinType {
        CoinType::parse("0xdef::usdc::USDC").unwrap()
    }

    fn coin(coin_type: &CoinType, id: &str, balance: u64) -> CoinObject {
        CoinObject {
            coin_type: coin_type.clone(),
            object_ref: ObjectRef {
                object_id: ObjectId::parse(id).unwrap(),
                version: 1,
                digest: format!("d{}", id),
            },
            balance,
        }
    }

    fn owned(entries: &[(&CoinType, Vec<CoinObject>)]) -> OwnedCoins {
        let mut owned = OwnedCoins::new();
        for (coin_type, coins) in entries {
            owned.insert(coin_type, coins.clone());
        }
        owned
    }

    #[test]
    fn test_single_native_object_splits_from_gas() {
        let sui = CoinType::native();
        let wallet = owned(&[(&sui, vec![coin(&sui, "0x1", 2_000_000_000)])]);
        let plan = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(sui, 1_000_000_000)], &wallet)
            .unwrap();

        assert_eq!(plan.payments[0].source, FundingSource::GasCoin);
        assert_eq!(plan.gas_payment.len(), 1);
    }

    #[test]
    fn test_single_native_object_must_cover_gas_buffer() {
        let sui = CoinType::native();
        let wallet = owned(&[(&sui, vec![coin(&sui, "0x1", 1_020_000_000)])]);
        let err = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(sui, 1_000_000_000)], &wallet)
            .unwrap_err();

        assert_eq!(
            err,
            ExecutionError::InsufficientFunds {
                coin_type: "0x2::sui::SUI".to_string(),
                required: 1_050_000_000,
                available: 1_020_000_000,
            }
        );
    }

    #[test]
    fn test_several_native_objects_keep_largest_for_gas() {
        let sui = CoinType::native();
        let wallet = owned(&[(
            &sui,
            vec![
                coin(&sui, "0x1", 300),
                coin(&sui, "0x2", 900_000_000),
                coin(&sui, "0x3", 500),
            ],
        )]);
        let plan = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(sui, 700)], &wallet)
            .unwrap();

        assert_eq!(plan.gas_payment[0].object_id, ObjectId::parse("0x2").unwrap());
        match &plan.payments[0].source {
            FundingSource::Owned { primary, extras } => {
                assert_eq!(primary.object_id, ObjectId::parse("0x3").unwrap());
                assert_eq!(extras.len(), 1);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_native_falls_back_to_merged_gas() {
        let sui = CoinType::native();
        let wallet = owned(&[(
            &sui,
            vec![coin(&sui, "0x1", 100_000_000), coin(&sui, "0x2", 100_000_000)],
        )]);
        let plan = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(sui, 120_000_000)], &wallet)
            .unwrap();

        assert_eq!(plan.payments[0].source, FundingSource::GasCoin);
        assert_eq!(plan.gas_payment.len(), 2);
    }

    #[test]
    fn test_non_native_accumulates_and_pays_gas_separately() {
        let sui = CoinType::native();
        let usdc = usdc();
        let wallet = owned(&[
            (&sui, vec![coin(&sui, "0x9", 10_000_000), coin(&sui, "0x8", 60_000_000)]),
            (
                &usdc,
                vec![coin(&usdc, "0x1", 40), coin(&usdc, "0x2", 50), coin(&usdc, "0x3", 5)],
            ),
        ]);
        let plan = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(usdc, 80)], &wallet)
            .unwrap();

        assert_eq!(plan.gas_payment, vec![wallet.of(&sui)[0].object_ref.clone()]);
        match &plan.payments[0].source {
            FundingSource::Owned { primary, extras } => {
                assert_eq!(primary.object_id, ObjectId::parse("0x2").unwrap());
                assert_eq!(extras.len(), 1);
                assert_eq!(extras[0].object_id, ObjectId::parse("0x1").unwrap());
            }
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_non_native_shortfall_reports_total() {
        let sui = CoinType::native();
        let usdc = usdc();
        let wallet = owned(&[
            (&sui, vec![coin(&sui, "0x9", BUDGET)]),
            (&usdc, vec![coin(&usdc, "0x1", 40), coin(&usdc, "0x2", 50)]),
        ]);
        let err = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(usdc, 100)], &wallet)
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::InsufficientFunds {
                required: 100,
                available: 90,
                ..
            }
        ));
    }

    #[test]
    fn test_no_gas_coins() {
        let usdc = usdc();
        let wallet = owned(&[(&usdc, vec![coin(&usdc, "0x1", 500)])]);
        let err = CoinSelector::new(BUDGET)
            .plan(&[PaymentRequest::new(usdc, 100)], &wallet)
            .unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::InsufficientFunds { available: 0, .. }
        ));
    }

    #[test]
    fn test_rejects_zero_and_duplicate_payments() {
        let usdc = usdc();
        let wallet = OwnedCoins::new();
        let selector = CoinSelector::new(BUDGET);

        assert!(matches!(
            selector.plan(&[PaymentRequest::new(usdc.clone(), 0)], &wallet),
            Err(ExecutionError::InvalidAmount(_))
        ));
        assert!(matches!(
            selector.plan(
                &[
                    PaymentRequest::new(usdc.clone(), 1),
                    PaymentRequest::new(usdc, 2)
                ],
                &wallet
            ),
            Err(ExecutionError::Build(_))
        ));
    }
}
