//! End-to-end AMM operations
//!
//! Each operation follows the same order:
//!
//! 1. quote against the snapshot the user previewed and run the
//!    confirmation gate, with no network traffic
//! 2. re-read the pool, quote again from the fresh snapshot and gate again
//! 3. select coins, build, sign, submit, wait for a terminal state
//! 4. swaps only: reconcile the activity flag after confirmation

use crate::builder::TransactionBuilder;
use crate::coin_selection::{CoinSelector, FundingPlan, OwnedCoins, PaymentRequest};
use crate::error::{ExecutionError, Result};
use crate::reconciler::{ReconcileOutcome, SideEffectReconciler};
use crate::submission::{ExecutionOutcome, TransactionExecutor};
use sluice_adapters::{fetch_pool, LedgerRpc, PoolObject, WalletSigner};
use sluice_amm::{
    parse_slippage_bps, to_raw_amount, FeeSchedule, ImpactLevel, ImpactPolicy, LiquidityQuote,
    QuoteEngine, RemoveLiquidityQuote, SwapDirection, SwapQuote,
};
use sluice_config::protocol::events;
use sluice_config::SluiceConfig;
use std::sync::Arc;
use tracing::{info, warn};
use types::{CoinType, ObjectId, SharedObject};

/// Exact-input swap parameters in raw units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub direction: SwapDirection,
    pub amount_in: u128,
    pub slippage_bps: u32,
}

impl SwapRequest {
    /// Parse user-typed amount and slippage percentage
    pub fn from_display(
        direction: SwapDirection,
        amount: &str,
        decimals: u8,
        slippage_percent: &str,
    ) -> Result<Self> {
        Ok(Self {
            direction,
            amount_in: to_raw_amount(amount, decimals)?,
            slippage_bps: parse_slippage_bps(slippage_percent)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapReceipt {
    pub quote: SwapQuote,
    pub impact: ImpactLevel,
    pub outcome: ExecutionOutcome,
    /// `None` when no reconciler is configured or the swap did not confirm
    pub activity: Option<ReconcileOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityReceipt {
    pub quote: LiquidityQuote,
    pub outcome: ExecutionOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoveLiquidityReceipt {
    pub quote: RemoveLiquidityQuote,
    pub outcome: ExecutionOutcome,
}

/// New pool parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePoolRequest {
    pub coin_a: CoinType,
    pub coin_b: CoinType,
    pub amount_a: u128,
    pub amount_b: u128,
    pub fees: FeeSchedule,
    pub creator_royalty_wallet: ObjectId,
}

/// Wires quote, builder, executor and reconciler for one wallet
pub struct AmmClient<L: ?Sized, S: ?Sized> {
    executor: TransactionExecutor<L, S>,
    builder: TransactionBuilder,
    selector: CoinSelector,
    impact_policy: ImpactPolicy,
    factory_id: Option<ObjectId>,
    reconciler: Option<SideEffectReconciler>,
}

impl<L, S> AmmClient<L, S>
where
    L: LedgerRpc + ?Sized,
    S: WalletSigner + ?Sized,
{
    pub fn new(ledger: Arc<L>, signer: Arc<S>, config: &SluiceConfig) -> Result<Self> {
        let package = parse_id("package_id", &config.ledger.package_id)?;
        let factory_id = if config.ledger.factory_id.is_empty() {
            None
        } else {
            Some(parse_id("factory_id", &config.ledger.factory_id)?)
        };
        let sender = signer.address();

        Ok(Self {
            builder: TransactionBuilder::new(package, sender, config.ledger.gas_budget),
            selector: CoinSelector::new(config.ledger.gas_budget),
            executor: TransactionExecutor::new(ledger, signer, &config.confirmation),
            impact_policy: ImpactPolicy {
                warn_pct: config.quote.warn_impact_pct,
                block_pct: config.quote.block_impact_pct,
            },
            factory_id,
            reconciler: None,
        })
    }

    pub fn with_reconciler(mut self, reconciler: SideEffectReconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn impact_policy(&self) -> &ImpactPolicy {
        &self.impact_policy
    }

    fn ledger(&self) -> &L {
        self.executor.ledger().as_ref()
    }

    fn sender(&self) -> ObjectId {
        self.executor.signer().address()
    }

    /// Quote and gate without touching the network
    pub fn preview_swap(&self, pool: &PoolObject, request: &SwapRequest) -> Result<(SwapQuote, ImpactLevel)> {
        if request.amount_in == 0 {
            return Err(ExecutionError::InvalidAmount("swap amount must be greater than zero".to_string()));
        }
        let quote = QuoteEngine::quote_swap(
            &pool.snapshot,
            request.direction,
            request.amount_in,
            request.slippage_bps,
        )?;
        let impact = quote.confirm(&self.impact_policy)?;
        Ok((quote, impact))
    }

    pub async fn swap(&self, previewed: &PoolObject, request: &SwapRequest) -> Result<SwapReceipt> {
        self.preview_swap(previewed, request)?;

        let pool = fetch_pool(self.ledger(), &previewed.shared.object_id).await?;
        let (quote, impact) = self.preview_swap(&pool, request)?;
        if impact == ImpactLevel::Warning {
            warn!(
                "Swap on {} has {}% price impact",
                pool.snapshot.pool_id, quote.price_impact_pct
            );
        }

        let coin_in = match request.direction {
            SwapDirection::AToB => pool.coin_a.clone(),
            SwapDirection::BToA => pool.coin_b.clone(),
        };
        let payments = [PaymentRequest::new(coin_in, to_u64(request.amount_in)?)];
        let funding = self.plan(&payments).await?;
        let payload = self.builder.swap(&pool, request.direction, &funding, quote.min_out)?;

        let outcome = self.executor.execute(&payload, None).await?;
        let activity = if outcome.is_confirmed() {
            self.reconcile(&pool).await
        } else {
            None
        };

        Ok(SwapReceipt {
            quote,
            impact,
            outcome,
            activity,
        })
    }

    pub fn preview_add_liquidity(
        &self,
        pool: &PoolObject,
        amount_a: u128,
        amount_b: u128,
        slippage_bps: u32,
    ) -> Result<LiquidityQuote> {
        if amount_a == 0 || amount_b == 0 {
            return Err(ExecutionError::InvalidAmount(
                "both deposit amounts must be greater than zero".to_string(),
            ));
        }
        Ok(QuoteEngine::quote_add_liquidity(
            &pool.snapshot,
            amount_a,
            amount_b,
            slippage_bps,
        )?)
    }

    pub async fn add_liquidity(
        &self,
        previewed: &PoolObject,
        amount_a: u128,
        amount_b: u128,
        slippage_bps: u32,
    ) -> Result<LiquidityReceipt> {
        self.preview_add_liquidity(previewed, amount_a, amount_b, slippage_bps)?;

        let pool = fetch_pool(self.ledger(), &previewed.shared.object_id).await?;
        let quote = self.preview_add_liquidity(&pool, amount_a, amount_b, slippage_bps)?;
        let payments = [
            PaymentRequest::new(pool.coin_a.clone(), to_u64(amount_a)?),
            PaymentRequest::new(pool.coin_b.clone(), to_u64(amount_b)?),
        ];
        let funding = self.plan(&payments).await?;
        let payload = self.builder.add_liquidity(&pool, &funding, quote.min_lp_out)?;

        let outcome = self
            .executor
            .execute(&payload, Some(events::LIQUIDITY_ADDED))
            .await?;
        Ok(LiquidityReceipt { quote, outcome })
    }

    pub async fn remove_liquidity(
        &self,
        previewed: &PoolObject,
        lp_amount: u128,
        slippage_bps: u32,
    ) -> Result<RemoveLiquidityReceipt> {
        if lp_amount == 0 {
            return Err(ExecutionError::InvalidAmount("LP amount must be greater than zero".to_string()));
        }
        QuoteEngine::quote_remove_liquidity(&previewed.snapshot, lp_amount, slippage_bps)?;

        let pool = fetch_pool(self.ledger(), &previewed.shared.object_id).await?;
        let quote = QuoteEngine::quote_remove_liquidity(&pool.snapshot, lp_amount, slippage_bps)?;
        let lp_type = self.builder.lp_coin_type(&pool.coin_a, &pool.coin_b)?;
        let funding = self
            .plan(&[PaymentRequest::new(lp_type, to_u64(lp_amount)?)])
            .await?;
        let payload = self
            .builder
            .remove_liquidity(&pool, &funding, quote.min_a_out, quote.min_b_out)?;

        let outcome = self
            .executor
            .execute(&payload, Some(events::LIQUIDITY_REMOVED))
            .await?;
        Ok(RemoveLiquidityReceipt { quote, outcome })
    }

    /// Burn LP tokens into the pool
    pub async fn burn_lp(&self, pool_id: &ObjectId, lp_amount: u128) -> Result<ExecutionOutcome> {
        if lp_amount == 0 {
            return Err(ExecutionError::InvalidAmount("LP amount must be greater than zero".to_string()));
        }
        let pool = fetch_pool(self.ledger(), pool_id).await?;
        let lp_type = self.builder.lp_coin_type(&pool.coin_a, &pool.coin_b)?;
        let funding = self
            .plan(&[PaymentRequest::new(lp_type, to_u64(lp_amount)?)])
            .await?;
        let payload = self.builder.deposit_lp(&pool, &funding)?;
        self.executor.execute(&payload, None).await
    }

    pub async fn create_pool(&self, request: &CreatePoolRequest) -> Result<ExecutionOutcome> {
        if request.amount_a == 0 || request.amount_b == 0 {
            return Err(ExecutionError::InvalidAmount(
                "initial liquidity must be greater than zero on both sides".to_string(),
            ));
        }
        if request.coin_a.normalized() == request.coin_b.normalized() {
            return Err(ExecutionError::InvalidAmount(
                "a pool needs two different coins".to_string(),
            ));
        }
        let factory_id = self
            .factory_id
            .ok_or_else(|| ExecutionError::Build("no factory_id configured".to_string()))?;

        let factory = self.ledger().get_object(&factory_id).await?;
        let initial_shared_version = factory.initial_shared_version.ok_or_else(|| {
            ExecutionError::Build(format!("factory {} is not a shared object", factory_id))
        })?;
        let factory = SharedObject {
            object_id: factory_id,
            initial_shared_version,
            mutable: true,
        };

        let payments = [
            PaymentRequest::new(request.coin_a.clone(), to_u64(request.amount_a)?),
            PaymentRequest::new(request.coin_b.clone(), to_u64(request.amount_b)?),
        ];
        let funding = self.plan(&payments).await?;
        let payload = self.builder.create_pool(
            &factory,
            &request.coin_a,
            &request.coin_b,
            &funding,
            &request.fees,
            request.creator_royalty_wallet,
        )?;

        info!("Creating pool {}-{}", request.coin_a, request.coin_b);
        self.executor
            .execute(&payload, Some(events::POOL_CREATED))
            .await
    }

    async fn plan(&self, payments: &[PaymentRequest]) -> Result<FundingPlan> {
        let owned = OwnedCoins::fetch(self.ledger(), &self.sender(), payments).await?;
        self.selector.plan(payments, &owned)
    }

    /// Re-read the pool after the swap and run the reconciler on it
    async fn reconcile(&self, pool: &PoolObject) -> Option<ReconcileOutcome> {
        let reconciler = self.reconciler.as_ref()?;
        let outcome = match fetch_pool(self.ledger(), &pool.shared.object_id).await {
            Ok(updated) => reconciler.reconcile(&updated).await,
            Err(e) => {
                warn!("Could not re-read pool {} for reconciliation: {}", pool.snapshot.pool_id, e);
                ReconcileOutcome::Skipped {
                    reason: format!("pool re-read failed: {}", e),
                }
            }
        };
        Some(outcome)
    }
}

fn parse_id(field: &str, value: &str) -> Result<ObjectId> {
    ObjectId::parse(value).map_err(|e| ExecutionError::Build(format!("ledger.{}: {}", field, e)))
}

fn to_u64(amount: u128) -> Result<u64> {
    u64::try_from(amount)
        .map_err(|_| ExecutionError::InvalidAmount(format!("{} exceeds the largest coin balance", amount)))
}
