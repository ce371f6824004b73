//! Post-swap activity reconciliation
//!
//! Once a swap confirms, a pool whose reward balance has reached the
//! threshold for its primary reserve asset is flagged active on the activity
//! endpoint. The flag is a side effect: whatever happens here never changes
//! the swap's result.

use network::{retry, RetryError, RetryPolicy};
use sluice_adapters::{ActivationResponse, ActivityEndpoint, ActivityError, MetadataSource, PoolObject};
use sluice_amm::to_raw_amount;
use sluice_config::ActivityConfig;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::CoinMetadata;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing to do: unknown asset, below threshold or no metadata
    Skipped { reason: String },
    Activated { message: String },
    /// Already active or a concurrent update won; not an error
    Conflict { message: String },
    /// Gave up; the swap itself is unaffected
    Failed { attempts: u32, error: String },
}

/// Reserve asset whose threshold applies, with its raw threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryReserve {
    pub metadata: CoinMetadata,
    pub threshold_raw: u128,
}

pub struct SideEffectReconciler {
    endpoint: Arc<dyn ActivityEndpoint>,
    metadata: Arc<dyn MetadataSource>,
    config: ActivityConfig,
    policy: RetryPolicy,
}

impl SideEffectReconciler {
    pub fn new(
        endpoint: Arc<dyn ActivityEndpoint>,
        metadata: Arc<dyn MetadataSource>,
        config: ActivityConfig,
    ) -> Self {
        let policy = RetryPolicy::exponential(config.max_attempts, config.base_delay(), config.max_delay());
        Self {
            endpoint,
            metadata,
            config,
            policy,
        }
    }

    /// Coin B when its symbol has a threshold, otherwise coin A
    pub fn primary_reserve(&self, coin_a: &CoinMetadata, coin_b: &CoinMetadata) -> Option<PrimaryReserve> {
        [coin_b, coin_a].into_iter().find_map(|coin| {
            let threshold = self.config.threshold_for(&coin.symbol)?;
            let threshold_raw = to_raw_amount(&threshold.to_string(), coin.decimals).ok()?;
            Some(PrimaryReserve {
                metadata: coin.clone(),
                threshold_raw,
            })
        })
    }

    /// Flag `pool` active if its reward balance has crossed the threshold
    ///
    /// `pool` should be read after the swap confirmed.
    pub async fn reconcile(&self, pool: &PoolObject) -> ReconcileOutcome {
        let pool_id = pool.snapshot.pool_id.as_str();

        let metadata = match self.metadata.pool_metadata(&pool.coin_a, &pool.coin_b).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return skipped(pool_id, "no metadata for pool".to_string()),
            Err(e) => return skipped(pool_id, format!("metadata lookup failed: {}", e)),
        };

        let (Some(coin_a), Some(coin_b)) = (metadata.side(&pool.coin_a), metadata.side(&pool.coin_b)) else {
            return skipped(pool_id, "metadata does not describe both coins".to_string());
        };

        let Some(primary) = self.primary_reserve(coin_a, coin_b) else {
            return skipped(
                pool_id,
                format!("no threshold for {} or {}", coin_a.symbol, coin_b.symbol),
            );
        };

        let rewards = pool.snapshot.reward_balance;
        if rewards < primary.threshold_raw {
            return skipped(
                pool_id,
                format!(
                    "reward balance {} below {} threshold {}",
                    rewards, primary.metadata.symbol, primary.threshold_raw
                ),
            );
        }

        info!(
            "Pool {} reward balance {} reached {} threshold, marking active",
            pool_id, rewards, primary.metadata.symbol
        );
        self.mark_active(pool_id).await
    }

    /// Call the endpoint under the retry budget; 409 stops immediately
    pub async fn mark_active(&self, pool_id: &str) -> ReconcileOutcome {
        let endpoint = self.endpoint.as_ref();
        let attempts = AtomicU32::new(0);
        let attempts_ref = &attempts;
        let label = format!("activity flag for {}", pool_id);

        let result = retry(
            &self.policy,
            &label,
            move |attempt| {
                attempts_ref.store(attempt, Ordering::SeqCst);
                endpoint.mark_active(pool_id)
            },
            ActivityError::is_recoverable,
        )
        .await;

        match result {
            Ok(ActivationResponse::Activated { message }) => {
                info!("Pool {} marked active: {}", pool_id, message);
                ReconcileOutcome::Activated { message }
            }
            Ok(ActivationResponse::Conflict { message }) => {
                info!("Pool {} activation not applied (409): {}", pool_id, message);
                ReconcileOutcome::Conflict { message }
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                warn!("Giving up on activity flag for {} after {} attempts: {}", pool_id, attempts, last);
                ReconcileOutcome::Failed {
                    attempts,
                    error: last.to_string(),
                }
            }
            Err(RetryError::Aborted(e)) => {
                warn!("Activity flag for {} failed: {}", pool_id, e);
                ReconcileOutcome::Failed {
                    attempts: attempts.load(Ordering::SeqCst),
                    error: e.to_string(),
                }
            }
        }
    }
}

fn skipped(pool_id: &str, reason: String) -> ReconcileOutcome {
    debug!("Skipping activity flag for {}: {}", pool_id, reason);
    ReconcileOutcome::Skipped { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_adapters::testing::{ScriptedActivity, StaticMetadata};
    use sluice_adapters::PoolMetadata;
    use sluice_amm::PoolSnapshot;
    use tokio::time::{Duration, Instant};
    use types::{CoinType, ObjectId, SharedObject};

    fn meta(coin_type: &CoinType, symbol: &str, decimals: u8) -> CoinMetadata {
        CoinMetadata {
            coin_type: coin_type.clone(),
            symbol: symbol.to_string(),
            decimals,
            name: String::new(),
            description: String::new(),
            icon_url: None,
        }
    }

    fn fixture(coin_b_symbol: &str, reward_balance: u128) -> (PoolObject, StaticMetadata) {
        let coin_a = CoinType::parse("0xa1::meme::MEME").unwrap();
        let coin_b = CoinType::native();
        let pool = PoolObject {
            snapshot: PoolSnapshot {
                pool_id: "0xpool".to_string(),
                reward_balance,
                ..Default::default()
            },
            coin_a: coin_a.clone(),
            coin_b: coin_b.clone(),
            shared: SharedObject {
                object_id: ObjectId::parse("0x10").unwrap(),
                initial_shared_version: 1,
                mutable: true,
            },
        };
        let metadata = StaticMetadata::new([PoolMetadata {
            pool_id: "0xpool".to_string(),
            coin_a: meta(&coin_a, "MEME", 6),
            coin_b: meta(&coin_b, coin_b_symbol, 9),
        }]);
        (pool, metadata)
    }

    fn reconciler(activity: Arc<ScriptedActivity>, metadata: StaticMetadata) -> SideEffectReconciler {
        SideEffectReconciler::new(activity, Arc::new(metadata), ActivityConfig::default())
    }

    #[test]
    fn test_primary_reserve_prefers_coin_b() {
        let (_, metadata) = fixture("SUI", 0);
        let rec = reconciler(Arc::new(ScriptedActivity::default()), metadata);
        let usdc = meta(&CoinType::parse("0xdef::usdc::USDC").unwrap(), "USDC", 6);
        let sui = meta(&CoinType::native(), "SUI", 9);
        let meme = meta(&CoinType::parse("0xa1::meme::MEME").unwrap(), "MEME", 6);

        let primary = rec.primary_reserve(&usdc, &sui).unwrap();
        assert_eq!(primary.metadata.symbol, "SUI");
        assert_eq!(primary.threshold_raw, 1_000_000_000_000);

        let fallback = rec.primary_reserve(&usdc, &meme).unwrap();
        assert_eq!(fallback.metadata.symbol, "USDC");
        assert_eq!(fallback.threshold_raw, 2_500_000_000);

        assert!(rec.primary_reserve(&meme, &meme).is_none());
    }

    #[tokio::test]
    async fn test_below_threshold_is_skipped_without_calling_endpoint() {
        let activity = Arc::new(ScriptedActivity::default());
        let (pool, metadata) = fixture("SUI", 999_999_999_999);
        let outcome = reconciler(activity.clone(), metadata).reconcile(&pool).await;

        assert!(matches!(outcome, ReconcileOutcome::Skipped { .. }));
        assert_eq!(activity.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_assets_are_skipped() {
        let activity = Arc::new(ScriptedActivity::default());
        let (pool, metadata) = fixture("WETH", u128::MAX);
        let outcome = reconciler(activity.clone(), metadata).reconcile(&pool).await;

        assert!(matches!(outcome, ReconcileOutcome::Skipped { .. }));
        assert_eq!(activity.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_conflict_stops_without_retry() {
        let activity = Arc::new(ScriptedActivity::new([Ok(ActivationResponse::Conflict {
            message: "pool already active".to_string(),
        })]));
        let (pool, metadata) = fixture("SUI", 1_000_000_000_000);
        let started = Instant::now();

        let outcome = reconciler(activity.clone(), metadata).reconcile(&pool).await;

        assert_eq!(
            outcome,
            ReconcileOutcome::Conflict {
                message: "pool already active".to_string()
            }
        );
        assert_eq!(activity.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_retry_with_backoff_then_fail() {
        let activity = Arc::new(ScriptedActivity::new([Err(ActivityError::Status {
            status: 503,
            body: "busy".to_string(),
        })]));
        let (pool, metadata) = fixture("SUI", 2_000_000_000_000);
        let started = Instant::now();

        let outcome = reconciler(activity.clone(), metadata).reconcile(&pool).await;

        assert!(matches!(outcome, ReconcileOutcome::Failed { attempts: 4, .. }));
        assert_eq!(activity.calls(), 4);
        // 2s + 4s + 8s between the four attempts
        assert_eq!(started.elapsed(), Duration::from_secs(14));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_one_failure() {
        let activity = Arc::new(ScriptedActivity::new([
            Err(ActivityError::Transport("reset".to_string())),
            Ok(ActivationResponse::Activated {
                message: "activated".to_string(),
            }),
        ]));
        let (pool, metadata) = fixture("SUI", 1_000_000_000_000);
        let started = Instant::now();

        let outcome = reconciler(activity.clone(), metadata).reconcile(&pool).await;

        assert!(matches!(outcome, ReconcileOutcome::Activated { .. }));
        assert_eq!(activity.calls(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_bad_url_is_not_retried() {
        let activity = Arc::new(ScriptedActivity::new([Err(ActivityError::InvalidUrl {
            url: "0xpool".to_string(),
            reason: "relative URL without a base".to_string(),
        })]));
        let (pool, metadata) = fixture("SUI", 1_000_000_000_000);

        let outcome = reconciler(activity.clone(), metadata).reconcile(&pool).await;

        assert!(matches!(outcome, ReconcileOutcome::Failed { attempts: 1, .. }));
        assert_eq!(activity.calls(), 1);
    }
}
