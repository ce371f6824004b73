//! Operation lifecycle tests against in-memory collaborators
//!
//! Time is paused so confirmation polling and retry delays run instantly
//! while elapsed virtual time still reflects the configured schedule.

use serde_json::json;
use sluice_adapters::testing::{InMemoryLedger, ScriptedActivity, StaticMetadata, StaticSigner};
use sluice_adapters::{ActivationResponse, LedgerError, LedgerObject, PoolMetadata, PoolObject};
use sluice_amm::{FeeSchedule, ImpactLevel, SwapDirection};
use sluice_config::SluiceConfig;
use sluice_execution::{
    AbortReason, AmmClient, CreatePoolRequest, EventStatus, ExecutionError, ExecutionOutcome,
    ReconcileOutcome, SideEffectReconciler, SwapRequest,
};
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use types::{
    CoinMetadata, CoinObject, CoinType, ExecutionStatus, LedgerEvent, ObjectId, ObjectRef,
    TransactionBlock, TransactionDigest, TransactionEffects,
};

const POOL_ID: &str = "0x50";
const USDC: &str = "0xdef::usdc::USDC";

fn usdc() -> CoinType {
    CoinType::parse(USDC).unwrap()
}

fn object_ref(id: &str) -> ObjectRef {
    ObjectRef {
        object_id: ObjectId::parse(id).unwrap(),
        version: 11,
        digest: format!("digest-{}", id),
    }
}

/// Scenario pool: 1,000,000 A / 2,000,000 B at 6 decimals, base fee only
fn pool_object(reward_balance: u128) -> LedgerObject {
    LedgerObject {
        object_ref: object_ref(POOL_ID),
        object_type: Some(format!("0xabc::pool::Pool<{}, 0x2::sui::SUI>", USDC)),
        initial_shared_version: Some(5),
        fields: json!({
            "balance_a": "1000000000000",
            "balance_b": "2000000000000",
            "lp_supply": "1414213562373",
            "lp_builder_fee": "0",
            "burn_fee": "0",
            "creator_royalty_fee": "0",
            "rewards_fee": "0",
            "reward_balance": reward_balance.to_string(),
            "creator_royalty_wallet": "0x77"
        }),
    }
}

fn coin(coin_type: &CoinType, id: &str, balance: u64) -> CoinObject {
    CoinObject {
        coin_type: coin_type.clone(),
        object_ref: object_ref(id),
        balance,
    }
}

fn block(status: ExecutionStatus, events: Vec<LedgerEvent>) -> TransactionBlock {
    TransactionBlock {
        digest: TransactionDigest::new("digest-1"),
        effects: TransactionEffects {
            status,
            gas_used: Some(1_250_000),
        },
        events,
    }
}

fn not_indexed() -> Result<TransactionBlock, LedgerError> {
    Err(LedgerError::from_rpc(
        -32602,
        "Could not find the referenced transaction [TransactionDigest(digest-1)]",
    ))
}

fn config() -> SluiceConfig {
    let mut config = SluiceConfig::default();
    config.ledger.package_id = "0xabc".to_string();
    config.ledger.factory_id = "0xfac".to_string();
    config
}

struct Harness {
    ledger: Arc<InMemoryLedger>,
    signer: Arc<StaticSigner>,
    previewed: PoolObject,
}

impl Harness {
    fn new(reward_balance: u128) -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let pool = pool_object(reward_balance);
        ledger.insert_object(pool.clone());
        ledger.set_coins(&usdc(), vec![coin(&usdc(), "0x1", 5_000_000_000)]);
        ledger.set_coins(&CoinType::native(), vec![coin(&CoinType::native(), "0x2", 1_000_000_000)]);

        Self {
            ledger,
            signer: Arc::new(StaticSigner::new(ObjectId::parse("0x5e4d").unwrap())),
            previewed: PoolObject::from_ledger_object(&pool).unwrap(),
        }
    }

    fn client(&self) -> AmmClient<InMemoryLedger, StaticSigner> {
        AmmClient::new(self.ledger.clone(), self.signer.clone(), &config()).unwrap()
    }
}

fn sell_a(amount_in: u128) -> SwapRequest {
    SwapRequest {
        direction: SwapDirection::AToB,
        amount_in,
        slippage_bps: 50,
    }
}

fn metadata() -> StaticMetadata {
    let meta = |coin_type: CoinType, symbol: &str, decimals: u8| CoinMetadata {
        coin_type,
        symbol: symbol.to_string(),
        decimals,
        name: String::new(),
        description: String::new(),
        icon_url: None,
    };
    StaticMetadata::new([PoolMetadata {
        pool_id: POOL_ID.to_string(),
        coin_a: meta(usdc(), "USDC", 6),
        coin_b: meta(CoinType::native(), "SUI", 9),
    }])
}

#[tokio::test]
async fn test_high_impact_swap_is_blocked_before_any_network_call() {
    let harness = Harness::new(0);
    let client = harness.client();

    // 200,000 A into a 1,000,000 A reserve moves the price ~16.5%
    let err = client
        .swap(&harness.previewed, &sell_a(200_000_000_000))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::PriceImpactTooHigh { .. }));
    assert!(err.is_local());
    assert_eq!(harness.ledger.calls(), 0);
    assert!(harness.signer.signed().is_empty());
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_network() {
    let harness = Harness::new(0);
    let client = harness.client();

    let err = SwapRequest::from_display(SwapDirection::AToB, "1.2.3", 6, "0.5").unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidAmount(_)));

    let err = client
        .swap(&harness.previewed, &sell_a(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::InvalidAmount(_)));

    let mut all_slippage = sell_a(1_000_000_000);
    all_slippage.slippage_bps = 10_000;
    let err = client
        .swap(&harness.previewed, &all_slippage)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::SlippageTooHigh { min_out: 0 }));

    assert_eq!(harness.ledger.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_swap_confirms_after_transient_lookups() {
    let harness = Harness::new(0);
    for _ in 0..3 {
        harness.ledger.push_lookup(not_indexed());
    }
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    let client = harness.client();
    let request = SwapRequest::from_display(SwapDirection::AToB, "1000", 6, "0.5").unwrap();
    let started = Instant::now();

    let receipt = client.swap(&harness.previewed, &request).await.unwrap();

    assert!(matches!(receipt.outcome, ExecutionOutcome::Confirmed { .. }));
    assert_eq!(receipt.impact, ImpactLevel::Acceptable);
    assert!(receipt.quote.amount_out > 1_977_000_000 && receipt.quote.amount_out < 1_979_000_000);
    assert_eq!(receipt.activity, None);
    // 3s initial delay, then three 5s intervals before the fourth lookup
    assert_eq!(started.elapsed(), Duration::from_secs(18));
    // pool read, two coin reads, submission, four lookups
    assert_eq!(harness.ledger.calls(), 8);

    let signed = harness.signer.signed();
    assert_eq!(signed.len(), 1);
    let call = signed[0].move_call().unwrap();
    assert_eq!(call.function, "swap_a_for_b");
    assert_eq!(signed[0].pure_u64(call.arguments[2]), Some(receipt.quote.min_out as u64));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_polling_is_reported_as_timed_out() {
    let harness = Harness::new(u128::MAX);
    let activity = Arc::new(ScriptedActivity::default());
    let client = harness.client().with_reconciler(SideEffectReconciler::new(
        activity.clone(),
        Arc::new(metadata()),
        config().activity,
    ));
    let started = Instant::now();

    let receipt = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap();

    assert_eq!(
        receipt.outcome,
        ExecutionOutcome::TimedOut {
            digest: TransactionDigest::new("digest-1")
        }
    );
    assert_eq!(started.elapsed(), Duration::from_secs(3 + 9 * 5));
    assert_eq!(receipt.activity, None);
    assert_eq!(activity.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_lookup_error_is_fatal() {
    let harness = Harness::new(0);
    harness.ledger.push_lookup(Err(LedgerError::Rpc {
        code: -32000,
        message: "Invalid digest".to_string(),
    }));
    let client = harness.client();

    let err = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::FatalLookup { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_on_chain_abort_is_decoded() {
    let harness = Harness::new(0);
    harness.ledger.push_lookup(Ok(block(
        ExecutionStatus::Failure {
            error: "MoveAbort(MoveLocation { module: ModuleId { address: abc, name: Identifier(\"pool\") }, \
                    function: 4, instruction: 31, function_name: Some(\"swap_a_for_b\") }, 3) in command 1"
                .to_string(),
        },
        vec![],
    )));
    let client = harness.client();

    let err = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap_err();

    match err {
        ExecutionError::ContractAbort { abort, message, .. } => {
            let abort = abort.unwrap();
            assert_eq!(abort.reason(), AbortReason::ExcessiveSlippage);
            assert_eq!(abort.command, Some(1));
            assert!(message.starts_with("Slippage tolerance exceeded"));
        }
        other => panic!("expected contract abort, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_unknown_abort_code_uses_generic_message() {
    let harness = Harness::new(0);
    harness.ledger.push_lookup(Ok(block(
        ExecutionStatus::Failure {
            error: "MoveAbort(MoveLocation { module: ModuleId { address: abc, name: Identifier(\"pool\") }, \
                    function: 4, instruction: 31, function_name: Some(\"swap_a_for_b\") }, 999)"
                .to_string(),
        },
        vec![],
    )));
    let client = harness.client();

    let err = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExecutionError::ContractAbort { ref message, .. } if message == "pool::swap_a_for_b failed with code 999"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_activity_conflict_stops_without_retry() {
    // 1,000 SUI at 9 decimals
    let harness = Harness::new(1_000_000_000_000);
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    let activity = Arc::new(ScriptedActivity::new([Ok(ActivationResponse::Conflict {
        message: "already active".to_string(),
    })]));
    let client = harness.client().with_reconciler(SideEffectReconciler::new(
        activity.clone(),
        Arc::new(metadata()),
        config().activity,
    ));

    let receipt = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap();

    assert!(receipt.outcome.is_confirmed());
    assert_eq!(
        receipt.activity,
        Some(ReconcileOutcome::Conflict {
            message: "already active".to_string()
        })
    );
    assert_eq!(activity.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_activity_failure_does_not_fail_the_swap() {
    let harness = Harness::new(5_000_000_000_000);
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    let activity = Arc::new(ScriptedActivity::new([Err(
        sluice_adapters::ActivityError::Status {
            status: 500,
            body: "boom".to_string(),
        },
    )]));
    let client = harness.client().with_reconciler(SideEffectReconciler::new(
        activity.clone(),
        Arc::new(metadata()),
        config().activity,
    ));

    let receipt = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap();

    assert!(receipt.outcome.is_confirmed());
    assert!(matches!(
        receipt.activity,
        Some(ReconcileOutcome::Failed { attempts: 4, .. })
    ));
    assert_eq!(activity.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_signer_rejection_stops_before_submission() {
    let harness = Harness::new(0);
    let signer = Arc::new(StaticSigner::rejecting(ObjectId::parse("0x5e4d").unwrap()));
    let client = AmmClient::new(harness.ledger.clone(), signer, &config()).unwrap();

    let err = client
        .swap(&harness.previewed, &sell_a(1_000_000_000))
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::Signer(_)));
    assert!(harness.ledger.submitted().is_empty());
}

#[tokio::test]
async fn test_insufficient_funds_is_reported_without_signing() {
    let harness = Harness::new(0);
    let client = harness.client();

    // Wallet holds 5,000 A
    let err = client
        .swap(&harness.previewed, &sell_a(6_000_000_000))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExecutionError::InsufficientFunds {
            coin_type: USDC.to_string(),
            required: 6_000_000_000,
            available: 5_000_000_000,
        }
    );
    assert!(harness.signer.signed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_liquidity_event_found_on_refetch() {
    let harness = Harness::new(0);
    let added = LedgerEvent {
        event_type: format!("0xabc::pool::LiquidityAdded<{}, 0x2::sui::SUI>", USDC),
        parsed_json: json!({ "lp_minted": "1414213" }),
    };
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![added.clone()])));
    let client = harness.client();
    let started = Instant::now();

    let receipt = client
        .add_liquidity(&harness.previewed, 1_000_000, 2_000_000, 100)
        .await
        .unwrap();

    match receipt.outcome {
        ExecutionOutcome::Confirmed { event, .. } => assert_eq!(event, EventStatus::Found(added)),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(receipt.quote.min_lp_out > 0);
    // 3s initial delay plus the single 5s re-fetch wait
    assert_eq!(started.elapsed(), Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn test_missing_event_is_not_fatal() {
    let harness = Harness::new(0);
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    let client = harness.client();

    let receipt = client
        .add_liquidity(&harness.previewed, 1_000_000, 2_000_000, 100)
        .await
        .unwrap();

    assert!(matches!(
        receipt.outcome,
        ExecutionOutcome::Confirmed {
            event: EventStatus::Missing,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_remove_liquidity_passes_quoted_minimums() {
    let harness = Harness::new(0);
    let lp_type = CoinType::parse(&format!(
        "{}::pool::LP<{}, 0x2::sui::SUI>",
        ObjectId::parse("0xabc").unwrap(),
        USDC
    ))
    .unwrap();
    harness
        .ledger
        .set_coins(&lp_type, vec![coin(&lp_type, "0x3", 2_000_000)]);
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    let client = harness.client();

    let receipt = client
        .remove_liquidity(&harness.previewed, 1_000_000, 100)
        .await
        .unwrap();

    let signed = harness.signer.signed();
    let call = signed[0].move_call().unwrap();
    assert_eq!(call.function, "remove_liquidity");
    assert_eq!(
        signed[0].pure_u64(call.arguments[2]),
        Some(receipt.quote.min_a_out as u64)
    );
    assert_eq!(
        signed[0].pure_u64(call.arguments[3]),
        Some(receipt.quote.min_b_out as u64)
    );
}

fn lp_type() -> CoinType {
    CoinType::parse(&format!(
        "{}::pool::LP<{}, 0x2::sui::SUI>",
        ObjectId::parse("0xabc").unwrap(),
        USDC
    ))
    .unwrap()
}

fn factory_object(initial_shared_version: Option<u64>) -> LedgerObject {
    LedgerObject {
        object_ref: object_ref("0xfac"),
        object_type: Some("0xabc::factory::Factory".to_string()),
        initial_shared_version,
        fields: json!({}),
    }
}

fn new_pool_request() -> CreatePoolRequest {
    CreatePoolRequest {
        coin_a: usdc(),
        coin_b: CoinType::native(),
        amount_a: 1_000_000,
        amount_b: 2_000_000,
        fees: FeeSchedule {
            lp_builder_bps: 10,
            burn_bps: 5,
            creator_royalty_bps: 0,
            rewards_bps: 0,
        },
        creator_royalty_wallet: ObjectId::parse("0x77").unwrap(),
    }
}

#[tokio::test]
async fn test_burning_zero_lp_never_reaches_the_network() {
    let harness = Harness::new(0);
    let client = harness.client();

    let err = client
        .burn_lp(&ObjectId::parse(POOL_ID).unwrap(), 0)
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::InvalidAmount(_)));
    assert_eq!(harness.ledger.calls(), 0);
    assert!(harness.signer.signed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_burn_lp_deposits_into_the_fetched_pool() {
    let harness = Harness::new(0);
    harness
        .ledger
        .set_coins(&lp_type(), vec![coin(&lp_type(), "0x3", 2_000_000)]);
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![])));
    let client = harness.client();

    let outcome = client
        .burn_lp(&ObjectId::parse(POOL_ID).unwrap(), 500_000)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ExecutionOutcome::Confirmed {
            event: EventStatus::NotRequested,
            ..
        }
    ));
    let signed = harness.signer.signed();
    assert_eq!(signed.len(), 1);
    let call = signed[0].move_call().unwrap();
    assert_eq!(call.function, "deposit_lp");
    assert_eq!(call.type_arguments, vec![usdc(), CoinType::native()]);
}

#[tokio::test]
async fn test_create_pool_rejects_the_same_coin_twice() {
    let harness = Harness::new(0);
    harness.ledger.insert_object(factory_object(Some(3)));
    let client = harness.client();
    // Long address form of the same coin
    let long_form = CoinType::parse(&format!(
        "{}::usdc::USDC",
        ObjectId::parse("0xdef").unwrap()
    ))
    .unwrap();
    let request = CreatePoolRequest {
        coin_b: long_form,
        ..new_pool_request()
    };

    let err = client.create_pool(&request).await.unwrap_err();

    assert_eq!(
        err,
        ExecutionError::InvalidAmount("a pool needs two different coins".to_string())
    );
    assert_eq!(harness.ledger.calls(), 0);
}

#[tokio::test]
async fn test_create_pool_without_factory_is_a_build_error() {
    let harness = Harness::new(0);
    let mut config = config();
    config.ledger.factory_id = String::new();
    let client = AmmClient::new(harness.ledger.clone(), harness.signer.clone(), &config).unwrap();

    let err = client.create_pool(&new_pool_request()).await.unwrap_err();

    assert_eq!(err, ExecutionError::Build("no factory_id configured".to_string()));
    assert_eq!(harness.ledger.calls(), 0);
}

#[tokio::test]
async fn test_create_pool_requires_a_shared_factory() {
    let harness = Harness::new(0);
    harness.ledger.insert_object(factory_object(None));
    let client = harness.client();

    let err = client.create_pool(&new_pool_request()).await.unwrap_err();

    match err {
        ExecutionError::Build(message) => assert!(message.ends_with("is not a shared object")),
        other => panic!("expected build error, got {:?}", other),
    }
    // Only the factory read
    assert_eq!(harness.ledger.calls(), 1);
    assert!(harness.signer.signed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_create_pool_reports_pool_created_event() {
    let harness = Harness::new(0);
    harness.ledger.insert_object(factory_object(Some(3)));
    let created = LedgerEvent {
        event_type: format!("0xabc::factory::PoolCreated<{}, 0x2::sui::SUI>", USDC),
        parsed_json: json!({ "pool_id": "0x51", "lp_minted": "1414213" }),
    };
    harness
        .ledger
        .push_lookup(Ok(block(ExecutionStatus::Success, vec![created.clone()])));
    let client = harness.client();

    let outcome = client.create_pool(&new_pool_request()).await.unwrap();

    match outcome {
        ExecutionOutcome::Confirmed { event, .. } => assert_eq!(event, EventStatus::Found(created)),
        other => panic!("unexpected outcome {:?}", other),
    }
    let signed = harness.signer.signed();
    let call = signed[0].move_call().unwrap();
    assert_eq!(call.function, "create_pool");
    assert_eq!(call.module, "factory");
    assert_eq!(call.type_arguments, vec![usdc(), CoinType::native()]);
    // factory, coin a, coin b, then the four fee settings
    assert_eq!(signed[0].pure_u64(call.arguments[3]), Some(10));
    assert_eq!(signed[0].pure_u64(call.arguments[4]), Some(5));
}
