//! # Sluice Execution - Transaction Lifecycle
//!
//! ## Purpose
//!
//! Turns a confirmed quote into a ledger transaction and follows it to a
//! terminal state: funding-source selection, programmable transaction
//! assembly, signing, submission, confirmation polling, Move abort decoding
//! and the post-swap activity flag.
//!
//! ## Integration Points
//!
//! - **Input**: pool snapshots and quotes from `sluice-amm`, configuration
//!   from `sluice-config`
//! - **Collaborators**: `LedgerRpc`, `WalletSigner`, `MetadataSource` and
//!   `ActivityEndpoint` from `sluice-adapters`, all injected
//! - **Timing**: polling and activity retries share `network::retry`
//!
//! ## Failure Model
//!
//! | condition | surfaced as |
//! |---|---|
//! | bad input, slippage or impact gate | `ExecutionError`, before any network call |
//! | "not yet indexed" lookup | retried silently |
//! | any other lookup error | `ExecutionError::FatalLookup` |
//! | on-chain failure | `ExecutionError::ContractAbort` with decoded reason |
//! | poll budget exhausted | `ExecutionOutcome::TimedOut` |
//! | activity flag failure | `ReconcileOutcome::Failed`, swap unaffected |

pub mod abort;
pub mod builder;
pub mod coin_selection;
pub mod error;
pub mod operations;
pub mod reconciler;
pub mod submission;

pub use abort::{decode_abort, describe_failure, AbortInfo, AbortReason};
pub use builder::TransactionBuilder;
pub use coin_selection::{CoinPayment, CoinSelector, FundingPlan, FundingSource, OwnedCoins, PaymentRequest};
pub use error::{ExecutionError, Result};
pub use operations::{
    AmmClient, CreatePoolRequest, LiquidityReceipt, RemoveLiquidityReceipt, SwapReceipt, SwapRequest,
};
pub use reconciler::{PrimaryReserve, ReconcileOutcome, SideEffectReconciler};
pub use submission::{EventStatus, ExecutionOutcome, TransactionExecutor, TransactionState};
