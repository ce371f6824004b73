//! Submission and confirmation tracking
//!
//! ```text
//! Building -> Signed -> Submitted -> Confirmed(success)
//!                                 -> Confirmed(failure)
//!                                 -> TimedOut
//! ```
//!
//! After submission the executor polls the digest on a fixed interval. A
//! "not yet indexed" lookup is retried; any other lookup error ends the wait.
//! Running out of attempts is `TimedOut`: the transaction may still land, so
//! it is reported as unconfirmed rather than failed.

use crate::abort::describe_failure;
use crate::error::{ExecutionError, Result};
use network::{retry, RetryError, RetryPolicy};
use serde::Serialize;
use sluice_adapters::{LedgerError, LedgerRpc, WalletSigner};
use sluice_config::ConfirmationConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use types::{ExecutionStatus, LedgerEvent, TransactionBlock, TransactionDigest, TransactionPayload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TransactionState {
    Building,
    Signed,
    Submitted { digest: TransactionDigest },
    Confirmed { digest: TransactionDigest, success: bool },
    TimedOut { digest: TransactionDigest },
}

impl TransactionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Confirmed { .. } | TransactionState::TimedOut { .. }
        )
    }

    /// Whether `next` directly follows `self`
    pub fn can_advance_to(&self, next: &TransactionState) -> bool {
        use TransactionState::*;
        match (self, next) {
            (Building, Signed) => true,
            (Signed, Submitted { .. }) => true,
            (Submitted { digest }, Confirmed { digest: next, .. })
            | (Submitted { digest }, TimedOut { digest: next }) => digest == next,
            _ => false,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TransactionState::Building => "building",
            TransactionState::Signed => "signed",
            TransactionState::Submitted { .. } => "submitted",
            TransactionState::Confirmed { .. } => "confirmed",
            TransactionState::TimedOut { .. } => "timed_out",
        }
    }
}

/// Linear state holder that refuses out-of-order transitions
#[derive(Debug)]
struct Lifecycle {
    state: TransactionState,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            state: TransactionState::Building,
        }
    }

    fn advance(&mut self, next: TransactionState) -> Result<()> {
        if !self.state.can_advance_to(&next) {
            return Err(ExecutionError::Build(format!(
                "illegal transition {} -> {}",
                self.state.name(),
                next.name()
            )));
        }
        debug!("Transaction {} -> {}", self.state.name(), next.name());
        self.state = next;
        Ok(())
    }
}

/// Whether the expected domain event showed up
#[derive(Debug, Clone, PartialEq)]
pub enum EventStatus {
    /// The caller did not ask for an event
    NotRequested,
    Found(LedgerEvent),
    /// Succeeded on chain but the event never appeared
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Confirmed {
        block: TransactionBlock,
        event: EventStatus,
    },
    /// Poll budget exhausted; verify manually
    TimedOut { digest: TransactionDigest },
}

impl ExecutionOutcome {
    pub fn digest(&self) -> &TransactionDigest {
        match self {
            ExecutionOutcome::Confirmed { block, .. } => &block.digest,
            ExecutionOutcome::TimedOut { digest } => digest,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ExecutionOutcome::Confirmed { .. })
    }
}

/// Signs, submits and tracks one transaction at a time
pub struct TransactionExecutor<L: ?Sized, S: ?Sized> {
    ledger: Arc<L>,
    signer: Arc<S>,
    poll_policy: RetryPolicy,
    event_refetch_delay: Duration,
}

impl<L, S> TransactionExecutor<L, S>
where
    L: LedgerRpc + ?Sized,
    S: WalletSigner + ?Sized,
{
    pub fn new(ledger: Arc<L>, signer: Arc<S>, config: &ConfirmationConfig) -> Self {
        Self {
            ledger,
            signer,
            poll_policy: RetryPolicy::fixed(
                config.max_attempts,
                config.initial_delay(),
                config.poll_interval(),
            ),
            event_refetch_delay: config.event_refetch_delay(),
        }
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn signer(&self) -> &Arc<S> {
        &self.signer
    }

    /// Drive `payload` to a terminal state
    ///
    /// `expected_event` is the struct name of the event the call emits on
    /// success (e.g. `LiquidityAdded`). On-chain failure is returned as
    /// [`ExecutionError::ContractAbort`] with the decoded reason.
    pub async fn execute(
        &self,
        payload: &TransactionPayload,
        expected_event: Option<&str>,
    ) -> Result<ExecutionOutcome> {
        let mut lifecycle = Lifecycle::new();
        let target = payload
            .move_call()
            .map(|call| call.function.clone())
            .unwrap_or_default();

        let signed = self.signer.sign(payload).await?;
        lifecycle.advance(TransactionState::Signed)?;

        let digest = self
            .ledger
            .execute_transaction(&signed)
            .await
            .map_err(ExecutionError::Submission)?;
        info!("Submitted {} as {}", target, digest);
        lifecycle.advance(TransactionState::Submitted {
            digest: digest.clone(),
        })?;

        let block = match self.await_confirmation(&digest).await? {
            Some(block) => block,
            None => {
                lifecycle.advance(TransactionState::TimedOut {
                    digest: digest.clone(),
                })?;
                return Ok(ExecutionOutcome::TimedOut { digest });
            }
        };

        let success = block.effects.status.is_success();
        lifecycle.advance(TransactionState::Confirmed {
            digest: digest.clone(),
            success,
        })?;

        if let ExecutionStatus::Failure { error } = &block.effects.status {
            let (abort, message) = describe_failure(error);
            warn!("Transaction {} failed on chain: {}", digest, message);
            return Err(ExecutionError::ContractAbort {
                digest,
                abort,
                message,
            });
        }

        info!("Transaction {} confirmed", digest);
        let event = match expected_event {
            Some(name) => self.extract_event(&block, name).await,
            None => EventStatus::NotRequested,
        };
        Ok(ExecutionOutcome::Confirmed { block, event })
    }

    /// Poll until a terminal status; `None` when the budget runs out
    pub async fn await_confirmation(&self, digest: &TransactionDigest) -> Result<Option<TransactionBlock>> {
        let ledger = self.ledger.as_ref();
        let label = format!("confirmation of {}", digest);
        let polled = retry(
            &self.poll_policy,
            &label,
            move |_attempt| ledger.get_transaction(digest),
            LedgerError::is_transient,
        )
        .await;

        match polled {
            Ok(block) => Ok(Some(block)),
            Err(RetryError::Exhausted { attempts, .. }) => {
                warn!(
                    "Transaction {} not confirmed after {} lookups; verify manually",
                    digest, attempts
                );
                Ok(None)
            }
            Err(RetryError::Aborted(source)) => Err(ExecutionError::FatalLookup {
                digest: digest.clone(),
                source,
            }),
        }
    }

    /// Find `name` in the block, re-fetching exactly once after a delay
    async fn extract_event(&self, block: &TransactionBlock, name: &str) -> EventStatus {
        if let Some(event) = block.find_event(name) {
            return EventStatus::Found(event.clone());
        }

        debug!(
            "{} not yet visible in {}, re-fetching in {:?}",
            name, block.digest, self.event_refetch_delay
        );
        tokio::time::sleep(self.event_refetch_delay).await;

        match self.ledger.get_transaction(&block.digest).await {
            Ok(refreshed) => match refreshed.find_event(name) {
                Some(event) => EventStatus::Found(event.clone()),
                None => {
                    warn!("Transaction {} succeeded but emitted no {}", block.digest, name);
                    EventStatus::Missing
                }
            },
            Err(e) => {
                warn!("Re-fetch of {} for {} failed: {}", block.digest, name, e);
                EventStatus::Missing
            }
        }
    }
}
