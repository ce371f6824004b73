//! In-memory collaborators for tests
//!
//! Scripted stand-ins for the ledger, wallet, metadata service and activity
//! endpoint. The scripted ones record what they were asked so tests can
//! assert on network traffic.

use crate::activity::{ActivationResponse, ActivityEndpoint};
use crate::error::{ActivityError, LedgerError, MetadataError, Result, SignerError};
use crate::ledger::{LedgerObject, LedgerRpc};
use crate::metadata::{MetadataSource, PoolMetadata};
use crate::signer::WalletSigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use types::{
    CoinObject, CoinType, ObjectId, SignedTransaction, TransactionBlock, TransactionDigest,
    TransactionPayload,
};

/// Ledger backed by maps and a queue of scripted transaction lookups
#[derive(Default)]
pub struct InMemoryLedger {
    objects: Mutex<HashMap<ObjectId, LedgerObject>>,
    coins: Mutex<HashMap<String, Vec<CoinObject>>>,
    lookups: Mutex<VecDeque<Result<TransactionBlock>>>,
    submit_result: Mutex<Option<Result<TransactionDigest>>>,
    submitted: Mutex<Vec<SignedTransaction>>,
    calls: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_object(&self, object: LedgerObject) {
        self.objects
            .lock()
            .insert(object.object_ref.object_id, object);
    }

    pub fn set_coins(&self, coin_type: &CoinType, coins: Vec<CoinObject>) {
        self.coins.lock().insert(coin_type.normalized(), coins);
    }

    /// Queue the next `get_transaction` result; the last one repeats
    pub fn push_lookup(&self, result: Result<TransactionBlock>) {
        self.lookups.lock().push_back(result);
    }

    pub fn set_submit_result(&self, result: Result<TransactionDigest>) {
        *self.submit_result.lock() = Some(result);
    }

    /// Every ledger call made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted.lock().clone()
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerRpc for InMemoryLedger {
    async fn get_object(&self, object_id: &ObjectId) -> Result<LedgerObject> {
        self.record();
        self.objects
            .lock()
            .get(object_id)
            .cloned()
            .ok_or_else(|| LedgerError::ObjectNotFound {
                object_id: object_id.to_string(),
            })
    }

    async fn get_balance(&self, _owner: &ObjectId, coin_type: &CoinType) -> Result<u128> {
        self.record();
        Ok(self
            .coins
            .lock()
            .get(&coin_type.normalized())
            .map(|coins| coins.iter().map(|c| u128::from(c.balance)).sum())
            .unwrap_or(0))
    }

    async fn get_coins(&self, _owner: &ObjectId, coin_type: &CoinType) -> Result<Vec<CoinObject>> {
        self.record();
        Ok(self
            .coins
            .lock()
            .get(&coin_type.normalized())
            .cloned()
            .unwrap_or_default())
    }

    async fn execute_transaction(&self, signed: &SignedTransaction) -> Result<TransactionDigest> {
        self.record();
        self.submitted.lock().push(signed.clone());
        self.submit_result
            .lock()
            .clone()
            .unwrap_or_else(|| Ok(TransactionDigest::new("digest-1")))
    }

    async fn get_transaction(&self, digest: &TransactionDigest) -> Result<TransactionBlock> {
        self.record();
        let mut lookups = self.lookups.lock();
        let next = if lookups.len() > 1 {
            lookups.pop_front()
        } else {
            lookups.front().cloned()
        };
        next.unwrap_or_else(|| {
            Err(LedgerError::NotYetIndexed {
                detail: format!("Could not find the referenced transaction {}", digest),
            })
        })
    }
}

/// Signer that approves (or rejects) everything and remembers the payloads
pub struct StaticSigner {
    address: ObjectId,
    reject: bool,
    signed: Mutex<Vec<TransactionPayload>>,
}

impl StaticSigner {
    pub fn new(address: ObjectId) -> Self {
        Self {
            address,
            reject: false,
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(address: ObjectId) -> Self {
        Self {
            reject: true,
            ..Self::new(address)
        }
    }

    pub fn signed(&self) -> Vec<TransactionPayload> {
        self.signed.lock().clone()
    }
}

#[async_trait]
impl WalletSigner for StaticSigner {
    fn address(&self) -> ObjectId {
        self.address
    }

    async fn sign(&self, payload: &TransactionPayload) -> std::result::Result<SignedTransaction, SignerError> {
        if self.reject {
            return Err(SignerError::Rejected("user declined".to_string()));
        }
        self.signed.lock().push(payload.clone());
        Ok(SignedTransaction {
            tx_bytes: format!("tx-{}-commands", payload.commands.len()),
            signatures: vec!["sig".to_string()],
        })
    }
}

/// Activity endpoint answering from a script; the last answer repeats
#[derive(Default)]
pub struct ScriptedActivity {
    responses: Mutex<VecDeque<std::result::Result<ActivationResponse, ActivityError>>>,
    calls: AtomicUsize,
}

impl ScriptedActivity {
    pub fn new(
        responses: impl IntoIterator<Item = std::result::Result<ActivationResponse, ActivityError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivityEndpoint for ScriptedActivity {
    async fn mark_active(
        &self,
        _pool_id: &str,
    ) -> std::result::Result<ActivationResponse, ActivityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        next.unwrap_or_else(|| {
            Ok(ActivationResponse::Activated {
                message: "ok".to_string(),
            })
        })
    }
}

/// Metadata source holding a fixed set of pools
#[derive(Default)]
pub struct StaticMetadata {
    pools: Mutex<Vec<PoolMetadata>>,
}

impl StaticMetadata {
    pub fn new(pools: impl IntoIterator<Item = PoolMetadata>) -> Self {
        Self {
            pools: Mutex::new(pools.into_iter().collect()),
        }
    }
}

#[async_trait]
impl MetadataSource for StaticMetadata {
    async fn pool_metadata(
        &self,
        coin_a: &CoinType,
        coin_b: &CoinType,
    ) -> std::result::Result<Option<PoolMetadata>, MetadataError> {
        Ok(self
            .pools
            .lock()
            .iter()
            .find(|pool| pool.side(coin_a).is_some() && pool.side(coin_b).is_some())
            .cloned())
    }
}
