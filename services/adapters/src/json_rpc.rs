//! JSON-RPC 2.0 ledger client over HTTP
//!
//! Maps the full node's response shapes onto the domain types in `types`.
//! Every method is a single request except `get_coins`, which follows the
//! pagination cursor until the owner has no more pages.

use crate::error::{LedgerError, Result};
use crate::ledger::{json_u128, LedgerObject, LedgerRpc};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use types::{
    CoinObject, CoinType, ExecutionStatus, LedgerEvent, ObjectId, ObjectRef, SignedTransaction,
    TransactionBlock, TransactionDigest, TransactionEffects,
};

/// Coins requested per page
const COIN_PAGE_LIMIT: u32 = 50;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct ObjectResponse {
    data: Option<ObjectData>,
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectData {
    object_id: ObjectId,
    version: Value,
    digest: String,
    #[serde(rename = "type")]
    object_type: Option<String>,
    owner: Option<Value>,
    content: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    total_balance: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<CoinEntry>,
    next_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinEntry {
    coin_type: String,
    coin_object_id: ObjectId,
    version: Value,
    digest: String,
    balance: Value,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    digest: TransactionDigest,
}

#[derive(Deserialize)]
struct TransactionResponse {
    digest: TransactionDigest,
    effects: Option<EffectsData>,
    #[serde(default)]
    events: Vec<LedgerEvent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EffectsData {
    status: ExecutionStatus,
    gas_used: Option<GasSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GasSummary {
    computation_cost: Value,
    storage_cost: Value,
    storage_rebate: Value,
}

impl GasSummary {
    fn net(&self) -> Option<u64> {
        let spent = json_u128(&self.computation_cost)? + json_u128(&self.storage_cost)?;
        let net = spent.saturating_sub(json_u128(&self.storage_rebate)?);
        u64::try_from(net).ok()
    }
}

fn json_u64(value: &Value, what: &str) -> Result<u64> {
    json_u128(value)
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| LedgerError::InvalidResponse(format!("{} is not a u64: {}", what, value)))
}

/// `initial_shared_version` from an owner of the form `{"Shared": {...}}`
fn shared_version(owner: &Value) -> Option<u64> {
    owner
        .get("Shared")
        .and_then(|shared| shared.get("initial_shared_version"))
        .and_then(json_u128)
        .and_then(|v| u64::try_from(v).ok())
}

/// Ledger client speaking JSON-RPC 2.0 to a full node
pub struct JsonRpcLedger {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("RPC {} #{}", method, id);

        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() && body.is_empty() {
            return Err(LedgerError::Transport(format!("{} returned HTTP {}", method, status)));
        }

        decode_response(method, &body)
    }
}

fn decode_response<T: DeserializeOwned>(method: &str, body: &str) -> Result<T> {
    let envelope: RpcResponse<T> = serde_json::from_str(body)?;
    if let Some(error) = envelope.error {
        return Err(LedgerError::from_rpc(error.code, error.message));
    }
    envelope
        .result
        .ok_or_else(|| LedgerError::InvalidResponse(format!("{} returned no result", method)))
}

fn object_from_response(requested: &ObjectId, response: ObjectResponse) -> Result<LedgerObject> {
    let data = match (response.data, response.error) {
        (Some(data), _) => data,
        (None, error) => {
            debug!("Object {} unavailable: {:?}", requested, error);
            return Err(LedgerError::ObjectNotFound {
                object_id: requested.to_string(),
            });
        }
    };

    let fields = data
        .content
        .as_ref()
        .and_then(|content| content.get("fields"))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(LedgerObject {
        object_ref: ObjectRef {
            object_id: data.object_id,
            version: json_u64(&data.version, "object version")?,
            digest: data.digest,
        },
        object_type: data.object_type,
        initial_shared_version: data.owner.as_ref().and_then(shared_version),
        fields,
    })
}

fn coin_from_entry(entry: CoinEntry) -> Result<CoinObject> {
    let coin_type = CoinType::parse(&entry.coin_type)
        .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
    Ok(CoinObject {
        coin_type,
        object_ref: ObjectRef {
            object_id: entry.coin_object_id,
            version: json_u64(&entry.version, "coin version")?,
            digest: entry.digest,
        },
        balance: json_u64(&entry.balance, "coin balance")?,
    })
}

fn block_from_response(response: TransactionResponse) -> Result<TransactionBlock> {
    let effects = response.effects.ok_or_else(|| {
        LedgerError::InvalidResponse(format!("transaction {} has no effects", response.digest))
    })?;

    Ok(TransactionBlock {
        digest: response.digest,
        effects: TransactionEffects {
            status: effects.status,
            gas_used: effects.gas_used.as_ref().and_then(GasSummary::net),
        },
        events: response.events,
    })
}

#[async_trait]
impl LedgerRpc for JsonRpcLedger {
    async fn get_object(&self, object_id: &ObjectId) -> Result<LedgerObject> {
        let response: ObjectResponse = self
            .call(
                "sui_getObject",
                json!([object_id, { "showType": true, "showOwner": true, "showContent": true }]),
            )
            .await?;
        object_from_response(object_id, response)
    }

    async fn get_balance(&self, owner: &ObjectId, coin_type: &CoinType) -> Result<u128> {
        let response: BalanceResponse = self
            .call("suix_getBalance", json!([owner, coin_type.as_str()]))
            .await?;
        json_u128(&response.total_balance).ok_or_else(|| {
            LedgerError::InvalidResponse(format!("bad balance {}", response.total_balance))
        })
    }

    async fn get_coins(&self, owner: &ObjectId, coin_type: &CoinType) -> Result<Vec<CoinObject>> {
        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page: CoinPage = self
                .call(
                    "suix_getCoins",
                    json!([owner, coin_type.as_str(), cursor, COIN_PAGE_LIMIT]),
                )
                .await?;

            for entry in page.data {
                coins.push(coin_from_entry(entry)?);
            }

            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        debug!("Owner {} holds {} {} coins", owner, coins.len(), coin_type);
        Ok(coins)
    }

    async fn execute_transaction(&self, signed: &SignedTransaction) -> Result<TransactionDigest> {
        let response: ExecuteResponse = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    signed.tx_bytes,
                    signed.signatures,
                    { "showEffects": false },
                    "WaitForEffectsCert"
                ]),
            )
            .await?;
        Ok(response.digest)
    }

    async fn get_transaction(&self, digest: &TransactionDigest) -> Result<TransactionBlock> {
        let response: TransactionResponse = self
            .call(
                "sui_getTransactionBlock",
                json!([digest, { "showEffects": true, "showEvents": true }]),
            )
            .await?;
        block_from_response(response).map_err(|e| {
            warn!("Transaction {} returned without effects", digest);
            e
        })
    }
}
