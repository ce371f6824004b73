//! # Sluice Adapters - External Collaborator Boundary
//!
//! ## Purpose
//!
//! Every network-facing dependency of the AMM client sits behind a trait in
//! this crate: the ledger JSON-RPC node, the user's wallet, the pool/coin
//! metadata service and the activity-flag endpoint. Nothing here computes
//! business math; adapters only move and decode data.
//!
//! ## Integration Points
//!
//! - **Ledger RPC**: [`LedgerRpc`] with the HTTP implementation [`JsonRpcLedger`]
//! - **Wallet**: [`WalletSigner`], implemented by the embedding application
//! - **Metadata**: [`MetadataClient`] with a per-pair `DashMap` cache
//! - **Activity flag**: [`HttpActivityClient`], 409 reported as a normal outcome
//!
//! ## Architecture Role
//!
//! Clients are constructed once per process from configuration and passed
//! explicitly into the execution layer. There is no global client state.
//!
//! Enable the `test-utils` feature for in-memory doubles of every trait.

pub mod activity;
pub mod error;
pub mod json_rpc;
pub mod ledger;
pub mod metadata;
pub mod pool;
pub mod signer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use activity::{classify_response, ActivationResponse, ActivityEndpoint, HttpActivityClient};
pub use error::{ActivityError, LedgerError, MetadataError, Result, SignerError, NOT_YET_INDEXED};
pub use json_rpc::JsonRpcLedger;
pub use ledger::{json_u128, LedgerObject, LedgerRpc};
pub use metadata::{MetadataClient, MetadataSource, PoolMetadata};
pub use pool::{fetch_pool, PoolObject};
pub use signer::WalletSigner;
