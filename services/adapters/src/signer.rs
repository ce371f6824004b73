//! Wallet signer interface
//!
//! Key custody stays in the wallet. The client hands over a built payload and
//! gets back serialized bytes plus signatures ready for submission.

use crate::error::SignerError;
use async_trait::async_trait;
use types::{ObjectId, SignedTransaction, TransactionPayload};

#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address that signs and pays gas
    fn address(&self) -> ObjectId;

    /// Serialize and sign `payload`; the user may reject it
    async fn sign(&self, payload: &TransactionPayload) -> Result<SignedTransaction, SignerError>;
}
