//! # Sluice Ledger Types
//!
//! Shared type system for everything that crosses the ledger boundary:
//! object identifiers, owned coin objects, the programmable transaction
//! payload the builder emits, and the effects/events the ledger reports back.
//!
//! ## Design Philosophy
//!
//! - **Raw units only**: balances are `u64`/`u128` raw integers, never floats
//! - **Transport agnostic**: shapes mirror the ledger's JSON-RPC responses
//!   but carry no client code
//! - **Serde everywhere**: every type round-trips through `serde_json` so the
//!   adapters can decode RPC payloads straight into them
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{CoinType, ObjectId};
//!
//! let sui = CoinType::native();
//! assert!(sui.is_native());
//!
//! let pool = ObjectId::parse("0x2a").unwrap();
//! assert_eq!(pool.to_string().len(), 66);
//! ```

pub mod coin;
pub mod effects;
pub mod error;
pub mod object;
pub mod transaction;

pub use coin::{CoinMetadata, CoinObject, CoinType, NATIVE_COIN_TYPE};
pub use effects::{
    ExecutionStatus, LedgerEvent, TransactionBlock, TransactionDigest, TransactionEffects,
};
pub use error::TypeError;
pub use object::{ObjectId, ObjectRef, SharedObject};
pub use transaction::{
    Argument, CallArg, Command, MoveCall, PureArg, SignedTransaction, TransactionPayload,
};
