//! # Quote API - Pool Quote Endpoint
//!
//! ## Purpose
//!
//! Exposes the quote engine to the page layer over HTTP and offers a
//! debounced [`QuoteSession`] for interactive amount inputs. Both are pure
//! consumers of `sluice-amm`: reserves and fees arrive with the request or
//! snapshot, nothing here reads the ledger.
//!
//! ## Endpoints
//!
//! - `GET /quote?pool_id=&amount=&sell_a=&buy_b=&reserve_a=&reserve_b=&lp_builder_fee=&burn_fee=&creator_royalty_fee=&rewards_fee=&slippage_bps=`
//! - `GET /health`
//!
//! Raw amounts travel as decimal strings so 128-bit values survive JSON.

pub mod error;
pub mod server;
pub mod session;

pub use error::{ApiError, Result};
pub use server::{quote_from_params, routes, QuoteDefaults, QuoteResponse};
pub use session::{QuoteField, QuoteSession, QuoteUpdate, QuoteUpdates};
