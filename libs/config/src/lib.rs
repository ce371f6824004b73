//! # Sluice Configuration
//!
//! Layered configuration for every Sluice component plus the protocol
//! constants they default to.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sluice_config::SluiceConfig;
//!
//! let config = SluiceConfig::load(None, Some("testnet")).unwrap();
//! println!("RPC: {}", config.ledger.rpc_url);
//! ```

pub mod protocol;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{
    load_config, ActivityConfig, ConfirmationConfig, LedgerConfig, MetadataConfig, QuoteConfig,
    ServerConfig, SluiceConfig,
};
