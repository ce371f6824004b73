//! Service Configuration Module
//!
//! Loads [`SluiceConfig`] from a base TOML file, an optional
//! environment-specific override and `SLUICE_` environment variables, in that
//! order. Every field has a default, so a missing section falls back cleanly.

use crate::protocol;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config/sluice.toml";

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SluiceConfig {
    pub ledger: LedgerConfig,
    pub confirmation: ConfirmationConfig,
    pub quote: QuoteConfig,
    pub metadata: MetadataConfig,
    pub activity: ActivityConfig,
    pub server: ServerConfig,
}

/// Ledger RPC endpoint and deployed package
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    pub rpc_url: String,
    pub request_timeout_ms: u64,
    /// Published AMM package id
    pub package_id: String,
    /// Shared factory object passed to `create_pool`
    pub factory_id: String,
    pub gas_budget: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://fullnode.mainnet.sui.io:443".to_string(),
            request_timeout_ms: 10_000,
            package_id: "0x0".to_string(),
            factory_id: "0x0".to_string(),
            gas_budget: protocol::DEFAULT_GAS_BUDGET,
        }
    }
}

impl LedgerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Post-submission polling
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub initial_delay_ms: u64,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
    pub event_refetch_delay_ms: u64,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: protocol::confirmation::INITIAL_DELAY_MS,
            poll_interval_ms: protocol::confirmation::POLL_INTERVAL_MS,
            max_attempts: protocol::confirmation::MAX_ATTEMPTS,
            event_refetch_delay_ms: protocol::confirmation::EVENT_REFETCH_DELAY_MS,
        }
    }
}

impl ConfirmationConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn event_refetch_delay(&self) -> Duration {
        Duration::from_millis(self.event_refetch_delay_ms)
    }
}

/// Quote preview behaviour
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct QuoteConfig {
    pub debounce_ms: u64,
    pub default_slippage_bps: u32,
    pub warn_impact_pct: Decimal,
    pub block_impact_pct: Decimal,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: protocol::quote::DEBOUNCE_MS,
            default_slippage_bps: protocol::quote::DEFAULT_SLIPPAGE_BPS,
            warn_impact_pct: Decimal::from(protocol::quote::WARN_IMPACT_PCT),
            block_impact_pct: Decimal::from(protocol::quote::BLOCK_IMPACT_PCT),
        }
    }
}

impl QuoteConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Pool/coin metadata service
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MetadataConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090/pools".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

impl MetadataConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Activity-flag endpoint and reward thresholds
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ActivityConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Reward balance in display units that marks a pool active
    pub thresholds: BTreeMap<String, u64>,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090/activity".to_string(),
            request_timeout_ms: 5_000,
            max_attempts: protocol::activity::MAX_ATTEMPTS,
            base_delay_ms: protocol::activity::BASE_DELAY_MS,
            max_delay_ms: protocol::activity::MAX_DELAY_MS,
            thresholds: protocol::activity::DEFAULT_THRESHOLDS
                .iter()
                .map(|(symbol, threshold)| (symbol.to_string(), *threshold))
                .collect(),
        }
    }
}

impl ActivityConfig {
    /// Threshold for a reserve symbol, case-insensitive
    ///
    /// Keys read through the config layer arrive lowercased.
    pub fn threshold_for(&self, symbol: &str) -> Option<u64> {
        self.thresholds
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(symbol))
            .map(|(_, threshold)| *threshold)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Quote HTTP server
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8085,
        }
    }
}

impl SluiceConfig {
    /// Load configuration from files with environment overrides
    ///
    /// An explicit `base_path` must exist; the default path is optional.
    /// Environment files are read from `environments/<env>.toml` next to the
    /// base file. Variables use `SLUICE_<SECTION>__<FIELD>`.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let required = base_path.is_some();
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(required));

        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("SLUICE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .with_context(|| format!("Failed to build configuration from {:?}", base))?;

        let mut config: SluiceConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.expand_env_vars()?;
        config.validate()?;

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Expand `${VAR}` references in URL fields
    pub fn expand_env_vars(&mut self) -> Result<()> {
        for (label, url) in [
            ("ledger RPC URL", &mut self.ledger.rpc_url),
            ("metadata URL", &mut self.metadata.base_url),
            ("activity URL", &mut self.activity.base_url),
        ] {
            let expanded = shellexpand::env(url.as_str())
                .with_context(|| format!("Failed to expand {}", label))?
                .to_string();
            *url = expanded;
        }
        Ok(())
    }

    /// Reject values outside the ranges the services support
    pub fn validate(&self) -> Result<()> {
        let attempts = self.confirmation.max_attempts;
        if !(protocol::confirmation::MIN_ATTEMPTS..=protocol::confirmation::MAX_ATTEMPTS_CEILING)
            .contains(&attempts)
        {
            anyhow::bail!(
                "confirmation.max_attempts must be between {} and {}, got {}",
                protocol::confirmation::MIN_ATTEMPTS,
                protocol::confirmation::MAX_ATTEMPTS_CEILING,
                attempts
            );
        }
        if self.activity.max_attempts == 0 {
            anyhow::bail!("activity.max_attempts cannot be zero");
        }
        if self.quote.warn_impact_pct > self.quote.block_impact_pct {
            anyhow::bail!(
                "quote.warn_impact_pct ({}) exceeds quote.block_impact_pct ({})",
                self.quote.warn_impact_pct,
                self.quote.block_impact_pct
            );
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Convenience function to load configuration from a path or the default location
pub fn load_config(path: Option<PathBuf>, environment: Option<&str>) -> Result<SluiceConfig> {
    SluiceConfig::load(path.as_deref(), environment)
}
