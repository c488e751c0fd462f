//! Engine configuration, loaded from TOML with environment overrides.
//!
//! The struct is intentionally small and typed; it only carries the
//! knobs the engine itself consumes (RPC endpoint and timeouts). The
//! outer web layer has its own configuration.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::Result;

/// Engine configuration.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// RPC endpoint of the Ethereum-compatible chain.
    pub chain_rpc_url: String,

    /// Per-request timeout for reconciliation chain reads, in
    /// milliseconds. Applied per campaign, not per batch.
    pub read_timeout_ms: u64,

    /// How long the orchestrator waits for a submitted transaction to
    /// confirm, in milliseconds.
    pub confirmation_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            chain_rpc_url: "http://localhost:8545".to_string(),
            read_timeout_ms: 5_000,
            confirmation_timeout_ms: 120_000,
        }
    }
}

impl EngineConfig {
    /// Builds a config from environment variables, falling back to
    /// defaults for unset optional values.
    ///
    /// Variables read:
    /// - `GIVECHAIN_RPC_URL`: chain RPC endpoint (required)
    /// - `GIVECHAIN_READ_TIMEOUT_MS`: per-read timeout (default: 5000)
    /// - `GIVECHAIN_CONFIRMATION_TIMEOUT_MS`: confirmation wait
    ///   (default: 120000)
    ///
    /// # Errors
    ///
    /// Returns an error if `GIVECHAIN_RPC_URL` is unset or a numeric
    /// value fails to parse.
    pub fn from_env() -> Result<Self> {
        let chain_rpc_url = std::env::var("GIVECHAIN_RPC_URL")
            .map_err(|_| "GIVECHAIN_RPC_URL environment variable not set")?;

        let read_timeout_ms = match std::env::var("GIVECHAIN_READ_TIMEOUT_MS") {
            Ok(val) => val
                .parse::<u64>()
                .map_err(|_| format!("GIVECHAIN_READ_TIMEOUT_MS invalid: '{}'", val))?,
            Err(_) => 5_000,
        };

        let confirmation_timeout_ms = match std::env::var("GIVECHAIN_CONFIRMATION_TIMEOUT_MS") {
            Ok(val) => val.parse::<u64>().map_err(|_| {
                format!("GIVECHAIN_CONFIRMATION_TIMEOUT_MS invalid: '{}'", val)
            })?,
            Err(_) => 120_000,
        };

        Ok(Self {
            chain_rpc_url,
            read_timeout_ms,
            confirmation_timeout_ms,
        })
    }
}

/// Load config from a TOML file path.
/// If the file is missing or fails to parse, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let p = path.as_ref();
    let s = fs::read_to_string(p)?;
    let cfg: EngineConfig = toml::from_str(&s)?;
    Ok(cfg)
}
