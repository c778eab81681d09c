//! Application configuration and persistence utilities.
//!
//! The config file holds the target network, the two contract addresses and
//! the wallet endpoint. It is not session state: nothing about a connected
//! account or its balances is ever written here.

use alloy_primitives::{Address, address};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::network::NetworkConfig;

/// Token contract deployed for the demo on BSC testnet.
pub const DEFAULT_TOKEN_ADDRESS: Address = address!("f379252Ab964302Eb81eE83a429F32DCd121f71F");

/// Staking contract deployed for the demo on BSC testnet.
pub const DEFAULT_STAKING_ADDRESS: Address =
    address!("8317A5fAe541C810358814CbDEF0835EDD921dba");

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Other configuration error.
    #[error("{0}")]
    Other(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network the wallet must be on.
    #[serde(default)]
    pub network: NetworkConfig,
    /// ERC20-style token contract.
    #[serde(default = "default_token_address")]
    pub token_address: Address,
    /// Staking contract.
    #[serde(default = "default_staking_address")]
    pub staking_address: Address,
    /// JSON-RPC endpoint of the wallet provider. `None` means no wallet.
    #[serde(default)]
    pub wallet_url: Option<String>,
    /// Interval between receipt polls while a transaction is pending.
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
}

fn default_token_address() -> Address {
    DEFAULT_TOKEN_ADDRESS
}

fn default_staking_address() -> Address {
    DEFAULT_STAKING_ADDRESS
}

fn default_receipt_poll_interval_ms() -> u64 {
    1500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            token_address: DEFAULT_TOKEN_ADDRESS,
            staking_address: DEFAULT_STAKING_ADDRESS,
            wallet_url: None,
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
        }
    }
}

// ==================== Path Utilities ====================

/// Get the config directory.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("xyz", "stakeapp", "stakeapp")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))
}

/// Get the config file path.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join("config.json"))
}

// ==================== Config I/O ====================

/// Load configuration from a specific file, falling back to defaults if it is absent.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a specific file.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Save configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path()?)
}
