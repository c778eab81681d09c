//! Target network parameters.
//!
//! The client is pinned to one network. These are the values handed to the
//! wallet when it has to add the chain, and the explorer used for links.

use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

/// Native currency of the target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Fixed network configuration (not user input at runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkConfig {
    /// Binance Smart Chain testnet, where the demo contracts are deployed.
    pub fn bsc_testnet() -> Self {
        Self {
            chain_id: 97,
            chain_name: "Binance Smart Chain Testnet".to_string(),
            native_currency: NativeCurrency {
                name: "BNB".to_string(),
                symbol: "BNB".to_string(),
                decimals: 18,
            },
            rpc_urls: vec!["https://data-seed-prebsc-1-s1.binance.org:8545".to_string()],
            block_explorer_urls: vec!["https://testnet.bscscan.com".to_string()],
        }
    }

    /// Chain id as the `0x`-prefixed hex quantity wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Block explorer link for a transaction, if an explorer is configured.
    pub fn explorer_tx_url(&self, hash: &TxHash) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), hash))
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::bsc_testnet()
    }
}

impl std::fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.chain_name, self.chain_id)
    }
}
