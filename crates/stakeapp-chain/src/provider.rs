//! Wallet provider boundary.
//!
//! Everything the client does on chain goes through [`WalletProvider`]: account
//! access, network switching, read calls, gas estimation, sending and receipt
//! waiting. The wallet owns signing, confirmation prompts and timeouts.

use async_trait::async_trait;
use stakeapp_core::{Address, Bytes, NetworkConfig, TxHash};
use std::sync::Arc;

use crate::error::{ProviderError, StakeError};

/// A contract call, used for `eth_call`, `eth_estimateGas` and `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
    pub gas: Option<u64>,
}

impl CallRequest {
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            from: None,
            to,
            data: data.into(),
            gas: None,
        }
    }

    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    /// 4-byte function selector, if the calldata has one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }
}

/// Receipt of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    /// `false` when the transaction reverted.
    pub success: bool,
}

/// EIP-1193 style provider exposed by the user's wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Chain the wallet is currently on (`eth_chainId`).
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Ask the wallet to switch network (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Ask the wallet to add and select a network (`wallet_addEthereumChain`).
    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), ProviderError>;

    /// Read-only call (`eth_call` against the latest block).
    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError>;

    /// Dry run returning the gas limit; errors if the call would revert.
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ProviderError>;

    /// Hand the transaction to the wallet for signing and broadcast.
    async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash, ProviderError>;

    /// Resolve once the transaction has a receipt. No client-side timeout.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, ProviderError>;
}

/// Holds the active provider handle, if any.
#[derive(Clone, Default)]
pub struct ChainConnection {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl ChainConnection {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A connection with no wallet installed.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Result<&Arc<dyn WalletProvider>, StakeError> {
        self.provider.as_ref().ok_or_else(|| {
            StakeError::WalletUnavailable("no wallet provider is configured".to_string())
        })
    }
}

impl std::fmt::Debug for ChainConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConnection")
            .field("available", &self.is_available())
            .finish()
    }
}
