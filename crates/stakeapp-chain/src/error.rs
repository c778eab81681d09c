//! Error types for wallet and staking operations.

use stakeapp_core::{AmountError, TokenAmount, TxHash};
use thiserror::Error;

/// EIP-1193 code for a request the user declined in the wallet.
pub const USER_REJECTED_CODE: i64 = 4001;

/// EIP-1193 code for a chain the wallet has not been told about.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Failure reported by the wallet provider or the node behind it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Request rejected by user: {0}")]
    Rejected(String),

    #[error("Chain not recognized by wallet: {0}")]
    UnrecognizedChain(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a JSON-RPC error object by its EIP-1193 code.
    pub fn from_code(code: i64, message: String) -> Self {
        match code {
            USER_REJECTED_CODE => ProviderError::Rejected(message),
            UNRECOGNIZED_CHAIN_CODE => ProviderError::UnrecognizedChain(message),
            _ => ProviderError::Rpc { code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

/// Failure of a connect, refresh, or staking operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    #[error("No wallet provider available: {0}")]
    WalletUnavailable(String),

    #[error("Request rejected in wallet: {0}")]
    UserRejected(String),

    #[error("Wallet is not on the expected network: {0}")]
    NetworkMismatch(String),

    #[error("Connect a wallet first")]
    NoSession,

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Cannot unstake {requested} tokens, only {staked} staked")]
    InsufficientStaked {
        requested: TokenAmount,
        staked: TokenAmount,
    },

    #[error("Gas estimation failed, transaction not sent: {0}")]
    EstimationFailed(String),

    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Transaction {0} reverted")]
    TransactionReverted(TxHash),

    #[error("Balance synchronization failed: {0}")]
    SyncFailed(String),
}

impl StakeError {
    /// Stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StakeError::WalletUnavailable(_) => "WalletUnavailable",
            StakeError::UserRejected(_) => "UserRejected",
            StakeError::NetworkMismatch(_) => "NetworkMismatch",
            StakeError::NoSession => "NoSession",
            StakeError::InvalidAmount(_) => "InvalidAmount",
            StakeError::InsufficientStaked { .. } => "InsufficientStaked",
            StakeError::EstimationFailed(_) => "EstimationFailed",
            StakeError::SubmissionFailed(_) => "SubmissionFailed",
            StakeError::TransactionReverted(_) => "TransactionReverted",
            StakeError::SyncFailed(_) => "SyncFailed",
        }
    }

    /// Whether the failure was detected before anything was sent to the network.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            StakeError::NoSession
                | StakeError::InvalidAmount(_)
                | StakeError::InsufficientStaked { .. }
        )
    }
}
