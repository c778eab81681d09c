//! Core domain types for staking operations.

pub use alloy_primitives::{Address, Bytes, TxHash, U256};

/// Connected wallet account on the target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSession {
    pub address: Address,
    pub chain_id: u64,
}

/// Kind of mutating operation a user can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Grant the staking contract an allowance on the token.
    Approve,
    /// Deposit tokens into the staking contract.
    Stake,
    /// Withdraw staked tokens.
    Unstake,
    /// Mint demo tokens to the connected account.
    Mint,
    /// Fund the staking contract's reward pool.
    AddReward,
}

impl OperationKind {
    /// Get display label for the operation.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Approve => "Approve",
            OperationKind::Stake => "Stake",
            OperationKind::Unstake => "Unstake",
            OperationKind::Mint => "Mint",
            OperationKind::AddReward => "Add Reward",
        }
    }

    /// Get description for the operation.
    pub fn description(&self) -> &'static str {
        match self {
            OperationKind::Approve => "Allow the staking contract to transfer your tokens",
            OperationKind::Stake => "Deposit tokens into the staking contract",
            OperationKind::Unstake => "Withdraw staked tokens",
            OperationKind::Mint => "Mint demo tokens to your account",
            OperationKind::AddReward => "Add tokens to the reward pool",
        }
    }

    /// Whether the local guard compares against the staked amount.
    pub fn is_withdrawal(&self) -> bool {
        matches!(self, OperationKind::Unstake)
    }

    pub fn all() -> &'static [OperationKind] {
        &[
            OperationKind::Approve,
            OperationKind::Stake,
            OperationKind::Unstake,
            OperationKind::Mint,
            OperationKind::AddReward,
        ]
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A user request to perform one operation with a human-entered amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationIntent {
    pub kind: OperationKind,
    /// Decimal string in whole-token units, validated by the controller.
    pub amount: String,
}

impl OperationIntent {
    pub fn new(kind: OperationKind, amount: impl Into<String>) -> Self {
        Self {
            kind,
            amount: amount.into(),
        }
    }
}

/// Lifecycle of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxStatus {
    /// Accepted by the wallet, waiting for the receipt.
    #[default]
    Submitted,
    /// Included with a success status.
    Confirmed,
    /// Reverted, dropped, or the outcome could not be determined.
    Failed,
}

impl TxStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TxStatus::Submitted => "Submitted",
            TxStatus::Confirmed => "Confirmed",
            TxStatus::Failed => "Failed",
        }
    }
}

/// The latest transaction sent through the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub kind: OperationKind,
    pub status: TxStatus,
}

impl PendingTransaction {
    pub fn submitted(hash: TxHash, kind: OperationKind) -> Self {
        Self {
            hash,
            kind,
            status: TxStatus::Submitted,
        }
    }
}

/// Phase of the operation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationPhase {
    #[default]
    Idle,
    Validating,
    EstimatingGas,
    Submitted(TxHash),
    Confirmed(TxHash),
    Failed(String),
}

impl OperationPhase {
    pub fn label(&self) -> &'static str {
        match self {
            OperationPhase::Idle => "Idle",
            OperationPhase::Validating => "Validating",
            OperationPhase::EstimatingGas => "Estimating gas",
            OperationPhase::Submitted(_) => "Submitted",
            OperationPhase::Confirmed(_) => "Confirmed",
            OperationPhase::Failed(_) => "Failed",
        }
    }
}

/// Phase change for one operation, published to frontends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationUpdate {
    pub kind: OperationKind,
    pub phase: OperationPhase,
}
