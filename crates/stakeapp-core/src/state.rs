//! Client state owned by the frontend and threaded through the controller.

use crate::amount::TokenAmount;
use crate::types::{PendingTransaction, WalletSession};

/// The four observable staking quantities, read together.
///
/// A snapshot is never patched field by field; a refresh replaces it whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StakingSnapshot {
    /// Wallet token balance.
    pub token_balance: TokenAmount,
    /// Amount the account has deposited in the staking contract.
    pub staked_amount: TokenAmount,
    /// What the account would receive on withdrawal, as computed by the contract.
    pub projected_reward: TokenAmount,
    /// Total deposited into the staking contract for this token.
    pub total_invested: TokenAmount,
}

/// Session-scoped state: connected account, latest snapshot, latest transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    pub session: Option<WalletSession>,
    pub snapshot: StakingSnapshot,
    pub last_transaction: Option<PendingTransaction>,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session and everything derived from it.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
