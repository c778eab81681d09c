//! Balance synchronization.
//!
//! Re-reads the four observable quantities from the contracts on every call.
//! There is no local ledger; the contracts are the only source of truth.

use stakeapp_core::{StakingSnapshot, TokenAmount, WalletSession};

use crate::contracts::{StakingContract, TokenContract};
use crate::error::{ProviderError, StakeError};
use crate::provider::WalletProvider;

/// Reads a fresh [`StakingSnapshot`] for a session.
#[derive(Debug, Clone, Copy)]
pub struct BalanceSynchronizer {
    token: TokenContract,
    staking: StakingContract,
    decimals: u8,
}

impl BalanceSynchronizer {
    pub fn new(token: TokenContract, staking: StakingContract, decimals: u8) -> Self {
        Self {
            token,
            staking,
            decimals,
        }
    }

    /// Issue the four reads concurrently and build a complete snapshot.
    ///
    /// Any single failure fails the whole refresh, so callers never publish a
    /// half-updated snapshot.
    pub async fn refresh(
        &self,
        provider: &dyn WalletProvider,
        session: &WalletSession,
    ) -> Result<StakingSnapshot, StakeError> {
        let account = session.address;
        let sync_failed =
            |what: &str, e: ProviderError| StakeError::SyncFailed(format!("{}: {}", what, e));

        let (balance, staked, reward, invested) = futures::try_join!(
            async {
                self.token
                    .balance_of(provider, account)
                    .await
                    .map_err(|e| sync_failed("balanceOf", e))
            },
            async {
                self.staking
                    .user_amount(provider, account)
                    .await
                    .map_err(|e| sync_failed("userAmount", e))
            },
            async {
                self.staking
                    .calculate_receive_amount(provider, account)
                    .await
                    .map_err(|e| sync_failed("calculateReceiveAmount", e))
            },
            async {
                self.staking
                    .total_invested(provider)
                    .await
                    .map_err(|e| sync_failed("tokenDetails", e))
            },
        )?;

        let snapshot = StakingSnapshot {
            token_balance: TokenAmount::new(balance, self.decimals),
            staked_amount: TokenAmount::new(staked, self.decimals),
            projected_reward: TokenAmount::new(reward, self.decimals),
            total_invested: TokenAmount::new(invested, self.decimals),
        };

        tracing::debug!(
            "Synchronized {}: balance={}, staked={}, reward={}, invested={}",
            account,
            snapshot.token_balance,
            snapshot.staked_amount,
            snapshot.projected_reward,
            snapshot.total_invested
        );

        Ok(snapshot)
    }
}
