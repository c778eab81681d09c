//! Staking operation controller.
//!
//! Turns an [`OperationIntent`] into one on-chain transaction:
//!
//! ```text
//! Idle -> Validating -> EstimatingGas -> Submitted -> Confirmed | Failed
//! ```
//!
//! Each operation runs to completion before the next one can start: the
//! controller borrows the [`ClientState`] mutably for the whole pipeline, so
//! only one transaction is ever tracked. Approve and Stake are separate
//! operations and are never chained here; the allowance must be confirmed by
//! the caller before staking.

use stakeapp_core::{
    Address, ClientState, NetworkConfig, OperationIntent, OperationKind, OperationPhase,
    OperationUpdate, PendingTransaction, TOKEN_DECIMALS, TokenAmount, TxStatus, U256,
    WalletSession, parse_positive,
};
use tokio::sync::mpsc;

use crate::contracts::{ContractAddresses, StakingContract, TokenContract};
use crate::error::{ProviderError, StakeError};
use crate::provider::{CallRequest, ChainConnection, TxReceipt};
use crate::sync::BalanceSynchronizer;
use crate::wallet::connect_wallet;

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Re-read balances before the Unstake guard instead of trusting the last snapshot.
    pub refresh_before_unstake: bool,
}

/// Validates, sequences and tracks staking operations.
pub struct StakeOperationController {
    connection: ChainConnection,
    network: NetworkConfig,
    token: TokenContract,
    staking: StakingContract,
    synchronizer: BalanceSynchronizer,
    options: ControllerOptions,
    updates: Option<mpsc::UnboundedSender<OperationUpdate>>,
}

impl StakeOperationController {
    pub fn new(
        connection: ChainConnection,
        network: NetworkConfig,
        addresses: ContractAddresses,
    ) -> Self {
        let token = TokenContract::new(addresses.token);
        let staking = StakingContract::new(addresses.staking, addresses.token);
        Self {
            connection,
            network,
            token,
            staking,
            synchronizer: BalanceSynchronizer::new(token, staking, TOKEN_DECIMALS),
            options: ControllerOptions::default(),
            updates: None,
        }
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    /// Publish phase changes on `tx` as operations progress.
    pub fn with_updates(mut self, tx: mpsc::UnboundedSender<OperationUpdate>) -> Self {
        self.updates = Some(tx);
        self
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Connect the wallet, publish the session and synchronize once.
    ///
    /// If the first synchronization fails the session stays connected with an
    /// empty snapshot and `SyncFailed` is returned.
    pub async fn connect(&self, state: &mut ClientState) -> Result<WalletSession, StakeError> {
        let session = connect_wallet(&self.connection, &self.network).await?;
        tracing::info!("Connected {} on chain {}", session.address, session.chain_id);

        *state = ClientState {
            session: Some(session),
            ..ClientState::default()
        };
        self.refresh(state).await?;
        Ok(session)
    }

    /// Forget the session and everything read for it.
    pub fn disconnect(&self, state: &mut ClientState) {
        if let Some(session) = state.session {
            tracing::info!("Disconnected {}", session.address);
        }
        state.clear();
    }

    /// Re-read all balances; the snapshot is replaced only on success.
    pub async fn refresh(&self, state: &mut ClientState) -> Result<(), StakeError> {
        let session = state.session.ok_or(StakeError::NoSession)?;
        let provider = self.connection.provider()?;

        match self.synchronizer.refresh(provider.as_ref(), &session).await {
            Ok(snapshot) => {
                state.snapshot = snapshot;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Keeping previous snapshot: {}", e);
                Err(e)
            }
        }
    }

    pub async fn approve(
        &self,
        state: &mut ClientState,
        amount: &str,
    ) -> Result<TxReceipt, StakeError> {
        self.execute(state, &OperationIntent::new(OperationKind::Approve, amount))
            .await
    }

    pub async fn stake(
        &self,
        state: &mut ClientState,
        amount: &str,
    ) -> Result<TxReceipt, StakeError> {
        self.execute(state, &OperationIntent::new(OperationKind::Stake, amount))
            .await
    }

    pub async fn unstake(
        &self,
        state: &mut ClientState,
        amount: &str,
    ) -> Result<TxReceipt, StakeError> {
        self.execute(state, &OperationIntent::new(OperationKind::Unstake, amount))
            .await
    }

    pub async fn mint(
        &self,
        state: &mut ClientState,
        amount: &str,
    ) -> Result<TxReceipt, StakeError> {
        self.execute(state, &OperationIntent::new(OperationKind::Mint, amount))
            .await
    }

    pub async fn add_reward(
        &self,
        state: &mut ClientState,
        amount: &str,
    ) -> Result<TxReceipt, StakeError> {
        self.execute(state, &OperationIntent::new(OperationKind::AddReward, amount))
            .await
    }

    /// Run one intent through validate, estimate, send, confirm and resync.
    ///
    /// On `Ok` the transaction is confirmed and the snapshot is fresh. A
    /// `SyncFailed` error after confirmation leaves `last_transaction` marked
    /// Confirmed with the previous snapshot kept.
    pub async fn execute(
        &self,
        state: &mut ClientState,
        intent: &OperationIntent,
    ) -> Result<TxReceipt, StakeError> {
        let kind = intent.kind;

        self.publish(kind, OperationPhase::Validating);
        let (session, amount) = match self.validate(state, intent).await {
            Ok(validated) => validated,
            Err(e) => return Err(self.fail(kind, e)),
        };
        let provider = match self.connection.provider() {
            Ok(provider) => provider,
            Err(e) => return Err(self.fail(kind, e)),
        };

        let request = self.build_call(kind, session.address, amount);

        self.publish(kind, OperationPhase::EstimatingGas);
        let gas = match provider.estimate_gas(&request).await {
            Ok(gas) => gas,
            Err(ProviderError::Rejected(msg)) => {
                return Err(self.fail(kind, StakeError::UserRejected(msg)));
            }
            Err(e) => return Err(self.fail(kind, StakeError::EstimationFailed(e.to_string()))),
        };
        tracing::info!("Estimated gas for {}: {}", kind, gas);

        let request = request.gas_limit(gas);
        let hash = match provider.send_transaction(&request).await {
            Ok(hash) => hash,
            Err(ProviderError::Rejected(msg)) => {
                return Err(self.fail(kind, StakeError::UserRejected(msg)));
            }
            Err(e) => return Err(self.fail(kind, StakeError::SubmissionFailed(e.to_string()))),
        };

        state.last_transaction = Some(PendingTransaction::submitted(hash, kind));
        tracing::info!("{} transaction submitted: {}", kind, hash);
        self.publish(kind, OperationPhase::Submitted(hash));

        match provider.wait_for_receipt(hash).await {
            Ok(receipt) if receipt.success => {
                set_status(state, TxStatus::Confirmed);
                tracing::info!(
                    "{} transaction {} confirmed in block {:?}",
                    kind,
                    hash,
                    receipt.block_number
                );
                self.publish(kind, OperationPhase::Confirmed(hash));
                self.refresh(state).await?;
                Ok(receipt)
            }
            Ok(_) => {
                set_status(state, TxStatus::Failed);
                Err(self.fail(kind, StakeError::TransactionReverted(hash)))
            }
            Err(e) => {
                // Outcome unknown: the transaction may or may not have landed.
                set_status(state, TxStatus::Failed);
                tracing::warn!("Lost track of {} transaction {}: {}", kind, hash, e);
                if let Err(sync_err) = self.refresh(state).await {
                    tracing::warn!("Resync after unknown outcome failed: {}", sync_err);
                }
                Err(self.fail(
                    kind,
                    StakeError::SubmissionFailed(format!("no receipt for {}: {}", hash, e)),
                ))
            }
        }
    }

    /// Local pre-flight checks. Advisory only: the contract still enforces its own rules.
    async fn validate(
        &self,
        state: &mut ClientState,
        intent: &OperationIntent,
    ) -> Result<(WalletSession, U256), StakeError> {
        let session = state.session.ok_or(StakeError::NoSession)?;
        let amount = parse_positive(&intent.amount, TOKEN_DECIMALS)?;

        if intent.kind.is_withdrawal() {
            if self.options.refresh_before_unstake {
                self.refresh(state).await?;
            }
            let staked = state.snapshot.staked_amount;
            if amount > staked.raw() {
                return Err(StakeError::InsufficientStaked {
                    requested: TokenAmount::new(amount, TOKEN_DECIMALS),
                    staked,
                });
            }
        }

        Ok((session, amount))
    }

    fn build_call(&self, kind: OperationKind, account: Address, amount: U256) -> CallRequest {
        let request = match kind {
            OperationKind::Approve => self.token.approve(self.staking.address(), amount),
            OperationKind::Stake => self.staking.deposit(amount),
            OperationKind::Unstake => self.staking.withdraw(amount),
            OperationKind::Mint => self.token.mint(account, amount),
            OperationKind::AddReward => self.staking.add_reward_tokens(amount),
        };
        request.sender(account)
    }

    fn publish(&self, kind: OperationKind, phase: OperationPhase) {
        if let Some(tx) = &self.updates {
            let _ = tx.send(OperationUpdate { kind, phase });
        }
    }

    fn fail(&self, kind: OperationKind, error: StakeError) -> StakeError {
        if error.is_preflight() {
            tracing::info!("{} rejected locally ({}): {}", kind, error.kind(), error);
        } else {
            tracing::warn!("{} failed ({}): {}", kind, error.kind(), error);
        }
        self.publish(kind, OperationPhase::Failed(error.to_string()));
        error
    }
}

fn set_status(state: &mut ClientState, status: TxStatus) {
    if let Some(tx) = state.last_transaction.as_mut() {
        tx.status = status;
    }
}
