//! Wallet connection: account access and network selection.

use stakeapp_core::{NetworkConfig, WalletSession};

use crate::error::{ProviderError, StakeError};
use crate::provider::{ChainConnection, WalletProvider};

/// Connect the wallet and make sure it is on `network`.
///
/// Requests account access, picks the first account, then switches the wallet
/// to the target chain, adding it first if the wallet does not know it.
/// Nothing is attempted when no provider is configured.
pub async fn connect_wallet(
    connection: &ChainConnection,
    network: &NetworkConfig,
) -> Result<WalletSession, StakeError> {
    let provider = connection.provider()?;

    let accounts = provider.request_accounts().await.map_err(|e| match e {
        ProviderError::Rejected(msg) => StakeError::UserRejected(msg),
        other => StakeError::WalletUnavailable(other.to_string()),
    })?;

    let address = accounts.first().copied().ok_or_else(|| {
        StakeError::UserRejected("wallet returned no accounts".to_string())
    })?;
    tracing::info!("Wallet account {} selected ({} available)", address, accounts.len());

    ensure_network(provider.as_ref(), network).await?;

    Ok(WalletSession {
        address,
        chain_id: network.chain_id,
    })
}

/// Switch to the target chain, falling back to adding it.
async fn ensure_network(
    provider: &dyn WalletProvider,
    network: &NetworkConfig,
) -> Result<(), StakeError> {
    match provider.switch_chain(network.chain_id).await {
        Ok(()) => {}
        Err(ProviderError::UnrecognizedChain(_)) => {
            tracing::info!("Wallet does not know {}, requesting to add it", network);
            provider.add_chain(network).await.map_err(|e| match e {
                ProviderError::Rejected(msg) => StakeError::UserRejected(msg),
                other => StakeError::NetworkMismatch(format!(
                    "could not add {}: {}",
                    network, other
                )),
            })?;
        }
        Err(ProviderError::Rejected(msg)) => return Err(StakeError::UserRejected(msg)),
        Err(e) => {
            return Err(StakeError::NetworkMismatch(format!(
                "could not switch to {}: {}",
                network, e
            )));
        }
    }

    let current = provider
        .chain_id()
        .await
        .map_err(|e| StakeError::NetworkMismatch(format!("could not read chain id: {}", e)))?;
    if current != network.chain_id {
        return Err(StakeError::NetworkMismatch(format!(
            "wallet is on chain {}, expected {}",
            current, network
        )));
    }

    tracing::info!("Wallet on {}", network);
    Ok(())
}
