//! Typed facades over the token and staking contracts.
//!
//! Reads go straight through the provider; writes only build the call so the
//! controller can estimate, send and track it. No business logic lives here.

use alloy_sol_types::{SolCall, sol};
use stakeapp_core::{Address, U256};

use crate::error::ProviderError;
use crate::provider::{CallRequest, WalletProvider};

sol! {
    interface IStakingToken {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
    }

    interface IStakingPool {
        function userAmount(address token, address user) external view returns (uint256);
        function calculateReceiveAmount(address token) external view returns (uint256);
        function tokenDetails(address token) external view returns (uint256 totalInvested);
        function deposit(address token, uint256 amount) external;
        function withdraw(address token, uint256 amount) external;
        function addRewardTokens(address token, uint256 amount) external;
    }
}

/// Deployed addresses of the two contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub token: Address,
    pub staking: Address,
}

/// Decode the first 32-byte word of a return value as `uint256`.
///
/// `tokenDetails` returns a tuple led by `totalInvested`; reading only the
/// leading word keeps the client working if the contract returns more fields.
pub(crate) fn decode_leading_uint(data: &[u8]) -> Result<U256, ProviderError> {
    let word = data.get(..32).ok_or_else(|| {
        ProviderError::InvalidResponse(format!(
            "expected at least 32 bytes of return data, got {}",
            data.len()
        ))
    })?;
    Ok(U256::from_be_slice(word))
}

/// ERC20-style token with a public mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContract {
    address: Address,
}

impl TokenContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn balance_of(
        &self,
        provider: &dyn WalletProvider,
        account: Address,
    ) -> Result<U256, ProviderError> {
        let call = IStakingToken::balanceOfCall { account };
        let data = provider
            .call(&CallRequest::new(self.address, call.abi_encode()))
            .await?;
        decode_leading_uint(&data)
    }

    pub fn approve(&self, spender: Address, amount: U256) -> CallRequest {
        let call = IStakingToken::approveCall { spender, amount };
        CallRequest::new(self.address, call.abi_encode())
    }

    pub fn mint(&self, to: Address, amount: U256) -> CallRequest {
        let call = IStakingToken::mintCall { to, amount };
        CallRequest::new(self.address, call.abi_encode())
    }
}

/// Staking pool contract, scoped to one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakingContract {
    address: Address,
    token: Address,
}

impl StakingContract {
    pub fn new(address: Address, token: Address) -> Self {
        Self { address, token }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn user_amount(
        &self,
        provider: &dyn WalletProvider,
        user: Address,
    ) -> Result<U256, ProviderError> {
        let call = IStakingPool::userAmountCall {
            token: self.token,
            user,
        };
        let data = provider
            .call(&CallRequest::new(self.address, call.abi_encode()))
            .await?;
        decode_leading_uint(&data)
    }

    /// Amount `caller` would receive; the contract reads `msg.sender`.
    pub async fn calculate_receive_amount(
        &self,
        provider: &dyn WalletProvider,
        caller: Address,
    ) -> Result<U256, ProviderError> {
        let call = IStakingPool::calculateReceiveAmountCall { token: self.token };
        let request = CallRequest::new(self.address, call.abi_encode()).sender(caller);
        let data = provider.call(&request).await?;
        decode_leading_uint(&data)
    }

    pub async fn total_invested(
        &self,
        provider: &dyn WalletProvider,
    ) -> Result<U256, ProviderError> {
        let call = IStakingPool::tokenDetailsCall { token: self.token };
        let data = provider
            .call(&CallRequest::new(self.address, call.abi_encode()))
            .await?;
        decode_leading_uint(&data)
    }

    pub fn deposit(&self, amount: U256) -> CallRequest {
        let call = IStakingPool::depositCall {
            token: self.token,
            amount,
        };
        CallRequest::new(self.address, call.abi_encode())
    }

    pub fn withdraw(&self, amount: U256) -> CallRequest {
        let call = IStakingPool::withdrawCall {
            token: self.token,
            amount,
        };
        CallRequest::new(self.address, call.abi_encode())
    }

    pub fn add_reward_tokens(&self, amount: U256) -> CallRequest {
        let call = IStakingPool::addRewardTokensCall {
            token: self.token,
            amount,
        };
        CallRequest::new(self.address, call.abi_encode())
    }
}
