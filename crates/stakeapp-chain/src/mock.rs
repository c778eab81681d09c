//! In-memory wallet and contracts for unit tests.
//!
//! Executes the token and staking calls against a small ledger so tests can
//! check balances move the way the real contracts move them.

use alloy_sol_types::SolCall;
use async_trait::async_trait;
use stakeapp_core::{Address, Bytes, NetworkConfig, TxHash, U256};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::contracts::{IStakingPool, IStakingToken};
use crate::error::{ProviderError, USER_REJECTED_CODE};
use crate::provider::{CallRequest, TxReceipt, WalletProvider};

/// Whole tokens in smallest units.
pub(crate) fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
}

/// Injected misbehaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Failure {
    /// Switching fails with 4902 until the chain is added.
    UnknownChain,
    AddChain,
    RejectAccounts,
    RejectSwitch,
    /// Switch reports success but the wallet stays where it was.
    IgnoreSwitch,
    Reads,
    Estimate,
    RejectSend,
    /// Transactions are mined but revert.
    Revert,
    /// Transactions land but the receipt never arrives.
    ReceiptLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MockCall {
    RequestAccounts,
    ChainId,
    SwitchChain(u64),
    AddChain(u64),
    Call([u8; 4]),
    EstimateGas([u8; 4]),
    Send([u8; 4]),
    WaitReceipt(TxHash),
}

#[derive(Debug, Clone, Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, U256>,
    staked: HashMap<Address, U256>,
    total_invested: U256,
    reward_pool: U256,
}

impl Ledger {
    fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn staked(&self, account: &Address) -> U256 {
        self.staked.get(account).copied().unwrap_or_default()
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), String> {
        let balance = self.balance(&account);
        if balance < amount {
            return Err("insufficient balance".to_string());
        }
        self.balances.insert(account, balance - amount);
        Ok(())
    }

    fn credit(&mut self, account: Address, amount: U256) {
        let balance = self.balance(&account);
        self.balances.insert(account, balance + amount);
    }

    fn receive_amount(&self, account: &Address) -> U256 {
        let staked = self.staked(account);
        if self.total_invested.is_zero() {
            return staked;
        }
        staked + self.reward_pool * staked / self.total_invested
    }

    fn read(&self, request: &CallRequest) -> Result<Vec<u8>, String> {
        let data = &request.data;
        let word = |v: U256| v.to_be_bytes::<32>().to_vec();
        match request.selector() {
            Some(s) if s == IStakingToken::balanceOfCall::SELECTOR => {
                let call = IStakingToken::balanceOfCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                Ok(word(self.balance(&call.account)))
            }
            Some(s) if s == IStakingPool::userAmountCall::SELECTOR => {
                let call = IStakingPool::userAmountCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                Ok(word(self.staked(&call.user)))
            }
            Some(s) if s == IStakingPool::calculateReceiveAmountCall::SELECTOR => {
                let caller = request.from.unwrap_or_default();
                Ok(word(self.receive_amount(&caller)))
            }
            Some(s) if s == IStakingPool::tokenDetailsCall::SELECTOR => {
                let mut out = word(self.total_invested);
                out.extend(word(self.reward_pool));
                Ok(out)
            }
            _ => Err("unknown selector".to_string()),
        }
    }

    fn execute(&mut self, request: &CallRequest) -> Result<(), String> {
        let sender = request.from.ok_or("missing sender")?;
        let data = &request.data;
        match request.selector() {
            Some(s) if s == IStakingToken::approveCall::SELECTOR => {
                let call = IStakingToken::approveCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                self.allowances.insert(sender, call.amount);
            }
            Some(s) if s == IStakingToken::mintCall::SELECTOR => {
                let call = IStakingToken::mintCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                self.credit(call.to, call.amount);
            }
            Some(s) if s == IStakingPool::depositCall::SELECTOR => {
                let call = IStakingPool::depositCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                let allowance = self.allowances.get(&sender).copied().unwrap_or_default();
                if allowance < call.amount {
                    return Err("insufficient allowance".to_string());
                }
                self.debit(sender, call.amount)?;
                self.allowances.insert(sender, allowance - call.amount);
                let staked = self.staked(&sender);
                self.staked.insert(sender, staked + call.amount);
                self.total_invested += call.amount;
            }
            Some(s) if s == IStakingPool::withdrawCall::SELECTOR => {
                let call = IStakingPool::withdrawCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                let staked = self.staked(&sender);
                if staked < call.amount {
                    return Err("amount exceeds stake".to_string());
                }
                self.staked.insert(sender, staked - call.amount);
                self.total_invested -= call.amount;
                self.credit(sender, call.amount);
            }
            Some(s) if s == IStakingPool::addRewardTokensCall::SELECTOR => {
                let call = IStakingPool::addRewardTokensCall::abi_decode(data, true)
                    .map_err(|e| e.to_string())?;
                self.debit(sender, call.amount)?;
                self.reward_pool += call.amount;
            }
            _ => return Err("unknown selector".to_string()),
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MockState {
    accounts: Vec<Address>,
    chain_id: u64,
    chain_added: bool,
    failures: HashSet<Failure>,
    ledger: Ledger,
    calls: Vec<MockCall>,
    sent: Vec<CallRequest>,
    receipts: HashMap<TxHash, TxReceipt>,
    nonce: u64,
}

/// Wallet plus token and staking contracts, all in memory.
#[derive(Debug)]
pub(crate) struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub(crate) const GAS_ESTIMATE: u64 = 50_000;
    /// BSC mainnet, so connecting always has to switch.
    const INITIAL_CHAIN: u64 = 56;

    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                accounts: vec![Self::user()],
                chain_id: Self::INITIAL_CHAIN,
                chain_added: false,
                failures: HashSet::new(),
                ledger: Ledger::default(),
                calls: Vec::new(),
                sent: Vec::new(),
                receipts: HashMap::new(),
                nonce: 0,
            }),
        }
    }

    pub(crate) fn user() -> Address {
        Address::repeat_byte(0x11)
    }

    pub(crate) fn token() -> Address {
        Address::repeat_byte(0x22)
    }

    pub(crate) fn staking() -> Address {
        Address::repeat_byte(0x33)
    }

    pub(crate) fn with_accounts(self, accounts: Vec<Address>) -> Self {
        self.state.lock().unwrap().accounts = accounts;
        self
    }

    pub(crate) fn with_balance(self, account: Address, amount: U256) -> Self {
        self.state
            .lock()
            .unwrap()
            .ledger
            .balances
            .insert(account, amount);
        self
    }

    pub(crate) fn with_stake(self, account: Address, amount: U256) -> Self {
        self.set_stake(account, amount);
        self
    }

    pub(crate) fn with_failure(self, failure: Failure) -> Self {
        self.add_failure(failure);
        self
    }

    /// Change a stake directly, as if another client had sent the transaction.
    pub(crate) fn set_stake(&self, account: Address, amount: U256) {
        let ledger = &mut self.state.lock().unwrap().ledger;
        let previous = ledger.staked.insert(account, amount).unwrap_or_default();
        ledger.total_invested = ledger.total_invested - previous + amount;
    }

    pub(crate) fn add_failure(&self, failure: Failure) {
        self.state.lock().unwrap().failures.insert(failure);
    }

    pub(crate) fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub(crate) fn sent_requests(&self) -> Vec<CallRequest> {
        self.state.lock().unwrap().sent.clone()
    }
}

impl MockState {
    fn fails(&self, failure: Failure) -> bool {
        self.failures.contains(&failure)
    }
}

fn selector(request: &CallRequest) -> [u8; 4] {
    request.selector().unwrap_or_default()
}

fn rejected(what: &str) -> ProviderError {
    ProviderError::from_code(USER_REJECTED_CODE, format!("User rejected {}", what))
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::RequestAccounts);
        if state.fails(Failure::RejectAccounts) {
            return Err(rejected("the request"));
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::ChainId);
        Ok(state.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::SwitchChain(chain_id));
        if state.fails(Failure::RejectSwitch) {
            return Err(rejected("the network switch"));
        }
        if state.fails(Failure::UnknownChain) && !state.chain_added {
            return Err(ProviderError::UnrecognizedChain(format!(
                "Unrecognized chain ID {:#x}",
                chain_id
            )));
        }
        if !state.fails(Failure::IgnoreSwitch) {
            state.chain_id = chain_id;
        }
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::AddChain(network.chain_id));
        if state.fails(Failure::AddChain) {
            return Err(ProviderError::Rpc {
                code: -32603,
                message: "Internal JSON-RPC error".to_string(),
            });
        }
        state.chain_added = true;
        state.chain_id = network.chain_id;
        Ok(())
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::Call(selector(request)));
        if state.fails(Failure::Reads) {
            return Err(ProviderError::Transport("connection reset".to_string()));
        }
        state
            .ledger
            .read(request)
            .map(Bytes::from)
            .map_err(|message| ProviderError::Rpc {
                code: -32000,
                message,
            })
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::EstimateGas(selector(request)));
        if state.fails(Failure::Estimate) {
            return Err(ProviderError::Rpc {
                code: -32000,
                message: "gas required exceeds allowance".to_string(),
            });
        }
        let mut dry_run = state.ledger.clone();
        dry_run
            .execute(request)
            .map_err(|reason| ProviderError::Rpc {
                code: 3,
                message: format!("execution reverted: {}", reason),
            })?;
        Ok(Self::GAS_ESTIMATE)
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::Send(selector(request)));
        state.sent.push(request.clone());
        if state.fails(Failure::RejectSend) {
            return Err(rejected("the transaction signature"));
        }

        state.nonce += 1;
        let nonce = state.nonce;
        let hash = alloy_primitives::keccak256(nonce.to_be_bytes());
        let success = !state.fails(Failure::Revert) && state.ledger.execute(request).is_ok();
        state.receipts.insert(
            hash,
            TxReceipt {
                transaction_hash: hash,
                block_number: Some(1_000 + nonce),
                gas_used: request.gas,
                success,
            },
        );
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(MockCall::WaitReceipt(hash));
        if state.fails(Failure::ReceiptLost) {
            return Err(ProviderError::Transport(
                "timed out waiting for receipt".to_string(),
            ));
        }
        state
            .receipts
            .get(&hash)
            .cloned()
            .ok_or_else(|| ProviderError::InvalidResponse(format!("unknown transaction {}", hash)))
    }
}
