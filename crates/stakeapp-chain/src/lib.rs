pub mod contracts;
pub mod controller;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod sync;
pub mod wallet;

#[cfg(test)]
pub(crate) mod mock;

pub use contracts::{ContractAddresses, StakingContract, TokenContract};
pub use controller::{ControllerOptions, StakeOperationController};
pub use error::*;
pub use provider::*;
pub use rpc::JsonRpcProvider;
pub use sync::BalanceSynchronizer;
pub use wallet::connect_wallet;
