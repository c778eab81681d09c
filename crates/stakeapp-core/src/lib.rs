//! Core domain logic for the token staking client.
//!
//! This crate provides:
//! - Exact decimal conversion between token units and smallest units (`amount` module)
//! - Core domain types: sessions, intents, transactions (`types` module)
//! - The client state and balance snapshot (`state` module)
//! - Target network parameters (`network` module)
//!
//! With the `persistence` feature enabled:
//! - Configuration file management (`config` module)

pub mod amount;
pub mod network;
pub mod state;
pub mod types;

#[cfg(feature = "persistence")]
pub mod config;

pub use amount::*;
pub use network::*;
pub use state::*;
pub use types::*;

#[cfg(feature = "persistence")]
pub use config::{AppConfig, ConfigError};
