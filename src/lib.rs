//! Mempool sweeper library.
//!
//! Watches node pending pools for transactions sent by controlled keys and
//! races them with same-nonce, higher-fee replacements paying a receiver.

pub mod blockchain;
pub mod config;
pub mod observability;
pub mod sweeper;

pub use blockchain::{AccountRegistry, ChainClient, PendingNode};
pub use config::SweeperConfig;
pub use sweeper::{Chain, HashOutcome, MonitorExit};
