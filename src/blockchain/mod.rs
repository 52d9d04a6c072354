//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! accounts file
//!     → accounts.rs (key parsing, address → key registry)
//! endpoint URL
//!     → client.rs (RPC connection with timeouts, pending feed)
//!     → signer.rs (sender recovery, replacement signing)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - One unreachable endpoint never affects another

pub mod accounts;
pub mod client;
pub mod signer;
pub mod types;

pub use accounts::{AccountError, AccountRegistry};
pub use client::{ChainClient, PendingHashes, PendingNode};
pub use signer::ChainSigner;
pub use types::{BlockchainError, BlockchainResult, ChainId};
