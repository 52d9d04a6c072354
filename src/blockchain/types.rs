//! Chain-specific types and error definitions.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Endpoint string is not a usable node address.
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Dialing the node failed.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node does not know the transaction (mined, dropped or never seen).
    #[error("Transaction {0} not found")]
    TransactionNotFound(TxHash),

    /// The pending transaction feed ended.
    #[error("Pending transaction subscription closed")]
    SubscriptionClosed,

    /// The node reported an error on the pending transaction feed.
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Transaction is bound to a different chain than the signer.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// Transaction type the signer policy cannot handle.
    #[error("Transaction type {0} not supported by signer")]
    UnsupportedTxType(u8),

    /// Sender could not be recovered from the signature.
    #[error("Sender recovery failed: {0}")]
    Recovery(String),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Signing the transaction failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Transfer value would be below zero after reserving the fee bump.
    #[error("Cannot encode negative value (short by {shortfall} wei)")]
    NegativeValue { shortfall: U256 },
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
