//! Signer context bound to one chain.
//!
//! Mirrors the London signing rules: senders can be recovered from legacy
//! (protected or not), access-list and dynamic-fee transactions, while
//! replacements are always produced as EIP-155 legacy transactions.

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{SignableTransaction, Transaction, TxEnvelope, TxLegacy};
use alloy::network::TxSignerSync;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Protocol-version signer context for a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSigner {
    chain_id: ChainId,
}

impl ChainSigner {
    /// Create a London-rules signer for `chain_id`.
    pub fn london(chain_id: ChainId) -> Self {
        Self { chain_id }
    }

    /// Chain this signer is bound to.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Recover the sender of an observed transaction.
    pub fn sender(&self, tx: &TxEnvelope) -> BlockchainResult<Address> {
        if matches!(tx, TxEnvelope::Eip4844(_) | TxEnvelope::Eip7702(_)) {
            return Err(BlockchainError::UnsupportedTxType(tx.tx_type() as u8));
        }

        // Unprotected legacy transactions carry no chain id and are accepted.
        if let Some(actual) = tx.chain_id() {
            if actual != self.chain_id.0 {
                return Err(BlockchainError::ChainMismatch {
                    expected: self.chain_id.0,
                    actual,
                });
            }
        }

        tx.recover_signer()
            .map_err(|e| BlockchainError::Recovery(e.to_string()))
    }

    /// Sign a legacy transaction for this chain with `key`.
    pub fn sign(&self, key: &PrivateKeySigner, mut tx: TxLegacy) -> BlockchainResult<TxEnvelope> {
        tx.chain_id = Some(self.chain_id.0);

        let signature = key
            .sign_transaction_sync(&mut tx)
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        Ok(TxEnvelope::Legacy(tx.into_signed(signature)))
    }
}
