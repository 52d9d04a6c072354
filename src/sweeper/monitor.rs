//! Pending transaction race pipeline.
//!
//! # Pipeline (per hash, in arrival order)
//! ```text
//! fetch by hash → has recipient? → recover sender → controlled & not to receiver?
//!     → plan replacement (same nonce, +11% gas price) → sign → broadcast
//! ```
//!
//! A failure at any stage abandons that hash only. The loop ends when the
//! subscription does; there is no resubscription, and lag gaps in the feed
//! are skipped rather than treated as an end.

use alloy::consensus::Transaction;
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::TxHash;
use futures_util::StreamExt;
use std::convert::Infallible;
use thiserror::Error;

use crate::blockchain::{BlockchainError, BlockchainResult, PendingNode};
use crate::observability::metrics;
use crate::sweeper::chain::Chain;
use crate::sweeper::replacement::ReplacementPlan;

/// Pipeline stage a per-hash failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Recover,
    Sign,
    Broadcast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Recover => "recover",
            Stage::Sign => "sign",
            Stage::Broadcast => "broadcast",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal failure processing one pending hash.
#[derive(Debug, Error)]
#[error("{stage} failed for {hash}: {source}")]
pub struct SweepError {
    pub stage: Stage,
    pub hash: TxHash,
    #[source]
    pub source: BlockchainError,
}

impl SweepError {
    fn new(stage: Stage, hash: TxHash, source: BlockchainError) -> Self {
        Self { stage, hash, source }
    }
}

/// Why a pending transaction was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No recipient: a contract deployment.
    ContractCreation,
    /// Sender is not one of our accounts.
    UnknownSender,
    /// Already moving funds to the receiver.
    AlreadyToReceiver,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::ContractCreation => "contract_creation",
            IgnoreReason::UnknownSender => "unknown_sender",
            IgnoreReason::AlreadyToReceiver => "already_to_receiver",
        }
    }
}

/// Result of processing one pending hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashOutcome {
    Replaced { original: TxHash, replacement: TxHash },
    Ignored(IgnoreReason),
}

impl<N: PendingNode> Chain<N> {
    /// Watch the pending feed and race every controlled transaction.
    ///
    /// Only returns when the subscription fails or ends.
    pub async fn scan_pending(&self) -> BlockchainResult<Infallible> {
        let mut hashes = self.node.subscribe_pending().await?;
        tracing::info!(endpoint = %self.endpoint, "Subscribed to pending transactions");

        loop {
            let hash = match hashes.next().await {
                Some(Ok(hash)) => hash,
                Some(Err(e)) => return Err(e),
                None => return Err(BlockchainError::SubscriptionClosed),
            };
            metrics::record_pending_seen(&self.endpoint);

            match self.process_hash(hash).await {
                Ok(HashOutcome::Replaced {
                    original,
                    replacement,
                }) => {
                    metrics::record_replacement(&self.endpoint);
                    tracing::info!(
                        original = %original,
                        replacement = %replacement,
                        "Replaced pending transaction"
                    );
                }
                Ok(HashOutcome::Ignored(reason)) => {
                    metrics::record_skipped(reason.as_str());
                    tracing::trace!(tx_hash = %hash, reason = reason.as_str(), "Ignored");
                }
                Err(e) => {
                    metrics::record_pipeline_error(e.stage.as_str());
                    tracing::warn!(
                        tx_hash = %e.hash,
                        stage = %e.stage,
                        error = %e.source,
                        "Skipping pending transaction"
                    );
                }
            }
        }
    }

    /// Run the race pipeline for a single pending hash.
    pub async fn process_hash(&self, hash: TxHash) -> Result<HashOutcome, SweepError> {
        let tx = self
            .node
            .transaction_by_hash(hash)
            .await
            .and_then(|tx| tx.ok_or(BlockchainError::TransactionNotFound(hash)))
            .map_err(|e| SweepError::new(Stage::Fetch, hash, e))?;

        let Some(to) = tx.to() else {
            return Ok(HashOutcome::Ignored(IgnoreReason::ContractCreation));
        };

        let from = self
            .signer
            .sender(&tx)
            .map_err(|e| SweepError::new(Stage::Recover, hash, e))?;

        let Some(key) = self.accounts.get(&from) else {
            return Ok(HashOutcome::Ignored(IgnoreReason::UnknownSender));
        };
        if to == self.receiver {
            return Ok(HashOutcome::Ignored(IgnoreReason::AlreadyToReceiver));
        }

        let plan = ReplacementPlan::for_observed(&tx, self.receiver);
        tracing::debug!(
            tx_hash = %hash,
            from = %from,
            nonce = plan.nonce,
            gas_price = plan.gas_price,
            "Racing controlled transaction"
        );

        let signed = plan
            .to_legacy()
            .and_then(|legacy| self.signer.sign(key, legacy))
            .map_err(|e| SweepError::new(Stage::Sign, hash, e))?;

        let replacement = self
            .node
            .send_raw_transaction(&signed.encoded_2718())
            .await
            .map_err(|e| SweepError::new(Stage::Broadcast, hash, e))?;

        Ok(HashOutcome::Replaced {
            original: hash,
            replacement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_error_display() {
        let err = SweepError::new(
            Stage::Broadcast,
            TxHash::ZERO,
            BlockchainError::Rpc("replacement transaction underpriced".to_string()),
        );
        let message = err.to_string();
        assert!(message.starts_with("broadcast failed for 0x0000"));
        assert!(message.contains("underpriced"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Stage::Recover.as_str(), "recover");
        assert_eq!(IgnoreReason::AlreadyToReceiver.as_str(), "already_to_receiver");
    }
}
