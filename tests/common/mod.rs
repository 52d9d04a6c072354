//! Shared utilities for integration testing: an in-memory node.

#![allow(dead_code)]

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Decodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, TxHash, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use futures_util::stream;
use futures_util::StreamExt;
use mempool_sweeper::blockchain::{BlockchainError, BlockchainResult, PendingHashes, PendingNode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// Anvil's first three accounts
pub const KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const KEY_2: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3451e35d2e1c3f2d";

pub const CHAIN_ID: u64 = 31337;

pub fn key(hex: &str) -> PrivateKeySigner {
    hex.parse().unwrap()
}

/// Test-side handle: push pending hashes, observe broadcasts.
pub struct NodeHandle {
    pub feed: mpsc::UnboundedSender<BlockchainResult<TxHash>>,
    pub broadcasts: mpsc::UnboundedReceiver<TxEnvelope>,
    node: MockNode,
}

impl NodeHandle {
    /// Make `tx` known to the node and announce it on the pending feed.
    pub fn announce(&self, tx: TxEnvelope) -> TxHash {
        let hash = self.node.insert(tx);
        self.feed.send(Ok(hash)).unwrap();
        hash
    }

    /// Deliver a transport error on the pending feed.
    pub fn fail_feed(&self, error: BlockchainError) {
        self.feed.send(Err(error)).unwrap();
    }

    /// Make `tx` known to the node without announcing it.
    pub fn insert(&self, tx: TxEnvelope) -> TxHash {
        self.node.insert(tx)
    }

    pub fn reject_broadcasts(&self) {
        self.node.inner.reject_broadcasts.store(true, Ordering::SeqCst);
    }
}

struct Inner {
    feed: Mutex<Option<mpsc::UnboundedReceiver<BlockchainResult<TxHash>>>>,
    txs: Mutex<HashMap<TxHash, TxEnvelope>>,
    sent: mpsc::UnboundedSender<TxEnvelope>,
    reject_broadcasts: AtomicBool,
}

/// In-memory node. The pending feed ends when the handle's sender is dropped.
#[derive(Clone)]
pub struct MockNode {
    inner: Arc<Inner>,
}

impl MockNode {
    pub fn new() -> (Self, NodeHandle) {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();

        let node = Self {
            inner: Arc::new(Inner {
                feed: Mutex::new(Some(feed_rx)),
                txs: Mutex::new(HashMap::new()),
                sent: sent_tx,
                reject_broadcasts: AtomicBool::new(false),
            }),
        };

        let handle = NodeHandle {
            feed: feed_tx,
            broadcasts: sent_rx,
            node: node.clone(),
        };

        (node, handle)
    }

    fn insert(&self, tx: TxEnvelope) -> TxHash {
        let hash = *tx.tx_hash();
        self.inner.txs.lock().unwrap().insert(hash, tx);
        hash
    }
}

#[async_trait]
impl PendingNode for MockNode {
    async fn subscribe_pending(&self) -> BlockchainResult<PendingHashes> {
        let rx = self
            .inner
            .feed
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BlockchainError::Subscription("already subscribed".to_string()))?;

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed())
    }

    async fn transaction_by_hash(&self, hash: TxHash) -> BlockchainResult<Option<TxEnvelope>> {
        Ok(self.inner.txs.lock().unwrap().get(&hash).cloned())
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        if self.inner.reject_broadcasts.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("replacement transaction underpriced".to_string()));
        }

        let tx = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| BlockchainError::Rpc(format!("rlp: {}", e)))?;
        let hash = *tx.tx_hash();
        let _ = self.inner.sent.send(tx);
        Ok(hash)
    }
}

/// Parameters of an observed transfer.
#[derive(Debug, Clone, Copy)]
pub struct Transfer {
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub to: Option<Address>,
    pub value: u64,
}

impl Default for Transfer {
    fn default() -> Self {
        Self {
            nonce: 5,
            gas_limit: 21_000,
            gas_price: 100,
            to: Some(Address::repeat_byte(0x11)),
            value: 1_000_000,
        }
    }
}

fn kind(to: Option<Address>) -> TxKind {
    match to {
        Some(to) => TxKind::Call(to),
        None => TxKind::Create,
    }
}

/// Legacy transfer signed by `key` for `chain_id`.
pub fn signed_legacy(key: &PrivateKeySigner, chain_id: u64, t: Transfer) -> TxEnvelope {
    let mut tx = TxLegacy {
        chain_id: Some(chain_id),
        nonce: t.nonce,
        gas_price: t.gas_price,
        gas_limit: t.gas_limit,
        to: kind(t.to),
        value: U256::from(t.value),
        ..Default::default()
    };
    let signature = key.sign_transaction_sync(&mut tx).unwrap();
    TxEnvelope::Legacy(tx.into_signed(signature))
}

/// Dynamic-fee transfer signed by `key`; `gas_price` becomes the fee cap.
pub fn signed_eip1559(key: &PrivateKeySigner, chain_id: u64, t: Transfer) -> TxEnvelope {
    let mut tx = TxEip1559 {
        chain_id,
        nonce: t.nonce,
        gas_limit: t.gas_limit,
        max_fee_per_gas: t.gas_price,
        max_priority_fee_per_gas: 1,
        to: kind(t.to),
        value: U256::from(t.value),
        ..Default::default()
    };
    let signature = key.sign_transaction_sync(&mut tx).unwrap();
    TxEnvelope::Eip1559(tx.into_signed(signature))
}
