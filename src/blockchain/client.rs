//! Node RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a WebSocket/IPC/HTTP JSON-RPC endpoint
//! - Subscribe to the pending transaction hash feed
//! - Fetch transactions by hash and broadcast raw transactions
//! - Bound every call with the configured timeout

use alloy::consensus::TxEnvelope;
use alloy::primitives::TxHash;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::pubsub::Subscription;
use alloy::transports::ws::WsConnect;
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::observability::metrics;

/// Pending hashes buffered per subscription before the feed starts lagging.
pub const PENDING_CHANNEL_SIZE: usize = 4096;

/// Stream of pending transaction hashes.
///
/// An `Err` item or the end of the stream means the subscription is gone.
pub type PendingHashes = BoxStream<'static, BlockchainResult<TxHash>>;

/// Node operations the race pipeline depends on.
#[async_trait]
pub trait PendingNode: Send + Sync {
    /// Subscribe to hashes of transactions entering the node's pool.
    async fn subscribe_pending(&self) -> BlockchainResult<PendingHashes>;

    /// Fetch a transaction by hash; `None` if the node does not know it.
    async fn transaction_by_hash(&self, hash: TxHash) -> BlockchainResult<Option<TxEnvelope>>;

    /// Broadcast an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;
}

/// Transport an endpoint string selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    WebSocket,
    Http,
    Ipc,
}

/// Source of pending hashes that reports dropped items.
#[async_trait]
trait HashFeed: Send + 'static {
    async fn next_hash(&mut self) -> Result<TxHash, RecvError>;
}

#[async_trait]
impl HashFeed for Subscription<TxHash> {
    async fn next_hash(&mut self) -> Result<TxHash, RecvError> {
        self.recv().await
    }
}

/// Turn a hash feed into a stream, logging and counting lag gaps.
///
/// The stream ends when the feed closes.
fn pending_stream<F: HashFeed>(feed: F, endpoint: String) -> PendingHashes {
    stream::unfold((feed, endpoint), |(mut feed, endpoint)| async move {
        loop {
            match feed.next_hash().await {
                Ok(hash) => return Some((Ok(hash), (feed, endpoint))),
                Err(RecvError::Lagged(missed)) => {
                    metrics::record_feed_lag(&endpoint, missed);
                    tracing::warn!(missed, "Pending feed lagged, hashes dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .boxed()
}

/// Alloy-backed connection to a single node.
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    endpoint: String,
    timeout_duration: Duration,
}

impl ChainClient {
    /// Dial a node endpoint.
    ///
    /// `ws://`, `wss://`, `http://` and `https://` URLs are accepted, as are
    /// IPC socket paths. Only WebSocket and IPC connections can carry the
    /// pending transaction subscription.
    ///
    /// WebSocket connections do not reconnect: once the socket drops, the
    /// subscription ends with it.
    pub async fn connect(endpoint: &str, timeout_secs: u64) -> BlockchainResult<Self> {
        let kind = validate_endpoint(endpoint)?;

        let timeout_duration = Duration::from_secs(timeout_secs);
        let dial = async {
            match kind {
                EndpointKind::WebSocket => ProviderBuilder::new()
                    .connect_ws(WsConnect::new(endpoint).with_max_retries(0))
                    .await
                    .map(|p| Arc::new(p) as Arc<dyn Provider + Send + Sync>),
                EndpointKind::Http | EndpointKind::Ipc => ProviderBuilder::new()
                    .connect(endpoint)
                    .await
                    .map(|p| Arc::new(p) as Arc<dyn Provider + Send + Sync>),
            }
        };

        let provider = match timeout(timeout_duration, dial).await {
            Ok(Ok(provider)) => provider,
            Ok(Err(e)) => return Err(BlockchainError::Connect(e.to_string())),
            Err(_) => return Err(BlockchainError::Timeout(timeout_secs)),
        };

        tracing::debug!(endpoint = %endpoint, ?kind, "Node connection established");

        Ok(Self {
            provider,
            endpoint: endpoint.to_string(),
            timeout_duration,
        })
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.call(self.provider.get_chain_id()).await.map(ChainId)
    }

    async fn call<F, T, E>(&self, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(BlockchainError::Rpc(e.to_string())),
            Err(_) => Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        }
    }
}

#[async_trait]
impl PendingNode for ChainClient {
    async fn subscribe_pending(&self) -> BlockchainResult<PendingHashes> {
        let subscription = match timeout(
            self.timeout_duration,
            self.provider
                .subscribe_pending_transactions()
                .channel_size(PENDING_CHANNEL_SIZE),
        )
        .await
        {
            Ok(Ok(sub)) => sub,
            Ok(Err(e)) => return Err(BlockchainError::Subscription(e.to_string())),
            Err(_) => return Err(BlockchainError::Timeout(self.timeout_duration.as_secs())),
        };

        Ok(pending_stream(subscription, self.endpoint.clone()))
    }

    async fn transaction_by_hash(&self, hash: TxHash) -> BlockchainResult<Option<TxEnvelope>> {
        let tx = self.call(self.provider.get_transaction_by_hash(hash)).await?;
        Ok(tx.map(|tx| tx.inner.into_inner()))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let pending = self.call(self.provider.send_raw_transaction(raw)).await?;
        Ok(*pending.tx_hash())
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// Classify an endpoint, rejecting URLs with schemes no transport understands.
///
/// Strings that do not parse as URLs are treated as IPC paths.
pub fn validate_endpoint(endpoint: &str) -> BlockchainResult<EndpointKind> {
    if endpoint.trim().is_empty() {
        return Err(BlockchainError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: "empty endpoint".to_string(),
        });
    }

    match endpoint.parse::<url::Url>() {
        Ok(url) => match url.scheme() {
            "ws" | "wss" => Ok(EndpointKind::WebSocket),
            "http" | "https" => Ok(EndpointKind::Http),
            other => Err(BlockchainError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        },
        Err(_) => Ok(EndpointKind::Ipc),
    }
}
