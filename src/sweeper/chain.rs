//! One logical connection to a node, with everything a monitor needs.

use alloy::primitives::Address;
use std::sync::Arc;

use crate::blockchain::{
    AccountRegistry, BlockchainResult, ChainClient, ChainId, ChainSigner, PendingNode,
};

/// A node connection bound to its chain's signer context.
///
/// The account registry and receiver are shared with every other
/// connection and never mutated.
pub struct Chain<N> {
    pub(crate) node: N,
    pub(crate) endpoint: String,
    pub(crate) signer: ChainSigner,
    pub(crate) accounts: Arc<AccountRegistry>,
    pub(crate) receiver: Address,
}

impl Chain<ChainClient> {
    /// Dial `endpoint`, query its chain ID and build the signer context.
    pub async fn connect(
        endpoint: &str,
        receiver: Address,
        accounts: Arc<AccountRegistry>,
        rpc_timeout_secs: u64,
    ) -> BlockchainResult<Self> {
        let client = ChainClient::connect(endpoint, rpc_timeout_secs).await?;
        let chain_id = client.get_chain_id().await?;

        tracing::info!(endpoint = %endpoint, chain_id = %chain_id, "Connected to node");

        Ok(Self::new(endpoint, client, chain_id, receiver, accounts))
    }
}

impl<N: PendingNode> Chain<N> {
    /// Wrap an already-connected node.
    pub fn new(
        endpoint: impl Into<String>,
        node: N,
        chain_id: ChainId,
        receiver: Address,
        accounts: Arc<AccountRegistry>,
    ) -> Self {
        Self {
            node,
            endpoint: endpoint.into(),
            signer: ChainSigner::london(chain_id),
            accounts,
            receiver,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn chain_id(&self) -> ChainId {
        self.signer.chain_id()
    }
}

impl<N> std::fmt::Debug for Chain<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("endpoint", &self.endpoint)
            .field("chain_id", &self.signer.chain_id())
            .field("receiver", &self.receiver)
            .field("accounts", &self.accounts.len())
            .finish()
    }
}
