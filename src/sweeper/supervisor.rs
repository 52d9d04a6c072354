//! Multi-endpoint supervisor.
//!
//! Each endpoint gets its own task that connects and then monitors, so a
//! slow or unreachable node never delays the others. Monitors are never
//! restarted: a monitor whose subscription dies stays down for the rest of
//! the run while the others keep racing.

use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::blockchain::{AccountRegistry, BlockchainError, BlockchainResult, PendingNode};
use crate::config::SweeperConfig;
use crate::observability::metrics;
use crate::sweeper::chain::Chain;

/// A monitor that has terminated.
#[derive(Debug)]
pub struct MonitorExit {
    pub endpoint: String,
    pub error: BlockchainError,
}

/// Run a connected chain's monitor until its subscription fails.
async fn monitor<N: PendingNode>(chain: Chain<N>) -> MonitorExit {
    metrics::monitor_started();
    tracing::info!(chain_id = %chain.chain_id(), "Starting pending scanner");

    let error = match chain.scan_pending().await {
        Ok(never) => match never {},
        Err(e) => e,
    };
    tracing::error!(error = %error, "Pending scanner failed");
    metrics::monitor_stopped();

    MonitorExit {
        endpoint: chain.endpoint,
        error,
    }
}

/// Collect monitor exits in the order they terminate.
async fn join_monitors(mut monitors: JoinSet<Option<MonitorExit>>) -> Vec<MonitorExit> {
    let mut exits = Vec::with_capacity(monitors.len());
    while let Some(joined) = monitors.join_next().await {
        match joined {
            Ok(Some(exit)) => exits.push(exit),
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Monitor task aborted"),
        }
    }
    exits
}

/// Connect to every endpoint concurrently and monitor each one that connects.
///
/// Endpoints whose connection fails are logged and skipped. Returns once
/// every started monitor has stopped.
pub async fn supervise<N, F, Fut>(endpoints: &[String], mut connect: F) -> Vec<MonitorExit>
where
    N: PendingNode + 'static,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = BlockchainResult<Chain<N>>> + Send + 'static,
{
    let mut monitors = JoinSet::new();

    for endpoint in endpoints {
        let span = tracing::info_span!("monitor", endpoint = %endpoint);
        let connecting = connect(endpoint.clone());

        monitors.spawn(
            async move {
                match connecting.await {
                    Ok(chain) => Some(monitor(chain).await),
                    Err(e) => {
                        tracing::error!(error = %e, "Couldn't connect to endpoint");
                        None
                    }
                }
            }
            .instrument(span),
        );
    }

    join_monitors(monitors).await
}

/// Run one monitor per already-connected chain until every monitor has stopped.
pub async fn run_monitors<N>(chains: Vec<Chain<N>>) -> Vec<MonitorExit>
where
    N: PendingNode + 'static,
{
    let mut monitors = JoinSet::new();

    for chain in chains {
        let span = tracing::info_span!("monitor", endpoint = %chain.endpoint());
        monitors.spawn(async move { Some(monitor(chain).await) }.instrument(span));
    }

    join_monitors(monitors).await
}

/// Connect to all configured endpoints and race until every monitor stops.
pub async fn run(config: &SweeperConfig, accounts: Arc<AccountRegistry>) -> Vec<MonitorExit> {
    tracing::info!(endpoints = config.endpoints.len(), "Connecting to endpoints");

    let receiver = config.receiver;
    let rpc_timeout_secs = config.rpc_timeout_secs();

    supervise(&config.endpoints, |endpoint| {
        let accounts = accounts.clone();
        async move { Chain::connect(&endpoint, receiver, accounts, rpc_timeout_secs).await }
    })
    .await
}
