//! Multi-endpoint supervision tests.

use alloy::consensus::Transaction;
use alloy::primitives::{Address, U256};
use mempool_sweeper::blockchain::{AccountRegistry, BlockchainError, ChainId};
use mempool_sweeper::sweeper::{self, Chain};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

mod common;
use common::{key, signed_legacy, MockNode, Transfer, CHAIN_ID, KEY_0};

fn receiver() -> Address {
    Address::repeat_byte(0xee)
}

#[tokio::test]
async fn test_failed_endpoint_does_not_stop_others() {
    let accounts = Arc::new(AccountRegistry::from_lines([KEY_0]));
    let (node_a, handle_a) = MockNode::new();
    let (node_b, mut handle_b) = MockNode::new();

    let chains = vec![
        Chain::new("mock://a", node_a, ChainId(CHAIN_ID), receiver(), accounts.clone()),
        Chain::new("mock://b", node_b, ChainId(CHAIN_ID), receiver(), accounts),
    ];
    let supervisor = tokio::spawn(sweeper::run_monitors(chains));

    // Kill endpoint A's feed, then give B work.
    drop(handle_a.feed);
    tokio::time::sleep(Duration::from_millis(50)).await;

    handle_b.announce(signed_legacy(&key(KEY_0), CHAIN_ID, Transfer::default()));

    let replacement = timeout(Duration::from_secs(5), handle_b.broadcasts.recv())
        .await
        .expect("endpoint B keeps racing")
        .expect("broadcast channel open");
    assert_eq!(replacement.to(), Some(receiver()));
    assert_eq!(replacement.value(), U256::from(769_000u64));

    drop(handle_b.feed);
    let exits = timeout(Duration::from_secs(5), supervisor)
        .await
        .expect("supervisor returns once all monitors stop")
        .unwrap();

    assert_eq!(exits.len(), 2);
    assert_eq!(exits[0].endpoint, "mock://a");
    assert_eq!(exits[1].endpoint, "mock://b");
    assert!(exits
        .iter()
        .all(|exit| matches!(exit.error, BlockchainError::SubscriptionClosed)));
}

#[tokio::test]
async fn test_both_endpoints_race_the_same_transaction() {
    let accounts = Arc::new(AccountRegistry::from_lines([KEY_0]));
    let (node_a, mut handle_a) = MockNode::new();
    let (node_b, mut handle_b) = MockNode::new();

    let observed = signed_legacy(&key(KEY_0), CHAIN_ID, Transfer::default());
    handle_a.announce(observed.clone());
    handle_b.announce(observed);
    drop(handle_a.feed);
    drop(handle_b.feed);

    let chains = vec![
        Chain::new("mock://a", node_a, ChainId(CHAIN_ID), receiver(), accounts.clone()),
        Chain::new("mock://b", node_b, ChainId(CHAIN_ID), receiver(), accounts),
    ];
    let exits = sweeper::run_monitors(chains).await;

    assert_eq!(exits.len(), 2);
    let from_a = handle_a.broadcasts.try_recv().unwrap();
    let from_b = handle_b.broadcasts.try_recv().unwrap();
    assert_eq!(from_a.tx_hash(), from_b.tx_hash());
}

#[tokio::test]
async fn test_subscribe_failure_ends_monitor() {
    let accounts = Arc::new(AccountRegistry::from_lines([KEY_0]));
    let (node, _handle) = MockNode::new();
    let chain = Chain::new("mock://a", node.clone(), ChainId(CHAIN_ID), receiver(), accounts.clone());

    // First subscription consumes the feed; a second chain on the same node cannot subscribe.
    let first = tokio::spawn(async move { chain.scan_pending().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = Chain::new("mock://a-again", node, ChainId(CHAIN_ID), receiver(), accounts);
    let exits = sweeper::run_monitors(vec![second]).await;

    assert_eq!(exits.len(), 1);
    assert!(matches!(exits[0].error, BlockchainError::Subscription(_)));
    first.abort();
}

#[tokio::test]
async fn test_no_chains_returns_immediately() {
    let exits = sweeper::run_monitors(Vec::<Chain<MockNode>>::new()).await;
    assert!(exits.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoints_are_skipped() {
    let accounts = Arc::new(AccountRegistry::from_lines([KEY_0]));
    let endpoints = vec!["ftp://nowhere".to_string(), "ws://127.0.0.1:1".to_string()];

    let exits = sweeper::supervise(&endpoints, |endpoint| {
        let accounts = accounts.clone();
        async move { Chain::connect(&endpoint, receiver(), accounts, 2).await }
    })
    .await;
    assert!(exits.is_empty());
}

#[tokio::test]
async fn test_connect_rejects_unsupported_scheme() {
    let accounts = Arc::new(AccountRegistry::from_lines([KEY_0]));
    let result = Chain::connect("ftp://nowhere", receiver(), accounts, 2).await;
    assert!(matches!(result, Err(BlockchainError::InvalidEndpoint { .. })));
}

#[tokio::test]
async fn test_stalled_connect_does_not_delay_other_endpoints() {
    let accounts = Arc::new(AccountRegistry::from_lines([KEY_0]));
    let (node, mut handle) = MockNode::new();
    let mut node = Some(node);
    let release = Arc::new(Notify::new());

    // The stalled endpoint is listed first and only finishes connecting once released.
    let endpoints = vec!["mock://stalled".to_string(), "mock://live".to_string()];
    let connect = {
        let release = release.clone();
        move |endpoint: String| {
            let accounts = accounts.clone();
            let release = release.clone();
            let live = if endpoint == "mock://live" { node.take() } else { None };
            async move {
                match live {
                    Some(node) => Ok(Chain::new(endpoint, node, ChainId(CHAIN_ID), receiver(), accounts)),
                    None => {
                        release.notified().await;
                        Err(BlockchainError::Timeout(10))
                    }
                }
            }
        }
    };

    let supervisor = tokio::spawn(async move { sweeper::supervise(&endpoints, connect).await });

    handle.announce(signed_legacy(&key(KEY_0), CHAIN_ID, Transfer::default()));
    let replacement = timeout(Duration::from_secs(5), handle.broadcasts.recv())
        .await
        .expect("live endpoint races while the other is still connecting")
        .expect("broadcast channel open");
    assert_eq!(replacement.to(), Some(receiver()));

    release.notify_one();
    drop(handle.feed);
    let exits = timeout(Duration::from_secs(5), supervisor)
        .await
        .expect("supervisor returns once all tasks finish")
        .unwrap();

    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].endpoint, "mock://live");
}
