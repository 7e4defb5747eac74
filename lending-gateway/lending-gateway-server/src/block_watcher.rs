//! Polls the chain head and fans new block numbers out to subscribers
//!
//! Subscribers receive the latest block on a `watch` channel, so a slow
//! subscriber skips intermediate blocks rather than queueing them

use std::time::Duration;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::chain_client::{ChainClient, DynChainClient};

/// Publishes the chain head to subscribers
pub struct BlockWatcher {
    /// The chain client to poll
    client: DynChainClient,
    /// The interval between polls
    interval: Duration,
    /// The publishing half of the block channel
    sender: watch::Sender<u64>,
}

impl BlockWatcher {
    /// Create a new watcher, starting from block zero
    pub fn new(client: DynChainClient, interval: Duration) -> Self {
        let (sender, _) = watch::channel(0);
        Self { client, interval, sender }
    }

    /// Subscribe to new blocks
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }

    /// The latest published block
    pub fn latest(&self) -> u64 {
        *self.sender.borrow()
    }

    /// Poll the chain once, publishing the block if it advanced
    pub async fn poll(&self) -> Option<u64> {
        match self.client.block_number().await {
            Ok(block) => {
                let advanced = self.sender.send_if_modified(|current| {
                    if block > *current {
                        *current = block;
                        true
                    } else {
                        false
                    }
                });
                advanced.then_some(block)
            },
            Err(e) => {
                warn!("failed to poll block number: {e}");
                None
            },
        }
    }

    /// Start the polling loop
    pub fn start(self) {
        tokio::spawn(async move {
            info!("polling for new blocks every {:?}", self.interval);
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                self.poll().await;
            }
        });
    }
}
