//! Watches a broadcast transaction until it is mined or times out

use std::time::Duration;

use alloy_primitives::TxHash;
use lending_gateway_api::TxStatus;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::tx_store::TxStore;
use crate::chain_client::{ChainClient, DynChainClient, ReceiptStatus};

/// Polls for a transaction's receipt and records the outcome
pub struct ConfirmationWatcher {
    /// The chain client
    client: DynChainClient,
    /// The store the outcome is recorded in
    tx_store: TxStore,
    /// The tracked transaction
    id: Uuid,
    /// The hash of the broadcast transaction
    tx_hash: TxHash,
    /// The interval between receipt polls
    poll_interval: Duration,
    /// How long to wait before failing the transaction
    timeout: Duration,
}

impl ConfirmationWatcher {
    /// Create a new watcher
    pub fn new(
        client: DynChainClient,
        tx_store: TxStore,
        id: Uuid,
        tx_hash: TxHash,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self { client, tx_store, id, tx_hash, poll_interval, timeout }
    }

    /// Spawn the watcher
    pub fn start(self) {
        tokio::spawn(self.run());
    }

    /// Wait for the receipt and record the terminal status
    async fn run(self) {
        let tx_hash = self.tx_hash;
        let status = match tokio::time::timeout(self.timeout, self.wait_for_receipt()).await {
            Ok(receipt) if receipt.success => {
                info!(id = %self.id, tx_hash = %tx_hash, "transaction confirmed");
                TxStatus::Confirmed { tx_hash, block_number: receipt.block_number }
            },
            Ok(_) => {
                error!(id = %self.id, tx_hash = %tx_hash, "transaction reverted");
                TxStatus::Failed { tx_hash: Some(tx_hash), reason: "transaction reverted".into() }
            },
            Err(_) => {
                let reason = format!("not mined within {}s", self.timeout.as_secs());
                error!(id = %self.id, tx_hash = %tx_hash, "{reason}");
                TxStatus::Failed { tx_hash: Some(tx_hash), reason }
            },
        };

        self.tx_store.set_status(&self.id, status);
    }

    /// Poll until the transaction has a receipt
    async fn wait_for_receipt(&self) -> ReceiptStatus {
        loop {
            match self.client.transaction_receipt(self.tx_hash).await {
                Ok(Some(receipt)) => return receipt,
                Ok(None) => {},
                Err(e) => warn!(tx_hash = %self.tx_hash, "failed to fetch receipt: {e}"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
