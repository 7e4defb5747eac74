//! Defines a worker that re-syncs every tracked ledger on each new block.

use futures::future::join_all;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::YieldEngine;

/// The worker that keeps tracked ledgers synced to the chain head
pub struct LedgerSyncWorker {
    /// The engine owning the ledgers
    engine: YieldEngine,
    /// The block number stream
    blocks: watch::Receiver<u64>,
}

impl LedgerSyncWorker {
    /// Creates a new `LedgerSyncWorker`
    pub fn new(engine: YieldEngine, blocks: watch::Receiver<u64>) -> Self {
        Self { engine, blocks }
    }

    /// Starts the worker.
    pub fn start(self) {
        let Self { engine, mut blocks } = self;
        tokio::spawn(async move {
            info!("syncing tracked ledgers on new blocks");
            while blocks.changed().await.is_ok() {
                let block = *blocks.borrow_and_update();
                sync_all(&engine, block).await;
            }
            warn!("block stream ended");
        });
    }
}

/// Sync every tracked ledger, logging failures
async fn sync_all(engine: &YieldEngine, block: u64) {
    let keys = engine.store().keys();
    if keys.is_empty() {
        return;
    }

    let syncs = keys.iter().map(|key| engine.sync(key.holder, key.asset));
    let results = join_all(syncs).await;
    let failures = results.iter().filter(|r| r.is_err()).count();
    for (key, result) in keys.iter().zip(&results) {
        if let Err(e) = result {
            warn!("failed to sync ledger of {:#x} in {:#x}: {e}", key.holder, key.asset);
        }
    }
    debug!("synced {} ledgers at block {block}, {failures} failed", keys.len());
}
