//! Defines a worker that refreshes the gas price cache on each new block.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{GasPriceCache, GasPriceOracle};

/// The worker that listens for blocks and updates the gas price cache.
pub struct GasPriceWorker {
    /// The oracle to query
    oracle: Arc<dyn GasPriceOracle>,
    /// The cache to update
    cache: GasPriceCache,
    /// The block number stream
    blocks: watch::Receiver<u64>,
}

impl GasPriceWorker {
    /// Creates a new `GasPriceWorker`
    pub fn new(
        oracle: Arc<dyn GasPriceOracle>,
        cache: GasPriceCache,
        blocks: watch::Receiver<u64>,
    ) -> Self {
        Self { oracle, cache, blocks }
    }

    /// Starts the worker.
    pub fn start(self) {
        let Self { oracle, cache, mut blocks } = self;
        tokio::spawn(async move {
            info!("refreshing gas price on new blocks");
            while blocks.changed().await.is_ok() {
                let block = *blocks.borrow_and_update();
                match oracle.gas_price().await {
                    Ok(price) => {
                        debug!("updated gas price to {price} wei at block {block}");
                        cache.set(price, block);
                    },
                    Err(e) => warn!("failed to refresh gas price at block {block}: {e}"),
                }
            }
            warn!("block stream ended");
        });
    }
}
