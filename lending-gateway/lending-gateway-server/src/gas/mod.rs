//! Gas price acquisition: an oracle interface, a per-block cache and the
//! worker that refreshes it
pub mod cache;
pub mod error;
pub mod oracle;
pub mod worker;

use std::sync::Arc;

use async_trait::async_trait;

pub use cache::GasPriceCache;

use self::error::GasError;

/// A source of gas prices
#[async_trait]
pub trait GasPriceOracle: Send + Sync {
    /// The gas price to submit transactions at, in wei
    async fn gas_price(&self) -> Result<u128, GasError>;
}

/// Serves gas prices from the cache, consulting the oracle only when the
/// cache is empty
#[derive(Clone)]
pub struct GasPricer {
    /// The oracle
    oracle: Arc<dyn GasPriceOracle>,
    /// The cache refreshed on each block
    cache: GasPriceCache,
}

impl GasPricer {
    /// Create a new pricer
    pub fn new<O: GasPriceOracle + 'static>(oracle: O, cache: GasPriceCache) -> Self {
        Self { oracle: Arc::new(oracle), cache }
    }

    /// The oracle backing the pricer
    pub fn oracle(&self) -> Arc<dyn GasPriceOracle> {
        self.oracle.clone()
    }

    /// The cache backing the pricer
    pub fn cache(&self) -> GasPriceCache {
        self.cache.clone()
    }

    /// The gas price to submit at
    pub async fn current(&self) -> Result<u128, GasError> {
        match self.cache.gas_price() {
            Some(price) => Ok(price),
            None => self.oracle.gas_price().await,
        }
    }
}
