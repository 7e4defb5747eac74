//! Defines a cache for the latest gas price
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The sentinel for an empty cache
const NONE: u64 = 0;

/// The inner cache backing storage. Kept private to hide concurrency details.
struct GasPriceCacheInner {
    /// The gas price, in wei
    gas_price: AtomicU64,
    /// The block the gas price was observed at
    block_number: AtomicU64,
}

/// A value-type handle to the gas price cache. Clones are cheap and share
/// state.
#[derive(Clone)]
pub struct GasPriceCache(Arc<GasPriceCacheInner>);

impl Default for GasPriceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GasPriceCache {
    /// Create a new cache
    pub fn new() -> Self {
        Self(Arc::new(GasPriceCacheInner {
            gas_price: AtomicU64::new(NONE),
            block_number: AtomicU64::new(0),
        }))
    }

    /// Sets the gas price observed at a block
    pub fn set(&self, gas_price: u128, block_number: u64) {
        let price = u64::try_from(gas_price).unwrap_or(u64::MAX);
        self.0.gas_price.store(price, Ordering::Relaxed);
        self.0.block_number.store(block_number, Ordering::Relaxed);
    }

    /// Gets the gas price, if one has been observed
    pub fn gas_price(&self) -> Option<u128> {
        match self.0.gas_price.load(Ordering::Relaxed) {
            NONE => None,
            v => Some(v as u128),
        }
    }

    /// The block the cached price was observed at
    pub fn block_number(&self) -> u64 {
        self.0.block_number.load(Ordering::Relaxed)
    }
}
