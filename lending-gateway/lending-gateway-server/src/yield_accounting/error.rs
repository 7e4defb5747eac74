//! Error types for yield accounting

use alloy_primitives::Address;

use crate::{chain_client::error::ChainClientError, registry::error::RegistryError};

/// The error type emitted while syncing or evaluating a ledger
#[derive(Debug, Clone, thiserror::Error)]
pub enum LedgerError {
    /// A log or rate query failed
    #[error("chain query failed: {0}")]
    Chain(#[from] ChainClientError),
    /// The asset could not be resolved
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// An update did not carry one rate sample per event plus the current one
    #[error("expected {expected} rate samples, got {actual}")]
    Misaligned {
        /// The number of samples required
        expected: usize,
        /// The number of samples supplied
        actual: usize,
    },
    /// An update contained events preceding the synced history
    #[error("transfer at block {0} precedes the synced history")]
    OutOfOrder(u64),
    /// The chain reported a zero exchange rate
    #[error("asset {0:#x} reported a zero exchange rate")]
    ZeroRate(Address),
    /// An AAVE asset has no lending pool reserve configured
    #[error("asset {0:#x} has no lending pool reserve")]
    MissingReserve(Address),
}
