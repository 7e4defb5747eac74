//! Error types for quoting

use crate::{registry::error::RegistryError, yield_accounting::error::LedgerError};

/// The error type emitted while serving a quote
///
/// Unavailable routes are not errors; they produce an empty quote
#[derive(Debug, Clone, thiserror::Error)]
pub enum QuoteError {
    /// The referral or asset could not be resolved
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The quote could not be valued
    #[error("failed to value quote: {0}")]
    Valuation(#[from] LedgerError),
}
