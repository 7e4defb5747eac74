//! Error types for deposit and withdrawal execution

use uuid::Uuid;

use crate::{
    chain_client::error::ChainClientError, gas::error::GasError, registry::error::RegistryError,
    yield_accounting::error::LedgerError,
};

/// A pre-flight validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The amount is zero
    #[error("amount must be greater than zero")]
    ZeroAmount,
    /// The amount exceeds the holder's balance
    #[error("insufficient balance")]
    InsufficientBalance,
    /// The amount would not leave enough ETH to pay for gas
    #[error("insufficient ETH remaining for gas")]
    InsufficientGas,
}

/// The error type emitted by the swap executor
#[derive(Debug, Clone, thiserror::Error)]
pub enum SwapError {
    /// The route index does not address a current route
    #[error("invalid route: {0}")]
    InvalidRoute(String),
    /// The request failed pre-flight validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The asset could not be resolved
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// No gas price could be obtained
    #[error("gas price unavailable: {0}")]
    Gas(#[from] GasError),
    /// A chain read failed before broadcast
    #[error("chain request failed: {0}")]
    Chain(#[from] ChainClientError),
    /// The exchange rate needed to size a withdrawal could not be read
    #[error("exchange rate unavailable: {0}")]
    Rate(#[from] LedgerError),
    /// No account is configured to send transactions from
    #[error("no sending account configured")]
    NoSender,
    /// The transaction id is not tracked
    #[error("unknown transaction {0}")]
    UnknownTx(Uuid),
}

#[allow(clippy::needless_pass_by_value)]
impl SwapError {
    /// Create a new invalid route error
    pub fn invalid_route<T: ToString>(msg: T) -> Self {
        Self::InvalidRoute(msg.to_string())
    }
}
