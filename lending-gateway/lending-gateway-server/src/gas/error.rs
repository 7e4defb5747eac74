//! Error types for gas price acquisition

use crate::chain_client::error::ChainClientError;

/// The error type emitted by gas price oracles
#[derive(Debug, Clone, thiserror::Error)]
pub enum GasError {
    /// An error querying the HTTP oracle
    #[error("HTTP oracle error: {0}")]
    Http(String),
    /// An error querying the node
    #[error("node error: {0}")]
    Node(#[from] ChainClientError),
    /// An oracle returned an unusable price
    #[error("invalid gas price: {0}")]
    InvalidPrice(String),
}

#[allow(clippy::needless_pass_by_value)]
impl GasError {
    /// Create a new invalid price error
    pub fn invalid_price<T: ToString>(msg: T) -> Self {
        Self::InvalidPrice(msg.to_string())
    }
}

impl From<reqwest::Error> for GasError {
    fn from(e: reqwest::Error) -> Self {
        GasError::Http(e.to_string())
    }
}
