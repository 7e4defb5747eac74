//! Error types for the chain client

use std::fmt::Display;

/// The error type emitted by the chain client
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainClientError {
    /// An error returned by the RPC node
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The RPC node did not respond within the configured timeout
    #[error("RPC request timed out: {0}")]
    Timeout(String),
    /// An error decoding a response
    #[error("decoding error: {0}")]
    Decode(String),
    /// An error configuring the client
    #[error("configuration error: {0}")]
    Config(String),
}

#[allow(clippy::needless_pass_by_value)]
impl ChainClientError {
    /// Create a new RPC error
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }

    /// Create a new timeout error
    pub fn timeout<T: ToString>(msg: T) -> Self {
        Self::Timeout(msg.to_string())
    }

    /// Create a new decoding error
    pub fn decode<T: ToString>(msg: T) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }
}

impl<E: Display> From<alloy::transports::RpcError<E>> for ChainClientError {
    fn from(e: alloy::transports::RpcError<E>) -> Self {
        ChainClientError::Rpc(e.to_string())
    }
}

impl From<alloy_sol_types::Error> for ChainClientError {
    fn from(e: alloy_sol_types::Error) -> Self {
        ChainClientError::Decode(e.to_string())
    }
}
