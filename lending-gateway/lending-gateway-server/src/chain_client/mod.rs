//! Read and write access to the chain, abstracted behind a trait so that the
//! engine can be driven by an RPC node or by a scripted mock in tests

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;

use crate::chain_client::error::ChainClientError;

pub mod error;
#[cfg(test)]
pub mod mock;
pub mod rpc;

// ---------
// | Types |
// ---------

/// A call or transaction against a contract
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallRequest {
    /// The sender, defaults to the client's account when submitting
    pub from: Option<Address>,
    /// The callee
    pub to: Address,
    /// The ETH value attached to the call
    pub value: U256,
    /// The calldata
    pub data: Bytes,
    /// The gas limit
    pub gas_limit: Option<u64>,
    /// The gas price, in wei
    pub gas_price: Option<u128>,
}

impl CallRequest {
    /// Build a read-only call with the given calldata
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { to, data, ..Default::default() }
    }

    /// Build a read-only call from a typed contract call
    pub fn typed<C: SolCall>(to: Address, call: &C) -> Self {
        Self::new(to, Bytes::from(call.abi_encode()))
    }

    /// Attach an ETH value to the request
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// A log filter over a single contract and event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogQuery {
    /// The emitting contract
    pub address: Address,
    /// The event signature hash, topic 0
    pub event_signature: B256,
    /// The first indexed topic, if filtered
    pub topic1: Option<B256>,
    /// The second indexed topic, if filtered
    pub topic2: Option<B256>,
    /// The first block to include
    pub from_block: u64,
    /// The last block to include
    pub to_block: u64,
}

/// A log returned by a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLog {
    /// The block the log was emitted in
    pub block_number: u64,
    /// The position of the log within its block
    pub log_index: u64,
    /// The log topics
    pub topics: Vec<B256>,
    /// The non-indexed log data
    pub data: Bytes,
}

/// The outcome of a mined transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiptStatus {
    /// Whether execution succeeded
    pub success: bool,
    /// The block the transaction was mined in
    pub block_number: Option<u64>,
}

// --------------------
// | Trait Definition |
// --------------------

/// The chain operations the engine consumes
#[async_trait]
pub trait ChainClient: Sync + Send {
    /// The latest block number
    async fn block_number(&self) -> Result<u64, ChainClientError>;

    /// Simulate a call, optionally at a historical block
    async fn call(
        &self,
        request: CallRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainClientError>;

    /// Estimate the gas used by a call
    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, ChainClientError>;

    /// Fetch the logs matching a query
    async fn get_logs(&self, query: LogQuery) -> Result<Vec<RawLog>, ChainClientError>;

    /// Broadcast a transaction, returning its hash
    async fn send_transaction(&self, request: CallRequest) -> Result<TxHash, ChainClientError>;

    /// Fetch a transaction's receipt, `None` while it is pending
    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptStatus>, ChainClientError>;

    /// The node's current gas price, in wei
    async fn gas_price(&self) -> Result<u128, ChainClientError>;

    /// The ETH balance of an account
    async fn balance(&self, address: Address) -> Result<U256, ChainClientError>;

    /// The size of the code deployed at an address
    async fn code_size(&self, address: Address) -> Result<usize, ChainClientError>;
}

// --------------------------
// | Erased Type Definition |
// --------------------------

/// A type-erased wrapper around a chain client
#[derive(Clone)]
pub struct DynChainClient(Arc<dyn ChainClient>);

impl DynChainClient {
    /// Create a new type-erased chain client
    pub fn new<C: ChainClient + 'static>(client: C) -> Self {
        Self(Arc::new(client))
    }

    /// Perform a typed read-only call and decode its return value
    pub async fn call_typed<C: SolCall + Send + Sync>(
        &self,
        to: Address,
        call: &C,
        block: Option<u64>,
    ) -> Result<C::Return, ChainClientError> {
        let output = self.call(CallRequest::typed(to, call), block).await?;
        Ok(C::abi_decode_returns(&output)?)
    }
}

#[async_trait]
impl ChainClient for DynChainClient {
    async fn block_number(&self) -> Result<u64, ChainClientError> {
        self.0.block_number().await
    }

    async fn call(
        &self,
        request: CallRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainClientError> {
        self.0.call(request, block).await
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, ChainClientError> {
        self.0.estimate_gas(request).await
    }

    async fn get_logs(&self, query: LogQuery) -> Result<Vec<RawLog>, ChainClientError> {
        self.0.get_logs(query).await
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<TxHash, ChainClientError> {
        self.0.send_transaction(request).await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptStatus>, ChainClientError> {
        self.0.transaction_receipt(tx_hash).await
    }

    async fn gas_price(&self) -> Result<u128, ChainClientError> {
        self.0.gas_price().await
    }

    async fn balance(&self, address: Address) -> Result<U256, ChainClientError> {
        self.0.balance(address).await
    }

    async fn code_size(&self, address: Address) -> Result<usize, ChainClientError> {
        self.0.code_size(address).await
    }
}
