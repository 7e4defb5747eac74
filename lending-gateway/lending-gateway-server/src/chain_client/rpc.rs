//! A chain client backed by a JSON-RPC node

use std::{future::Future, str::FromStr, time::Duration};

use alloy::{
    network::ReceiptResponse,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{BlockId, Filter, TransactionInput, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use super::{error::ChainClientError, CallRequest, ChainClient, LogQuery, RawLog, ReceiptStatus};

/// A chain client that talks to an RPC node over HTTP
///
/// When constructed with a private key, transactions are signed locally and
/// broadcast raw; otherwise they are submitted through the node's managed
/// accounts via `eth_sendTransaction`
#[derive(Clone)]
pub struct RpcChainClient {
    /// The underlying provider
    provider: DynProvider,
    /// The account transactions are sent from
    sender: Option<Address>,
    /// The bound on every RPC round trip
    timeout: Duration,
}

impl RpcChainClient {
    /// Create a new client
    pub fn new(
        rpc_url: &str,
        private_key: Option<&str>,
        from_address: Option<Address>,
        timeout: Duration,
    ) -> Result<Self, ChainClientError> {
        let url = Url::parse(rpc_url).map_err(ChainClientError::config)?;
        let (provider, sender) = match private_key {
            Some(key) => {
                let signer = PrivateKeySigner::from_str(key).map_err(ChainClientError::config)?;
                let sender = signer.address();
                let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
                (DynProvider::new(provider), Some(sender))
            },
            None => (DynProvider::new(ProviderBuilder::new().connect_http(url)), from_address),
        };

        Ok(Self { provider, sender, timeout })
    }

    /// The account transactions are sent from, if one is configured
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    /// Bound a request by the configured timeout
    async fn bounded<T, F>(&self, method: &str, fut: F) -> Result<T, ChainClientError>
    where
        F: Future<Output = Result<T, ChainClientError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| ChainClientError::timeout(method))?
    }

    /// Convert a call request into an alloy transaction request
    fn to_transaction_request(&self, request: CallRequest) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .to(request.to)
            .value(request.value)
            .input(TransactionInput::new(request.data));
        tx.from = request.from.or(self.sender);
        tx.gas = request.gas_limit;
        tx.gas_price = request.gas_price;
        tx
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn block_number(&self) -> Result<u64, ChainClientError> {
        self.bounded("eth_blockNumber", async { Ok(self.provider.get_block_number().await?) })
            .await
    }

    async fn call(
        &self,
        request: CallRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainClientError> {
        let tx = self.to_transaction_request(request);
        self.bounded("eth_call", async {
            let call = self.provider.call(tx);
            let output = match block {
                Some(number) => call.block(BlockId::number(number)).await?,
                None => call.await?,
            };
            Ok(output)
        })
        .await
    }

    async fn estimate_gas(&self, request: CallRequest) -> Result<u64, ChainClientError> {
        let tx = self.to_transaction_request(request);
        self.bounded("eth_estimateGas", async { Ok(self.provider.estimate_gas(tx).await?) }).await
    }

    async fn get_logs(&self, query: LogQuery) -> Result<Vec<RawLog>, ChainClientError> {
        let mut filter = Filter::new()
            .address(query.address)
            .event_signature(query.event_signature)
            .from_block(query.from_block)
            .to_block(query.to_block);
        if let Some(topic) = query.topic1 {
            filter = filter.topic1(topic);
        }
        if let Some(topic) = query.topic2 {
            filter = filter.topic2(topic);
        }

        let logs = self
            .bounded("eth_getLogs", async { Ok(self.provider.get_logs(&filter).await?) })
            .await?;
        logs.into_iter()
            .map(|log| {
                let block_number = log
                    .block_number
                    .ok_or_else(|| ChainClientError::decode("log is missing its block number"))?;
                Ok(RawLog {
                    block_number,
                    log_index: log.log_index.unwrap_or_default(),
                    topics: log.topics().to_vec(),
                    data: log.data().data.clone(),
                })
            })
            .collect()
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<TxHash, ChainClientError> {
        let tx = self.to_transaction_request(request);
        self.bounded("eth_sendTransaction", async {
            let pending = self.provider.send_transaction(tx).await?;
            Ok(*pending.tx_hash())
        })
        .await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptStatus>, ChainClientError> {
        self.bounded("eth_getTransactionReceipt", async {
            let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
            Ok(receipt.map(|r| ReceiptStatus {
                success: ReceiptResponse::status(&r),
                block_number: ReceiptResponse::block_number(&r),
            }))
        })
        .await
    }

    async fn gas_price(&self) -> Result<u128, ChainClientError> {
        self.bounded("eth_gasPrice", async { Ok(self.provider.get_gas_price().await?) }).await
    }

    async fn balance(&self, address: Address) -> Result<U256, ChainClientError> {
        self.bounded("eth_getBalance", async { Ok(self.provider.get_balance(address).await?) })
            .await
    }

    async fn code_size(&self, address: Address) -> Result<usize, ChainClientError> {
        self.bounded("eth_getCode", async { Ok(self.provider.get_code_at(address).await?.len()) })
            .await
    }
}
