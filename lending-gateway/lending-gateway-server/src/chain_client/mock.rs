//! A scripted chain client used for testing

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;

use super::{error::ChainClientError, CallRequest, ChainClient, LogQuery, RawLog, ReceiptStatus};

/// A handler resolving simulated calls
type CallHandler =
    Box<dyn Fn(&CallRequest, Option<u64>) -> Result<Bytes, ChainClientError> + Send + Sync>;

/// The shared state of the mock
struct MockChainClientInner {
    /// The current block number
    block_number: AtomicU64,
    /// Resolves `eth_call`s
    call_handler: Mutex<CallHandler>,
    /// The number of `eth_call`s issued
    calls: AtomicUsize,
    /// The emitted logs, keyed by emitting contract
    logs: Mutex<Vec<(Address, RawLog)>>,
    /// Whether log queries should fail
    fail_logs: AtomicBool,
    /// The number of log queries issued
    log_queries: AtomicUsize,
    /// Account balances
    balances: Mutex<HashMap<Address, U256>>,
    /// Deployed code sizes
    code_sizes: Mutex<HashMap<Address, usize>>,
    /// Every broadcast transaction, in order
    sent: Mutex<Vec<CallRequest>>,
    /// The error to return from broadcasts, if any
    send_error: Mutex<Option<String>>,
    /// Receipts by transaction hash
    receipts: Mutex<HashMap<TxHash, ReceiptStatus>>,
    /// The receipt assigned to every broadcast, if any
    auto_receipt: Mutex<Option<ReceiptStatus>>,
    /// The node gas price
    gas_price: AtomicU64,
}

/// A scripted chain client. Clones share state
#[derive(Clone)]
pub struct MockChainClient(Arc<MockChainClientInner>);

impl Default for MockChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChainClient {
    /// Create a mock at block 1 whose calls all revert
    pub fn new() -> Self {
        Self(Arc::new(MockChainClientInner {
            block_number: AtomicU64::new(1),
            call_handler: Mutex::new(Box::new(|_, _| {
                Err(ChainClientError::rpc("execution reverted"))
            })),
            calls: AtomicUsize::new(0),
            logs: Mutex::new(Vec::new()),
            fail_logs: AtomicBool::new(false),
            log_queries: AtomicUsize::new(0),
            balances: Mutex::new(HashMap::new()),
            code_sizes: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            send_error: Mutex::new(None),
            receipts: Mutex::new(HashMap::new()),
            auto_receipt: Mutex::new(None),
            gas_price: AtomicU64::new(1_000_000_000),
        }))
    }

    // --- Setters --- //

    /// Set the current block number
    pub fn set_block_number(&self, block: u64) {
        self.0.block_number.store(block, Ordering::SeqCst);
    }

    /// Set the handler resolving `eth_call`s
    pub fn set_call_handler<F>(&self, handler: F)
    where
        F: Fn(&CallRequest, Option<u64>) -> Result<Bytes, ChainClientError> + Send + Sync + 'static,
    {
        *self.0.call_handler.lock().unwrap() = Box::new(handler);
    }

    /// Record a log emitted by a contract
    pub fn push_log(&self, address: Address, log: RawLog) {
        self.0.logs.lock().unwrap().push((address, log));
    }

    /// Make log queries fail
    pub fn set_fail_logs(&self, fail: bool) {
        self.0.fail_logs.store(fail, Ordering::SeqCst);
    }

    /// Set an account balance
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.0.balances.lock().unwrap().insert(address, balance);
    }

    /// Set the code size deployed at an address
    pub fn set_code_size(&self, address: Address, size: usize) {
        self.0.code_sizes.lock().unwrap().insert(address, size);
    }

    /// Make broadcasts fail with the given message
    pub fn set_send_error(&self, msg: &str) {
        *self.0.send_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Assign a receipt to every subsequent broadcast
    pub fn set_auto_receipt(&self, receipt: Option<ReceiptStatus>) {
        *self.0.auto_receipt.lock().unwrap() = receipt;
    }

    /// Set the node gas price
    pub fn set_gas_price(&self, price: u64) {
        self.0.gas_price.store(price, Ordering::SeqCst);
    }

    // --- Getters --- //

    /// The number of `eth_call`s issued
    pub fn call_count(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }

    /// The number of log queries issued
    pub fn log_query_count(&self) -> usize {
        self.0.log_queries.load(Ordering::SeqCst)
    }

    /// Every broadcast transaction, in order
    pub fn sent_transactions(&self) -> Vec<CallRequest> {
        self.0.sent.lock().unwrap().clone()
    }
}

/// Whether an optional topic filter matches a log topic
fn topic_matches(filter: Option<B256>, topic: Option<&B256>) -> bool {
    match filter {
        Some(expected) => topic == Some(&expected),
        None => true,
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn block_number(&self) -> Result<u64, ChainClientError> {
        Ok(self.0.block_number.load(Ordering::SeqCst))
    }

    async fn call(
        &self,
        request: CallRequest,
        block: Option<u64>,
    ) -> Result<Bytes, ChainClientError> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        let handler = self.0.call_handler.lock().unwrap();
        handler(&request, block)
    }

    async fn estimate_gas(&self, _request: CallRequest) -> Result<u64, ChainClientError> {
        Ok(21_000)
    }

    async fn get_logs(&self, query: LogQuery) -> Result<Vec<RawLog>, ChainClientError> {
        self.0.log_queries.fetch_add(1, Ordering::SeqCst);
        if self.0.fail_logs.load(Ordering::SeqCst) {
            return Err(ChainClientError::rpc("log query failed"));
        }

        let logs = self.0.logs.lock().unwrap();
        Ok(logs
            .iter()
            .filter(|(address, log)| {
                *address == query.address
                    && log.topics.first() == Some(&query.event_signature)
                    && topic_matches(query.topic1, log.topics.get(1))
                    && topic_matches(query.topic2, log.topics.get(2))
                    && log.block_number >= query.from_block
                    && log.block_number <= query.to_block
            })
            .map(|(_, log)| log.clone())
            .collect())
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<TxHash, ChainClientError> {
        if let Some(msg) = self.0.send_error.lock().unwrap().clone() {
            return Err(ChainClientError::rpc(msg));
        }

        let mut sent = self.0.sent.lock().unwrap();
        sent.push(request);
        let tx_hash = TxHash::with_last_byte(sent.len() as u8);
        if let Some(receipt) = *self.0.auto_receipt.lock().unwrap() {
            self.0.receipts.lock().unwrap().insert(tx_hash, receipt);
        }
        Ok(tx_hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<ReceiptStatus>, ChainClientError> {
        Ok(self.0.receipts.lock().unwrap().get(&tx_hash).copied())
    }

    async fn gas_price(&self) -> Result<u128, ChainClientError> {
        Ok(self.0.gas_price.load(Ordering::SeqCst) as u128)
    }

    async fn balance(&self, address: Address) -> Result<U256, ChainClientError> {
        Ok(self.0.balances.lock().unwrap().get(&address).copied().unwrap_or_default())
    }

    async fn code_size(&self, address: Address) -> Result<usize, ChainClientError> {
        Ok(self.0.code_sizes.lock().unwrap().get(&address).copied().unwrap_or_default())
    }
}
