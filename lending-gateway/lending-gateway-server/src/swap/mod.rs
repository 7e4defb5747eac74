//! Executes deposits through quoted gateway routes and withdrawals from
//! lending positions, tracking each transaction until it is mined

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, U256};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    chain_client::{CallRequest, ChainClient, DynChainClient},
    gas::GasPricer,
    quote::board::QuoteBoard,
    registry::Registry,
    yield_accounting::rates::RateReader,
};
use lending_gateway_api::TxStatus;

use self::{
    confirmation::ConfirmationWatcher,
    error::{SwapError, ValidationError},
    tx_store::{TxContext, TxKind, TxStore},
    validation::{max_spendable, validate_deposit},
};

pub mod confirmation;
pub mod deposit;
pub mod error;
pub mod tx_store;
pub mod validation;
pub mod withdraw;

/// Submission settings of the executor
#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    /// The account transactions are sent from
    pub sender: Option<Address>,
    /// The interval between receipt polls
    pub receipt_poll_interval: Duration,
    /// How long to wait for a transaction to be mined before failing it
    pub confirmation_timeout: Duration,
}

/// The outcome of validating a deposit against a holder's balance
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositCheck {
    /// The validation result
    pub result: Result<(), ValidationError>,
    /// The largest deposit the holder can make, in wei
    pub max_spendable: U256,
}

/// Submits deposit and withdrawal transactions
#[derive(Clone)]
pub struct SwapExecutor {
    /// The chain client
    client: DynChainClient,
    /// The asset and gateway registries
    registry: Arc<Registry>,
    /// The chain transactions are submitted on
    chain_id: u64,
    /// Prices submitted transactions
    gas: GasPricer,
    /// Reads exchange rates and token balances for withdrawals
    reader: RateReader,
    /// The quotes issued per session
    board: QuoteBoard,
    /// The submitted transactions
    tx_store: TxStore,
    /// Submission settings
    config: ExecutorConfig,
}

impl SwapExecutor {
    /// Create a new executor
    pub fn new(
        client: DynChainClient,
        registry: Arc<Registry>,
        chain_id: u64,
        gas: GasPricer,
        reader: RateReader,
        board: QuoteBoard,
        config: ExecutorConfig,
    ) -> Self {
        let tx_store = TxStore::new();
        Self { client, registry, chain_id, gas, reader, board, tx_store, config }
    }

    /// The account transactions are sent from
    pub fn sender(&self) -> Result<Address, SwapError> {
        self.config.sender.ok_or(SwapError::NoSender)
    }

    /// The status of a submitted transaction
    pub fn tx_status(&self, id: Uuid) -> Result<TxContext, SwapError> {
        self.tx_store.get(&id).ok_or(SwapError::UnknownTx(id))
    }

    /// Validate a deposit of `amount` wei by `holder`
    ///
    /// Accounts with deployed code are treated as contract wallets, which
    /// need no gas reserve
    pub async fn check_deposit(
        &self,
        holder: Address,
        amount: U256,
    ) -> Result<DepositCheck, SwapError> {
        let (balance, code_size) =
            futures::try_join!(self.client.balance(holder), self.client.code_size(holder))?;
        let is_contract_wallet = code_size > 0;

        Ok(DepositCheck {
            result: validate_deposit(balance, amount, is_contract_wallet),
            max_spendable: max_spendable(balance, is_contract_wallet),
        })
    }

    /// Broadcast a transaction and watch it until it is mined
    ///
    /// Broadcast failures are recorded on the returned context rather than
    /// retried
    async fn submit(&self, kind: TxKind, request: CallRequest) -> TxContext {
        let tx = self.tx_store.insert(kind);
        let status = match self.client.send_transaction(request).await {
            Ok(tx_hash) => {
                info!(id = %tx.id, tx_hash = %tx_hash, "transaction broadcast");
                ConfirmationWatcher::new(
                    self.client.clone(),
                    self.tx_store.clone(),
                    tx.id,
                    tx_hash,
                    self.config.receipt_poll_interval,
                    self.config.confirmation_timeout,
                )
                .start();
                TxStatus::Pending { tx_hash }
            },
            Err(e) => {
                error!(id = %tx.id, "transaction broadcast failed: {e}");
                TxStatus::Failed { tx_hash: None, reason: e.to_string() }
            },
        };

        self.tx_store.set_status(&tx.id, status).unwrap_or(tx)
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    //! Shared setup for executor tests

    use std::time::Duration;

    use alloy_primitives::{Address, U256};
    use lending_gateway_api::TxStatus;
    use uuid::Uuid;

    use super::{ExecutorConfig, SwapExecutor};
    use crate::{
        chain_client::{mock::MockChainClient, DynChainClient},
        gas::{oracle::NodeGasOracle, GasPriceCache, GasPricer},
        quote::board::QuoteBoard,
        registry::{
            mainnet::{LENDING_POOL_ADDRESS, MAINNET_CHAIN_ID, POT_ADDRESS},
            Registry,
        },
        yield_accounting::rates::{PlatformContracts, RateReader},
    };

    /// One ETH in wei
    pub const ONE_ETH: u64 = 1_000_000_000_000_000_000;

    /// Build an executor over the mock and registry, funding the sender
    /// with 10 ETH
    pub fn executor(mock: &MockChainClient, registry: Registry) -> (SwapExecutor, Address) {
        executor_with_board(mock, registry, QuoteBoard::new())
    }

    /// Build a funded executor checking sessions against the given board
    pub fn executor_with_board(
        mock: &MockChainClient,
        registry: Registry,
        board: QuoteBoard,
    ) -> (SwapExecutor, Address) {
        let sender = Address::random();
        mock.set_balance(sender, U256::from(ONE_ETH) * U256::from(10));

        let client = DynChainClient::new(mock.clone());
        let gas = GasPricer::new(NodeGasOracle::new(client.clone()), GasPriceCache::new());
        let reader = RateReader::new(
            client.clone(),
            PlatformContracts { pot: POT_ADDRESS, lending_pool: LENDING_POOL_ADDRESS },
        );
        let config = ExecutorConfig {
            sender: Some(sender),
            receipt_poll_interval: Duration::from_millis(5),
            confirmation_timeout: Duration::from_millis(200),
        };
        let executor = SwapExecutor::new(
            client,
            registry.into(),
            MAINNET_CHAIN_ID,
            gas,
            reader,
            board,
            config,
        );
        (executor, sender)
    }

    /// Wait for a transaction to reach a terminal status
    pub async fn wait_final(executor: &SwapExecutor, id: Uuid) -> TxStatus {
        for _ in 0..200 {
            let status = executor.tx_status(id).unwrap().status;
            if status.is_final() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("transaction {id} never reached a terminal status");
    }
}
