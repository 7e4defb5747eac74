//! Defines the server which encapsulates all dependencies of the lending
//! gateway: the registries, the engines and their background workers

use std::{error::Error, sync::Arc};

use alloy_primitives::Address;
use lending_gateway_api::{QuoteDetails, QuoteRequest, QuoteResponse, RouteInfo, RoutesResponse};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    block_watcher::BlockWatcher,
    chain_client::{rpc::RpcChainClient, ChainClient, DynChainClient},
    cli::Cli,
    gas::{
        oracle::{HttpGasOracle, NodeGasOracle},
        worker::GasPriceWorker,
        GasPriceCache, GasPricer,
    },
    quote::{
        board::{QuoteBoard, QuoteInput},
        error::QuoteError,
        value_quote, QuoteEngine,
    },
    registry::{
        error::RegistryError,
        mainnet::{LENDING_POOL_ADDRESS, POT_ADDRESS},
        referral::ReferralBook,
        Registry,
    },
    swap::{ExecutorConfig, SwapExecutor},
    yield_accounting::{
        rates::{PlatformContracts, RateReader},
        worker::LedgerSyncWorker,
        YieldEngine,
    },
};

/// The server
#[derive(Clone)]
pub struct Server {
    /// The chain the server operates on
    pub chain_id: u64,
    /// The asset and gateway registries
    pub registry: Arc<Registry>,
    /// The referral allow-list
    pub referrals: ReferralBook,
    /// The chain client
    pub client: DynChainClient,
    /// The quote engine
    pub quotes: QuoteEngine,
    /// The newest quote of each session
    pub board: QuoteBoard,
    /// The swap executor
    pub executor: SwapExecutor,
    /// The yield accounting engine
    pub yield_engine: YieldEngine,
    /// The chain head published by the block watcher
    pub blocks: watch::Receiver<u64>,
}

impl Server {
    /// Build a server from the CLI and start its background workers
    pub async fn build_from_cli(cli: Cli) -> Result<Self, Box<dyn Error>> {
        let chain_id = cli.chain_id;
        let registry = Arc::new(Registry::builtin()?);
        if !registry.supports_chain(chain_id) {
            return Err(RegistryError::UnsupportedChain(chain_id).into());
        }

        let referrals = match &cli.referral_list_file {
            Some(path) => ReferralBook::from_file(path)?,
            None => ReferralBook::default(),
        };
        info!("loaded {} referrers", referrals.len());

        let rpc = RpcChainClient::new(
            &cli.rpc_url,
            cli.private_key.as_deref(),
            cli.from_address,
            cli.rpc_timeout(),
        )?;
        let sender = rpc.sender();
        match sender {
            Some(sender) => info!("sending transactions from {sender:#x}"),
            None => warn!("no sending account configured, deposits and withdrawals are disabled"),
        }
        let client = DynChainClient::new(rpc);

        // Seed the block channel before any subscriber starts
        let watcher = BlockWatcher::new(client.clone(), cli.block_polling_interval());
        let blocks = watcher.subscribe();
        if let Some(block) = watcher.poll().await {
            info!("starting at block {block}");
        }

        // --- Gas --- //

        let node_oracle = NodeGasOracle::new(client.clone());
        let gas = match cli.gas_price_url.clone() {
            Some(url) => GasPricer::new(HttpGasOracle::new(url, node_oracle), GasPriceCache::new()),
            None => GasPricer::new(node_oracle, GasPriceCache::new()),
        };
        GasPriceWorker::new(gas.oracle(), gas.cache(), blocks.clone()).start();

        // --- Engines --- //

        let board = QuoteBoard::new();
        board.spawn_expiry(blocks.clone());
        let quotes = QuoteEngine::new(client.clone(), registry.clone(), chain_id);

        let contracts = PlatformContracts { pot: POT_ADDRESS, lending_pool: LENDING_POOL_ADDRESS };
        let yield_engine = YieldEngine::new(client.clone(), registry.clone(), chain_id, contracts);
        LedgerSyncWorker::new(yield_engine.clone(), blocks.clone()).start();

        let config = ExecutorConfig {
            sender,
            receipt_poll_interval: cli.receipt_poll_interval(),
            confirmation_timeout: cli.confirmation_timeout(),
        };
        let executor = SwapExecutor::new(
            client.clone(),
            registry.clone(),
            chain_id,
            gas,
            RateReader::new(client.clone(), contracts),
            board.clone(),
            config,
        );

        watcher.start();
        Ok(Self {
            chain_id,
            registry,
            referrals,
            client,
            quotes,
            board,
            executor,
            yield_engine,
            blocks,
        })
    }

    /// The latest known block, asking the node if none has been published
    pub async fn current_block(&self) -> u64 {
        let block = *self.blocks.borrow();
        if block > 0 {
            return block;
        }

        self.client.block_number().await.unwrap_or_else(|e| {
            warn!("failed to fetch block number: {e}");
            0
        })
    }

    /// Resolve an optional referral code or address against the allow-list
    pub fn resolve_referral(
        &self,
        referral: Option<&str>,
    ) -> Result<Option<Address>, RegistryError> {
        referral.map(|r| self.referrals.resolve(r)).transpose()
    }

    // ----------
    // | Quotes |
    // ----------

    /// Quote a deposit, recording it for the session if one is given
    ///
    /// The quote is tagged with the block read before simulating, so a block
    /// arriving mid-simulation leaves it stale. A quote whose session issued a
    /// newer request while it was simulating is discarded and reported as
    /// superseded
    pub async fn quote(&self, req: QuoteRequest) -> Result<QuoteResponse, QuoteError> {
        let referral = self.resolve_referral(req.referral.as_deref())?;
        let input = QuoteInput { asset: req.asset, amount: req.amount, referral };
        let ticket = req.session_id.as_deref().map(|session| self.board.begin(session, input));

        let block_number = self.current_block().await;
        let quote = self.quotes.quote(req.asset, req.amount, referral).await;
        if let Some(ticket) = &ticket {
            if !self.board.publish(ticket, quote, block_number) {
                return Ok(QuoteResponse { quote: None, superseded: true });
            }
        }

        let (Some(quote), Some(asset)) = (quote, self.registry.asset(self.chain_id, req.asset))
        else {
            return Ok(QuoteResponse { quote: None, superseded: false });
        };

        let (rate, apr) = futures::join!(
            self.yield_engine.exchange_rate(req.asset),
            self.yield_engine.apr(req.asset)
        );
        let valuation = value_quote(&quote, asset, req.amount, rate?.as_ref(), apr?.as_ref());

        let details = QuoteDetails {
            route_index: quote.route_index,
            estimated_output: quote.estimated_output,
            underlying_output: valuation.underlying_output,
            rate_per_eth: valuation.rate_per_eth,
            projected_annual_earnings: valuation.projected_annual_earnings,
            block_number,
            stale: block_number < *self.blocks.borrow(),
        };
        Ok(QuoteResponse { quote: Some(details), superseded: false })
    }

    /// The flattened routes for an asset
    pub fn routes(
        &self,
        asset: Address,
        is_referral: bool,
    ) -> Result<RoutesResponse, RegistryError> {
        self.registry.asset_or_err(self.chain_id, asset)?;
        let routes = self
            .registry
            .routes_for_target(self.chain_id, asset, is_referral)
            .into_iter()
            .map(|route| RouteInfo {
                route_index: route.index,
                gateway: route.gateway.address,
                method: route.method.name.to_string(),
                gas_limit: route.gas_limit(),
            })
            .collect();

        Ok(RoutesResponse { routes })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, str::FromStr};

    use alloy_primitives::{Bytes, U256};
    use alloy_sol_types::SolCall;
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::{
        abis::ICToken,
        chain_client::{error::ChainClientError, mock::MockChainClient, CallRequest},
        registry::mainnet::{CDAI, MAINNET_CHAIN_ID},
        swap::{
            deposit::SwapRequest,
            error::SwapError,
            test_helpers::{executor_with_board, ONE_ETH},
        },
    };

    /// Encode a single word
    fn word(value: U256) -> Bytes {
        Bytes::from(value.to_be_bytes::<32>().to_vec())
    }

    /// Price cDAI at 0.02 DAI with a 0.021024 APR and answer every gateway
    /// with 10_000 cDAI
    fn answer(req: &CallRequest) -> Result<Bytes, ChainClientError> {
        let selector: [u8; 4] = req.data[..4].try_into().unwrap();
        let value = match selector {
            ICToken::exchangeRateCurrentCall::SELECTOR => {
                U256::from(200_000_000_000_000_000_000_000_000u128)
            },
            ICToken::supplyRatePerBlockCall::SELECTOR => U256::from(10_000_000_000u64),
            _ => U256::from(1_000_000_000_000u64),
        };
        Ok(word(value))
    }

    /// Build a server over the mock at block 100, its executor sharing the
    /// server's quote board
    fn server(mock: &MockChainClient) -> (Server, watch::Sender<u64>) {
        mock.set_call_handler(|req, _| answer(req));

        let registry = Arc::new(Registry::builtin().unwrap());
        let client = DynChainClient::new(mock.clone());
        let referrer = Address::repeat_byte(0x42);
        let referrals = ReferralBook::new(HashMap::from([("alice".to_string(), referrer)]));

        let (tx, blocks) = watch::channel(100);
        let board = QuoteBoard::new();
        board.spawn_expiry(blocks.clone());
        let (executor, _) = executor_with_board(mock, Registry::builtin().unwrap(), board.clone());
        let contracts = PlatformContracts { pot: POT_ADDRESS, lending_pool: LENDING_POOL_ADDRESS };
        let server = Server {
            chain_id: MAINNET_CHAIN_ID,
            registry: registry.clone(),
            referrals,
            client: client.clone(),
            quotes: QuoteEngine::new(client.clone(), registry.clone(), MAINNET_CHAIN_ID),
            board,
            executor,
            yield_engine: YieldEngine::new(client, registry, MAINNET_CHAIN_ID, contracts),
            blocks,
        };
        (server, tx)
    }

    /// A quote request
    fn request(session_id: Option<&str>, referral: Option<&str>) -> QuoteRequest {
        QuoteRequest {
            session_id: session_id.map(str::to_string),
            asset: CDAI,
            amount: U256::from(ONE_ETH) * U256::from(2),
            referral: referral.map(str::to_string),
        }
    }

    /// A quote is valued in the underlying at the published block
    #[tokio::test]
    async fn test_quote_valuation() {
        let mock = MockChainClient::new();
        let (server, _tx) = server(&mock);

        let resp = server.quote(request(None, None)).await.unwrap();
        assert!(!resp.superseded);
        let details = resp.quote.unwrap();
        assert_eq!(details.route_index, 1);
        assert_eq!(details.block_number, 100);
        assert!(!details.stale);
        assert_eq!(details.underlying_output, Some(BigDecimal::from(200)));
        assert_eq!(details.rate_per_eth, Some(BigDecimal::from(100)));
        assert_eq!(
            details.projected_annual_earnings,
            Some(BigDecimal::from_str("4.2048").unwrap())
        );
    }

    /// Session quotes are recorded on the board for execution
    #[tokio::test]
    async fn test_quote_recorded_for_session() {
        let mock = MockChainClient::new();
        let (server, _tx) = server(&mock);

        server.quote(request(Some("session"), Some("alice"))).await.unwrap();
        let stored = server.board.current("session").unwrap();
        assert_eq!(stored.input.referral, Some(Address::repeat_byte(0x42)));
        assert_eq!(stored.quote.route_index, 1);
        assert!(server.board.current("other").is_none());
    }

    /// Wait for the expiry task to mark a session's quote stale
    async fn wait_stale(board: &QuoteBoard, session: &str) {
        for _ in 0..100 {
            if board.current(session).is_some_and(|stored| stored.stale) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("quote of {session} never became stale");
    }

    /// A block arriving mid-simulation leaves the quote at the earlier block,
    /// so it expires rather than passing as current
    #[tokio::test]
    async fn test_block_advances_during_quote() {
        let mock = MockChainClient::new();
        let (server, tx) = server(&mock);
        mock.set_call_handler(move |req, _| {
            tx.send_replace(101);
            answer(req)
        });

        let resp = server.quote(request(Some("session"), None)).await.unwrap();
        let details = resp.quote.unwrap();
        assert_eq!(details.block_number, 100);
        assert!(details.stale);

        wait_stale(&server.board, "session").await;
        assert_eq!(server.board.current("session").unwrap().block_number, 100);
    }

    /// The executor honors the quote the server recorded until a new block
    /// expires it
    #[tokio::test]
    async fn test_execute_after_new_block() {
        let mock = MockChainClient::new();
        let (server, tx) = server(&mock);

        let req = request(Some("session"), None);
        let amount = req.amount;
        let route_index = server.quote(req).await.unwrap().quote.unwrap().route_index;
        let swap = SwapRequest {
            session_id: Some("session".to_string()),
            asset: CDAI,
            amount,
            route_index: Some(route_index),
            referral: None,
        };
        server.executor.execute(swap.clone()).await.unwrap();
        assert_eq!(mock.sent_transactions().len(), 1);

        tx.send(101).unwrap();
        wait_stale(&server.board, "session").await;

        let err = server.executor.execute(swap).await.unwrap_err();
        assert!(matches!(err, SwapError::InvalidRoute(_)));
        assert_eq!(mock.sent_transactions().len(), 1);
    }

    /// Unknown referrals are rejected before simulating
    #[tokio::test]
    async fn test_quote_unknown_referral() {
        let mock = MockChainClient::new();
        let (server, _tx) = server(&mock);

        let err = server.quote(request(None, Some("mallory"))).await.unwrap_err();
        assert!(matches!(err, QuoteError::Registry(RegistryError::UnknownReferral(_))));
        assert_eq!(mock.call_count(), 0);
    }

    /// Unquotable requests report no quote rather than failing
    #[tokio::test]
    async fn test_quote_unavailable() {
        let mock = MockChainClient::new();
        let (server, _tx) = server(&mock);

        let mut req = request(None, None);
        req.amount = U256::ZERO;
        let resp = server.quote(req).await.unwrap();
        assert!(resp.quote.is_none());
        assert!(!resp.superseded);
    }

    /// Routes are listed with contiguous 1-based indices
    #[tokio::test]
    async fn test_routes() {
        let mock = MockChainClient::new();
        let (server, _tx) = server(&mock);

        for is_referral in [false, true] {
            let resp = server.routes(CDAI, is_referral).unwrap();
            assert!(!resp.routes.is_empty());
            for (i, route) in resp.routes.iter().enumerate() {
                assert_eq!(route.route_index, i + 1);
            }
        }

        let unknown = Address::repeat_byte(0xee);
        assert!(matches!(server.routes(unknown, false), Err(RegistryError::UnknownAsset(_))));
    }
}
