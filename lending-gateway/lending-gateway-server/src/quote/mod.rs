//! The quote engine: simulates every candidate route for a deposit and
//! selects the one with the largest output

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::{
    abis::{decode_gateway_output, gateway_calldata},
    chain_client::{CallRequest, ChainClient, DynChainClient},
    helpers::{u256_to_decimal, ETH_DECIMALS},
    registry::{assets::Asset, gateways::Route, Registry},
};

pub mod board;
pub mod error;

/// The route selected for a deposit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    /// The 1-based index of the route within the flattened candidate list
    pub route_index: usize,
    /// The simulated output, in the smallest unit of the target asset
    pub estimated_output: U256,
}

/// A quote expressed in the underlying asset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteValuation {
    /// Whole units of underlying received
    pub underlying_output: Option<BigDecimal>,
    /// Whole units of underlying received per whole ETH
    pub rate_per_eth: Option<BigDecimal>,
    /// Underlying earned over a year at the current APR
    pub projected_annual_earnings: Option<BigDecimal>,
}

/// Simulates gateway routes through read-only calls
#[derive(Clone)]
pub struct QuoteEngine {
    /// The chain client
    client: DynChainClient,
    /// The asset and gateway registries
    registry: Arc<Registry>,
    /// The chain quotes are computed on
    chain_id: u64,
}

impl QuoteEngine {
    /// Create a new quote engine
    pub fn new(client: DynChainClient, registry: Arc<Registry>, chain_id: u64) -> Self {
        Self { client, registry, chain_id }
    }

    /// Quote a deposit of `amount` wei into `asset`
    ///
    /// Referral deposits are simulated against the referral gateway, others
    /// against every plain gateway. Returns `None` without simulating when
    /// the amount is zero or the asset is unknown, and when every route fails
    #[instrument(skip_all, fields(asset = %asset, amount = %amount))]
    pub async fn quote(
        &self,
        asset: Address,
        amount: U256,
        referral: Option<Address>,
    ) -> Option<Quote> {
        if amount.is_zero() {
            return None;
        }
        if self.registry.asset(self.chain_id, asset).is_none() {
            warn!("cannot quote unknown asset");
            return None;
        }

        let routes = self.registry.routes_for_target(self.chain_id, asset, referral.is_some());
        let simulations = routes.iter().map(|route| self.simulate(route, amount, referral));
        let outputs = join_all(simulations).await;

        let quote = select_best_route(&outputs)
            .map(|(route_index, estimated_output)| Quote { route_index, estimated_output });
        match &quote {
            Some(q) => info!(
                "selected route {} of {} with output {}",
                q.route_index,
                routes.len(),
                q.estimated_output
            ),
            None => warn!("no route could be simulated"),
        }
        quote
    }

    /// Simulate a single route, returning `None` if it fails
    async fn simulate(
        &self,
        route: &Route<'_>,
        amount: U256,
        referral: Option<Address>,
    ) -> Option<U256> {
        let data = gateway_calldata(route.method.name, Address::random(), referral);
        let request = CallRequest::new(route.gateway.address, data).with_value(amount);

        let result = match self.client.call(request, None).await {
            Ok(output) => decode_gateway_output(&output),
            Err(e) => Err(e),
        };
        match result {
            Ok(output) => Some(output),
            Err(e) => {
                warn!(
                    "simulation of route {} ({:#x}.{}) failed: {e}",
                    route.index, route.gateway.address, route.method.name
                );
                None
            },
        }
    }
}

/// Select the route with the largest output, the earliest winning ties
///
/// Returns the 1-based index of the route and its output
pub fn select_best_route(outputs: &[Option<U256>]) -> Option<(usize, U256)> {
    let mut best: Option<(usize, U256)> = None;
    for (i, output) in outputs.iter().enumerate() {
        let Some(output) = *output else { continue };
        match best {
            Some((_, best_output)) if output <= best_output => {},
            _ => best = Some((i + 1, output)),
        }
    }

    best
}

/// Value a quote in the underlying asset
///
/// `exchange_rate` is whole units of underlying per whole token and is
/// ignored for assets without one; `apr` is a plain fraction
pub fn value_quote(
    quote: &Quote,
    asset: &Asset,
    amount: U256,
    exchange_rate: Option<&BigDecimal>,
    apr: Option<&BigDecimal>,
) -> QuoteValuation {
    let tokens = u256_to_decimal(quote.estimated_output, i64::from(asset.decimals));
    let underlying_output = if asset.has_exchange_rate() {
        exchange_rate.map(|rate| tokens * rate)
    } else {
        Some(tokens)
    };

    let eth = u256_to_decimal(amount, ETH_DECIMALS);
    let rate_per_eth = match &underlying_output {
        Some(output) if !amount.is_zero() => Some(output / &eth),
        _ => None,
    };
    let projected_annual_earnings = match (&underlying_output, apr) {
        (Some(output), Some(apr)) => Some(output * apr),
        _ => None,
    };

    QuoteValuation { underlying_output, rate_per_eth, projected_annual_earnings }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::Bytes;
    use rand::{thread_rng, Rng};

    use super::*;
    use crate::{
        chain_client::{error::ChainClientError, mock::MockChainClient},
        registry::{
            assets::Platform,
            mainnet::{self, CDAI, MAINNET_CHAIN_ID},
        },
    };

    /// Encode a gateway output
    fn output(value: u64) -> Bytes {
        Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec())
    }

    /// Build a quote engine over the given gateways for cDAI, answering each
    /// gateway's simulation with the given output or a revert
    fn engine_with_outputs(outputs: Vec<Option<u64>>) -> (QuoteEngine, MockChainClient) {
        let gateways: Vec<_> = (0..outputs.len())
            .map(|i| {
                mainnet_gateway(Address::repeat_byte(i as u8 + 1), "etherTocDai", 275_000)
            })
            .collect();
        let registry = Registry::new(mainnet::assets(), gateways.clone()).unwrap();

        let mock = MockChainClient::new();
        mock.set_call_handler(move |req, _| {
            let idx = gateways.iter().position(|g| g.address == req.to).unwrap();
            match outputs[idx] {
                Some(value) => Ok(output(value)),
                None => Err(ChainClientError::rpc("execution reverted")),
            }
        });

        let engine = QuoteEngine::new(
            DynChainClient::new(mock.clone()),
            Arc::new(registry),
            MAINNET_CHAIN_ID,
        );
        (engine, mock)
    }

    /// A plain cDAI gateway
    fn mainnet_gateway(
        address: Address,
        method: &'static str,
        gas: u64,
    ) -> crate::registry::gateways::Gateway {
        crate::registry::gateways::Gateway::plain(MAINNET_CHAIN_ID, address, CDAI, method, gas)
    }

    /// One ETH in wei
    fn one_eth() -> U256 {
        U256::from(10u64).pow(U256::from(18u64))
    }

    /// Three gateways yielding [100, 150, 120] select the second
    #[tokio::test]
    async fn test_simple_quote() {
        let (engine, mock) = engine_with_outputs(vec![Some(100), Some(150), Some(120)]);
        let quote = engine.quote(CDAI, one_eth(), None).await.unwrap();

        assert_eq!(quote, Quote { route_index: 2, estimated_output: U256::from(150u64) });
        assert_eq!(mock.call_count(), 3);
    }

    /// Ties resolve to the earliest route
    #[tokio::test]
    async fn test_tie_break_earliest() {
        let (engine, _) = engine_with_outputs(vec![Some(100), Some(150), Some(150)]);
        let quote = engine.quote(CDAI, one_eth(), None).await.unwrap();
        assert_eq!(quote.route_index, 2);
    }

    /// Failed simulations are excluded without failing the quote
    #[tokio::test]
    async fn test_partial_failure_tolerated() {
        let (engine, _) = engine_with_outputs(vec![None, Some(90), None]);
        let quote = engine.quote(CDAI, one_eth(), None).await.unwrap();
        assert_eq!(quote, Quote { route_index: 2, estimated_output: U256::from(90u64) });
    }

    /// A quote is unavailable when every simulation fails
    #[tokio::test]
    async fn test_all_failures_unavailable() {
        let (engine, mock) = engine_with_outputs(vec![None, None]);
        assert!(engine.quote(CDAI, one_eth(), None).await.is_none());
        assert_eq!(mock.call_count(), 2);
    }

    /// Zero amounts and unknown assets are rejected before simulating
    #[tokio::test]
    async fn test_no_simulation_for_invalid_input() {
        let (engine, mock) = engine_with_outputs(vec![Some(1)]);
        assert!(engine.quote(CDAI, U256::ZERO, None).await.is_none());
        assert!(engine.quote(Address::repeat_byte(0xee), one_eth(), None).await.is_none());
        assert_eq!(mock.call_count(), 0);
    }

    /// Every simulation carries the deposit value and a fresh recipient
    #[tokio::test]
    async fn test_simulation_requests() {
        let registry = Registry::builtin().unwrap();
        let mock = MockChainClient::new();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        mock.set_call_handler(move |req, block| {
            seen_clone.lock().unwrap().push((req.clone(), block));
            Ok(output(1))
        });
        let engine =
            QuoteEngine::new(DynChainClient::new(mock), Arc::new(registry), MAINNET_CHAIN_ID);

        let referral = Address::repeat_byte(0x42);
        engine.quote(CDAI, one_eth(), Some(referral)).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for (req, block) in seen.iter() {
            assert_eq!(req.value, one_eth());
            assert_eq!(*block, None);
            assert_eq!(req.data.len(), 4 + 64);
            assert_eq!(Address::from_slice(&req.data[48..68]), referral);
        }
        assert_ne!(seen[0].0.data[16..36], seen[1].0.data[16..36]);
    }

    /// The selection matches a naive maximum search over random outputs
    #[test]
    fn test_select_best_route_random() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let outputs: Vec<Option<U256>> = (0..rng.gen_range(1..8))
                .map(|_| rng.gen_bool(0.7).then(|| U256::from(rng.gen_range(0u64..5))))
                .collect();

            let max = outputs.iter().flatten().max().copied();
            let expected = max.map(|m| {
                let idx = outputs.iter().position(|o| *o == Some(m)).unwrap();
                (idx + 1, m)
            });
            assert_eq!(select_best_route(&outputs), expected);
        }
    }

    /// Valuation converts through the exchange rate except for rebasing
    /// assets
    #[test]
    fn test_value_quote() {
        let registry = Registry::builtin().unwrap();
        let cdai = registry.asset(MAINNET_CHAIN_ID, CDAI).unwrap();
        // 10_000 cDAI at 0.02 DAI each, 5% APR, for 2 ETH
        let quote = Quote { route_index: 1, estimated_output: U256::from(1_000_000_000_000u64) };
        let rate = BigDecimal::from_str("0.02").unwrap();
        let apr = BigDecimal::from_str("0.05").unwrap();
        let amount = one_eth() * U256::from(2u64);

        let valuation = value_quote(&quote, cdai, amount, Some(&rate), Some(&apr));
        assert_eq!(valuation.underlying_output, Some(BigDecimal::from(200)));
        assert_eq!(valuation.rate_per_eth, Some(BigDecimal::from(100)));
        assert_eq!(valuation.projected_annual_earnings, Some(BigDecimal::from(10)));

        let missing_rate = value_quote(&quote, cdai, amount, None, Some(&apr));
        assert_eq!(missing_rate, QuoteValuation::default());

        let adai = registry.asset(MAINNET_CHAIN_ID, mainnet::ADAI).unwrap();
        assert_eq!(adai.platform, Platform::Aave);
        let quote = Quote { route_index: 1, estimated_output: one_eth() };
        let valuation = value_quote(&quote, adai, one_eth(), None, None);
        assert_eq!(valuation.underlying_output, Some(BigDecimal::from(1)));
        assert_eq!(valuation.projected_annual_earnings, None);
    }
}
