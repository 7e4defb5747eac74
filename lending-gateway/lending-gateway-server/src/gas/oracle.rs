//! Gas price oracles

use std::str::FromStr;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::warn;

use super::{error::GasError, GasPriceOracle};
use crate::{
    chain_client::{ChainClient, DynChainClient},
    helpers::decimal_to_u256,
};

/// The decimals of the "tenths of a gwei" unit reported by ethgasstation
const ETHGASSTATION_DECIMALS: i64 = 8;

/// The subset of the ethgasstation response we consume
#[derive(Debug, Deserialize)]
struct EthGasStationResponse {
    /// The price for fast inclusion, in tenths of a gwei
    fast: serde_json::Number,
}

/// Reads the gas price from the node's `eth_gasPrice`
#[derive(Clone)]
pub struct NodeGasOracle {
    /// The chain client
    client: DynChainClient,
}

impl NodeGasOracle {
    /// Create a new node oracle
    pub fn new(client: DynChainClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GasPriceOracle for NodeGasOracle {
    async fn gas_price(&self) -> Result<u128, GasError> {
        Ok(self.client.gas_price().await?)
    }
}

/// Reads the "fast" tier from an ethgasstation-style HTTP endpoint, falling
/// back to the node when the endpoint fails
#[derive(Clone)]
pub struct HttpGasOracle {
    /// The HTTP client
    http: reqwest::Client,
    /// The oracle endpoint
    url: String,
    /// The oracle used when the endpoint fails
    fallback: NodeGasOracle,
}

impl HttpGasOracle {
    /// Create a new HTTP oracle
    pub fn new(url: String, fallback: NodeGasOracle) -> Self {
        Self { http: reqwest::Client::new(), url, fallback }
    }

    /// Query the HTTP endpoint
    async fn fetch(&self) -> Result<u128, GasError> {
        let resp: EthGasStationResponse =
            self.http.get(&self.url).send().await?.error_for_status()?.json().await?;
        parse_fast_price(&resp.fast)
    }
}

#[async_trait]
impl GasPriceOracle for HttpGasOracle {
    async fn gas_price(&self) -> Result<u128, GasError> {
        match self.fetch().await {
            Ok(price) => Ok(price),
            Err(e) => {
                warn!("gas oracle {} failed, falling back to node: {e}", self.url);
                self.fallback.gas_price().await
            },
        }
    }
}

/// Convert a price in tenths of a gwei into wei
fn parse_fast_price(fast: &serde_json::Number) -> Result<u128, GasError> {
    let tenths = BigDecimal::from_str(&fast.to_string()).map_err(GasError::invalid_price)?;
    let wei = decimal_to_u256(&tenths, ETHGASSTATION_DECIMALS)
        .ok_or_else(|| GasError::invalid_price(fast))?;
    if wei.is_zero() {
        return Err(GasError::invalid_price("zero gas price"));
    }

    u128::try_from(wei).map_err(|_| GasError::invalid_price("gas price overflows u128"))
}
