//! API types for quoting gateway routes
use alloy_primitives::{Address, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::serialization::{
    address_string_serialization, option_decimal_string_serialization, u256_string_serialization,
};

// --------------
// | Api Routes |
// --------------

/// The route to quote a deposit of ETH into a target asset
pub const QUOTE_ROUTE: &str = "quote";
/// The route to list the flattened gateway routes for an asset
///
/// Expected query parameters:
/// - referral: whether to list the referral routes (defaults to false)
pub const GATEWAYS_ROUTE: &str = "gateways";

// -------------
// | Api Types |
// -------------

/// The request body for quoting a deposit
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// An identifier for the client session issuing the quote
    ///
    /// When present, the quote is recorded for the session and newer quotes
    /// for the same session supersede older in-flight ones
    #[serde(default)]
    pub session_id: Option<String>,
    /// The address of the target yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The amount of ETH to deposit, in wei
    #[serde(with = "u256_string_serialization")]
    pub amount: U256,
    /// A referral code or beneficiary address, selects the referral gateway
    #[serde(default)]
    pub referral: Option<String>,
}

/// The response to a quote request
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    /// The quote, `None` when no route could be simulated
    pub quote: Option<QuoteDetails>,
    /// Whether a newer quote for the same session replaced this one before it
    /// resolved
    pub superseded: bool,
}

/// The details of a selected route
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetails {
    /// The 1-based index of the selected route
    pub route_index: usize,
    /// The simulated output, in the smallest unit of the target asset
    #[serde(with = "u256_string_serialization")]
    pub estimated_output: U256,
    /// The output converted into whole units of the underlying asset
    #[serde(with = "option_decimal_string_serialization")]
    pub underlying_output: Option<BigDecimal>,
    /// The amount of underlying received per whole ETH
    #[serde(with = "option_decimal_string_serialization")]
    pub rate_per_eth: Option<BigDecimal>,
    /// The underlying earned over a year at the current APR
    #[serde(with = "option_decimal_string_serialization")]
    pub projected_annual_earnings: Option<BigDecimal>,
    /// The block at which the routes were simulated
    pub block_number: u64,
    /// Whether the chain has advanced since the quote was computed
    pub stale: bool,
}

/// A single route through a gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    /// The 1-based index of the route
    pub route_index: usize,
    /// The gateway contract
    #[serde(with = "address_string_serialization")]
    pub gateway: Address,
    /// The gateway method invoked for the route
    pub method: String,
    /// The gas ceiling used when submitting the route
    pub gas_limit: u64,
}

/// The response listing the routes for an asset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutesResponse {
    /// The routes, in route index order
    pub routes: Vec<RouteInfo>,
}
