//! Gateway contracts converting ETH into a yield-bearing asset

use alloy_primitives::Address;

/// A deposit entry point on a gateway
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayMethod {
    /// The method name
    pub name: &'static str,
    /// The gas ceiling for calls to the method
    pub gas_limit: u64,
}

/// A deployed router converting ETH into exactly one asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gateway {
    /// The chain the gateway is deployed on
    pub chain_id: u64,
    /// The gateway contract
    pub address: Address,
    /// The asset the gateway deposits into
    pub target_asset: Address,
    /// Whether the gateway records a referral beneficiary
    pub is_referral: bool,
    /// The deposit methods, in route order
    pub methods: Vec<GatewayMethod>,
    /// The gas ceiling for plain value transfers to the gateway
    pub fallback_gas_limit: u64,
}

impl Gateway {
    /// A gateway with a single method, entered through its fallback
    pub fn plain(
        chain_id: u64,
        address: Address,
        target_asset: Address,
        method: &'static str,
        gas_limit: u64,
    ) -> Self {
        Self {
            chain_id,
            address,
            target_asset,
            is_referral: false,
            methods: vec![GatewayMethod { name: method, gas_limit }],
            fallback_gas_limit: gas_limit,
        }
    }

    /// A referral gateway with one or more alternate routing methods
    pub fn referral(
        chain_id: u64,
        address: Address,
        target_asset: Address,
        methods: Vec<GatewayMethod>,
    ) -> Self {
        let fallback_gas_limit = methods.iter().map(|m| m.gas_limit).max().unwrap_or_default();
        Self { chain_id, address, target_asset, is_referral: true, methods, fallback_gas_limit }
    }
}

/// A (gateway, method) pair addressed by its 1-based position in the
/// flattened candidate list for an asset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route<'a> {
    /// The 1-based route index
    pub index: usize,
    /// The gateway
    pub gateway: &'a Gateway,
    /// The method on the gateway
    pub method: &'a GatewayMethod,
}

impl Route<'_> {
    /// The gas ceiling used when submitting the route
    pub fn gas_limit(&self) -> u64 {
        if self.gateway.is_referral {
            self.method.gas_limit
        } else {
            self.gateway.fallback_gas_limit
        }
    }
}

/// Flatten gateways into routes, gateway-then-method
pub fn flatten_routes<'a>(gateways: &[&'a Gateway]) -> Vec<Route<'a>> {
    gateways
        .iter()
        .copied()
        .flat_map(|gateway| gateway.methods.iter().map(move |method| (gateway, method)))
        .enumerate()
        .map(|(i, (gateway, method))| Route { index: i + 1, gateway, method })
        .collect()
}
