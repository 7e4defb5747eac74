//! Static registries of yield-bearing assets and the gateways that deposit
//! into them, loaded once at startup and never mutated

use std::collections::{HashMap, HashSet};

use alloy_primitives::Address;

use self::{
    assets::Asset,
    error::RegistryError,
    gateways::{flatten_routes, Gateway, Route},
};

pub mod assets;
pub mod error;
pub mod gateways;
pub mod mainnet;
pub mod referral;

/// The asset and gateway registries
#[derive(Clone, Debug)]
pub struct Registry {
    /// Assets keyed by chain and address
    assets: HashMap<(u64, Address), Asset>,
    /// Gateways in insertion order
    gateways: Vec<Gateway>,
}

impl Registry {
    /// Build a registry, validating its invariants
    pub fn new(assets: Vec<Asset>, gateways: Vec<Gateway>) -> Result<Self, RegistryError> {
        let mut asset_map = HashMap::with_capacity(assets.len());
        for asset in assets {
            let key = (asset.chain_id, asset.address);
            if asset_map.insert(key, asset).is_some() {
                return Err(RegistryError::DuplicateAsset(key.1, key.0));
            }
        }

        let mut referral_targets = HashSet::new();
        for gateway in &gateways {
            if gateway.methods.is_empty() {
                return Err(RegistryError::EmptyMethods(gateway.address));
            }
            if !asset_map.contains_key(&(gateway.chain_id, gateway.target_asset)) {
                return Err(RegistryError::UnknownTarget(gateway.address, gateway.target_asset));
            }
            if gateway.is_referral
                && !referral_targets.insert((gateway.chain_id, gateway.target_asset))
            {
                return Err(RegistryError::MultipleReferralGateways(gateway.target_asset));
            }
        }

        Ok(Self { assets: asset_map, gateways })
    }

    /// The registry of every supported chain
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(mainnet::assets(), mainnet::gateways())
    }

    /// Whether any asset is registered for the chain
    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.assets(chain_id).next().is_some()
    }

    /// Look up an asset
    pub fn asset(&self, chain_id: u64, address: Address) -> Option<&Asset> {
        self.assets.get(&(chain_id, address))
    }

    /// Look up an asset, failing if it is not registered
    pub fn asset_or_err(&self, chain_id: u64, address: Address) -> Result<&Asset, RegistryError> {
        self.asset(chain_id, address).ok_or(RegistryError::UnknownAsset(address))
    }

    /// The assets registered on a chain
    pub fn assets(&self, chain_id: u64) -> impl Iterator<Item = &Asset> {
        self.assets.values().filter(move |asset| asset.chain_id == chain_id)
    }

    /// The gateways targeting an asset, in registry order
    pub fn gateways_for_target(
        &self,
        chain_id: u64,
        target: Address,
        is_referral: bool,
    ) -> Vec<&Gateway> {
        self.gateways
            .iter()
            .filter(|g| {
                g.chain_id == chain_id && g.target_asset == target && g.is_referral == is_referral
            })
            .collect()
    }

    /// The flattened routes for an asset, gateway-then-method
    pub fn routes_for_target(
        &self,
        chain_id: u64,
        target: Address,
        is_referral: bool,
    ) -> Vec<Route<'_>> {
        flatten_routes(&self.gateways_for_target(chain_id, target, is_referral))
    }

    /// Resolve a 1-based route index
    pub fn route(
        &self,
        chain_id: u64,
        target: Address,
        is_referral: bool,
        index: usize,
    ) -> Option<Route<'_>> {
        if index == 0 {
            return None;
        }
        self.routes_for_target(chain_id, target, is_referral).get(index - 1).copied()
    }
}
