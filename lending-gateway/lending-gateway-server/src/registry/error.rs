//! Error types for the registries

use alloy_primitives::Address;

/// The error type emitted while loading or querying the registries
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Two assets share a chain and address
    #[error("duplicate asset {0:#x} on chain {1}")]
    DuplicateAsset(Address, u64),
    /// A gateway lists no methods
    #[error("gateway {0:#x} has no methods")]
    EmptyMethods(Address),
    /// An asset is not registered
    #[error("unknown asset {0:#x}")]
    UnknownAsset(Address),
    /// A gateway targets an asset missing from the asset registry
    #[error("gateway {0:#x} targets unknown asset {1:#x}")]
    UnknownTarget(Address, Address),
    /// More than one referral gateway targets the same asset
    #[error("asset {0:#x} has more than one referral gateway")]
    MultipleReferralGateways(Address),
    /// The chain has no registered assets
    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),
    /// A referral code or address is not on the allow-list
    #[error("unknown referral: {0}")]
    UnknownReferral(String),
    /// The referral allow-list could not be loaded
    #[error("failed to load referral list: {0}")]
    ReferralList(String),
}

#[allow(clippy::needless_pass_by_value)]
impl RegistryError {
    /// Create a new referral list error
    pub fn referral_list<T: ToString>(msg: T) -> Self {
        Self::ReferralList(msg.to_string())
    }
}
