//! Yield-bearing assets and the lending platforms that issue them

use alloy_primitives::Address;

/// The lending platforms an asset may belong to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Compound cTokens, valued by `exchangeRateCurrent`
    Compound,
    /// Fulcrum iTokens, valued by `tokenPrice`
    Fulcrum,
    /// Chai, valued by the DSR pot's `chi`
    MakerDao,
    /// AAVE aTokens, rebasing 1:1 with the underlying
    Aave,
}

impl Platform {
    /// The platform's display name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Compound => "Compound",
            Platform::Fulcrum => "Fulcrum",
            Platform::MakerDao => "MakerDAO",
            Platform::Aave => "AAVE",
        }
    }

    /// The fixed-point precision of the platform's raw exchange rate, `None`
    /// for platforms without one
    pub fn rate_precision(&self) -> Option<u32> {
        match self {
            Platform::Compound | Platform::Fulcrum => Some(18),
            Platform::MakerDao => Some(27),
            Platform::Aave => None,
        }
    }

    /// The name of the method used to withdraw into the underlying
    pub fn withdraw_method(&self) -> &'static str {
        match self {
            Platform::Compound | Platform::Aave => "redeem",
            Platform::Fulcrum => "burn",
            Platform::MakerDao => "exit",
        }
    }

    /// The gas ceiling used for withdrawals
    pub fn withdraw_gas_limit(&self) -> u64 {
        match self {
            Platform::Compound => 950_000,
            Platform::Fulcrum | Platform::Aave => 600_000,
            Platform::MakerDao => 400_000,
        }
    }
}

/// A yield-bearing wrapper token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// The chain the asset is deployed on
    pub chain_id: u64,
    /// The token contract
    pub address: Address,
    /// The token symbol
    pub symbol: &'static str,
    /// The issuing platform
    pub platform: Platform,
    /// The token decimals
    pub decimals: u8,
    /// The symbol of the underlying asset
    pub underlying_symbol: &'static str,
    /// The decimals of the underlying asset
    pub underlying_decimals: u8,
    /// The underlying reserve in the platform's lending pool, AAVE only
    pub reserve: Option<Address>,
    /// The block the token contract was created in
    pub creation_block: u64,
}

impl Asset {
    /// The power of ten dividing the raw exchange rate into whole units of
    /// underlying per whole token, `None` for platforms without a rate
    pub fn rate_scale(&self) -> Option<i64> {
        self.platform.rate_precision().map(|precision| {
            i64::from(precision) + i64::from(self.underlying_decimals) - i64::from(self.decimals)
        })
    }

    /// Whether the asset is valued through an exchange rate
    pub fn has_exchange_rate(&self) -> bool {
        self.platform != Platform::Aave
    }
}
