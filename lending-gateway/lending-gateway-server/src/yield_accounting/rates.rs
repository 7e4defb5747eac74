//! Reads platform exchange rates, supply rates and balances from the chain

use alloy_primitives::{Address, U256};
use bigdecimal::{BigDecimal, Zero};

use super::error::LedgerError;
use crate::{
    abis::{IAToken, ICToken, IIToken, ILendingPool, IPot, IERC20},
    chain_client::DynChainClient,
    helpers::{pow10, u256_to_decimal},
    registry::assets::{Asset, Platform},
};

// -------------
// | Constants |
// -------------

/// The number of blocks per year assumed by Compound's per-block rates
pub const BLOCKS_PER_YEAR: u64 = 2_102_400;
/// The number of seconds per year, compounding the DSR's per-second rate
pub const SECONDS_PER_YEAR: u64 = 31_536_000;
/// The precision of Compound and Fulcrum rates
const WAD_DECIMALS: i64 = 18;
/// The precision of MakerDAO and AAVE rates
const RAY_DECIMALS: i64 = 27;
/// Fulcrum reports its supply rate as a percentage
const PERCENT_DECIMALS: i64 = 2;

/// The platform contracts shared by every asset on a chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformContracts {
    /// The MakerDAO DSR pot
    pub pot: Address,
    /// The AAVE lending pool
    pub lending_pool: Address,
}

/// Reads the on-chain values yield accounting depends on
#[derive(Clone)]
pub struct RateReader {
    /// The chain client
    client: DynChainClient,
    /// The platform contracts
    contracts: PlatformContracts,
}

impl RateReader {
    /// Create a new reader
    pub fn new(client: DynChainClient, contracts: PlatformContracts) -> Self {
        Self { client, contracts }
    }

    /// Whole units of underlying per whole token, at `block` or the latest
    /// block
    pub async fn exchange_rate(
        &self,
        asset: &Asset,
        block: Option<u64>,
    ) -> Result<BigDecimal, LedgerError> {
        let raw = match asset.platform {
            Platform::Compound => {
                self.client
                    .call_typed(asset.address, &ICToken::exchangeRateCurrentCall {}, block)
                    .await?
            },
            Platform::Fulcrum => {
                self.client.call_typed(asset.address, &IIToken::tokenPriceCall {}, block).await?
            },
            Platform::MakerDao => {
                self.client.call_typed(self.contracts.pot, &IPot::chiCall {}, block).await?
            },
            Platform::Aave => return Ok(BigDecimal::from(1)),
        };

        let scale = asset.rate_scale().unwrap_or_default();
        Ok(u256_to_decimal(raw, scale))
    }

    /// The current supply APR, as a fraction
    pub async fn apr(&self, asset: &Asset) -> Result<BigDecimal, LedgerError> {
        match asset.platform {
            Platform::Compound => {
                let call = ICToken::supplyRatePerBlockCall {};
                let rate = self.client.call_typed(asset.address, &call, None).await?;
                Ok(u256_to_decimal(rate, WAD_DECIMALS) * BigDecimal::from(BLOCKS_PER_YEAR))
            },
            Platform::Fulcrum => {
                let call = IIToken::supplyInterestRateCall {};
                let rate = self.client.call_typed(asset.address, &call, None).await?;
                Ok(u256_to_decimal(rate, WAD_DECIMALS + PERCENT_DECIMALS))
            },
            Platform::MakerDao => {
                let dsr =
                    self.client.call_typed(self.contracts.pot, &IPot::dsrCall {}, None).await?;
                let per_second = u256_to_decimal(dsr, RAY_DECIMALS) - BigDecimal::from(1);
                Ok(per_second * BigDecimal::from(SECONDS_PER_YEAR))
            },
            Platform::Aave => {
                let reserve = asset.reserve.ok_or(LedgerError::MissingReserve(asset.address))?;
                let call = ILendingPool::getReserveDataCall { reserve };
                let data = self.client.call_typed(self.contracts.lending_pool, &call, None).await?;
                Ok(u256_to_decimal(data.liquidityRate, RAY_DECIMALS))
            },
        }
    }

    /// The holder's token balance, in the token's smallest unit
    pub async fn token_balance(
        &self,
        asset: &Asset,
        holder: Address,
        block: Option<u64>,
    ) -> Result<U256, LedgerError> {
        let call = IERC20::balanceOfCall { owner: holder };
        Ok(self.client.call_typed(asset.address, &call, block).await?)
    }

    /// The holder's AAVE principal, in the token's smallest unit
    pub async fn principal_balance(
        &self,
        asset: &Asset,
        holder: Address,
        block: Option<u64>,
    ) -> Result<U256, LedgerError> {
        let call = IAToken::principalBalanceOfCall { user: holder };
        Ok(self.client.call_typed(asset.address, &call, block).await?)
    }

    /// Convert a raw token amount into whole tokens
    pub fn to_tokens(asset: &Asset, amount: U256) -> BigDecimal {
        u256_to_decimal(amount, i64::from(asset.decimals))
    }

    /// Convert whole units of underlying into raw tokens at a rate
    pub fn underlying_to_raw_tokens(
        asset: &Asset,
        underlying: &BigDecimal,
        rate: &BigDecimal,
    ) -> Result<BigDecimal, LedgerError> {
        if rate.is_zero() {
            return Err(LedgerError::ZeroRate(asset.address));
        }
        Ok(underlying * pow10(i64::from(asset.decimals)) / rate)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy_primitives::Bytes;
    use alloy_sol_types::SolCall;

    use super::*;
    use crate::{
        chain_client::mock::MockChainClient,
        registry::{
            mainnet::{self, CDAI, CHAI, ISAI, LENDING_POOL_ADDRESS, MAINNET_CHAIN_ID, POT_ADDRESS},
            Registry,
        },
    };

    /// Encode a uint256 return value
    fn word(value: U256) -> Bytes {
        Bytes::from(value.to_be_bytes::<32>().to_vec())
    }

    /// A reader whose calls are answered by selector
    fn reader(answer: impl Fn([u8; 4]) -> U256 + Send + Sync + 'static) -> RateReader {
        let mock = MockChainClient::new();
        mock.set_call_handler(move |req, _| {
            let selector: [u8; 4] = req.data[..4].try_into().unwrap();
            Ok(word(answer(selector)))
        });
        RateReader::new(
            DynChainClient::new(mock),
            PlatformContracts { pot: POT_ADDRESS, lending_pool: LENDING_POOL_ADDRESS },
        )
    }

    /// Each platform's raw rate is scaled into underlying per whole token
    #[tokio::test]
    async fn test_exchange_rates() {
        let registry = Registry::builtin().unwrap();
        let reader = reader(|selector| match selector {
            // 0.0205 DAI per cDAI, scaled by 1e28
            ICToken::exchangeRateCurrentCall::SELECTOR => {
                U256::from(205_000_000_000_000_000_000_000_000u128)
            },
            IIToken::tokenPriceCall::SELECTOR => U256::from(1_050_000_000_000_000_000u128),
            IPot::chiCall::SELECTOR => U256::from(1_020_000_000_000_000_000_000_000_000u128),
            _ => U256::ZERO,
        });

        let cases = [(CDAI, "0.0205"), (ISAI, "1.05"), (CHAI, "1.02"), (mainnet::ADAI, "1")];
        for (address, expected) in cases {
            let asset = registry.asset(MAINNET_CHAIN_ID, address).unwrap();
            let rate = reader.exchange_rate(asset, None).await.unwrap();
            assert_eq!(rate, BigDecimal::from_str(expected).unwrap());
        }
    }

    /// Each platform's supply rate annualizes into a plain fraction
    #[tokio::test]
    async fn test_aprs() {
        let registry = Registry::builtin().unwrap();
        let reader = reader(|selector| match selector {
            // 1e10 per block
            ICToken::supplyRatePerBlockCall::SELECTOR => U256::from(10_000_000_000u64),
            // 5%
            IIToken::supplyInterestRateCall::SELECTOR => U256::from(5_000_000_000_000_000_000u128),
            // 1 + 1e-9 per second
            IPot::dsrCall::SELECTOR => U256::from(1_000_000_001_000_000_000_000_000_000u128),
            _ => U256::ZERO,
        });

        let cases = [(CDAI, "0.021024"), (ISAI, "0.05"), (CHAI, "0.031536")];
        for (address, expected) in cases {
            let asset = registry.asset(MAINNET_CHAIN_ID, address).unwrap();
            let apr = reader.apr(asset).await.unwrap();
            assert_eq!(apr, BigDecimal::from_str(expected).unwrap());
        }
    }

    /// Underlying amounts convert back to raw tokens through the rate
    #[test]
    fn test_underlying_to_raw_tokens() {
        let registry = Registry::builtin().unwrap();
        let cdai = registry.asset(MAINNET_CHAIN_ID, CDAI).unwrap();
        let rate = BigDecimal::from_str("0.02").unwrap();

        let one = BigDecimal::from(1);
        let raw = RateReader::underlying_to_raw_tokens(cdai, &one, &rate).unwrap();
        // 1 DAI buys 50 cDAI, 8 decimals
        assert_eq!(raw, BigDecimal::from(5_000_000_000u64));

        let zero = BigDecimal::from(0);
        let err = RateReader::underlying_to_raw_tokens(cdai, &one, &zero);
        assert!(matches!(err, Err(LedgerError::ZeroRate(addr)) if addr == CDAI));
    }
}
