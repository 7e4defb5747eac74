//! Withdrawals from lending positions back to the underlying asset

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use bigdecimal::BigDecimal;
use tracing::{info, instrument};

use super::{
    error::{SwapError, ValidationError},
    tx_store::{TxContext, TxKind},
    SwapExecutor,
};
use crate::{
    abis::{IAToken, IChai, ICToken, IIToken},
    chain_client::CallRequest,
    helpers::{decimal_to_u256, pow10},
    registry::assets::{Asset, Platform},
    yield_accounting::rates::RateReader,
};

/// Remainders below 10^-DUST_DECIMALS whole tokens are swept into the
/// withdrawal
///
/// The threshold is in whole tokens, not raw units: requested amounts are
/// truncated to raw units, so a raw-unit threshold below one would never
/// leave a remainder to sweep
const DUST_DECIMALS: i64 = 3;

impl SwapExecutor {
    /// Withdraw `amount` whole units of underlying from a position, or the
    /// whole position when no amount is given
    #[instrument(skip_all, fields(asset = %asset))]
    pub async fn withdraw(
        &self,
        asset: Address,
        amount: Option<BigDecimal>,
    ) -> Result<TxContext, SwapError> {
        let sender = self.sender()?;
        let asset = self.registry.asset_or_err(self.chain_id, asset)?;

        let balance = self.reader.token_balance(asset, sender, None).await?;
        let requested = match amount {
            Some(underlying) => {
                let rate = self.reader.exchange_rate(asset, None).await?;
                Some(RateReader::underlying_to_raw_tokens(asset, &underlying, &rate)?)
            },
            None => None,
        };
        let tokens = withdraw_amount(asset, balance, requested.as_ref())?;
        let gas_price = self.gas.current().await?;

        let call = CallRequest {
            from: Some(sender),
            to: asset.address,
            value: U256::ZERO,
            data: withdraw_calldata(asset.platform, sender, tokens),
            gas_limit: Some(asset.platform.withdraw_gas_limit()),
            gas_price: Some(gas_price),
        };

        let (platform, method) = (asset.platform.name(), asset.platform.withdraw_method());
        info!("withdrawing {tokens} {} from {platform} via {method}", asset.symbol);
        Ok(self.submit(TxKind::Withdraw { asset: asset.address }, call).await)
    }
}

/// The raw token amount to withdraw
///
/// `requested` is in raw token units and is truncated. The full balance is
/// withdrawn when nothing is requested or when the remainder would be dust
pub fn withdraw_amount(
    asset: &Asset,
    balance: U256,
    requested: Option<&BigDecimal>,
) -> Result<U256, ValidationError> {
    let Some(requested) = requested else {
        return if balance.is_zero() { Err(ValidationError::ZeroAmount) } else { Ok(balance) };
    };

    let tokens = decimal_to_u256(requested, 0).ok_or(ValidationError::ZeroAmount)?;
    if tokens.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    if tokens > balance {
        return Err(ValidationError::InsufficientBalance);
    }

    let dust = pow10(i64::from(asset.decimals) - DUST_DECIMALS);
    let dust = decimal_to_u256(&dust, 0).unwrap_or_default();
    if balance - tokens < dust {
        return Ok(balance);
    }
    Ok(tokens)
}

/// The calldata of the platform's withdrawal method
pub fn withdraw_calldata(platform: Platform, sender: Address, tokens: U256) -> Bytes {
    let data = match platform {
        Platform::Compound => ICToken::redeemCall { redeemTokens: tokens }.abi_encode(),
        Platform::Fulcrum => {
            IIToken::burnCall { receiver: sender, burnAmount: tokens }.abi_encode()
        },
        Platform::MakerDao => IChai::exitCall { src: sender, wad: tokens }.abi_encode(),
        Platform::Aave => IAToken::redeemCall { amount: tokens }.abi_encode(),
    };
    Bytes::from(data)
}
