//! Deposits of ETH through a quoted gateway route

use alloy_primitives::{Address, Bytes, U256};
use tracing::{info, instrument};

use super::{
    error::SwapError,
    tx_store::{TxContext, TxKind},
    SwapExecutor,
};
use crate::{abis::gateway_calldata, chain_client::CallRequest};

/// A request to deposit through a route
#[derive(Clone, Debug)]
pub struct SwapRequest {
    /// The session the route was quoted under
    pub session_id: Option<String>,
    /// The target asset
    pub asset: Address,
    /// The amount of ETH to deposit, in wei
    pub amount: U256,
    /// The 1-based route index returned by the quote
    pub route_index: Option<usize>,
    /// The referral beneficiary, if any
    pub referral: Option<Address>,
}

impl SwapExecutor {
    /// Deposit through the route at the requested index
    ///
    /// The index must address a current route for the asset and referral
    /// presence, and must match the session's quote when one is stored.
    /// Exactly one transaction is broadcast
    #[instrument(skip_all, fields(asset = %request.asset, amount = %request.amount))]
    pub async fn execute(&self, request: SwapRequest) -> Result<TxContext, SwapError> {
        let sender = self.sender()?;
        self.registry.asset_or_err(self.chain_id, request.asset)?;

        let index =
            request.route_index.ok_or_else(|| SwapError::invalid_route("missing route index"))?;
        let is_referral = request.referral.is_some();
        let route =
            self.registry.route(self.chain_id, request.asset, is_referral, index).ok_or_else(
                || SwapError::invalid_route(format!("no route {index} for {:#x}", request.asset)),
            )?;
        if let Some(session) = &request.session_id {
            self.check_session(session, &request)?;
        }

        self.check_deposit(sender, request.amount).await?.result?;
        let gas_price = self.gas.current().await?;

        // Plain gateways deposit through their fallback on a bare transfer
        let data = match request.referral {
            Some(referral) => gateway_calldata(route.method.name, sender, Some(referral)),
            None => Bytes::new(),
        };
        let call = CallRequest {
            from: Some(sender),
            to: route.gateway.address,
            value: request.amount,
            data,
            gas_limit: Some(route.gas_limit()),
            gas_price: Some(gas_price),
        };

        info!(
            "depositing through route {index} ({:#x}.{})",
            route.gateway.address, route.method.name
        );
        let kind = TxKind::Deposit { asset: request.asset, route_index: index };
        Ok(self.submit(kind, call).await)
    }

    /// Check a request against the quote stored for its session
    fn check_session(&self, session: &str, request: &SwapRequest) -> Result<(), SwapError> {
        let Some(stored) = self.board.current(session) else {
            return Ok(());
        };

        if stored.stale {
            return Err(SwapError::invalid_route("quote is stale, request a new quote"));
        }
        let input = &stored.input;
        let same_deposit = input.asset == request.asset
            && input.amount == request.amount
            && input.referral.is_some() == request.referral.is_some();
        if !same_deposit {
            return Err(SwapError::invalid_route("quote was computed for a different deposit"));
        }
        if request.route_index != Some(stored.quote.route_index) {
            return Err(SwapError::invalid_route(format!(
                "route {} was not the quoted route",
                request.route_index.unwrap_or_default()
            )));
        }
        Ok(())
    }
}
