//! Handlers for yield accounting queries

use std::sync::Arc;

use alloy_primitives::Address;
use lending_gateway_api::{
    AprResponse, BalanceResponse, EarnedResponse, ExchangeRateResponse, PositionInfo,
    PositionsResponse, ProfitResponse,
};
use tracing::instrument;
use warp::reply::Json;

use super::parse_address;
use crate::{error::ApiError, server::Server};

/// Handler for a holder's accrued interest
#[instrument(skip_all)]
pub async fn earned_handler(
    asset: String,
    holder: String,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let (asset, holder) = (parse_address(&asset)?, parse_address(&holder)?);
    let underlying = underlying_symbol(&server, asset)?;
    let earnings = server.yield_engine.earned(holder, asset).await.map_err(ApiError::from)?;

    Ok(warp::reply::json(&EarnedResponse {
        asset,
        holder,
        underlying,
        earned: earnings.value,
        block_number: earnings.block_number,
    }))
}

/// Handler for a holder's profit over the latest period
#[instrument(skip_all)]
pub async fn profit_handler(
    asset: String,
    holder: String,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let (asset, holder) = (parse_address(&asset)?, parse_address(&holder)?);
    let underlying = underlying_symbol(&server, asset)?;
    let profit = server.yield_engine.profit(holder, asset).await.map_err(ApiError::from)?;

    Ok(warp::reply::json(&ProfitResponse {
        asset,
        holder,
        underlying,
        profit: profit.value,
        block_number: profit.block_number,
    }))
}

/// Handler for an asset's supply APR
#[instrument(skip_all)]
pub async fn apr_handler(asset: String, server: Arc<Server>) -> Result<Json, warp::Rejection> {
    let asset = parse_address(&asset)?;
    let apr = server.yield_engine.apr(asset).await.map_err(ApiError::from)?;
    Ok(warp::reply::json(&AprResponse { asset, apr }))
}

/// Handler for an asset's current exchange rate
#[instrument(skip_all)]
pub async fn exchange_rate_handler(
    asset: String,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let asset = parse_address(&asset)?;
    let exchange_rate = server.yield_engine.exchange_rate(asset).await.map_err(ApiError::from)?;
    Ok(warp::reply::json(&ExchangeRateResponse { asset, exchange_rate }))
}

/// Handler for a holder's balance in an asset
#[instrument(skip_all)]
pub async fn balance_handler(
    asset: String,
    holder: String,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let (asset, holder) = (parse_address(&asset)?, parse_address(&holder)?);
    let underlying = underlying_symbol(&server, asset)?;
    let balance = server.yield_engine.balance(holder, asset).await.map_err(ApiError::from)?;

    Ok(warp::reply::json(&BalanceResponse {
        asset,
        holder,
        underlying,
        balance: balance.tokens,
        underlying_value: balance.underlying_value,
        block_number: balance.block_number,
    }))
}

/// Handler for a holder's positions across every asset
#[instrument(skip_all)]
pub async fn positions_handler(
    holder: String,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let holder = parse_address(&holder)?;
    let positions = server.yield_engine.positions(holder).await.map_err(ApiError::from)?;

    let mut infos = Vec::with_capacity(positions.len());
    for position in positions {
        let asset = server
            .registry
            .asset_or_err(server.chain_id, position.asset)
            .map_err(ApiError::from)?;
        infos.push(PositionInfo {
            asset: asset.address,
            symbol: asset.symbol.to_string(),
            platform: asset.platform.name().to_string(),
            underlying: asset.underlying_symbol.to_string(),
            balance: position.balance.tokens,
            underlying_value: position.balance.underlying_value,
            earned: position.earnings.value,
        });
    }
    Ok(warp::reply::json(&PositionsResponse { holder, positions: infos }))
}

/// The underlying symbol of an asset
fn underlying_symbol(server: &Server, asset: Address) -> Result<String, ApiError> {
    let asset = server.registry.asset_or_err(server.chain_id, asset)?;
    Ok(asset.underlying_symbol.to_string())
}
