//! Handlers for quoting routes

use std::{collections::HashMap, sync::Arc};

use lending_gateway_api::QuoteRequest;
use tracing::instrument;
use warp::reply::Json;

use super::{parse_address, parse_bool_param, REFERRAL_QUERY_PARAM};
use crate::{error::ApiError, server::Server};

/// Handler for quoting a deposit
#[instrument(skip_all)]
pub async fn quote_handler(
    req: QuoteRequest,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let resp = server.quote(req).await.map_err(ApiError::from)?;
    Ok(warp::reply::json(&resp))
}

/// Handler for listing the routes of an asset
#[instrument(skip_all)]
pub async fn gateways_handler(
    asset: String,
    query_params: HashMap<String, String>,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let asset = parse_address(&asset)?;
    let is_referral = parse_bool_param(&query_params, REFERRAL_QUERY_PARAM)?;
    let resp = server.routes(asset, is_referral).map_err(ApiError::from)?;
    Ok(warp::reply::json(&resp))
}
