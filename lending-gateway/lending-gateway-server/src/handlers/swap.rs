//! Handlers for deposits, withdrawals and transaction status

use std::{str::FromStr, sync::Arc};

use lending_gateway_api::{
    ExecuteSwapRequest, TxStatusResponse, ValidateDepositRequest, ValidateDepositResponse,
    WithdrawRequest,
};
use tracing::instrument;
use uuid::Uuid;
use warp::reply::Json;

use crate::{error::ApiError, server::Server, swap::deposit::SwapRequest};

/// Handler for validating a deposit against the holder's balance
#[instrument(skip_all)]
pub async fn validate_deposit_handler(
    req: ValidateDepositRequest,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let check =
        server.executor.check_deposit(req.holder, req.amount).await.map_err(ApiError::from)?;
    let resp = ValidateDepositResponse {
        valid: check.result.is_ok(),
        error: check.result.err().map(|e| e.to_string()),
        max_spendable: check.max_spendable,
    };
    Ok(warp::reply::json(&resp))
}

/// Handler for executing a quoted route
#[instrument(skip_all)]
pub async fn execute_swap_handler(
    req: ExecuteSwapRequest,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let referral = server.resolve_referral(req.referral.as_deref()).map_err(ApiError::from)?;
    let request = SwapRequest {
        session_id: req.session_id,
        asset: req.asset,
        amount: req.amount,
        route_index: req.route_index,
        referral,
    };

    let tx = server.executor.execute(request).await.map_err(ApiError::from)?;
    Ok(warp::reply::json(&TxStatusResponse { id: tx.id, status: tx.status }))
}

/// Handler for withdrawing from a position
#[instrument(skip_all)]
pub async fn withdraw_handler(
    req: WithdrawRequest,
    server: Arc<Server>,
) -> Result<Json, warp::Rejection> {
    let tx = server.executor.withdraw(req.asset, req.amount).await.map_err(ApiError::from)?;
    Ok(warp::reply::json(&TxStatusResponse { id: tx.id, status: tx.status }))
}

/// Handler for fetching the status of a submitted transaction
#[instrument(skip_all)]
pub async fn tx_status_handler(id: String, server: Arc<Server>) -> Result<Json, warp::Rejection> {
    let id = Uuid::from_str(&id)
        .map_err(|e| ApiError::bad_request(format!("invalid transaction id: {e}")))?;
    let tx = server.executor.tx_status(id).map_err(ApiError::from)?;
    Ok(warp::reply::json(&TxStatusResponse { id: tx.id, status: tx.status }))
}
