//! Error types for the HTTP API

use std::{error::Error, fmt::Display};

use serde_json::json;
use tracing::error;
use warp::{
    http::StatusCode,
    reject::Reject,
    reply::{Json, WithStatus},
    Rejection,
};

use crate::{
    quote::error::QuoteError,
    registry::error::RegistryError,
    swap::error::{SwapError, ValidationError},
    yield_accounting::error::LedgerError,
};

/// API-specific error type
#[derive(Debug)]
pub enum ApiError {
    /// The request was malformed or failed validation
    BadRequest(String),
    /// The requested resource does not exist
    NotFound(String),
    /// Internal server error
    InternalError(String),
}

#[allow(clippy::needless_pass_by_value)]
impl ApiError {
    /// Create a bad request error
    pub fn bad_request<T: ToString>(msg: T) -> Self {
        Self::BadRequest(msg.to_string())
    }

    /// Create an internal error
    pub fn internal<T: ToString>(msg: T) -> Self {
        Self::InternalError(msg.to_string())
    }
}

impl Reject for ApiError {}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(e) => write!(f, "Bad request: {e}"),
            ApiError::NotFound(e) => write!(f, "Not found: {e}"),
            ApiError::InternalError(e) => write!(f, "Internal error: {e}"),
        }
    }
}

impl Error for ApiError {}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownAsset(_)
            | RegistryError::UnknownReferral(_)
            | RegistryError::UnsupportedChain(_) => ApiError::bad_request(e),
            _ => ApiError::internal(e),
        }
    }
}

impl From<QuoteError> for ApiError {
    fn from(e: QuoteError) -> Self {
        match e {
            QuoteError::Registry(e) => e.into(),
            QuoteError::Valuation(e) => e.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Registry(e) => e.into(),
            e => ApiError::internal(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::bad_request(e)
    }
}

impl From<SwapError> for ApiError {
    fn from(e: SwapError) -> Self {
        match e {
            SwapError::InvalidRoute(_) => ApiError::bad_request(e),
            SwapError::Validation(e) => e.into(),
            SwapError::Registry(e) => e.into(),
            SwapError::UnknownTx(_) => ApiError::NotFound(e.to_string()),
            e => ApiError::internal(e),
        }
    }
}

// ------------------
// | Error Handling |
// ------------------

/// Handle rejections and convert `ApiError`s to JSON responses
pub async fn handle_rejection(err: Rejection) -> Result<WithStatus<Json>, Rejection> {
    if let Some(api_error) = err.find::<ApiError>() {
        let (code, message) = match api_error {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        error!("API Error: {api_error}");
        Ok(json_error(message, code))
    } else if err.is_not_found() {
        Ok(json_error("route not found", StatusCode::NOT_FOUND))
    } else {
        error!("Unhandled rejection: {err:?}");
        Err(err)
    }
}

/// Return a json error from a string message
fn json_error(msg: &str, code: StatusCode) -> WithStatus<Json> {
    let json = json!({ "error": msg });
    warp::reply::with_status(warp::reply::json(&json), code)
}
