//! Middleware for the lending gateway server

use std::{convert::Infallible, sync::Arc};

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::info_span;
use warp::Filter;

use crate::{error::ApiError, server::Server};

/// Extract a JSON body from a request
#[allow(clippy::needless_pass_by_value)]
pub fn with_json_body<T: DeserializeOwned + Send>(body: Bytes) -> Result<T, warp::Rejection> {
    serde_json::from_slice(&body)
        .map_err(|e| warp::reject::custom(ApiError::BadRequest(format!("Invalid JSON: {e}"))))
}

/// Identity map for a handler's middleware, used to chain together `map`s and
/// `and_then`s
pub async fn identity<T>(res: T) -> T {
    res
}

/// Helper function to clone and pass the server to filters
pub fn with_server(
    server: Arc<Server>,
) -> impl Filter<Extract = (Arc<Server>,), Error = Infallible> + Clone {
    warp::any().map(move || server.clone())
}

/// Custom tracing filter that creates spans for requests at info level
/// with the lending_gateway_server::request target
pub fn with_tracing() -> warp::trace::Trace<impl Fn(warp::trace::Info) -> tracing::Span + Clone> {
    warp::trace(|info| {
        info_span!(
            target: "lending_gateway_server::request",
            "handle_request",
            method = %info.method(),
            path = %info.path(),
        )
    })
}
