//! Route handlers for the lending gateway
//!
//! Expected failures, such as an unavailable quote or a holder without
//! history, are reported as `null` values; caller mistakes are rejected with
//! an `ApiError`

// warp hands extracted path and query params to handlers by value
#![allow(clippy::needless_pass_by_value)]

use std::{collections::HashMap, str::FromStr};

use alloy_primitives::Address;

use crate::error::ApiError;

pub mod earnings;
pub mod quote;
pub mod swap;

/// The "referral" query param
pub const REFERRAL_QUERY_PARAM: &str = "referral";

/// Parse an address path segment
pub(crate) fn parse_address(segment: &str) -> Result<Address, ApiError> {
    Address::from_str(segment)
        .map_err(|e| ApiError::bad_request(format!("invalid address {segment}: {e}")))
}

/// Parse an optional boolean query param, defaulting to `false`
pub(crate) fn parse_bool_param(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<bool, ApiError> {
    match params.get(name) {
        Some(value) => bool::from_str(value)
            .map_err(|_| ApiError::bad_request(format!("invalid '{name}' query parameter"))),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Malformed path segments and params are bad requests
    #[test]
    fn test_parse_params() {
        assert!(matches!(parse_address("0x12"), Err(ApiError::BadRequest(_))));
        assert_eq!(parse_address(&format!("{:#x}", Address::ZERO)).unwrap(), Address::ZERO);

        let mut params = HashMap::new();
        assert!(!parse_bool_param(&params, REFERRAL_QUERY_PARAM).unwrap());
        params.insert(REFERRAL_QUERY_PARAM.to_string(), "true".to_string());
        assert!(parse_bool_param(&params, REFERRAL_QUERY_PARAM).unwrap());
        params.insert(REFERRAL_QUERY_PARAM.to_string(), "yes".to_string());
        assert!(parse_bool_param(&params, REFERRAL_QUERY_PARAM).is_err());
    }
}
