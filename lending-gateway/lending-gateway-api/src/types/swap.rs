//! API types for executing deposits and withdrawals
use alloy_primitives::{Address, TxHash, U256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::serialization::{
    address_string_serialization, option_decimal_string_serialization, u256_string_serialization,
};

// --------------
// | Api Routes |
// --------------

/// The route to validate a deposit amount against a holder's balance
pub const VALIDATE_DEPOSIT_ROUTE: &str = "validate-deposit";
/// The route to execute a previously quoted route
pub const EXECUTE_SWAP_ROUTE: &str = "execute";
/// The route to withdraw from a yield-bearing asset
pub const WITHDRAW_ROUTE: &str = "withdraw";
/// The route to fetch the status of a submitted transaction
pub const TX_STATUS_ROUTE: &str = "tx";

// -------------
// | Api Types |
// -------------

/// The request body for validating a deposit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidateDepositRequest {
    /// The depositing account
    #[serde(with = "address_string_serialization")]
    pub holder: Address,
    /// The amount of ETH to deposit, in wei
    #[serde(with = "u256_string_serialization")]
    pub amount: U256,
}

/// The result of validating a deposit
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDepositResponse {
    /// Whether the deposit may proceed
    pub valid: bool,
    /// The validation failure, if any
    pub error: Option<String>,
    /// The largest amount the holder may deposit, in wei
    #[serde(with = "u256_string_serialization")]
    pub max_spendable: U256,
}

/// The request body for executing a quoted route
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteSwapRequest {
    /// The session the route was quoted under
    #[serde(default)]
    pub session_id: Option<String>,
    /// The address of the target yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The amount of ETH to deposit, in wei
    #[serde(with = "u256_string_serialization")]
    pub amount: U256,
    /// The 1-based route index returned by the quote
    #[serde(default)]
    pub route_index: Option<usize>,
    /// A referral code or beneficiary address
    #[serde(default)]
    pub referral: Option<String>,
}

/// The request body for withdrawing from a yield-bearing asset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// The address of the yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The amount of underlying to withdraw, in whole units; withdraws the
    /// full balance when omitted
    #[serde(default, with = "option_decimal_string_serialization")]
    pub amount: Option<BigDecimal>,
}

/// The lifecycle of a submitted transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum TxStatus {
    /// The transaction has been accepted but not yet broadcast
    Idle,
    /// The transaction has been broadcast
    #[serde(rename_all = "camelCase")]
    Pending {
        /// The hash of the broadcast transaction
        tx_hash: TxHash,
    },
    /// The transaction was mined successfully
    #[serde(rename_all = "camelCase")]
    Confirmed {
        /// The hash of the mined transaction
        tx_hash: TxHash,
        /// The block the transaction was mined in
        block_number: Option<u64>,
    },
    /// The transaction was rejected or reverted
    #[serde(rename_all = "camelCase")]
    Failed {
        /// The hash of the transaction, if it was broadcast
        tx_hash: Option<TxHash>,
        /// The node or contract error message
        reason: String,
    },
}

impl TxStatus {
    /// Whether the status is terminal
    pub fn is_final(&self) -> bool {
        matches!(self, TxStatus::Confirmed { .. } | TxStatus::Failed { .. })
    }
}

/// The status of a tracked transaction
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxStatusResponse {
    /// The identifier of the tracked transaction
    pub id: Uuid,
    /// The current status
    pub status: TxStatus,
}
