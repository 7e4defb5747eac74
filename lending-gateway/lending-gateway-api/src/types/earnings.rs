//! API types for yield accounting queries
use alloy_primitives::Address;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::serialization::{address_string_serialization, option_decimal_string_serialization};

// --------------
// | Api Routes |
// --------------

/// The route to fetch a holder's accrued interest, `/earned/<asset>/<holder>`
pub const EARNED_ROUTE: &str = "earned";
/// The route to fetch a holder's latest-period profit,
/// `/profit/<asset>/<holder>`
pub const PROFIT_ROUTE: &str = "profit";
/// The route to fetch an asset's supply APR, `/apr/<asset>`
pub const APR_ROUTE: &str = "apr";
/// The route to fetch an asset's current exchange rate,
/// `/exchange-rate/<asset>`
pub const EXCHANGE_RATE_ROUTE: &str = "exchange-rate";
/// The route to fetch a holder's balance in an asset,
/// `/balance/<asset>/<holder>`
pub const BALANCE_ROUTE: &str = "balance";
/// The route to fetch a holder's balance and earnings in every asset,
/// `/positions/<holder>`
pub const POSITIONS_ROUTE: &str = "positions";

// -------------
// | Api Types |
// -------------

/// A holder's accrued interest in an asset
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnedResponse {
    /// The yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The holder
    #[serde(with = "address_string_serialization")]
    pub holder: Address,
    /// The symbol of the underlying the amount is denominated in
    pub underlying: String,
    /// The accrued interest, `None` when there is no history or the sync
    /// failed
    #[serde(with = "option_decimal_string_serialization")]
    pub earned: Option<BigDecimal>,
    /// The block the ledger is synced to
    pub block_number: u64,
}

/// A holder's profit over the most recent accounting period
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitResponse {
    /// The yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The holder
    #[serde(with = "address_string_serialization")]
    pub holder: Address,
    /// The symbol of the underlying the amount is denominated in
    pub underlying: String,
    /// The profit, `None` when it cannot be computed
    #[serde(with = "option_decimal_string_serialization")]
    pub profit: Option<BigDecimal>,
    /// The block the ledger is synced to
    pub block_number: u64,
}

/// The supply APR of an asset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AprResponse {
    /// The yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The APR as a fraction, e.g. `0.05` for 5%
    #[serde(with = "option_decimal_string_serialization")]
    pub apr: Option<BigDecimal>,
}

/// The current exchange rate of an asset
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateResponse {
    /// The yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// Whole units of underlying per whole unit of the asset
    #[serde(with = "option_decimal_string_serialization")]
    pub exchange_rate: Option<BigDecimal>,
}

/// A holder's balance in an asset
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// The yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The holder
    #[serde(with = "address_string_serialization")]
    pub holder: Address,
    /// The symbol of the underlying the value is denominated in
    pub underlying: String,
    /// The balance in whole units of the asset, `None` when unreadable
    #[serde(with = "option_decimal_string_serialization")]
    pub balance: Option<BigDecimal>,
    /// The balance valued in whole units of underlying at the current
    /// exchange rate
    #[serde(with = "option_decimal_string_serialization")]
    pub underlying_value: Option<BigDecimal>,
    /// The block the balance was read at
    pub block_number: u64,
}

/// A holder's position in one asset
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionInfo {
    /// The yield-bearing asset
    #[serde(with = "address_string_serialization")]
    pub asset: Address,
    /// The asset's symbol
    pub symbol: String,
    /// The lending platform's display name
    pub platform: String,
    /// The symbol of the underlying the amounts are denominated in
    pub underlying: String,
    /// The balance in whole units of the asset
    #[serde(with = "option_decimal_string_serialization")]
    pub balance: Option<BigDecimal>,
    /// The balance valued in whole units of underlying
    #[serde(with = "option_decimal_string_serialization")]
    pub underlying_value: Option<BigDecimal>,
    /// The accrued interest
    #[serde(with = "option_decimal_string_serialization")]
    pub earned: Option<BigDecimal>,
}

/// A holder's positions across every registered asset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionsResponse {
    /// The holder
    #[serde(with = "address_string_serialization")]
    pub holder: Address,
    /// One entry per asset, ordered by symbol
    pub positions: Vec<PositionInfo>,
}
