//! Numeric helpers bridging on-chain integers and exact decimals

use alloy_primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};

/// The decimals of ETH
pub const ETH_DECIMALS: i64 = 18;

/// Interpret an integer as a fixed-point decimal with `scale` fractional
/// digits
pub fn u256_to_decimal(value: U256, scale: i64) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>());
    BigDecimal::new(digits, scale)
}

/// Convert a decimal into an integer with `scale` fractional digits,
/// truncating any further precision. Returns `None` for negative values or
/// values that overflow a `U256`
pub fn decimal_to_u256(value: &BigDecimal, scale: i64) -> Option<U256> {
    let (digits, _) = value.with_scale(scale).into_bigint_and_exponent();
    let (sign, bytes) = digits.to_bytes_be();
    if sign == Sign::Minus {
        return None;
    }

    U256::try_from_be_slice(&bytes)
}

/// Ten raised to a power, as a decimal
pub fn pow10(exp: i64) -> BigDecimal {
    BigDecimal::new(BigInt::from(1), -exp)
}
