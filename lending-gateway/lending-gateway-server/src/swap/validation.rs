//! Pre-flight checks on deposit amounts

use alloy_primitives::U256;

use super::error::ValidationError;

/// The ETH kept back for gas by externally owned accounts, 0.01 ETH
pub const GAS_RESERVE: U256 = U256::from_limbs([10_000_000_000_000_000, 0, 0, 0]);

/// Check a deposit of `amount` wei against the holder's balance
///
/// Contract wallets pay gas through a relayer and need no reserve
pub fn validate_deposit(
    balance: U256,
    amount: U256,
    is_contract_wallet: bool,
) -> Result<(), ValidationError> {
    if amount.is_zero() {
        return Err(ValidationError::ZeroAmount);
    }
    if balance < amount {
        return Err(ValidationError::InsufficientBalance);
    }
    if !is_contract_wallet && balance.saturating_sub(GAS_RESERVE) <= amount {
        return Err(ValidationError::InsufficientGas);
    }
    Ok(())
}

/// The largest deposit the holder can make
pub fn max_spendable(balance: U256, is_contract_wallet: bool) -> U256 {
    if is_contract_wallet {
        balance
    } else {
        balance.saturating_sub(GAS_RESERVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse an amount of milli-ETH into wei
    fn milli_eth(amount: u64) -> U256 {
        U256::from(amount) * U256::from(1_000_000_000_000_000u64)
    }

    /// A balance below the amount is reported as insufficient balance even
    /// though the gas reserve is also missing
    #[test]
    fn test_insufficient_balance() {
        let err = validate_deposit(milli_eth(5), milli_eth(10), false).unwrap_err();
        assert_eq!(err, ValidationError::InsufficientBalance);
    }

    /// Spending into the gas reserve is rejected for plain accounts only
    #[test]
    fn test_gas_reserve() {
        let balance = milli_eth(100);
        for amount in [milli_eth(95), milli_eth(90)] {
            let res = validate_deposit(balance, amount, false);
            assert_eq!(res, Err(ValidationError::InsufficientGas));
        }
        assert_eq!(validate_deposit(balance, milli_eth(89), false), Ok(()));
        assert_eq!(validate_deposit(balance, milli_eth(100), true), Ok(()));
    }

    /// Zero deposits are rejected first
    #[test]
    fn test_zero_amount() {
        let res = validate_deposit(U256::ZERO, U256::ZERO, false);
        assert_eq!(res, Err(ValidationError::ZeroAmount));
    }

    /// The spendable amount excludes the reserve and never underflows
    #[test]
    fn test_max_spendable() {
        assert_eq!(max_spendable(milli_eth(100), false), milli_eth(90));
        assert_eq!(max_spendable(milli_eth(5), false), U256::ZERO);
        assert_eq!(max_spendable(milli_eth(5), true), milli_eth(5));
    }
}
