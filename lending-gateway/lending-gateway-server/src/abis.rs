//! Solidity interfaces of the lending platforms and gateways
#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolEvent, SolValue};

use crate::chain_client::{error::ChainClientError, RawLog};

sol! {
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address owner) external view returns (uint256);
    }

    interface ICToken {
        function exchangeRateCurrent() external returns (uint256);
        function supplyRatePerBlock() external view returns (uint256);
        function redeem(uint256 redeemTokens) external returns (uint256);
    }

    interface IIToken {
        function tokenPrice() external view returns (uint256);
        function supplyInterestRate() external view returns (uint256);
        function burn(address receiver, uint256 burnAmount) external returns (uint256);
    }

    interface IChai {
        function exit(address src, uint256 wad) external;
    }

    interface IPot {
        function chi() external view returns (uint256);
        function dsr() external view returns (uint256);
    }

    interface IAToken {
        function principalBalanceOf(address user) external view returns (uint256);
        function redeem(uint256 amount) external;
    }

    interface ILendingPool {
        function getReserveData(address reserve) external view returns (
            uint256 totalLiquidity,
            uint256 availableLiquidity,
            uint256 totalBorrowsStable,
            uint256 totalBorrowsVariable,
            uint256 liquidityRate,
            uint256 variableBorrowRate,
            uint256 stableBorrowRate,
            uint256 averageStableBorrowRate,
            uint256 utilizationRate,
            uint256 liquidityIndex,
            uint256 variableBorrowIndex,
            address aTokenAddress,
            uint40 lastUpdateTimestamp
        );
    }
}

// ------------
// | Gateways |
// ------------

/// Build the calldata for a gateway deposit method
///
/// Gateway methods are only known by name, so the selector is derived from
/// the signature: `name(address)` for plain routes and
/// `name(address,address)` for referral routes
pub fn gateway_calldata(method: &str, recipient: Address, referral: Option<Address>) -> Bytes {
    let (signature, params) = match referral {
        Some(referral) => {
            (format!("{method}(address,address)"), (recipient, referral).abi_encode_params())
        },
        None => (format!("{method}(address)"), (recipient,).abi_encode_params()),
    };

    let mut data = keccak256(signature.as_bytes())[..4].to_vec();
    data.extend(params);
    Bytes::from(data)
}

/// Decode the `uint256` returned by a gateway simulation
pub fn decode_gateway_output(output: &[u8]) -> Result<U256, ChainClientError> {
    Ok(U256::abi_decode(output)?)
}

// -------------
// | Transfers |
// -------------

/// The signature hash of the ERC20 `Transfer` event
pub fn transfer_signature() -> B256 {
    IERC20::Transfer::SIGNATURE_HASH
}

/// A decoded `Transfer` log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferLog {
    /// The block the transfer was emitted in
    pub block_number: u64,
    /// The sender
    pub from: Address,
    /// The recipient
    pub to: Address,
    /// The amount, in the token's smallest unit
    pub value: U256,
}

impl TryFrom<&RawLog> for TransferLog {
    type Error = ChainClientError;

    fn try_from(log: &RawLog) -> Result<Self, Self::Error> {
        if log.topics.len() < 3 || log.topics[0] != transfer_signature() {
            return Err(ChainClientError::decode("log is not a Transfer event"));
        }
        if log.data.len() < 32 {
            return Err(ChainClientError::decode("Transfer event data is truncated"));
        }

        Ok(Self {
            block_number: log.block_number,
            from: Address::from_word(log.topics[1]),
            to: Address::from_word(log.topics[2]),
            value: U256::from_be_slice(&log.data[..32]),
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, hex};

    use super::*;

    /// Plain routes encode a single padded address behind the selector
    #[test]
    fn test_gateway_calldata_plain() {
        let recipient = address!("00000000000000000000000000000000000000aa");
        let data = gateway_calldata("etherTocDai", recipient, None);

        let selector = &keccak256("etherTocDai(address)")[..4];
        assert_eq!(&data[..4], selector);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(Address::from_slice(&data[16..36]), recipient);
    }

    /// Referral routes encode the recipient then the referral
    #[test]
    fn test_gateway_calldata_referral() {
        let recipient = Address::repeat_byte(0x11);
        let referral = Address::repeat_byte(0x22);
        let data = gateway_calldata("etherTocDai2", recipient, Some(referral));

        assert_eq!(&data[..4], &keccak256("etherTocDai2(address,address)")[..4]);
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(Address::from_slice(&data[16..36]), recipient);
        assert_eq!(Address::from_slice(&data[48..68]), referral);
    }

    /// A Transfer log decodes its indexed parties and value
    #[test]
    fn test_transfer_decoding() {
        let log = RawLog {
            block_number: 7,
            log_index: 0,
            topics: vec![
                transfer_signature(),
                Address::repeat_byte(1).into_word(),
                Address::repeat_byte(2).into_word(),
            ],
            data: Bytes::from(U256::from(500u64).to_be_bytes::<32>().to_vec()),
        };

        let transfer = TransferLog::try_from(&log).unwrap();
        assert_eq!(transfer.from, Address::repeat_byte(1));
        assert_eq!(transfer.to, Address::repeat_byte(2));
        assert_eq!(transfer.value, U256::from(500u64));

        let truncated = RawLog { data: Bytes::from(hex!("01").to_vec()), ..log };
        assert!(TransferLog::try_from(&truncated).is_err());
    }
}
