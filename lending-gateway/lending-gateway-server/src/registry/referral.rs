//! The referral allow-list, mapping referral codes to beneficiary addresses

use std::{collections::HashMap, path::Path, str::FromStr};

use alloy_primitives::Address;

use super::error::RegistryError;

/// The allow-listed referrers
#[derive(Clone, Debug, Default)]
pub struct ReferralBook {
    /// Beneficiary addresses by referral code
    codes: HashMap<String, Address>,
}

impl ReferralBook {
    /// Create a book from code-address pairs
    pub fn new(codes: HashMap<String, Address>) -> Self {
        Self { codes }
    }

    /// Load a book from a JSON object of `{"code": "0x..."}` entries
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(RegistryError::referral_list)?;
        Self::from_json(&contents)
    }

    /// Parse a book from a JSON object of `{"code": "0x..."}` entries
    pub fn from_json(contents: &str) -> Result<Self, RegistryError> {
        let raw: HashMap<String, String> =
            serde_json::from_str(contents).map_err(RegistryError::referral_list)?;
        let codes = raw
            .into_iter()
            .map(|(code, addr)| {
                let addr = Address::from_str(&addr).map_err(|e| {
                    RegistryError::referral_list(format!("invalid address for {code}: {e}"))
                })?;
                Ok((code, addr))
            })
            .collect::<Result<_, RegistryError>>()?;

        Ok(Self { codes })
    }

    /// Resolve a referral code, or an allow-listed address, to its beneficiary
    pub fn resolve(&self, referral: &str) -> Result<Address, RegistryError> {
        if let Some(addr) = self.codes.get(referral) {
            return Ok(*addr);
        }

        match Address::from_str(referral) {
            Ok(addr) if self.codes.values().any(|a| *a == addr) => Ok(addr),
            _ => Err(RegistryError::UnknownReferral(referral.to_string())),
        }
    }

    /// The number of allow-listed referrers
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the allow-list is empty
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
