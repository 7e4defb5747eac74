//! Serialization helpers for the lending gateway API

/// A module for serializing and deserializing addresses as strings
pub(crate) mod address_string_serialization {
    use std::str::FromStr;

    use alloy_primitives::Address;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an address to a string
    pub fn serialize<S: Serializer>(address: &Address, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("{address:#x}"))
    }

    /// Deserialize a string to an address
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
        let s = String::deserialize(d)?;
        Address::from_str(&s).map_err(|_| D::Error::custom("Invalid address"))
    }
}

/// A module for serializing and deserializing U256 as decimal strings
pub(crate) mod u256_string_serialization {
    use std::str::FromStr;

    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize a U256 to a string
    pub fn serialize<S: Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    /// Deserialize a string to a U256
    ///
    /// Accepts both decimal and `0x`-prefixed hex strings
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
        let s = String::deserialize(d)?;
        U256::from_str(&s).map_err(|_| D::Error::custom("Invalid U256 value"))
    }
}

/// A module for serializing and deserializing optional decimals as strings
pub(crate) mod option_decimal_string_serialization {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    /// Serialize an optional decimal to a string or null
    pub fn serialize<S: Serializer>(value: &Option<BigDecimal>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&v.normalized().to_string()),
            None => s.serialize_none(),
        }
    }

    /// Deserialize a string or null to an optional decimal
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BigDecimal>, D::Error> {
        let s = Option::<String>::deserialize(d)?;
        s.map(|s| BigDecimal::from_str(&s).map_err(|_| D::Error::custom("Invalid decimal value")))
            .transpose()
    }
}
