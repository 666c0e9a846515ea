// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Decimals of the native staking asset (1 coin = 10^8 octas).
pub const NATIVE_DECIMALS: u8 = 8;

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Short identifier used in configuration (`mainnet`, `testnet`)
    pub key: &'static str,
    /// Full node REST endpoint (view functions)
    pub node_url: &'static str,
    /// Indexer GraphQL endpoint
    pub indexer_url: &'static str,
}

/// Mainnet configuration.
pub const APTOS_MAINNET: NetworkConfig = NetworkConfig {
    name: "Aptos Mainnet",
    key: "mainnet",
    node_url: "https://api.mainnet.aptoslabs.com/v1",
    indexer_url: "https://api.mainnet.aptoslabs.com/v1/graphql",
};

/// Testnet configuration.
pub const APTOS_TESTNET: NetworkConfig = NetworkConfig {
    name: "Aptos Testnet",
    key: "testnet",
    node_url: "https://api.testnet.aptoslabs.com/v1",
    indexer_url: "https://api.testnet.aptoslabs.com/v1/graphql",
};

/// Resolve a network by its configuration key.
pub fn network_by_key(raw: &str) -> Option<NetworkConfig> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mainnet" => Some(APTOS_MAINNET),
        "testnet" => Some(APTOS_TESTNET),
        _ => None,
    }
}

// =============================================================================
// Account Address
// =============================================================================

/// A 32-byte account identifier in its canonical long form.
///
/// Accepts `0x`-prefixed hex of 1 to 64 digits (short forms such as `0x1` are
/// left-padded) and stores it lowercased and zero-padded to 64 digits, so the
/// same account always compares and hashes equal regardless of how the
/// indexer or the caller spelled it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),

    #[error("address must have 1 to 64 hex digits: {0}")]
    InvalidLength(String),

    #[error("address contains non-hex characters: {0}")]
    InvalidHex(String),
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(raw.to_string()))?;

        if digits.is_empty() || digits.len() > 64 {
            return Err(AddressError::InvalidLength(raw.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex(raw.to_string()));
        }

        Ok(Self(format!("0x{:0>64}", digits.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountAddress> for String {
    fn from(value: AccountAddress) -> Self {
        value.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Amount formatting
// =============================================================================

/// Format an integer amount with the given number of decimals.
///
/// Display only; reconciliation never leaves integer arithmetic.
pub fn format_amount(amount: u64, decimals: u8) -> String {
    if amount == 0 {
        return "0".to_string();
    }

    let divisor = 10u64.pow(u32::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder == 0 {
        return whole.to_string();
    }

    let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
    let trimmed = decimal_str.trim_end_matches('0');
    format!("{whole}.{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_is_padded() {
        let addr: AccountAddress = "0x1".parse().unwrap();
        assert_eq!(addr.as_str().len(), 66);
        assert!(addr.as_str().ends_with("01"));
        assert!(addr.as_str().starts_with("0x0000"));
    }

    #[test]
    fn address_is_case_insensitive() {
        let upper: AccountAddress = "0xABCDEF".parse().unwrap();
        let lower: AccountAddress = "0xabcdef".parse().unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn address_rejects_bad_input() {
        assert!(matches!(
            "abcd".parse::<AccountAddress>(),
            Err(AddressError::MissingPrefix(_))
        ));
        assert!(matches!(
            "0x".parse::<AccountAddress>(),
            Err(AddressError::InvalidLength(_))
        ));
        assert!(matches!(
            format!("0x{}", "a".repeat(65)).parse::<AccountAddress>(),
            Err(AddressError::InvalidLength(_))
        ));
        assert!(matches!(
            "0xzz".parse::<AccountAddress>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn address_serde_validates() {
        let ok: AccountAddress = serde_json::from_str("\"0x2\"").unwrap();
        assert_eq!(serde_json::to_string(&ok).unwrap(), format!("\"0x{:0>64}\"", "2"));
        assert!(serde_json::from_str::<AccountAddress>("\"nope\"").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(100_000_000, NATIVE_DECIMALS), "1");
        assert_eq!(format_amount(150_000_000, NATIVE_DECIMALS), "1.5");
        assert_eq!(format_amount(1, NATIVE_DECIMALS), "0.00000001");
        assert_eq!(format_amount(0, NATIVE_DECIMALS), "0");
    }

    #[test]
    fn network_lookup() {
        assert_eq!(network_by_key("Mainnet").map(|n| n.key), Some("mainnet"));
        assert_eq!(network_by_key(" testnet ").map(|n| n.key), Some("testnet"));
        assert!(network_by_key("devnet").is_none());
    }
}
