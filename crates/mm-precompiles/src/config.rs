use crate::{
    block_header::{UncleIndexBound, BLOCK_HEADER_PRECOMPILE_ADDR},
    hd_wallet::HD_WALLET_PRECOMPILE_ADDR,
};
use alloy_primitives::Address;
use std::{env, str::FromStr};
use thiserror::Error;

/// Environment variable overriding the block header precompile address.
pub const BLOCK_HEADER_ADDR_ENV: &str = "MM_BLOCK_HEADER_PRECOMPILE_ADDR";
/// Environment variable overriding the HD wallet precompile address.
pub const HD_WALLET_ADDR_ENV: &str = "MM_HD_WALLET_PRECOMPILE_ADDR";
/// Environment variable enabling the exclusive uncle index bound.
pub const STRICT_UNCLE_INDEX_ENV: &str = "MM_STRICT_UNCLE_INDEX";

/// Configuration for installing the merged-mining precompiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileConfig {
    /// The address of the block header precompile.
    pub block_header_address: Address,
    /// The address of the HD wallet utility precompile.
    pub hd_wallet_address: Address,
    /// Reject `getUncleCoinbaseAddress` indices equal to the uncle count.
    pub strict_uncle_index: bool,
}

impl Default for PrecompileConfig {
    fn default() -> Self {
        Self {
            block_header_address: BLOCK_HEADER_PRECOMPILE_ADDR,
            hd_wallet_address: HD_WALLET_PRECOMPILE_ADDR,
            strict_uncle_index: false,
        }
    }
}

impl PrecompileConfig {
    /// Creates a `PrecompileConfig` from environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(BLOCK_HEADER_ADDR_ENV) {
            config.block_header_address = parse_address(BLOCK_HEADER_ADDR_ENV, &raw)?;
        }
        if let Some(raw) = lookup(HD_WALLET_ADDR_ENV) {
            config.hd_wallet_address = parse_address(HD_WALLET_ADDR_ENV, &raw)?;
        }
        if let Some(raw) = lookup(STRICT_UNCLE_INDEX_ENV) {
            config.strict_uncle_index = parse_flag(STRICT_UNCLE_INDEX_ENV, &raw)?;
        }

        if config.block_header_address == config.hd_wallet_address {
            return Err(ConfigError::AddressCollision(config.block_header_address));
        }

        Ok(config)
    }

    /// Index bound used by `getUncleCoinbaseAddress`.
    pub const fn uncle_index_bound(&self) -> UncleIndexBound {
        if self.strict_uncle_index {
            UncleIndexBound::Exclusive
        } else {
            UncleIndexBound::Inclusive
        }
    }
}

/// Errors that can occur while building a [`PrecompileConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable does not hold a hex-encoded address.
    #[error("invalid address in {var}: {reason}")]
    InvalidAddress {
        /// Name of the offending environment variable.
        var: &'static str,
        /// Parser message.
        reason: String,
    },
    /// The variable does not hold a boolean.
    #[error("invalid boolean in {var}: {value}")]
    InvalidFlag {
        /// Name of the offending environment variable.
        var: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Both precompiles were configured at the same address.
    #[error("both precompiles configured at {0}")]
    AddressCollision(Address),
}

fn parse_address(var: &'static str, raw: &str) -> Result<Address, ConfigError> {
    Address::from_str(raw.trim())
        .map_err(|err| ConfigError::InvalidAddress { var, reason: err.to_string() })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var, value: raw.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = PrecompileConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PrecompileConfig::default());
        assert_eq!(config.uncle_index_bound(), UncleIndexBound::Inclusive);
    }

    #[test]
    fn overrides_from_variables() {
        let config = PrecompileConfig::from_lookup(lookup(&[
            (BLOCK_HEADER_ADDR_ENV, "0x00000000000000000000000000000000000000aa"),
            (HD_WALLET_ADDR_ENV, " 0x00000000000000000000000000000000000000bb "),
            (STRICT_UNCLE_INDEX_ENV, "true"),
        ]))
        .unwrap();

        assert_eq!(
            config.block_header_address,
            address!("0x00000000000000000000000000000000000000aa")
        );
        assert_eq!(
            config.hd_wallet_address,
            address!("0x00000000000000000000000000000000000000bb")
        );
        assert_eq!(config.uncle_index_bound(), UncleIndexBound::Exclusive);
    }

    #[test]
    fn rejects_invalid_values() {
        let err = PrecompileConfig::from_lookup(lookup(&[(BLOCK_HEADER_ADDR_ENV, "nope")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAddress { var: BLOCK_HEADER_ADDR_ENV, .. }));

        let err = PrecompileConfig::from_lookup(lookup(&[(STRICT_UNCLE_INDEX_ENV, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { .. }));
    }

    #[test]
    fn rejects_shared_address() {
        let shared = "0x00000000000000000000000000000000000000cc";
        let err = PrecompileConfig::from_lookup(lookup(&[
            (BLOCK_HEADER_ADDR_ENV, shared),
            (HD_WALLET_ADDR_ENV, shared),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::AddressCollision(_)));
    }
}
