// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validator pool registry.
//!
//! Reference data only. Discovery of the pools a delegator actually holds
//! goes through the indexer, so a pool missing here still gets reconciled,
//! just under the [`UNKNOWN_VALIDATOR`] label.

use std::collections::HashMap;
use std::path::Path;

use super::types::{ValidatorPool, UNKNOWN_VALIDATOR};
use crate::blockchain::AccountAddress;

/// Built-in registry entry.
#[derive(Debug, Clone)]
pub struct KnownPool {
    pub pool_address: &'static str,
    pub operator_address: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub commission_bps: u32,
    pub apy_bps: u32,
    pub uptime_percent: f64,
}

/// Pools operated by Relational Network.
/// Commission and APY are the advertised figures, not measured ones.
pub const KNOWN_POOLS: &[KnownPool] = &[
    KnownPool {
        pool_address: "0x7a1c0f1e4d9b3a2c5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5",
        operator_address: "0x3f0e2d1c0b9a8f7e6d5c4b3a29180f7e6d5c4b3a29180f7e6d5c4b3a29180f7e",
        name: "Relational Validator",
        description: "Primary delegation pool",
        commission_bps: 800,
        apy_bps: 700,
        uptime_percent: 99.9,
    },
    KnownPool {
        pool_address: "0x1b2c3d4e5f60718293a4b5c6d7e8f9010a1b2c3d4e5f60718293a4b5c6d7e8f9",
        operator_address: "0x9e8d7c6b5a49382716f5e4d3c2b1a0998877665544332211ffeeddccbbaa9988",
        name: "Relational Validator II",
        description: "Secondary delegation pool",
        commission_bps: 1000,
        apy_bps: 680,
        uptime_percent: 99.5,
    },
];

/// Lookup table of known pools.
#[derive(Debug, Clone, Default)]
pub struct PoolRegistry {
    pools: Vec<ValidatorPool>,
    index: HashMap<AccountAddress, usize>,
}

impl PoolRegistry {
    /// Build a registry; later duplicates of a pool address are ignored.
    pub fn new(pools: Vec<ValidatorPool>) -> Self {
        let mut unique = Vec::with_capacity(pools.len());
        let mut index = HashMap::with_capacity(pools.len());
        for pool in pools {
            if index.contains_key(&pool.pool_address) {
                tracing::warn!(pool = %pool.pool_address, "Duplicate pool in registry, ignoring");
                continue;
            }
            index.insert(pool.pool_address.clone(), unique.len());
            unique.push(pool);
        }
        Self {
            pools: unique,
            index,
        }
    }

    /// Registry of the built-in [`KNOWN_POOLS`].
    pub fn builtin() -> Result<Self, RegistryError> {
        let pools = KNOWN_POOLS
            .iter()
            .map(|p| {
                Ok(ValidatorPool {
                    pool_address: p
                        .pool_address
                        .parse()
                        .map_err(|e| RegistryError::Invalid(format!("{e}")))?,
                    operator_address: p
                        .operator_address
                        .parse()
                        .map_err(|e| RegistryError::Invalid(format!("{e}")))?,
                    name: p.name.to_string(),
                    description: p.description.to_string(),
                    commission_bps: p.commission_bps,
                    apy_bps: p.apy_bps,
                    is_active: true,
                    uptime_percent: p.uptime_percent,
                    total_stake: 0,
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;
        Ok(Self::new(pools))
    }

    /// Load a registry from a JSON array of pools.
    pub fn from_json_file(path: &Path) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::Io(format!("{}: {e}", path.display())))?;
        let pools: Vec<ValidatorPool> =
            serde_json::from_str(&raw).map_err(|e| RegistryError::Invalid(e.to_string()))?;
        Ok(Self::new(pools))
    }

    pub fn get(&self, pool: &AccountAddress) -> Option<&ValidatorPool> {
        self.index.get(pool).map(|&i| &self.pools[i])
    }

    /// Display name, falling back to "Unknown Validator".
    pub fn validator_name(&self, pool: &AccountAddress) -> String {
        self.get(pool)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_VALIDATOR.to_string())
    }

    pub fn pools(&self) -> &[ValidatorPool] {
        &self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to read pool registry: {0}")]
    Io(String),

    #[error("Invalid pool registry: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_registry_parses() {
        let registry = PoolRegistry::builtin().unwrap();
        assert_eq!(registry.len(), KNOWN_POOLS.len());

        let first: AccountAddress = KNOWN_POOLS[0].pool_address.parse().unwrap();
        assert_eq!(registry.validator_name(&first), KNOWN_POOLS[0].name);
    }

    #[test]
    fn unknown_pool_gets_fallback_name() {
        let registry = PoolRegistry::builtin().unwrap();
        let unknown: AccountAddress = "0xdead".parse().unwrap();
        assert!(registry.get(&unknown).is_none());
        assert_eq!(registry.validator_name(&unknown), UNKNOWN_VALIDATOR);
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "pool_address": "0xA1",
                "operator_address": "0xb2",
                "name": "Community Pool",
                "commission_bps": 500,
                "apy_bps": 710
            }}]"#
        )
        .unwrap();

        let registry = PoolRegistry::from_json_file(file.path()).unwrap();
        let pool: AccountAddress = "0xa1".parse().unwrap();
        let entry = registry.get(&pool).unwrap();
        assert_eq!(entry.name, "Community Pool");
        assert!(entry.is_active);
        assert_eq!(entry.total_stake, 0);
    }

    #[test]
    fn rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"pool_address": "not-hex"}}]"#).unwrap();
        assert!(matches!(
            PoolRegistry::from_json_file(file.path()),
            Err(RegistryError::Invalid(_))
        ));
    }

    #[test]
    fn duplicates_keep_first_entry() {
        let mut pools = PoolRegistry::builtin().unwrap().pools().to_vec();
        let mut dup = pools[0].clone();
        dup.name = "Impostor".into();
        pools.push(dup);

        let registry = PoolRegistry::new(pools);
        assert_eq!(registry.len(), KNOWN_POOLS.len());
        assert_eq!(registry.pools()[0].name, KNOWN_POOLS[0].name);
    }
}
