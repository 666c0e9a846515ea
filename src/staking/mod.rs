// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Staking Position Reconciliation
//!
//! Splits each delegation into principal and accrued rewards by replaying
//! the indexed activity log against current on-chain balances.
//!
//! ## Layout
//!
//! - `types` - Pool, event, balance and position types
//! - `readers` - Node and indexer capabilities the engine consumes
//! - `reconcile` - Principal replay and per-pool reward derivation
//! - `aggregate` - Portfolio totals
//! - `pools` - Validator pool registry
//! - `service` - Reconciliation passes, caching and de-duplication

pub mod aggregate;
pub mod pools;
pub mod readers;
pub mod reconcile;
pub mod service;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;

pub use pools::{PoolRegistry, RegistryError};
pub use readers::{ActivityLogReader, BalanceReader, ReadError};
pub use reconcile::PrincipalPolicy;
pub use service::{
    ServiceOptions, StakingError, StakingStatsService, DEFAULT_APY_BPS, DEFAULT_CACHE_CAPACITY,
    DEFAULT_CACHE_TTL,
};
pub use types::{DelegatorStake, HistoryConfidence, StakingStats, ValidatorPool};
