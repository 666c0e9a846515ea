// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staking domain types.
//!
//! All amounts are integers in the smallest on-chain unit (octas).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::AccountAddress;

/// Amount in the smallest on-chain unit.
pub type Amount = u64;

/// Label used when a pool is not in the registry.
pub const UNKNOWN_VALIDATOR: &str = "Unknown Validator";

// =============================================================================
// Reference data
// =============================================================================

/// A known delegation pool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ValidatorPool {
    /// Pool address (unique key)
    pub pool_address: AccountAddress,
    /// Operator account
    pub operator_address: AccountAddress,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Advertised commission in basis points
    pub commission_bps: u32,
    /// Advertised APY in basis points
    pub apy_bps: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Uptime over the last epochs, 0-100
    #[serde(default)]
    pub uptime_percent: f64,
    /// Informational total stake of the pool
    #[serde(default)]
    pub total_stake: Amount,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Activity log
// =============================================================================

/// Kind of a stake activity event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StakeEventKind {
    AddStake,
    UnlockStake,
    ReactivateStake,
}

/// Total order of events on chain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventSequence {
    pub transaction_version: u64,
    pub event_index: u64,
}

/// One stake-related ledger entry of a delegator against a pool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StakeActivityEvent {
    pub pool_address: AccountAddress,
    pub kind: StakeEventKind,
    pub amount: Amount,
    pub sequence: EventSequence,
}

/// A page of activity as returned by the indexer, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPage {
    pub events: Vec<StakeActivityEvent>,
    /// The indexer returned as many rows as the page limit allowed, so older
    /// events may be missing.
    pub truncated: bool,
}

/// Row of the balance-discovery listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DelegationRow {
    pub pool_address: AccountAddress,
    /// Raw share balance as reported by the indexer
    pub shares: String,
}

// =============================================================================
// Current balances
// =============================================================================

/// Stake of one delegator in one pool as recorded on chain right now.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentStakeBalances {
    pub active: Amount,
    pub inactive: Amount,
    pub pending_inactive: Amount,
}

/// Result of the pending-withdrawal view function.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WithdrawalStatus {
    pub can_withdraw: bool,
    pub withdrawable: Amount,
}

/// Everything the balance reader knows about one delegator in one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolBalances {
    pub stake: CurrentStakeBalances,
    /// Defaults when the pool does not expose the view function.
    pub withdrawal: WithdrawalStatus,
    /// Epoch seconds at which the running lock-up cycle ends.
    pub unlock_time: Option<i64>,
}

// =============================================================================
// Reconciled output
// =============================================================================

/// How far the activity history behind a position can be trusted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryConfidence {
    /// The replay covered the full history.
    Complete,
    /// The page limit was hit or the replay found an unlock without matching
    /// principal; rewards may be overstated.
    PossiblyTruncated,
    /// The log holds no events for this pool.
    Missing,
    /// The indexer could not be queried.
    Unavailable,
}

/// Reconciled position of a delegator in one pool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DelegatorStake {
    pub pool_address: AccountAddress,
    pub validator_name: String,
    pub active_stake: Amount,
    pub pending_inactive: Amount,
    pub withdrawable_stake: Amount,
    /// `active_rewards + pending_inactive_rewards`, only when both are known
    pub rewards: Option<Amount>,
    pub active_rewards: Option<Amount>,
    pub pending_inactive_rewards: Option<Amount>,
    /// Epoch seconds at which the current lock-up cycle ends
    pub unlock_time: Option<i64>,
    pub can_withdraw_pending_inactive: bool,
    /// False when the balance queries failed and the amounts are zeroed
    pub balance_available: bool,
    pub history: HistoryConfidence,
}

impl DelegatorStake {
    /// Zeroed position for a pool whose queries failed.
    pub fn unavailable(pool_address: AccountAddress, validator_name: String) -> Self {
        Self {
            pool_address,
            validator_name,
            active_stake: 0,
            pending_inactive: 0,
            withdrawable_stake: 0,
            rewards: None,
            active_rewards: None,
            pending_inactive_rewards: None,
            unlock_time: None,
            can_withdraw_pending_inactive: false,
            balance_available: false,
            history: HistoryConfidence::Unavailable,
        }
    }

    /// Whether the position holds any stake in any bucket.
    pub fn is_empty(&self) -> bool {
        self.active_stake == 0 && self.pending_inactive == 0 && self.withdrawable_stake == 0
    }
}

/// Portfolio-level totals for one address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StakingStats {
    pub address: AccountAddress,
    pub total_staked: Amount,
    pub total_rewards: Amount,
    /// Flat configured estimate in basis points
    pub apy_bps: u32,
    pub is_staking: bool,
    pub can_withdraw: bool,
    pub delegations: Vec<DelegatorStake>,
    /// Pools whose balances could not be read in this pass
    pub degraded_pools: Vec<AccountAddress>,
    pub computed_at: DateTime<Utc>,
}
