// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Position Reconciler
//!
//! The chain only exposes current balances, never a cost basis. Principal is
//! rebuilt by replaying the delegator's add/unlock/reactivate events for a
//! pool oldest-first; whatever the current balance holds above that principal
//! is reward.
//!
//! A reward component is only reported when the balance strictly exceeds the
//! replayed principal. Otherwise it stays `None`: a slashing, an indexer gap
//! or a truncated page can all push the balance below principal, and zero
//! would claim a certainty we do not have.

use serde::{Deserialize, Serialize};

use super::types::{
    Amount, DelegatorStake, HistoryConfidence, PoolBalances, StakeActivityEvent, StakeEventKind,
};
use crate::blockchain::AccountAddress;

/// How to treat a pool that has a balance but no recorded events.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PrincipalPolicy {
    /// No events means no principal basis: rewards stay undetermined.
    #[default]
    Strict,
    /// No events means zero principal: the whole balance counts as reward.
    ZeroBasis,
}

impl std::str::FromStr for PrincipalPolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "zero-basis" | "zero_basis" => Ok(Self::ZeroBasis),
            other => Err(format!("unknown principal policy `{other}`")),
        }
    }
}

/// Activity history available to a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityHistory {
    Available {
        /// All pools, newest first as delivered by the indexer.
        events: Vec<StakeActivityEvent>,
        truncated: bool,
    },
    Unavailable,
}

/// Replayed net contributions per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Principal {
    pub active: Amount,
    pub pending_inactive: Amount,
    /// A subtraction hit zero; at least one earlier event is missing.
    pub underflowed: bool,
}

/// Events of one pool, oldest first.
pub fn pool_history<'a>(
    events: &'a [StakeActivityEvent],
    pool: &AccountAddress,
) -> Vec<&'a StakeActivityEvent> {
    let mut history: Vec<_> = events.iter().filter(|e| &e.pool_address == pool).collect();
    history.sort_by_key(|e| e.sequence);
    history
}

fn debit(bucket: &mut Amount, amount: Amount, underflowed: &mut bool) {
    match bucket.checked_sub(amount) {
        Some(v) => *bucket = v,
        None => {
            *bucket = 0;
            *underflowed = true;
        }
    }
}

/// Replay events in the order given.
///
/// Principal cannot be negative, so a debit larger than the bucket clamps to
/// zero and flags the replay; this is why callers must pass events
/// oldest-first (see [`pool_history`]).
pub fn replay_principal<'a, I>(events: I) -> Principal
where
    I: IntoIterator<Item = &'a StakeActivityEvent>,
{
    let mut p = Principal::default();

    for event in events {
        let amount = event.amount;
        match event.kind {
            StakeEventKind::AddStake => {
                p.active = p.active.saturating_add(amount);
            }
            StakeEventKind::UnlockStake => {
                debit(&mut p.active, amount, &mut p.underflowed);
                p.pending_inactive = p.pending_inactive.saturating_add(amount);
            }
            StakeEventKind::ReactivateStake => {
                p.active = p.active.saturating_add(amount);
                debit(&mut p.pending_inactive, amount, &mut p.underflowed);
            }
        }
    }

    p
}

/// Reward in a bucket, defined only when the balance exceeds principal.
pub fn bucket_reward(current: Amount, principal: Amount) -> Option<Amount> {
    if current > principal {
        Some(current - principal)
    } else {
        None
    }
}

/// Build the reconciled position of `pool` from its balances and the
/// delegator's history.
pub fn reconcile_position(
    pool: &AccountAddress,
    validator_name: String,
    history: &ActivityHistory,
    balances: &PoolBalances,
    policy: PrincipalPolicy,
) -> DelegatorStake {
    let (principal, confidence) = match history {
        ActivityHistory::Unavailable => (None, HistoryConfidence::Unavailable),
        ActivityHistory::Available { events, truncated } => {
            let pool_events = pool_history(events, pool);
            if pool_events.is_empty() {
                match policy {
                    PrincipalPolicy::Strict => (None, HistoryConfidence::Missing),
                    PrincipalPolicy::ZeroBasis => {
                        (Some(Principal::default()), HistoryConfidence::Missing)
                    }
                }
            } else {
                let principal = replay_principal(pool_events);
                let confidence = if *truncated || principal.underflowed {
                    HistoryConfidence::PossiblyTruncated
                } else {
                    HistoryConfidence::Complete
                };
                (Some(principal), confidence)
            }
        }
    };

    let stake = balances.stake;
    let (active_rewards, pending_inactive_rewards) = match principal {
        Some(p) => (
            bucket_reward(stake.active, p.active),
            bucket_reward(stake.pending_inactive, p.pending_inactive),
        ),
        None => (None, None),
    };

    let rewards = match (active_rewards, pending_inactive_rewards) {
        (Some(a), Some(p)) => Some(a.saturating_add(p)),
        _ => None,
    };

    DelegatorStake {
        pool_address: pool.clone(),
        validator_name,
        active_stake: stake.active,
        pending_inactive: stake.pending_inactive,
        withdrawable_stake: balances.withdrawal.withdrawable,
        rewards,
        active_rewards,
        pending_inactive_rewards,
        unlock_time: balances.unlock_time,
        can_withdraw_pending_inactive: balances.withdrawal.can_withdraw,
        balance_available: true,
        history: confidence,
    }
}
