// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Portfolio fold over reconciled positions.

use chrono::{DateTime, Utc};

use super::types::{DelegatorStake, StakingStats};
use crate::blockchain::AccountAddress;

/// Fold per-pool positions into portfolio totals.
///
/// Positions with nothing in any bucket are dropped, except zeroed positions
/// of pools whose balances could not be read: those stay in `delegations`
/// and are listed in `degraded_pools`, so a failed read is never shown as
/// "no stake".
pub fn fold_positions(
    address: AccountAddress,
    positions: Vec<DelegatorStake>,
    apy_bps: u32,
    computed_at: DateTime<Utc>,
) -> StakingStats {
    let delegations: Vec<DelegatorStake> = positions
        .into_iter()
        .filter(|p| !p.is_empty() || !p.balance_available)
        .collect();

    let total_staked = delegations
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.active_stake));
    let total_rewards = delegations
        .iter()
        .filter_map(|p| p.rewards)
        .fold(0u64, |acc, r| acc.saturating_add(r));
    let can_withdraw = delegations
        .iter()
        .any(|p| p.can_withdraw_pending_inactive && p.withdrawable_stake > 0);
    let degraded_pools = delegations
        .iter()
        .filter(|p| !p.balance_available)
        .map(|p| p.pool_address.clone())
        .collect();

    StakingStats {
        address,
        total_staked,
        total_rewards,
        apy_bps,
        is_staking: total_staked > 0,
        can_withdraw,
        delegations,
        degraded_pools,
        computed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staking::types::HistoryConfidence;

    fn position(pool: &str, active: u64, pending: u64, withdrawable: u64) -> DelegatorStake {
        DelegatorStake {
            pool_address: pool.parse().unwrap(),
            validator_name: "Validator".into(),
            active_stake: active,
            pending_inactive: pending,
            withdrawable_stake: withdrawable,
            rewards: None,
            active_rewards: None,
            pending_inactive_rewards: None,
            unlock_time: None,
            can_withdraw_pending_inactive: false,
            balance_available: true,
            history: HistoryConfidence::Complete,
        }
    }

    fn fold(positions: Vec<DelegatorStake>) -> StakingStats {
        fold_positions("0x99".parse().unwrap(), positions, 700, Utc::now())
    }

    #[test]
    fn empty_pools_are_dropped() {
        let stats = fold(vec![position("0xa", 0, 0, 0), position("0xb", 50, 0, 0)]);
        assert_eq!(stats.delegations.len(), 1);
        assert_eq!(stats.delegations[0].pool_address.as_str(), format!("0x{:0>64}", "b"));
        assert_eq!(stats.total_staked, 50);
        assert!(stats.is_staking);
    }

    #[test]
    fn pending_only_position_is_kept_but_not_staked() {
        let stats = fold(vec![position("0xa", 0, 30, 0)]);
        assert_eq!(stats.delegations.len(), 1);
        assert_eq!(stats.total_staked, 0);
        assert!(!stats.is_staking);
    }

    #[test]
    fn undefined_rewards_contribute_zero() {
        let mut a = position("0xa", 100, 10, 0);
        a.rewards = Some(7);
        let b = position("0xb", 50, 0, 0);

        let stats = fold(vec![a, b]);
        assert_eq!(stats.total_rewards, 7);
        assert_eq!(stats.total_staked, 150);
    }

    #[test]
    fn can_withdraw_requires_flag_and_amount() {
        let mut flag_only = position("0xa", 10, 0, 0);
        flag_only.can_withdraw_pending_inactive = true;
        assert!(!fold(vec![flag_only.clone()]).can_withdraw);

        let mut ready = position("0xb", 0, 0, 25);
        ready.can_withdraw_pending_inactive = true;
        let stats = fold(vec![flag_only, ready]);
        assert!(stats.can_withdraw);
    }

    #[test]
    fn degraded_pool_is_kept_and_flagged() {
        let failed = DelegatorStake::unavailable("0xa".parse().unwrap(), "Validator".into());
        let stats = fold(vec![failed, position("0xb", 50, 0, 0)]);

        assert_eq!(stats.delegations.len(), 2);
        assert_eq!(stats.total_staked, 50);
        let failed_pool: AccountAddress = "0xa".parse().unwrap();
        assert_eq!(stats.degraded_pools, vec![failed_pool]);
        assert_eq!(stats.apy_bps, 700);
    }

    #[test]
    fn no_positions_means_not_staking() {
        let stats = fold(vec![]);
        assert!(!stats.is_staking);
        assert!(!stats.can_withdraw);
        assert_eq!(stats.total_rewards, 0);
        assert!(stats.delegations.is_empty());
    }
}
