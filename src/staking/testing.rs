// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory readers for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::pools::PoolRegistry;
use super::readers::{ActivityLogReader, BalanceReader, ReadError};
use super::service::{ServiceOptions, StakingStatsService};
use super::types::{
    ActivityPage, CurrentStakeBalances, DelegationRow, StakeActivityEvent, WithdrawalStatus,
};
use crate::blockchain::AccountAddress;

/// Node double: balances per pool, regardless of delegator.
#[derive(Default)]
pub struct FakeChain {
    pub stakes: HashMap<AccountAddress, CurrentStakeBalances>,
    pub withdrawals: HashMap<AccountAddress, WithdrawalStatus>,
    /// Pools whose stake query times out.
    pub failing: Vec<AccountAddress>,
}

#[async_trait]
impl BalanceReader for FakeChain {
    async fn stake(
        &self,
        pool: &AccountAddress,
        _delegator: &AccountAddress,
    ) -> Result<CurrentStakeBalances, ReadError> {
        if self.failing.contains(pool) {
            return Err(ReadError::Unavailable("node timeout".into()));
        }
        Ok(self.stakes.get(pool).copied().unwrap_or_default())
    }

    async fn pending_withdrawal(
        &self,
        pool: &AccountAddress,
        _delegator: &AccountAddress,
    ) -> Result<Option<WithdrawalStatus>, ReadError> {
        Ok(self.withdrawals.get(pool).copied())
    }

    async fn remaining_lockup_secs(
        &self,
        _pool: &AccountAddress,
    ) -> Result<Option<u64>, ReadError> {
        Ok(None)
    }
}

/// Indexer double with a fixed activity log and pool list.
#[derive(Default)]
pub struct FakeIndexer {
    pub pools: Vec<AccountAddress>,
    pub events: Vec<StakeActivityEvent>,
    pub discovery_down: bool,
    pub activity_down: bool,
    pub discovery_calls: AtomicUsize,
}

#[async_trait]
impl ActivityLogReader for FakeIndexer {
    async fn stake_activities(&self, _delegator: &AccountAddress) -> Result<ActivityPage, ReadError> {
        if self.activity_down {
            return Err(ReadError::Unavailable("indexer 502".into()));
        }
        Ok(ActivityPage {
            events: self.events.clone(),
            truncated: false,
        })
    }

    async fn delegated_pools(
        &self,
        _delegator: &AccountAddress,
    ) -> Result<Vec<DelegationRow>, ReadError> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers overlap.
        tokio::task::yield_now().await;
        if self.discovery_down {
            return Err(ReadError::Unavailable("indexer 502".into()));
        }
        Ok(self
            .pools
            .iter()
            .map(|p| DelegationRow {
                pool_address: p.clone(),
                shares: "1".into(),
            })
            .collect())
    }
}

/// Service over the fakes and the built-in registry.
pub fn service(chain: FakeChain, indexer: FakeIndexer) -> Arc<StakingStatsService> {
    let registry = PoolRegistry::builtin().expect("built-in registry");
    Arc::new(StakingStatsService::new(
        Arc::new(chain),
        Arc::new(indexer),
        Arc::new(registry),
        ServiceOptions::default(),
    ))
}
