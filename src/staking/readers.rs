// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reader capabilities consumed by the reconciliation engine.
//!
//! The engine never talks to the node or the indexer directly; it is handed
//! a [`BalanceReader`] and an [`ActivityLogReader`] so it can run against
//! fakes in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::{
    ActivityPage, CurrentStakeBalances, DelegationRow, PoolBalances, WithdrawalStatus,
};
use crate::blockchain::{AccountAddress, DelegationPoolView, NodeClient, NodeClientError};
use crate::indexer::{IndexerClient, IndexerError};

/// Failure of a reader query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("malformed upstream data: {0}")]
    Malformed(String),
}

impl From<NodeClientError> for ReadError {
    fn from(e: NodeClientError) -> Self {
        match e {
            NodeClientError::Decode(_) => ReadError::Malformed(e.to_string()),
            _ => ReadError::Unavailable(e.to_string()),
        }
    }
}

impl From<IndexerError> for ReadError {
    fn from(e: IndexerError) -> Self {
        match e {
            IndexerError::InvalidResponse(_) => ReadError::Malformed(e.to_string()),
            _ => ReadError::Unavailable(e.to_string()),
        }
    }
}

/// Current on-chain balances of a delegator.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// `(active, inactive, pending_inactive)` in `pool`.
    async fn stake(
        &self,
        pool: &AccountAddress,
        delegator: &AccountAddress,
    ) -> Result<CurrentStakeBalances, ReadError>;

    /// Withdrawal status; `None` when the pool does not expose it.
    async fn pending_withdrawal(
        &self,
        pool: &AccountAddress,
        delegator: &AccountAddress,
    ) -> Result<Option<WithdrawalStatus>, ReadError>;

    /// Seconds left in the lock-up cycle; `None` when not exposed.
    async fn remaining_lockup_secs(&self, pool: &AccountAddress) -> Result<Option<u64>, ReadError>;
}

/// Indexed staking history of a delegator.
#[async_trait]
pub trait ActivityLogReader: Send + Sync {
    /// Add/unlock/reactivate events across all pools, newest first.
    async fn stake_activities(&self, delegator: &AccountAddress) -> Result<ActivityPage, ReadError>;

    /// Raw balance rows, used to discover which pools to reconcile.
    async fn delegated_pools(
        &self,
        delegator: &AccountAddress,
    ) -> Result<Vec<DelegationRow>, ReadError>;
}

#[async_trait]
impl BalanceReader for NodeClient {
    async fn stake(
        &self,
        pool: &AccountAddress,
        delegator: &AccountAddress,
    ) -> Result<CurrentStakeBalances, ReadError> {
        Ok(DelegationPoolView::new(self, pool).get_stake(delegator).await?)
    }

    async fn pending_withdrawal(
        &self,
        pool: &AccountAddress,
        delegator: &AccountAddress,
    ) -> Result<Option<WithdrawalStatus>, ReadError> {
        Ok(DelegationPoolView::new(self, pool)
            .get_pending_withdrawal(delegator)
            .await?)
    }

    async fn remaining_lockup_secs(&self, pool: &AccountAddress) -> Result<Option<u64>, ReadError> {
        Ok(DelegationPoolView::new(self, pool)
            .get_remaining_lockup_secs()
            .await?)
    }
}

#[async_trait]
impl ActivityLogReader for IndexerClient {
    async fn stake_activities(&self, delegator: &AccountAddress) -> Result<ActivityPage, ReadError> {
        Ok(IndexerClient::stake_activities(self, delegator).await?)
    }

    async fn delegated_pools(
        &self,
        delegator: &AccountAddress,
    ) -> Result<Vec<DelegationRow>, ReadError> {
        Ok(IndexerClient::delegated_pools(self, delegator).await?)
    }
}

/// Run the three balance queries for one pool concurrently.
///
/// Missing optional view functions resolve to defaults
/// (`can_withdraw = false`, no unlock time); any other failure fails the pool.
pub async fn read_pool_balances(
    reader: &dyn BalanceReader,
    pool: &AccountAddress,
    delegator: &AccountAddress,
    now: DateTime<Utc>,
) -> Result<PoolBalances, ReadError> {
    let (stake, withdrawal, lockup) = tokio::join!(
        reader.stake(pool, delegator),
        reader.pending_withdrawal(pool, delegator),
        reader.remaining_lockup_secs(pool),
    );

    let unlock_time = lockup?
        .filter(|secs| *secs > 0)
        .and_then(|secs| i64::try_from(secs).ok())
        .map(|secs| now.timestamp().saturating_add(secs));

    Ok(PoolBalances {
        stake: stake?,
        withdrawal: withdrawal?.unwrap_or_default(),
        unlock_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OptionalMissing;

    #[async_trait]
    impl BalanceReader for OptionalMissing {
        async fn stake(
            &self,
            _pool: &AccountAddress,
            _delegator: &AccountAddress,
        ) -> Result<CurrentStakeBalances, ReadError> {
            Ok(CurrentStakeBalances {
                active: 10,
                inactive: 0,
                pending_inactive: 5,
            })
        }

        async fn pending_withdrawal(
            &self,
            _pool: &AccountAddress,
            _delegator: &AccountAddress,
        ) -> Result<Option<WithdrawalStatus>, ReadError> {
            Ok(None)
        }

        async fn remaining_lockup_secs(
            &self,
            _pool: &AccountAddress,
        ) -> Result<Option<u64>, ReadError> {
            Ok(None)
        }
    }

    struct LockupRunning(u64);

    #[async_trait]
    impl BalanceReader for LockupRunning {
        async fn stake(
            &self,
            _pool: &AccountAddress,
            _delegator: &AccountAddress,
        ) -> Result<CurrentStakeBalances, ReadError> {
            Ok(CurrentStakeBalances::default())
        }

        async fn pending_withdrawal(
            &self,
            _pool: &AccountAddress,
            _delegator: &AccountAddress,
        ) -> Result<Option<WithdrawalStatus>, ReadError> {
            if self.0 == 0 {
                return Err(ReadError::Unavailable("timeout".into()));
            }
            Ok(Some(WithdrawalStatus {
                can_withdraw: false,
                withdrawable: 0,
            }))
        }

        async fn remaining_lockup_secs(
            &self,
            _pool: &AccountAddress,
        ) -> Result<Option<u64>, ReadError> {
            Ok(Some(self.0))
        }
    }

    fn addr(s: &str) -> AccountAddress {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn missing_optional_views_resolve_to_defaults() {
        let balances = read_pool_balances(&OptionalMissing, &addr("0xa"), &addr("0xb"), Utc::now())
            .await
            .unwrap();
        assert_eq!(balances.stake.active, 10);
        assert!(!balances.withdrawal.can_withdraw);
        assert_eq!(balances.withdrawal.withdrawable, 0);
        assert!(balances.unlock_time.is_none());
    }

    #[tokio::test]
    async fn running_lockup_sets_unlock_time() {
        let now = Utc::now();
        let balances = read_pool_balances(&LockupRunning(3600), &addr("0xa"), &addr("0xb"), now)
            .await
            .unwrap();
        assert_eq!(balances.unlock_time, Some(now.timestamp() + 3600));
    }

    #[tokio::test]
    async fn transient_optional_failure_fails_the_pool() {
        // LockupRunning(0) fails its withdrawal query.
        let result =
            read_pool_balances(&LockupRunning(0), &addr("0xa"), &addr("0xb"), Utc::now()).await;
        assert_eq!(result, Err(ReadError::Unavailable("timeout".into())));
    }

    #[test]
    fn node_errors_map_to_read_errors() {
        let e: ReadError = NodeClientError::Decode("bad".into()).into();
        assert!(matches!(e, ReadError::Malformed(_)));
        let e: ReadError = NodeClientError::Request("down".into()).into();
        assert!(matches!(e, ReadError::Unavailable(_)));
        let e: ReadError = IndexerError::Graphql("boom".into()).into();
        assert!(matches!(e, ReadError::Unavailable(_)));
    }
}
