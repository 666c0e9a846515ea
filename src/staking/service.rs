// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Staking Stats Service
//!
//! Runs reconciliation passes and owns the per-address cache.
//!
//! ## Pass
//!
//! 1. Balance discovery and the activity log are fetched concurrently.
//!    Discovery failure aborts the pass; activity failure only makes rewards
//!    undeterminable.
//! 2. Every discovered pool is reconciled concurrently. A pool whose balance
//!    queries fail becomes a zeroed, flagged position; the other pools are
//!    unaffected.
//! 3. Positions are folded into [`StakingStats`].
//!
//! ## Caching
//!
//! [`StakingStatsService::stats`] serves from the cache inside the TTL and
//! lets only one pass per address run at a time; callers arriving while a
//! pass is running wait for it and read its result. [`StakingStatsService::refresh`]
//! always runs a new pass. Each pass takes a request token when issued, and
//! the cache keeps the result of the latest-issued pass. Invalidation raises
//! the lowest accepted token, so passes already running are discarded.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use super::aggregate::fold_positions;
use super::pools::PoolRegistry;
use super::readers::{read_pool_balances, ActivityLogReader, BalanceReader, ReadError};
use super::reconcile::{reconcile_position, ActivityHistory, PrincipalPolicy};
use super::types::{DelegatorStake, StakingStats};
use crate::blockchain::{format_amount, AccountAddress, NATIVE_DECIMALS};
use crate::storage::StatsCache;

/// Default cache TTL for reconciled stats.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Default number of addresses kept in the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Default flat APY estimate (7%).
pub const DEFAULT_APY_BPS: u32 = 700;

/// Engine errors surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StakingError {
    /// The pools of the address could not be discovered.
    #[error("staking data unavailable: {0}")]
    Unavailable(#[source] ReadError),
}

/// Tunables of the service.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub apy_bps: u32,
    pub policy: PrincipalPolicy,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            apy_bps: DEFAULT_APY_BPS,
            policy: PrincipalPolicy::default(),
        }
    }
}

/// Reconciliation engine with a per-address cache.
pub struct StakingStatsService {
    balances: Arc<dyn BalanceReader>,
    activity: Arc<dyn ActivityLogReader>,
    registry: Arc<PoolRegistry>,
    cache: StatsCache,
    apy_bps: u32,
    policy: PrincipalPolicy,
    next_token: AtomicU64,
    inflight: Mutex<HashMap<AccountAddress, Arc<tokio::sync::Mutex<()>>>>,
}

impl StakingStatsService {
    pub fn new(
        balances: Arc<dyn BalanceReader>,
        activity: Arc<dyn ActivityLogReader>,
        registry: Arc<PoolRegistry>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            balances,
            activity,
            registry,
            cache: StatsCache::new(options.cache_capacity, options.cache_ttl),
            apy_bps: options.apy_bps,
            policy: options.policy,
            next_token: AtomicU64::new(1),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Number of addresses currently cached.
    pub fn cached_addresses(&self) -> usize {
        self.cache.len()
    }

    /// Stats for `address`, from cache when fresh.
    pub async fn stats(&self, address: &AccountAddress) -> Result<Arc<StakingStats>, StakingError> {
        if let Some(stats) = self.cache.get(address) {
            tracing::debug!(address = %address, "Staking stats served from cache");
            return Ok(stats);
        }

        let gate = self.gate(address);
        let result = {
            let _guard = gate.lock().await;
            // A pass that finished while we waited already filled the cache.
            match self.cache.get(address) {
                Some(stats) => Ok(stats),
                None => self.run_pass(address).await,
            }
        };
        self.release_gate(address, gate);
        result
    }

    /// Run a new pass regardless of the cache.
    ///
    /// Expected after any state-changing action (stake, unlock, withdraw,
    /// reactivate).
    ///
    /// The previous entry keeps serving [`Self::stats`] until the new pass
    /// lands; its later token makes it win over any pass already running.
    pub async fn refresh(&self, address: &AccountAddress) -> Result<Arc<StakingStats>, StakingError> {
        self.run_pass(address).await
    }

    /// Drop the cached stats of `address`.
    ///
    /// Passes issued before this call can no longer fill the cache.
    pub fn invalidate(&self, address: &AccountAddress) {
        self.cache
            .invalidate(address, self.next_token.load(Ordering::SeqCst));
    }

    /// One uncached reconciliation pass.
    pub async fn reconcile(&self, address: &AccountAddress) -> Result<StakingStats, StakingError> {
        let (pools, history) = tokio::join!(
            self.activity.delegated_pools(address),
            self.activity.stake_activities(address),
        );

        let rows = pools.map_err(|e| {
            tracing::warn!(address = %address, error = %e, "Pool discovery failed");
            StakingError::Unavailable(e)
        })?;
        let history = self.history_from(address, history);

        let pool_addresses: BTreeSet<AccountAddress> =
            rows.into_iter().map(|row| row.pool_address).collect();

        let now = Utc::now();
        let positions = join_all(
            pool_addresses
                .iter()
                .map(|pool| self.reconcile_pool(address, pool, &history)),
        )
        .await;

        let stats = fold_positions(address.clone(), positions, self.apy_bps, now);
        tracing::info!(
            address = %address,
            pools = pool_addresses.len(),
            delegations = stats.delegations.len(),
            degraded = stats.degraded_pools.len(),
            total_staked = %format_amount(stats.total_staked, NATIVE_DECIMALS),
            "Reconciled staking positions"
        );
        Ok(stats)
    }

    /// Uncached reconciliation of a single pool.
    pub async fn position(
        &self,
        address: &AccountAddress,
        pool: &AccountAddress,
    ) -> DelegatorStake {
        let history = self.activity.stake_activities(address).await;
        let history = self.history_from(address, history);
        self.reconcile_pool(address, pool, &history).await
    }

    async fn reconcile_pool(
        &self,
        address: &AccountAddress,
        pool: &AccountAddress,
        history: &ActivityHistory,
    ) -> DelegatorStake {
        let name = self.registry.validator_name(pool);
        match read_pool_balances(self.balances.as_ref(), pool, address, Utc::now()).await {
            Ok(balances) => reconcile_position(pool, name, history, &balances, self.policy),
            Err(e) => {
                tracing::warn!(
                    address = %address,
                    pool = %pool,
                    error = %e,
                    "Pool balance query failed, reporting zeroed position"
                );
                DelegatorStake::unavailable(pool.clone(), name)
            }
        }
    }

    fn history_from(
        &self,
        address: &AccountAddress,
        page: Result<super::types::ActivityPage, ReadError>,
    ) -> ActivityHistory {
        match page {
            Ok(page) => ActivityHistory::Available {
                events: page.events,
                truncated: page.truncated,
            },
            Err(e) => {
                tracing::warn!(
                    address = %address,
                    error = %e,
                    "Activity log unavailable, rewards will be undetermined"
                );
                ActivityHistory::Unavailable
            }
        }
    }

    async fn run_pass(&self, address: &AccountAddress) -> Result<Arc<StakingStats>, StakingError> {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let stats = Arc::new(self.reconcile(address).await?);
        if !self.cache.put(address, Arc::clone(&stats), token) {
            tracing::debug!(address = %address, token, "Discarded result of superseded pass");
        }
        Ok(stats)
    }

    fn gate(&self, address: &AccountAddress) -> Arc<tokio::sync::Mutex<()>> {
        match self.inflight.lock() {
            Ok(mut map) => Arc::clone(map.entry(address.clone()).or_default()),
            // Poisoned map: fall back to an unshared gate.
            Err(_) => Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn release_gate(&self, address: &AccountAddress, gate: Arc<tokio::sync::Mutex<()>>) {
        if let Ok(mut map) = self.inflight.lock() {
            // Only the map and this caller hold it: nobody else is waiting.
            if Arc::strong_count(&gate) == 2 {
                map.remove(address);
            }
        }
    }
}
