// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Stats Refresher
//!
//! Background task that keeps the stats of watched addresses warm, so
//! dashboards see balances and rewards move between user requests.
//!
//! ## Strategy
//!
//! Every `interval` (default 60 s) the refresher runs a fresh pass for each
//! address in `WATCH_ADDRESSES`, one after another. A failed pass is logged
//! and retried on the next sweep; the previous cache entry simply expires.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown. A sweep
//! in progress stops before its next address.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::AccountAddress;
use crate::staking::StakingStatsService;

/// Default interval between refresh sweeps.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Periodic refresher for a fixed set of addresses.
pub struct StatsRefresher {
    service: Arc<StakingStatsService>,
    addresses: Vec<AccountAddress>,
    interval: Duration,
}

impl StatsRefresher {
    pub fn new(
        service: Arc<StakingStatsService>,
        addresses: Vec<AccountAddress>,
        interval: Duration,
    ) -> Self {
        Self {
            service,
            addresses,
            interval,
        }
    }

    /// Run the refresh loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(refresher.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        if self.addresses.is_empty() {
            info!("No watched addresses, stats refresher not started");
            return;
        }

        info!(
            addresses = self.addresses.len(),
            interval_secs = self.interval.as_secs(),
            "Stats refresher starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Stats refresher shutting down");
                return;
            }

            self.sweep(&shutdown).await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Stats refresher shutting down");
                    return;
                }
            }
        }
    }

    /// Refresh every watched address once. Returns how many passes succeeded.
    async fn sweep(&self, shutdown: &CancellationToken) -> usize {
        let mut refreshed = 0;
        for address in &self.addresses {
            if shutdown.is_cancelled() {
                break;
            }
            match self.service.refresh(address).await {
                Ok(stats) => {
                    refreshed += 1;
                    debug!(
                        address = %address,
                        total_staked = stats.total_staked,
                        degraded = stats.degraded_pools.len(),
                        "Refreshed staking stats"
                    );
                }
                Err(e) => {
                    warn!(address = %address, error = %e, "Stats refresh failed");
                }
            }
        }
        refreshed
    }
}
