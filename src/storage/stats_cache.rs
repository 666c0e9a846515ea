// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for reconciled staking stats.
//!
//! Short-lived de-duplication window per address: several UI panels asking
//! for the same account within the TTL share one reconciliation pass.
//! Entries carry the request token of the pass that produced them, and an
//! entry is never replaced by the result of an earlier-issued pass.
//! Invalidation and expiry keep the token as a floor, so a pass issued
//! before an invalidation cannot repopulate the entry when it finishes late.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::blockchain::AccountAddress;
use crate::staking::types::StakingStats;

/// Cached entry: stats + producing token + insertion timestamp.
/// `stats` is `None` once invalidated; `token` is then the lowest token
/// still accepted.
struct CacheEntry {
    stats: Option<Arc<StakingStats>>,
    token: u64,
    inserted_at: Instant,
}

/// In-process LRU cache of stats per address.
pub struct StatsCache {
    cache: Mutex<LruCache<AccountAddress, CacheEntry>>,
    ttl: Duration,
}

impl StatsCache {
    /// Create a new cache with the given capacity and TTL.
    ///
    /// - `capacity`: Max number of addresses to cache.
    /// - `ttl`: Time-to-live for each cache entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Get fresh stats for an address.
    ///
    /// Returns `None` if not cached or expired.
    pub fn get(&self, address: &AccountAddress) -> Option<Arc<StakingStats>> {
        let mut cache = self.cache.lock().ok()?;
        let entry = cache.get(address)?;
        if entry.inserted_at.elapsed() < self.ttl {
            entry.stats.clone()
        } else {
            None
        }
    }

    /// Store stats produced by the pass holding `token`.
    ///
    /// Returns `false` when a later-issued pass already stored its result,
    /// or the entry was invalidated after this pass was issued; the result is
    /// then dropped.
    pub fn put(&self, address: &AccountAddress, stats: Arc<StakingStats>, token: u64) -> bool {
        let Ok(mut cache) = self.cache.lock() else {
            return false;
        };

        // Peek so a rejected write does not bump the entry's recency.
        if let Some(existing) = cache.peek(address) {
            if existing.token > token {
                return false;
            }
        }

        cache.put(
            address.clone(),
            CacheEntry {
                stats: Some(stats),
                token,
                inserted_at: Instant::now(),
            },
        );
        true
    }

    /// Invalidate the cache for a specific address.
    ///
    /// Results of passes holding a token below `floor` are refused from now
    /// on. Pass the next token to be issued.
    pub fn invalidate(&self, address: &AccountAddress, floor: u64) {
        let Ok(mut cache) = self.cache.lock() else {
            return;
        };
        let floor = cache
            .peek(address)
            .map_or(floor, |existing| existing.token.max(floor));
        cache.put(
            address.clone(),
            CacheEntry {
                stats: None,
                token: floor,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of addresses holding stats, fresh or not.
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .map(|c| c.iter().filter(|(_, e)| e.stats.is_some()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
