// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `STAKING_NETWORK` | `mainnet` or `testnet` | `mainnet` |
//! | `NODE_URL` | Full node REST endpoint | network default |
//! | `INDEXER_URL` | Indexer GraphQL endpoint | network default |
//! | `HTTP_TIMEOUT_SECS` | Per-request timeout for node and indexer calls | `15` |
//! | `STATS_CACHE_TTL_SECS` | De-duplication window for stats per address | `30` |
//! | `STATS_CACHE_CAPACITY` | Max cached addresses | `1024` |
//! | `ACTIVITY_PAGE_LIMIT` | Max activity rows fetched per address | `1000` |
//! | `STAKING_APY_BPS` | Flat APY estimate in basis points | `700` |
//! | `PRINCIPAL_POLICY` | `strict` or `zero-basis` | `strict` |
//! | `POOL_REGISTRY_PATH` | JSON file replacing the built-in pool registry | Optional |
//! | `WATCH_ADDRESSES` | Comma-separated addresses refreshed in the background | Optional |
//! | `REFRESH_INTERVAL_SECS` | Background refresh interval | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::blockchain::client::DEFAULT_HTTP_TIMEOUT;
use crate::blockchain::{network_by_key, AccountAddress, NetworkConfig, APTOS_MAINNET};
use crate::indexer::DEFAULT_PAGE_LIMIT;
use crate::refresher::DEFAULT_REFRESH_INTERVAL;
use crate::staking::{
    PrincipalPolicy, ServiceOptions, DEFAULT_APY_BPS, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const NETWORK_ENV: &str = "STAKING_NETWORK";
pub const NODE_URL_ENV: &str = "NODE_URL";
pub const INDEXER_URL_ENV: &str = "INDEXER_URL";
pub const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const CACHE_TTL_ENV: &str = "STATS_CACHE_TTL_SECS";
pub const CACHE_CAPACITY_ENV: &str = "STATS_CACHE_CAPACITY";
pub const PAGE_LIMIT_ENV: &str = "ACTIVITY_PAGE_LIMIT";
pub const APY_BPS_ENV: &str = "STAKING_APY_BPS";
pub const PRINCIPAL_POLICY_ENV: &str = "PRINCIPAL_POLICY";
pub const POOL_REGISTRY_PATH_ENV: &str = "POOL_REGISTRY_PATH";
pub const WATCH_ADDRESSES_ENV: &str = "WATCH_ADDRESSES";
pub const REFRESH_INTERVAL_ENV: &str = "REFRESH_INTERVAL_SECS";

/// Environment variable selecting the log output format.
///
/// `json` emits one JSON object per line for log shipping; anything else
/// uses the human-readable formatter.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct StakingConfig {
    pub bind_addr: SocketAddr,
    pub network: NetworkConfig,
    pub node_url: String,
    pub indexer_url: String,
    pub http_timeout: Duration,
    pub activity_page_limit: u32,
    pub service: ServiceOptions,
    pub pool_registry_path: Option<PathBuf>,
    pub watch_addresses: Vec<AccountAddress>,
    pub refresh_interval: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.into(),
    }
}

impl StakingConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            vars.get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let host = get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, 8080)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|e| invalid(HOST_ENV, format!("{e}")))?;

        let network = match get(NETWORK_ENV) {
            Some(raw) => network_by_key(&raw)
                .ok_or_else(|| invalid(NETWORK_ENV, format!("unknown network `{raw}`")))?,
            None => APTOS_MAINNET,
        };

        let node_url = get(NODE_URL_ENV).unwrap_or_else(|| network.node_url.to_string());
        url::Url::parse(&node_url).map_err(|e| invalid(NODE_URL_ENV, e.to_string()))?;
        let indexer_url = get(INDEXER_URL_ENV).unwrap_or_else(|| network.indexer_url.to_string());
        url::Url::parse(&indexer_url).map_err(|e| invalid(INDEXER_URL_ENV, e.to_string()))?;

        let http_timeout = Duration::from_secs(parse_or(
            get(HTTP_TIMEOUT_ENV),
            HTTP_TIMEOUT_ENV,
            DEFAULT_HTTP_TIMEOUT.as_secs(),
        )?);
        let cache_ttl = Duration::from_secs(parse_or(
            get(CACHE_TTL_ENV),
            CACHE_TTL_ENV,
            DEFAULT_CACHE_TTL.as_secs(),
        )?);
        let cache_capacity = parse_or(get(CACHE_CAPACITY_ENV), CACHE_CAPACITY_ENV, DEFAULT_CACHE_CAPACITY)?;
        let activity_page_limit: u32 = parse_or(get(PAGE_LIMIT_ENV), PAGE_LIMIT_ENV, DEFAULT_PAGE_LIMIT)?;
        if activity_page_limit == 0 {
            return Err(invalid(PAGE_LIMIT_ENV, "must be at least 1"));
        }
        let apy_bps = parse_or(get(APY_BPS_ENV), APY_BPS_ENV, DEFAULT_APY_BPS)?;
        let policy = match get(PRINCIPAL_POLICY_ENV) {
            Some(raw) => raw
                .parse::<PrincipalPolicy>()
                .map_err(|e| invalid(PRINCIPAL_POLICY_ENV, e))?,
            None => PrincipalPolicy::default(),
        };

        let watch_addresses = match get(WATCH_ADDRESSES_ENV) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<AccountAddress>()
                        .map_err(|e| invalid(WATCH_ADDRESSES_ENV, e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let refresh_interval = Duration::from_secs(parse_or(
            get(REFRESH_INTERVAL_ENV),
            REFRESH_INTERVAL_ENV,
            DEFAULT_REFRESH_INTERVAL.as_secs(),
        )?);
        if refresh_interval.is_zero() {
            return Err(invalid(REFRESH_INTERVAL_ENV, "must be at least 1 second"));
        }

        Ok(Self {
            bind_addr,
            network,
            node_url,
            indexer_url,
            http_timeout,
            activity_page_limit,
            service: ServiceOptions {
                cache_ttl,
                cache_capacity,
                apy_bps,
                policy,
            },
            pool_registry_path: get(POOL_REGISTRY_PATH_ENV).map(PathBuf::from),
            watch_addresses,
            refresh_interval,
        })
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.parse().map_err(|e: T::Err| invalid(var, e.to_string())),
        None => Ok(default),
    }
}
