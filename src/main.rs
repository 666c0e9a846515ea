// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use relational_staking_server::{
    api::router,
    blockchain::NodeClient,
    config::{StakingConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    indexer::IndexerClient,
    refresher::StatsRefresher,
    staking::{PoolRegistry, StakingStatsService},
    state::AppState,
};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = StakingConfig::from_env().expect("Invalid configuration");

    let node = NodeClient::new(config.node_url.clone(), config.http_timeout)
        .expect("Failed to build node client");
    let indexer = IndexerClient::new(
        config.indexer_url.clone(),
        config.activity_page_limit,
        config.http_timeout,
    )
    .expect("Failed to build indexer client");

    let registry = match &config.pool_registry_path {
        Some(path) => PoolRegistry::from_json_file(path).expect("Failed to load pool registry"),
        None => PoolRegistry::builtin().expect("Built-in pool registry is invalid"),
    };

    tracing::info!(
        network = config.network.name,
        node_url = %config.node_url,
        indexer_url = %config.indexer_url,
        pools = registry.len(),
        policy = ?config.service.policy,
        "Staking service configured"
    );

    let staking = Arc::new(StakingStatsService::new(
        Arc::new(node),
        Arc::new(indexer),
        Arc::new(registry),
        config.service.clone(),
    ));

    let shutdown = CancellationToken::new();
    let refresher = StatsRefresher::new(
        Arc::clone(&staking),
        config.watch_addresses.clone(),
        config.refresh_interval,
    );
    let refresher_handle = tokio::spawn(refresher.run(shutdown.clone()));

    let app = router(AppState::new(staking));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %config.bind_addr, "Relational Staking listening (docs at /docs)");

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {},
                _ = server_shutdown.cancelled() => {},
            }
            tracing::info!("Shutting down gracefully");
        })
        .await;

    shutdown.cancel();
    if let Err(e) = refresher_handle.await {
        tracing::warn!(error = %e, "Stats refresher task failed");
    }
    if let Err(e) = served {
        tracing::error!(error = %e, "HTTP server failed");
    }
}
