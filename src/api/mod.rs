// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::AccountAddress,
    staking::{DelegatorStake, HistoryConfidence, StakingStats, ValidatorPool},
    state::AppState,
};

pub mod health;
pub mod pools;
pub mod staking;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/pools", get(pools::list_pools))
        .route("/staking/{address}/stats", get(staking::get_stats))
        .route("/staking/{address}/refresh", post(staking::refresh_stats))
        .route(
            "/staking/{address}/pools/{pool}",
            get(staking::get_position),
        );

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        pools::list_pools,
        staking::get_stats,
        staking::refresh_stats,
        staking::get_position,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AccountAddress,
            ValidatorPool,
            DelegatorStake,
            HistoryConfidence,
            StakingStats,
            pools::PoolListResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Staking", description = "Reconciled staking positions and rewards"),
        (name = "Pools", description = "Validator pool registry"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
