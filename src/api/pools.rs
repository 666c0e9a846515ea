// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validator pool registry endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{staking::ValidatorPool, state::AppState};

/// Known validator pools.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    pub pools: Vec<ValidatorPool>,
}

/// List the known validator pools.
///
/// Reference data only: stats cover every pool an address holds shares in,
/// listed here or not.
#[utoipa::path(
    get,
    path = "/v1/pools",
    tag = "Pools",
    responses(
        (status = 200, description = "Known validator pools", body = PoolListResponse)
    )
)]
pub async fn list_pools(State(state): State<AppState>) -> Json<PoolListResponse> {
    Json(PoolListResponse {
        pools: state.staking.registry().pools().to_vec(),
    })
}
