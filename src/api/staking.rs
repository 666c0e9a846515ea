// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Staking position endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    blockchain::AccountAddress,
    error::ApiError,
    staking::{DelegatorStake, StakingStats},
    state::AppState,
};

fn parse_address(raw: &str) -> Result<AccountAddress, ApiError> {
    raw.parse::<AccountAddress>().map_err(ApiError::from)
}

/// Get the staking stats of an address.
///
/// Served from a short-lived cache; concurrent requests for the same address
/// share one reconciliation pass.
#[utoipa::path(
    get,
    path = "/v1/staking/{address}/stats",
    tag = "Staking",
    params(("address" = String, Path, description = "Delegator account address")),
    responses(
        (status = 200, description = "Reconciled staking stats", body = StakingStats),
        (status = 400, description = "Malformed address"),
        (status = 503, description = "Staking data unavailable")
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<StakingStats>, ApiError> {
    let address = parse_address(&address)?;
    let stats = state.staking.stats(&address).await?;
    Ok(Json(stats.as_ref().clone()))
}

/// Recompute the staking stats of an address, bypassing the cache.
///
/// Call after staking, unlocking, reactivating or withdrawing.
#[utoipa::path(
    post,
    path = "/v1/staking/{address}/refresh",
    tag = "Staking",
    params(("address" = String, Path, description = "Delegator account address")),
    responses(
        (status = 200, description = "Freshly reconciled staking stats", body = StakingStats),
        (status = 400, description = "Malformed address"),
        (status = 503, description = "Staking data unavailable")
    )
)]
pub async fn refresh_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<StakingStats>, ApiError> {
    let address = parse_address(&address)?;
    let stats = state.staking.refresh(&address).await?;
    Ok(Json(stats.as_ref().clone()))
}

/// Get the reconciled position of an address in one pool.
#[utoipa::path(
    get,
    path = "/v1/staking/{address}/pools/{pool}",
    tag = "Staking",
    params(
        ("address" = String, Path, description = "Delegator account address"),
        ("pool" = String, Path, description = "Delegation pool address")
    ),
    responses(
        (status = 200, description = "Reconciled position", body = DelegatorStake),
        (status = 400, description = "Malformed address"),
        (status = 404, description = "No stake in this pool")
    )
)]
pub async fn get_position(
    State(state): State<AppState>,
    Path((address, pool)): Path<(String, String)>,
) -> Result<Json<DelegatorStake>, ApiError> {
    let address = parse_address(&address)?;
    let pool = parse_address(&pool)?;

    let position = state.staking.position(&address, &pool).await;
    if position.balance_available && position.is_empty() {
        return Err(ApiError::not_found("No stake in this pool"));
    }
    Ok(Json(position))
}
