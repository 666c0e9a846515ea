// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Staking Indexer Client
//!
//! GraphQL client for the indexer's delegated-staking tables.
//!
//! ## Queries
//!
//! 1. **Activity log**: `delegated_staking_activities` for one delegator,
//!    newest first, capped at `page_limit` rows. Only add, unlock and
//!    reactivate events are kept; withdrawals and reward distributions do not
//!    move principal between buckets.
//! 2. **Balance discovery**: `current_delegator_balances` rows for one
//!    delegator, used to find every pool the account has ever held shares in,
//!    including pools no longer in the registry.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::blockchain::delegation_pool::MoveU64;
use crate::blockchain::AccountAddress;
use crate::staking::types::{
    ActivityPage, DelegationRow, EventSequence, StakeActivityEvent, StakeEventKind,
};

/// Default number of activity rows fetched per delegator.
pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

const ACTIVITIES_QUERY: &str = r#"
query DelegatorStakeActivities($delegator: String!, $limit: Int!) {
  delegated_staking_activities(
    where: { delegator_address: { _eq: $delegator } }
    order_by: [{ transaction_version: desc }, { event_index: desc }]
    limit: $limit
  ) {
    pool_address
    event_type
    amount
    transaction_version
    event_index
  }
}
"#;

const DELEGATED_POOLS_QUERY: &str = r#"
query DelegatorPools($delegator: String!) {
  current_delegator_balances(
    where: { delegator_address: { _eq: $delegator } }
    order_by: { pool_address: asc }
  ) {
    pool_address
    shares
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ActivitiesData {
    delegated_staking_activities: Vec<ActivityRow>,
}

#[derive(Debug, Deserialize)]
struct ActivityRow {
    pool_address: String,
    event_type: String,
    amount: MoveU64,
    transaction_version: MoveU64,
    event_index: MoveU64,
}

#[derive(Debug, Deserialize)]
struct DelegatedPoolsData {
    current_delegator_balances: Vec<BalanceRow>,
}

#[derive(Debug, Deserialize)]
struct BalanceRow {
    pool_address: String,
    shares: Value,
}

/// Map an indexer event type (`0x1::delegation_pool::AddStakeEvent`, ...)
/// to the kinds that move principal.
fn event_kind(event_type: &str) -> Option<StakeEventKind> {
    let name = event_type.rsplit("::").next().unwrap_or(event_type);
    match name {
        "AddStakeEvent" | "AddStake" => Some(StakeEventKind::AddStake),
        "UnlockStakeEvent" | "UnlockStake" => Some(StakeEventKind::UnlockStake),
        "ReactivateStakeEvent" | "ReactivateStake" => Some(StakeEventKind::ReactivateStake),
        _ => None,
    }
}

fn decode_activities(
    rows: Vec<ActivityRow>,
    page_limit: u32,
) -> Result<ActivityPage, IndexerError> {
    let mut truncated = rows.len() >= page_limit as usize;
    let mut events = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(kind) = event_kind(&row.event_type) else {
            continue;
        };
        // A row we cannot attribute to a pool is dropped; the page then no
        // longer holds the full history of whichever pool it belonged to.
        let pool_address = match row.pool_address.parse::<AccountAddress>() {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(
                    pool_address = %row.pool_address,
                    error = %e,
                    "Skipping activity row with unparseable pool address"
                );
                truncated = true;
                continue;
            }
        };
        let decode = |v: &MoveU64| v.value().map_err(|e| IndexerError::InvalidResponse(e.to_string()));

        events.push(StakeActivityEvent {
            pool_address,
            kind,
            amount: decode(&row.amount)?,
            sequence: EventSequence {
                transaction_version: decode(&row.transaction_version)?,
                event_index: decode(&row.event_index)?,
            },
        });
    }

    Ok(ActivityPage { events, truncated })
}

fn decode_delegated_pools(rows: Vec<BalanceRow>) -> Result<Vec<DelegationRow>, IndexerError> {
    rows.into_iter()
        .map(|row| {
            let pool_address = row
                .pool_address
                .parse::<AccountAddress>()
                .map_err(|e| IndexerError::InvalidResponse(e.to_string()))?;
            let shares = match row.shares {
                Value::String(s) => s,
                Value::Null => "0".to_string(),
                other => other.to_string(),
            };
            Ok(DelegationRow {
                pool_address,
                shares,
            })
        })
        .collect()
}

/// Indexer GraphQL client.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    endpoint: String,
    page_limit: u32,
    http: Client,
}

impl IndexerClient {
    /// Create a client for the given GraphQL endpoint.
    pub fn new(
        endpoint: impl Into<String>,
        page_limit: u32,
        timeout: Duration,
    ) -> Result<Self, IndexerError> {
        let endpoint: String = endpoint.into();
        url::Url::parse(&endpoint).map_err(|e| IndexerError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            page_limit: page_limit.max(1),
            http,
        })
    }

    /// Add/unlock/reactivate events of a delegator across all pools, newest
    /// first.
    pub async fn stake_activities(
        &self,
        delegator: &AccountAddress,
    ) -> Result<ActivityPage, IndexerError> {
        let data: ActivitiesData = self
            .query(
                ACTIVITIES_QUERY,
                json!({ "delegator": delegator.as_str(), "limit": self.page_limit }),
            )
            .await?;

        let page = decode_activities(data.delegated_staking_activities, self.page_limit)?;
        if page.truncated {
            tracing::warn!(
                delegator = %delegator,
                limit = self.page_limit,
                "Activity log hit the page limit, older events may be missing"
            );
        }
        Ok(page)
    }

    /// Balance rows of a delegator, one per pool and share type.
    pub async fn delegated_pools(
        &self,
        delegator: &AccountAddress,
    ) -> Result<Vec<DelegationRow>, IndexerError> {
        let data: DelegatedPoolsData = self
            .query(
                DELEGATED_POOLS_QUERY,
                json!({ "delegator": delegator.as_str() }),
            )
            .await?;

        decode_delegated_pools(data.current_delegator_balances)
    }

    async fn query<T: for<'de> Deserialize<'de>>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, IndexerError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| IndexerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexerError::Request(format!(
                "HTTP {} from indexer",
                response.status()
            )));
        }

        let body: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| IndexerError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.errors.first() {
            return Err(IndexerError::Graphql(error.message.clone()));
        }

        body.data
            .ok_or_else(|| IndexerError::InvalidResponse("missing data".to_string()))
    }
}

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("Invalid indexer URL: {0}")]
    InvalidUrl(String),

    #[error("Indexer request failed: {0}")]
    Request(String),

    #[error("Indexer query error: {0}")]
    Graphql(String),

    #[error("Malformed indexer response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pool: &str, event_type: &str, amount: &str, version: u64) -> ActivityRow {
        ActivityRow {
            pool_address: pool.to_string(),
            event_type: event_type.to_string(),
            amount: MoveU64::Str(amount.to_string()),
            transaction_version: MoveU64::Num(version),
            event_index: MoveU64::Num(0),
        }
    }

    #[test]
    fn event_kind_mapping() {
        assert_eq!(
            event_kind("0x1::delegation_pool::AddStakeEvent"),
            Some(StakeEventKind::AddStake)
        );
        assert_eq!(
            event_kind("0x1::delegation_pool::UnlockStakeEvent"),
            Some(StakeEventKind::UnlockStake)
        );
        assert_eq!(
            event_kind("0x1::delegation_pool::ReactivateStakeEvent"),
            Some(StakeEventKind::ReactivateStake)
        );
        assert_eq!(event_kind("0x1::delegation_pool::WithdrawStakeEvent"), None);
        assert_eq!(event_kind("0x1::delegation_pool::DistributeCommissionEvent"), None);
    }

    #[test]
    fn activities_skip_irrelevant_events_and_keep_order() {
        let rows = vec![
            row("0xa", "0x1::delegation_pool::UnlockStakeEvent", "40", 20),
            row("0xa", "0x1::delegation_pool::WithdrawStakeEvent", "5", 15),
            row("0xa", "0x1::delegation_pool::AddStakeEvent", "100", 10),
        ];

        let page = decode_activities(rows, 100).unwrap();
        assert!(!page.truncated);
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.events[0].kind, StakeEventKind::UnlockStake);
        assert_eq!(page.events[0].amount, 40);
        assert_eq!(page.events[1].sequence.transaction_version, 10);
    }

    #[test]
    fn full_page_is_marked_truncated() {
        let rows = vec![
            row("0xa", "0x1::delegation_pool::AddStakeEvent", "1", 2),
            row("0xa", "0x1::delegation_pool::AddStakeEvent", "1", 1),
        ];
        assert!(decode_activities(rows, 2).unwrap().truncated);
    }

    #[test]
    fn unattributable_row_is_skipped_and_page_marked_truncated() {
        let rows = vec![
            row("0xa", "0x1::delegation_pool::AddStakeEvent", "100", 2),
            row("pool", "0x1::delegation_pool::AddStakeEvent", "1", 1),
        ];
        let page = decode_activities(rows, 10).unwrap();
        assert!(page.truncated);
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.events[0].amount, 100);
    }

    #[test]
    fn activities_reject_bad_amounts() {
        let rows = vec![row("0xa", "0x1::delegation_pool::AddStakeEvent", "1.5", 1)];
        assert!(matches!(
            decode_activities(rows, 10),
            Err(IndexerError::InvalidResponse(_))
        ));
    }

    #[test]
    fn graphql_response_parses() {
        let raw = r#"{"data":{"current_delegator_balances":[
            {"pool_address":"0xA","shares":"12.5"},
            {"pool_address":"0xb","shares":0}
        ]}}"#;
        let body: GraphqlResponse<DelegatedPoolsData> = serde_json::from_str(raw).unwrap();
        let pools = decode_delegated_pools(body.data.unwrap().current_delegator_balances).unwrap();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].pool_address.as_str(), format!("0x{:0>64}", "a"));
        assert_eq!(pools[0].shares, "12.5");
        assert_eq!(pools[1].shares, "0");
    }

    #[test]
    fn graphql_errors_are_surfaced() {
        let raw = r#"{"errors":[{"message":"field not found"}]}"#;
        let body: GraphqlResponse<DelegatedPoolsData> = serde_json::from_str(raw).unwrap();
        assert!(body.data.is_none());
        assert_eq!(body.errors[0].message, "field not found");
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let err = IndexerClient::new("nope", DEFAULT_PAGE_LIMIT, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, IndexerError::InvalidUrl(_)));
    }
}
