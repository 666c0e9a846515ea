// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delegation pool view functions.
//!
//! Every response is normalised here, once. Nodes and SDK versions disagree
//! on the shape of multi-value returns (flat tuple, tuple wrapped in an
//! outer array, named object) and on integer encoding (JSON string or
//! number); the untagged serde enums below accept each of them and produce
//! the typed values the reconciler works with.

use serde::Deserialize;
use serde_json::Value;

use super::client::{NodeClient, NodeClientError};
use super::types::AccountAddress;
use crate::staking::types::{CurrentStakeBalances, WithdrawalStatus};

const GET_STAKE: &str = "0x1::delegation_pool::get_stake";
const GET_PENDING_WITHDRAWAL: &str = "0x1::delegation_pool::get_pending_withdrawal";
const GET_REMAINING_LOCKUP_SECS: &str = "0x1::stake::get_remaining_lockup_secs";

/// Move `u64` as encoded in JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum MoveU64 {
    Str(String),
    Num(u64),
}

impl MoveU64 {
    pub(crate) fn value(&self) -> Result<u64, NodeClientError> {
        match self {
            MoveU64::Num(n) => Ok(*n),
            MoveU64::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| NodeClientError::Decode(format!("not a u64: {s:?}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NamedStake {
    active: MoveU64,
    inactive: MoveU64,
    pending_inactive: MoveU64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StakeResponse {
    Flat((MoveU64, MoveU64, MoveU64)),
    Wrapped(((MoveU64, MoveU64, MoveU64),)),
    Named((NamedStake,)),
    Object(NamedStake),
}

#[derive(Debug, Deserialize)]
struct NamedWithdrawal {
    #[serde(alias = "can_withdraw_pending_inactive")]
    can_withdraw: bool,
    #[serde(alias = "withdrawable_amount", alias = "amount")]
    withdrawable: MoveU64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WithdrawalResponse {
    Flat((bool, MoveU64)),
    Wrapped(((bool, MoveU64),)),
    Named((NamedWithdrawal,)),
    Object(NamedWithdrawal),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SingleU64Response {
    Flat((MoveU64,)),
    Wrapped(((MoveU64,),)),
    Bare(MoveU64),
}

fn from_values<T: for<'de> Deserialize<'de>>(
    function: &str,
    values: Vec<Value>,
) -> Result<T, NodeClientError> {
    serde_json::from_value(Value::Array(values))
        .map_err(|e| NodeClientError::Decode(format!("{function}: {e}")))
}

/// Decode the result of `get_stake`.
pub fn decode_stake(values: Vec<Value>) -> Result<CurrentStakeBalances, NodeClientError> {
    let (active, inactive, pending_inactive) = match from_values(GET_STAKE, values)? {
        StakeResponse::Flat(t) | StakeResponse::Wrapped((t,)) => t,
        StakeResponse::Named((n,)) | StakeResponse::Object(n) => {
            (n.active, n.inactive, n.pending_inactive)
        }
    };

    Ok(CurrentStakeBalances {
        active: active.value()?,
        inactive: inactive.value()?,
        pending_inactive: pending_inactive.value()?,
    })
}

/// Decode the result of `get_pending_withdrawal`.
pub fn decode_withdrawal(values: Vec<Value>) -> Result<WithdrawalStatus, NodeClientError> {
    let (can_withdraw, withdrawable) = match from_values(GET_PENDING_WITHDRAWAL, values)? {
        WithdrawalResponse::Flat(t) | WithdrawalResponse::Wrapped((t,)) => t,
        WithdrawalResponse::Named((n,)) | WithdrawalResponse::Object(n) => {
            (n.can_withdraw, n.withdrawable)
        }
    };

    Ok(WithdrawalStatus {
        can_withdraw,
        withdrawable: withdrawable.value()?,
    })
}

/// Decode a single `u64` return value.
pub fn decode_u64(function: &str, values: Vec<Value>) -> Result<u64, NodeClientError> {
    // A lone value is sent either as `[v]` or, by some gateways, as `v`.
    let value = if values.len() == 1 {
        match from_values::<SingleU64Response>(function, values.clone()) {
            Ok(r) => r,
            Err(_) => serde_json::from_value(values[0].clone())
                .map_err(|e| NodeClientError::Decode(format!("{function}: {e}")))?,
        }
    } else {
        from_values(function, values)?
    };

    match value {
        SingleU64Response::Flat((v,)) | SingleU64Response::Wrapped(((v,),)) => v.value(),
        SingleU64Response::Bare(v) => v.value(),
    }
}

/// View wrapper for one delegation pool.
pub struct DelegationPoolView<'a> {
    client: &'a NodeClient,
    pool: &'a AccountAddress,
}

impl<'a> DelegationPoolView<'a> {
    pub fn new(client: &'a NodeClient, pool: &'a AccountAddress) -> Self {
        Self { client, pool }
    }

    /// `(active, inactive, pending_inactive)` of a delegator.
    pub async fn get_stake(
        &self,
        delegator: &AccountAddress,
    ) -> Result<CurrentStakeBalances, NodeClientError> {
        let values = self
            .client
            .view(
                GET_STAKE,
                vec![
                    Value::String(self.pool.to_string()),
                    Value::String(delegator.to_string()),
                ],
            )
            .await?;
        decode_stake(values)
    }

    /// Withdrawal status, or `None` if the pool does not expose it.
    pub async fn get_pending_withdrawal(
        &self,
        delegator: &AccountAddress,
    ) -> Result<Option<WithdrawalStatus>, NodeClientError> {
        let result = self
            .client
            .view(
                GET_PENDING_WITHDRAWAL,
                vec![
                    Value::String(self.pool.to_string()),
                    Value::String(delegator.to_string()),
                ],
            )
            .await;

        match result {
            Ok(values) => decode_withdrawal(values).map(Some),
            Err(NodeClientError::MissingFunction(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Seconds left in the pool's lock-up cycle, or `None` if not exposed.
    pub async fn get_remaining_lockup_secs(&self) -> Result<Option<u64>, NodeClientError> {
        let result = self
            .client
            .view(
                GET_REMAINING_LOCKUP_SECS,
                vec![Value::String(self.pool.to_string())],
            )
            .await;

        match result {
            Ok(values) => decode_u64(GET_REMAINING_LOCKUP_SECS, values).map(Some),
            Err(NodeClientError::MissingFunction(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
