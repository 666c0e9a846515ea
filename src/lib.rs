// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Staking - Delegation Position Service
//!
//! Splits delegated stake into principal and accrued rewards per pool by
//! replaying the indexed staking activity log against current on-chain
//! balances, and serves the result to the wallet UI.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Full node view-function client and address types
//! - `indexer` - GraphQL client for staking activity and balance discovery
//! - `staking` - Reconciliation engine
//! - `storage` - In-process stats cache
//! - `refresher` - Background refresh of watched addresses

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod indexer;
pub mod refresher;
pub mod staking;
pub mod state;
pub mod storage;
