// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain integration for delegation pools.
//!
//! This module provides functionality for:
//! - Calling view functions on a full node
//! - Decoding delegation pool stake and withdrawal responses
//! - Canonical account addresses and amount formatting

pub mod client;
pub mod delegation_pool;
pub mod types;

pub use client::{NodeClient, NodeClientError, DEFAULT_HTTP_TIMEOUT};
pub use delegation_pool::DelegationPoolView;
pub use types::*;
