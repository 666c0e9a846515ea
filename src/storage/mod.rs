// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process storage. Stats are derived data and are never persisted.

pub mod stats_cache;

pub use stats_cache::StatsCache;
