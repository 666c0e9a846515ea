// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::staking::StakingStatsService;

#[derive(Clone)]
pub struct AppState {
    pub staking: Arc<StakingStatsService>,
}

impl AppState {
    pub fn new(staking: Arc<StakingStatsService>) -> Self {
        Self { staking }
    }
}
