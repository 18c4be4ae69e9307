// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthGate;
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    pub auth: AuthGate,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, auth: AuthGate) -> Self {
        Self { db, auth }
    }
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
