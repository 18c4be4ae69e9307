// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for users, preferences, run logs, clubs and relations.
//!
//! Handlers talk to the [`Database`] trait object held in
//! [`AppState`](crate::state::AppState); [`RedbStore`] is the production
//! implementation on an embedded redb file.
//!
//! ## Table Layout
//!
//! ```text
//! users            user_id → User (JSON)
//! user_emails      email → user_id
//! preferences      user_id → UserPreferences (JSON)
//! run_logs         (user_id, log_id) → RunLog (JSON)
//! user_relations   relation_id → friend / blocked row (JSON)
//! club_relations   relation_id → club membership row (JSON)
//! sequences        sequence name → last issued id
//! ```
//!
//! Every operation is a single redb transaction; nothing spans two calls.

pub mod database;
pub mod error;

pub use database::RedbStore;
pub use error::{StoreError, StoreResult};

use crate::models::{
    Club, ClubMember, NewClub, NewRunLog, NewUser, RunLog, User, UserPreferences,
};
use crate::relations::RelationStore;

pub trait UserStore: Send + Sync {
    /// Register a user with default preferences.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the email is taken.
    fn add_user(&self, user: &NewUser) -> StoreResult<User>;

    fn get_user(&self, user_id: u64) -> StoreResult<User>;

    fn get_user_by_email(&self, email: &str) -> StoreResult<User>;

    fn get_user_preferences(&self, email: &str) -> StoreResult<UserPreferences>;

    fn update_user_preferences(&self, email: &str, preferences: &UserPreferences)
        -> StoreResult<()>;
}

pub trait RunLogStore: Send + Sync {
    fn add_run_log(&self, user_id: u64, log: &NewRunLog) -> StoreResult<RunLog>;

    /// Runs of the user registered under `email`, oldest first.
    fn get_run_logs(&self, email: &str) -> StoreResult<Vec<RunLog>>;
}

pub trait ClubStore: Send + Sync {
    fn add_club(&self, owner_id: u64, club: &NewClub) -> StoreResult<Club>;

    fn get_club(&self, club_id: u64) -> StoreResult<Club>;

    fn get_clubs(&self) -> StoreResult<Vec<Club>>;

    fn delete_club(&self, club_id: u64) -> StoreResult<()>;

    fn add_club_member(&self, club_id: u64, user_id: u64, role: &str) -> StoreResult<()>;

    fn get_club_members(&self, club_id: u64) -> StoreResult<Vec<ClubMember>>;

    fn delete_club_member(&self, club_id: u64, user_id: u64) -> StoreResult<()>;
}

/// Everything the API needs from persistence.
pub trait Database: UserStore + RunLogStore + ClubStore + RelationStore {
    /// Cheap round trip proving the store is usable.
    fn health_check(&self) -> StoreResult<()>;
}
