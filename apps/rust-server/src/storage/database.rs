// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded store backed by redb (pure Rust, ACID).
//!
//! Rows are JSON documents; ids come from per-collection counters in the
//! `sequences` table, incremented inside the same write transaction as the
//! insert they belong to.

use std::path::Path;

use chrono::Utc;
use redb::{
    Database as RedbDatabase, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::{Deserialize, Serialize};

use super::{ClubStore, Database, RunLogStore, StoreError, StoreResult, UserStore};
use crate::models::{Club, ClubMember, NewClub, NewRunLog, NewUser, RunLog, User, UserPreferences};
use crate::relations::{RelationCollection, RelationContext, RelationRecord, RelationStore};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized User (JSON bytes).
const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique index: email → user_id.
const USER_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("user_emails");

/// user_id → serialized UserPreferences.
const PREFERENCES: TableDefinition<u64, &[u8]> = TableDefinition::new("preferences");

/// (user_id, log_id) → serialized RunLog. Scanning a user prefix yields
/// their runs in insertion order.
const RUN_LOGS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("run_logs");

/// Friend requests and blocks.
const USER_RELATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("user_relations");

/// Club memberships.
const CLUB_RELATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("club_relations");

/// Sequence name → last issued id.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const USER_SEQUENCE: &str = "users";
const RUN_LOG_SEQUENCE: &str = "run_logs";

fn relation_table(
    collection: RelationCollection,
) -> TableDefinition<'static, u64, &'static [u8]> {
    match collection {
        RelationCollection::UserRelations => USER_RELATIONS,
        RelationCollection::ClubRelations => CLUB_RELATIONS,
    }
}

/// Relation row as persisted.
///
/// Club rows carry neither `context` nor `has-accepted` until accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
struct StoredRelation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<RelationContext>,
    sender_id: u64,
    receiver_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    has_accepted: Option<bool>,
}

impl From<&RelationRecord> for StoredRelation {
    fn from(record: &RelationRecord) -> Self {
        match *record {
            RelationRecord::Membership {
                sender_id,
                receiver_id,
            } => Self {
                context: None,
                sender_id,
                receiver_id,
                has_accepted: None,
            },
            RelationRecord::Tagged {
                context,
                sender_id,
                receiver_id,
                has_accepted,
            } => Self {
                context: Some(context),
                sender_id,
                receiver_id,
                has_accepted,
            },
        }
    }
}

/// Bump and return the counter named `sequence`.
fn next_id(txn: &WriteTransaction, sequence: &str) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let next = table.get(sequence)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

// =============================================================================
// RedbStore
// =============================================================================

pub struct RedbStore {
    db: RedbDatabase,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = RedbDatabase::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAILS)?;
            let _ = write_txn.open_table(PREFERENCES)?;
            let _ = write_txn.open_table(RUN_LOGS)?;
            let _ = write_txn.open_table(USER_RELATIONS)?;
            let _ = write_txn.open_table(CLUB_RELATIONS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self { db })
    }

    fn user_id_for_email(&self, email: &str) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_EMAILS)?;
        table
            .get(email)?
            .map(|v| v.value())
            .ok_or_else(|| StoreError::NotFound(format!("User with email {email}")))
    }
}

// =============================================================================
// Users
// =============================================================================

impl UserStore for RedbStore {
    fn add_user(&self, user: &NewUser) -> StoreResult<User> {
        let write_txn = self.db.begin_write()?;
        let stored = {
            let taken = write_txn
                .open_table(USER_EMAILS)?
                .get(user.email.as_str())?
                .is_some();
            if taken {
                return Err(StoreError::AlreadyExists(format!(
                    "User with email {}",
                    user.email
                )));
            }

            let id = next_id(&write_txn, USER_SEQUENCE)?;
            let stored = User {
                id,
                name: user.name.clone(),
                avatar: String::new(),
                email: Some(user.email.clone()),
                country: "USA".to_string(),
                since: Utc::now(),
            };

            let json = serde_json::to_vec(&stored)?;
            write_txn.open_table(USERS)?.insert(id, json.as_slice())?;
            write_txn
                .open_table(USER_EMAILS)?
                .insert(user.email.as_str(), id)?;

            let prefs = serde_json::to_vec(&UserPreferences::default())?;
            write_txn.open_table(PREFERENCES)?.insert(id, prefs.as_slice())?;
            stored
        };
        write_txn.commit()?;

        tracing::info!(user_id = stored.id, "User registered");
        Ok(stored)
    }

    fn get_user(&self, user_id: u64) -> StoreResult<User> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("User {user_id}"))),
        }
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        let user_id = self.user_id_for_email(email)?;
        self.get_user(user_id)
    }

    fn get_user_preferences(&self, email: &str) -> StoreResult<UserPreferences> {
        let user_id = self.user_id_for_email(email)?;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PREFERENCES)?;
        match table.get(user_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(UserPreferences::default()),
        }
    }

    fn update_user_preferences(
        &self,
        email: &str,
        preferences: &UserPreferences,
    ) -> StoreResult<()> {
        let user_id = self.user_id_for_email(email)?;
        let json = serde_json::to_vec(preferences)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PREFERENCES)?;
            table.insert(user_id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// Run Logs
// =============================================================================

impl RunLogStore for RedbStore {
    fn add_run_log(&self, user_id: u64, log: &NewRunLog) -> StoreResult<RunLog> {
        let write_txn = self.db.begin_write()?;
        let stored = {
            if write_txn.open_table(USERS)?.get(user_id)?.is_none() {
                return Err(StoreError::NotFound(format!("User {user_id}")));
            }

            let id = next_id(&write_txn, RUN_LOG_SEQUENCE)?;
            let stored = RunLog {
                id,
                user_id,
                started_at: log.started_at,
                ended_at: log.ended_at,
                polyline: log.polyline.clone(),
                distance: log.distance,
                split_interval: log.split_interval,
                splits: log.splits.clone(),
                comment: log.comment.clone(),
            };

            let json = serde_json::to_vec(&stored)?;
            write_txn
                .open_table(RUN_LOGS)?
                .insert((user_id, id), json.as_slice())?;
            stored
        };
        write_txn.commit()?;
        Ok(stored)
    }

    fn get_run_logs(&self, email: &str) -> StoreResult<Vec<RunLog>> {
        let user_id = self.user_id_for_email(email)?;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RUN_LOGS)?;

        let mut logs = Vec::new();
        for entry in table.range((user_id, 0)..=(user_id, u64::MAX))? {
            let (_, value) = entry?;
            logs.push(serde_json::from_slice(value.value())?);
        }
        Ok(logs)
    }
}

// =============================================================================
// Clubs
// =============================================================================

impl ClubStore for RedbStore {
    fn add_club(&self, _owner_id: u64, _club: &NewClub) -> StoreResult<Club> {
        Err(StoreError::NotImplemented("Creating a club"))
    }

    fn get_club(&self, _club_id: u64) -> StoreResult<Club> {
        Err(StoreError::NotImplemented("Fetching a club"))
    }

    fn get_clubs(&self) -> StoreResult<Vec<Club>> {
        Err(StoreError::NotImplemented("Listing clubs"))
    }

    fn delete_club(&self, _club_id: u64) -> StoreResult<()> {
        Err(StoreError::NotImplemented("Deleting a club"))
    }

    fn add_club_member(&self, _club_id: u64, _user_id: u64, _role: &str) -> StoreResult<()> {
        Err(StoreError::NotImplemented("Adding a club member"))
    }

    fn get_club_members(&self, _club_id: u64) -> StoreResult<Vec<ClubMember>> {
        Err(StoreError::NotImplemented("Listing club members"))
    }

    fn delete_club_member(&self, _club_id: u64, _user_id: u64) -> StoreResult<()> {
        Err(StoreError::NotImplemented("Removing a club member"))
    }
}

// =============================================================================
// Relations
// =============================================================================

impl RelationStore for RedbStore {
    fn insert_relation(&self, record: &RelationRecord) -> StoreResult<u64> {
        let collection = record.collection();
        let json = serde_json::to_vec(&StoredRelation::from(record))?;

        let write_txn = self.db.begin_write()?;
        let id = next_id(&write_txn, collection.name())?;
        {
            let mut table = write_txn.open_table(relation_table(collection))?;
            table.insert(id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(id)
    }

    fn accept_relation(&self, collection: RelationCollection, relation_id: u64) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(relation_table(collection))?;

            let existing_bytes = {
                let existing = table.get(relation_id)?.ok_or_else(|| {
                    StoreError::NotFound(format!("Relation {relation_id} in {}", collection.name()))
                })?;
                existing.value().to_vec()
            };

            let mut row: StoredRelation = serde_json::from_slice(&existing_bytes)?;
            row.has_accepted = Some(true);

            let json = serde_json::to_vec(&row)?;
            table.insert(relation_id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_relation(&self, collection: RelationCollection, relation_id: u64) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(relation_table(collection))?;
            table.remove(relation_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

impl Database for RedbStore {
    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
