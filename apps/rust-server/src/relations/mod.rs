// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Relation Model
//!
//! A relation is a directed edge from a sender to a receiver, tagged with a
//! [`RelationContext`]:
//!
//! | Context | Receiver | Collection | Acceptance |
//! |---------|----------|------------|------------|
//! | `friend` | user | `user_relations` | starts `false`, set by accepting |
//! | `club` | club | `club_relations` | implicit, nothing written |
//! | `blocked` | user | `user_relations` | none |
//!
//! [`RelationContext::collection`] is the routing table. Stores pick a fixed
//! table per [`RelationCollection`]; collection names are never assembled at
//! runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::StoreError;

pub mod service;

pub use service::{NewRelation, RelationService};

/// Kind of relationship an edge models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelationContext {
    /// Friend request from one user to another
    Friend,
    /// Membership of a user in a club
    Club,
    /// A user blocking another user
    Blocked,
}

impl RelationContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationContext::Friend => "friend",
            RelationContext::Club => "club",
            RelationContext::Blocked => "blocked",
        }
    }

    /// Collection that stores relations of this context.
    pub fn collection(&self) -> RelationCollection {
        match self {
            RelationContext::Friend | RelationContext::Blocked => RelationCollection::UserRelations,
            RelationContext::Club => RelationCollection::ClubRelations,
        }
    }
}

impl FromStr for RelationContext {
    type Err = RelationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friend" => Ok(RelationContext::Friend),
            "club" => Ok(RelationContext::Club),
            "blocked" => Ok(RelationContext::Blocked),
            other => Err(RelationError::UnknownContext(other.to_string())),
        }
    }
}

impl fmt::Display for RelationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical collection holding relation rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationCollection {
    UserRelations,
    ClubRelations,
}

impl RelationCollection {
    pub fn name(&self) -> &'static str {
        match self {
            RelationCollection::UserRelations => "user_relations",
            RelationCollection::ClubRelations => "club_relations",
        }
    }
}

/// A relation row as written on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationRecord {
    /// Club membership: sender and receiver only
    Membership { sender_id: u64, receiver_id: u64 },
    /// User-to-user relation carrying its context tag
    Tagged {
        context: RelationContext,
        sender_id: u64,
        receiver_id: u64,
        /// `Some(false)` for pending friend requests, `None` for blocks
        has_accepted: Option<bool>,
    },
}

impl RelationRecord {
    pub fn collection(&self) -> RelationCollection {
        match self {
            RelationRecord::Membership { .. } => RelationCollection::ClubRelations,
            RelationRecord::Tagged { context, .. } => context.collection(),
        }
    }
}

/// A stored relation as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub struct UserRelation {
    pub id: u64,
    pub sender_id: u64,
    pub receiver_id: u64,
    pub context: RelationContext,
    pub has_accepted: bool,
}

/// Persistence seam for relations.
pub trait RelationStore: Send + Sync {
    /// Insert `record` into its collection and return the new row id.
    fn insert_relation(&self, record: &RelationRecord) -> Result<u64, StoreError>;

    /// Mark row `relation_id` of `collection` as accepted.
    fn accept_relation(
        &self,
        collection: RelationCollection,
        relation_id: u64,
    ) -> Result<(), StoreError>;

    /// Remove row `relation_id` of `collection`; removing a missing row is not an error.
    fn delete_relation(
        &self,
        collection: RelationCollection,
        relation_id: u64,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RelationError {
    #[error("unknown relation context {0:?}")]
    UnknownContext(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}
