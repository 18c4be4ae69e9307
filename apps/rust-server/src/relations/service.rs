// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Create, accept/reject and delete relations.
//!
//! Contexts arrive as raw strings from the API and are resolved here before
//! the store is touched: an unrecognised context never reaches persistence.

use super::{RelationContext, RelationError, RelationRecord, RelationStore, UserRelation};

/// A relation requested by its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelation {
    pub sender_id: u64,
    pub receiver_id: u64,
    /// Raw context name (`friend`, `club` or `blocked`)
    pub context: String,
}

/// Relation operations over any [`RelationStore`].
pub struct RelationService<'a> {
    store: &'a dyn RelationStore,
}

impl<'a> RelationService<'a> {
    pub fn new(store: &'a dyn RelationStore) -> Self {
        Self { store }
    }

    /// Create a relation in the collection of its context.
    ///
    /// Club memberships count as accepted immediately; friend requests start
    /// pending; blocks carry no acceptance at all.
    pub fn create(&self, relation: &NewRelation) -> Result<UserRelation, RelationError> {
        let context: RelationContext = relation.context.parse()?;
        let (record, has_accepted) = match context {
            RelationContext::Club => (
                RelationRecord::Membership {
                    sender_id: relation.sender_id,
                    receiver_id: relation.receiver_id,
                },
                true,
            ),
            RelationContext::Friend => (
                RelationRecord::Tagged {
                    context,
                    sender_id: relation.sender_id,
                    receiver_id: relation.receiver_id,
                    has_accepted: Some(false),
                },
                false,
            ),
            RelationContext::Blocked => (
                RelationRecord::Tagged {
                    context,
                    sender_id: relation.sender_id,
                    receiver_id: relation.receiver_id,
                    has_accepted: None,
                },
                false,
            ),
        };

        let id = self.store.insert_relation(&record)?;
        tracing::debug!(
            relation_id = id,
            context = %context,
            collection = record.collection().name(),
            "Relation created"
        );

        Ok(UserRelation {
            id,
            sender_id: relation.sender_id,
            receiver_id: relation.receiver_id,
            context,
            has_accepted,
        })
    }

    /// Accept (`accept = true`) or reject a pending relation.
    ///
    /// Rejecting deletes the row. Blocks cannot be updated.
    pub fn update(
        &self,
        context: &str,
        relation_id: u64,
        accept: bool,
    ) -> Result<(), RelationError> {
        let context: RelationContext = context.parse()?;
        if context == RelationContext::Blocked {
            return Err(RelationError::NotImplemented("Unblocking a user"));
        }
        if !accept {
            return self.delete_in(context, relation_id);
        }
        self.store.accept_relation(context.collection(), relation_id)?;
        Ok(())
    }

    /// Delete a relation by id within its context's collection.
    pub fn delete(&self, context: &str, relation_id: u64) -> Result<(), RelationError> {
        let context: RelationContext = context.parse()?;
        self.delete_in(context, relation_id)
    }

    fn delete_in(&self, context: RelationContext, relation_id: u64) -> Result<(), RelationError> {
        self.store
            .delete_relation(context.collection(), relation_id)?;
        Ok(())
    }
}
