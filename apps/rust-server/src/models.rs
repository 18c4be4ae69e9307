// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. JSON field names are
//! kebab-case (`uses-metric`, `started-at`, ...) to match the mobile client.
//!
//! ## Model Categories
//!
//! - **Users**: Profiles and preferences
//! - **Run Logs**: Recorded workouts
//! - **Relations**: Friend requests, club memberships, blocks
//! - **Clubs**: Groups of users (endpoints not available yet)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// User Models
// =============================================================================

/// A user profile.
///
/// `email` is only present on the owner's own view of the profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct User {
    pub id: u64,
    pub name: String,
    /// Avatar URL, empty when the user has none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub country: String,
    /// Registration time.
    pub since: DateTime<Utc>,
}

impl User {
    /// The profile as other users see it.
    pub fn public_profile(self) -> Self {
        Self {
            email: None,
            ..self
        }
    }
}

/// Data needed to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
}

/// Per-user display preferences.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct UserPreferences {
    /// Show distances in kilometres rather than miles.
    #[serde(default)]
    pub uses_metric: bool,
}

// =============================================================================
// Run Log Models
// =============================================================================

/// A recorded run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RunLog {
    pub id: u64,
    pub user_id: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Encoded route polyline.
    pub polyline: String,
    /// Distance in metres.
    pub distance: f64,
    /// Distance covered between two splits, in metres.
    pub split_interval: f64,
    /// Seconds taken for each split.
    pub splits: Vec<f64>,
    pub comment: String,
}

/// Request body for recording a run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NewRunLog {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    #[serde(default)]
    pub polyline: String,
    pub distance: f64,
    #[serde(default)]
    pub split_interval: f64,
    #[serde(default)]
    pub splits: Vec<f64>,
    #[serde(default)]
    pub comment: String,
}

// =============================================================================
// Relation Models
// =============================================================================

/// Request body for creating a relation from the caller to a receiver.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CreateRelationRequest {
    /// User id (`friend`, `blocked`) or club id (`club`).
    pub receiver_id: u64,
    /// `friend`, `club` or `blocked`.
    pub context: String,
}

/// Request body for accepting or rejecting a relation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateRelationRequest {
    pub context: String,
    /// `true` accepts the relation, `false` rejects (deletes) it.
    pub accept: bool,
}

/// Query string naming the context of the relation to delete.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RelationContextQuery {
    /// `friend`, `club` or `blocked`.
    pub context: String,
}

// =============================================================================
// Club Models
// =============================================================================

/// A group of users sharing activities.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Club {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar: String,
    pub since: DateTime<Utc>,
    /// User id of the owner.
    pub owner: u64,
    pub member_count: u64,
}

/// Request body for creating a club.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct NewClub {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

/// A club member as other members see them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ClubMember {
    pub id: u64,
    /// Public profile of the member.
    pub profile: User,
    pub role: String,
    pub since: DateTime<Utc>,
}

/// Request body for adding a member to a club.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct NewClubMember {
    pub user_id: u64,
    #[serde(default = "default_member_role")]
    pub role: String,
}

fn default_member_role() -> String {
    "member".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn public_profile_hides_email() {
        let user = User {
            id: 7,
            name: "Ada".into(),
            avatar: String::new(),
            email: Some("ada@x.com".into()),
            country: "USA".into(),
            since: Utc::now(),
        };

        let value = serde_json::to_value(user.public_profile()).unwrap();
        assert!(value.get("email").is_none());
        assert!(value.get("avatar").is_none());
        assert_eq!(value["country"], "USA");
    }

    #[test]
    fn preferences_use_kebab_case() {
        let prefs: UserPreferences = serde_json::from_value(json!({"uses-metric": true})).unwrap();
        assert!(prefs.uses_metric);
        assert_eq!(
            serde_json::to_value(prefs).unwrap(),
            json!({"uses-metric": true})
        );
    }

    #[test]
    fn run_log_request_defaults_optional_fields() {
        let log: NewRunLog = serde_json::from_value(json!({
            "started-at": "2026-03-01T07:00:00Z",
            "ended-at": "2026-03-01T07:30:00Z",
            "distance": 5012.5
        }))
        .unwrap();

        assert_eq!(log.distance, 5012.5);
        assert!(log.splits.is_empty());
        assert!(log.comment.is_empty());
    }

    #[test]
    fn club_member_role_defaults_to_member() {
        let member: NewClubMember = serde_json::from_value(json!({"user-id": 3})).unwrap();
        assert_eq!(member.role, "member");
    }
}
