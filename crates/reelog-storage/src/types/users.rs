//! User types, sharing preferences, and the deferred group-disposition queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, UserId};

/// User record
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    /// Premium tier: exempt from the free-tier group quotas.
    pub is_premium: bool,
    pub sharing: SharingPreferences,
    pub is_deactivated: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    /// Dispositions for owned groups, staged before account deletion and
    /// executed by an external reaper after the grace window expires.
    pub pending_group_actions: Vec<PendingGroupAction>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The three independent sharing toggles. Each one gates a category of the
/// user's content for group co-members; all default to off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SharingPreferences {
    pub share_watches: bool,
    pub share_ratings: bool,
    pub share_notes: bool,
}

/// A staged disposition for one owned group, serialized on the user row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingGroupAction {
    /// Hand the group to an existing member when the account is reaped.
    Transfer {
        group_id: GroupId,
        new_owner_id: UserId,
    },
    /// Delete the group when the account is reaped.
    Delete { group_id: GroupId },
}

impl PendingGroupAction {
    /// The group this action disposes of.
    pub fn group_id(&self) -> &GroupId {
        match self {
            PendingGroupAction::Transfer { group_id, .. } => group_id,
            PendingGroupAction::Delete { group_id } => group_id,
        }
    }
}

// GroupId/UserId are stored as plain UUIDs inside the serialized queue.
impl Serialize for GroupId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GroupId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(GroupId(uuid::Uuid::deserialize(deserializer)?))
    }
}

impl Serialize for UserId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(UserId(uuid::Uuid::deserialize(deserializer)?))
    }
}

/// Parameters for creating a user
#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub display_name: String,
    pub is_premium: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_sharing_preferences_default_all_off() {
        let prefs = SharingPreferences::default();
        assert!(!prefs.share_watches);
        assert!(!prefs.share_ratings);
        assert!(!prefs.share_notes);
    }

    #[test]
    fn test_pending_action_serde_roundtrip() {
        let actions = vec![
            PendingGroupAction::Transfer {
                group_id: GroupId(Uuid::new_v4()),
                new_owner_id: UserId(Uuid::new_v4()),
            },
            PendingGroupAction::Delete {
                group_id: GroupId(Uuid::new_v4()),
            },
        ];

        let json = serde_json::to_string(&actions).unwrap();
        let parsed: Vec<PendingGroupAction> = serde_json::from_str(&json).unwrap();
        assert_eq!(actions, parsed);
    }

    #[test]
    fn test_pending_action_tagged_format() {
        let action = PendingGroupAction::Delete {
            group_id: GroupId(Uuid::new_v4()),
        };
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"action\":\"delete\""));
    }

    #[test]
    fn test_pending_action_group_id() {
        let group_id = GroupId(Uuid::new_v4());
        let transfer = PendingGroupAction::Transfer {
            group_id: group_id.clone(),
            new_owner_id: UserId(Uuid::new_v4()),
        };
        let delete = PendingGroupAction::Delete {
            group_id: group_id.clone(),
        };
        assert_eq!(transfer.group_id(), &group_id);
        assert_eq!(delete.group_id(), &group_id);
    }
}
