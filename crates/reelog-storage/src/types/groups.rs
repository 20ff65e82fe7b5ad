//! Group, membership, and membership-history types.
//!
//! Group, member rows, and history rows form one transactional aggregate:
//! every membership mutation goes through [`MembershipChange`] so the audit
//! append can never be skipped.

use chrono::{DateTime, Utc};

use super::{GroupId, GroupRole, HistoryId, MembershipAction, UserId};

/// Group record
#[derive(Clone, Debug)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    /// Owner reference; always equals the single Creator member.
    pub created_by: UserId,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group membership record. (group_id, user_id) is unique.
#[derive(Clone, Debug)]
pub struct GroupMember {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Append-only audit row: one per membership transition, never mutated.
#[derive(Clone, Debug)]
pub struct GroupMemberHistory {
    pub id: HistoryId,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub action: MembershipAction,
    /// Who performed the transition (the removed user themself for `Left`).
    pub actor_id: UserId,
    pub previous_role: Option<GroupRole>,
    pub new_role: Option<GroupRole>,
    pub occurred_at: DateTime<Utc>,
}

/// Parameters for creating a group
#[derive(Clone, Debug)]
pub struct CreateGroupParams {
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
}

/// A single membership transition, applied atomically with its audit row.
#[derive(Clone, Debug)]
pub struct MembershipChange {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub actor_id: UserId,
    pub kind: MembershipChangeKind,
}

#[derive(Clone, Debug)]
pub enum MembershipChangeKind {
    /// Insert a member row with the given role.
    Add { role: GroupRole },
    /// Delete the member row; `action` distinguishes `Removed` from `Left`.
    Remove { action: MembershipAction },
    /// Update the member's role.
    ChangeRole { new_role: GroupRole },
}
