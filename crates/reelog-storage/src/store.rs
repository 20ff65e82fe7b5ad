//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait `reelog-core` depends on.
///
/// Every method that mutates membership state also appends its audit-history
/// row in the same transaction; backends must not expose a way to do one
/// without the other.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Users ──────────────────────────────────────────

    /// Create a new user (returns generated ID).
    async fn create_user(&self, params: &CreateUserParams) -> Result<UserId, StoreError>;

    /// Get user by ID. Soft-deleted users are `NotFound`.
    async fn get_user(&self, user_id: &UserId) -> Result<User, StoreError>;

    /// Replace the user's sharing toggles.
    async fn set_sharing_preferences(
        &self,
        user_id: &UserId,
        prefs: &SharingPreferences,
    ) -> Result<(), StoreError>;

    /// Set or clear the premium tier flag.
    async fn set_premium(&self, user_id: &UserId, is_premium: bool) -> Result<(), StoreError>;

    /// Mark the user deactivated and persist the staged group dispositions.
    /// The queue replaces any previously staged actions.
    async fn deactivate_user(
        &self,
        user_id: &UserId,
        actions: &[PendingGroupAction],
    ) -> Result<(), StoreError>;

    /// Clear deactivation state and discard any staged group dispositions.
    async fn reactivate_user(&self, user_id: &UserId) -> Result<(), StoreError>;

    /// Soft-delete the user (performed by the external reaper after the
    /// grace window; this core never calls it directly).
    async fn soft_delete_user(&self, user_id: &UserId) -> Result<(), StoreError>;

    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    /// Create a group, its Creator member row, and the `Added` history row in
    /// one transaction (returns the generated group ID).
    async fn create_group(&self, params: &CreateGroupParams) -> Result<GroupId, StoreError>;

    /// Get group by ID. Soft-deleted groups are `NotFound`.
    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError>;

    /// Update group name and description.
    async fn update_group(
        &self,
        group_id: &GroupId,
        name: &str,
        description: Option<String>,
    ) -> Result<(), StoreError>;

    /// Soft-delete a group.
    async fn soft_delete_group(&self, group_id: &GroupId) -> Result<(), StoreError>;

    /// Number of non-deleted groups the user created.
    async fn count_owned_groups(&self, user_id: &UserId) -> Result<i64, StoreError>;

    /// Number of non-deleted groups the user belongs to but did not create.
    async fn count_joined_only_groups(&self, user_id: &UserId) -> Result<i64, StoreError>;

    /// All non-deleted groups the user created.
    async fn list_owned_groups(&self, user_id: &UserId) -> Result<Vec<Group>, StoreError>;

    // ─────────────────────────────────── Membership ───────────────────────────────────────

    /// Get a user's membership row in a group.
    async fn get_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<GroupMember, StoreError>;

    /// List all members of a group.
    async fn list_group_members(&self, group_id: &GroupId)
        -> Result<Vec<GroupMember>, StoreError>;

    /// Apply a membership transition and append exactly one history row, in
    /// one transaction. `Add` on an existing member is `AlreadyExists`;
    /// `Remove`/`ChangeRole` on a missing member is `NotFound`.
    async fn apply_membership_change(&self, change: &MembershipChange) -> Result<(), StoreError>;

    /// List the audit history of a group, newest first.
    async fn list_member_history(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<GroupMemberHistory>, StoreError>;

    /// IDs of all non-deleted groups the user belongs to.
    async fn list_user_group_ids(&self, user_id: &UserId) -> Result<Vec<GroupId>, StoreError>;

    /// Whether two users hold memberships in at least one common non-deleted
    /// group. Indexed join; called per feed item, so backends should not
    /// materialize either membership set.
    async fn users_share_group(&self, a: &UserId, b: &UserId) -> Result<bool, StoreError>;

    // ───────────────────────────────────── Watches ────────────────────────────────────────

    /// Create a watch (returns generated ID).
    async fn create_watch(&self, params: &CreateWatchParams) -> Result<WatchId, StoreError>;

    /// Get watch by ID. Soft-deleted watches are `NotFound`.
    async fn get_watch(&self, watch_id: &WatchId) -> Result<Watch, StoreError>;

    /// All non-deleted watches owned by a user, newest watched first.
    async fn list_watches_by_owner(&self, owner_id: &UserId) -> Result<Vec<Watch>, StoreError>;

    /// Replace the mutable fields of a watch.
    async fn update_watch(
        &self,
        watch_id: &WatchId,
        params: &UpdateWatchParams,
    ) -> Result<(), StoreError>;

    /// Soft-delete a watch.
    async fn soft_delete_watch(&self, watch_id: &WatchId) -> Result<(), StoreError>;

    /// Share a watch into a group. Sharing twice is `AlreadyExists`.
    async fn share_watch_to_group(
        &self,
        watch_id: &WatchId,
        group_id: &GroupId,
    ) -> Result<(), StoreError>;

    /// Remove a watch's share from a group.
    async fn unshare_watch_from_group(
        &self,
        watch_id: &WatchId,
        group_id: &GroupId,
    ) -> Result<(), StoreError>;

    /// All non-deleted watches shared into a group whose owners are not
    /// soft-deleted, newest watched first.
    async fn list_group_watches(&self, group_id: &GroupId) -> Result<Vec<Watch>, StoreError>;
}
