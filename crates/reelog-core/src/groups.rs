//! Group lifecycle, membership administration, and the account-deactivation
//! staging workflow.

use std::collections::HashSet;
use std::sync::Arc;

use reelog_storage::{
    CreateGroupParams, Group, GroupId, GroupMember, GroupMemberHistory, GroupRole,
    MembershipAction, MembershipChange, MembershipChangeKind, PendingGroupAction, Store,
    StoreError, UserId,
};

use crate::config::QuotaConfig;
use crate::error::{optional, ServiceError};

/// A group together with its current member list.
#[derive(Clone, Debug)]
pub struct GroupWithMembers {
    pub group: Group,
    pub members: Vec<GroupMember>,
}

/// One owned group and who could take it over, for the deletion flow UI.
#[derive(Clone, Debug)]
pub struct GroupTransferEligibility {
    pub group: Group,
    /// Members who could receive ownership: not the owner, not deactivated,
    /// not soft-deleted.
    pub eligible_members: Vec<GroupMember>,
    pub can_transfer: bool,
}

pub struct GroupService<S> {
    store: Arc<S>,
    quotas: QuotaConfig,
}

impl<S: Store> GroupService<S> {
    pub fn new(store: Arc<S>, quotas: QuotaConfig) -> Self {
        Self { store, quotas }
    }

    /// Membership role of `user_id` in the group, `None` when not a member.
    async fn member_role(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<Option<GroupRole>, StoreError> {
        Ok(optional(self.store.get_group_member(group_id, user_id).await)?.map(|m| m.role))
    }

    // ─────────────────────────────── Group lifecycle ──────────────────────────────────────

    /// Create a group owned by `owner`. The owner becomes the sole Creator
    /// member and the first audit row is written in the same transaction.
    pub async fn create(
        &self,
        owner: &UserId,
        name: &str,
        description: Option<String>,
    ) -> Result<GroupWithMembers, ServiceError> {
        let user = self.store.get_user(owner).await?;
        if !user.is_premium {
            let owned = self.store.count_owned_groups(owner).await?;
            if owned >= self.quotas.free_owned_group_limit {
                return Err(ServiceError::QuotaExceeded(format!(
                    "free tier allows {} owned group(s)",
                    self.quotas.free_owned_group_limit
                )));
            }
        }

        let group_id = self
            .store
            .create_group(&CreateGroupParams {
                name: name.to_string(),
                description,
                created_by: owner.clone(),
            })
            .await?;
        tracing::info!(group_id = %group_id.0, owner = %owner.0, "group created");

        let group = self.store.get_group(&group_id).await?;
        let members = self.store.list_group_members(&group_id).await?;
        Ok(GroupWithMembers { group, members })
    }

    /// Update name and description. Creator or Admin only; `Ok(None)` for
    /// anyone else.
    pub async fn update(
        &self,
        group_id: &GroupId,
        requester: &UserId,
        name: &str,
        description: Option<String>,
    ) -> Result<Option<Group>, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(None);
        }
        match self.member_role(group_id, requester).await? {
            Some(role) if role.can_manage_members() => {}
            _ => return Ok(None),
        }

        self.store.update_group(group_id, name, description).await?;
        Ok(Some(self.store.get_group(group_id).await?))
    }

    /// Soft-delete a group. Creator only; `Ok(false)` for anyone else.
    pub async fn delete(&self, group_id: &GroupId, requester: &UserId) -> Result<bool, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(false);
        }
        if self.member_role(group_id, requester).await? != Some(GroupRole::Creator) {
            return Ok(false);
        }

        self.store.soft_delete_group(group_id).await?;
        tracing::info!(group_id = %group_id.0, "group deleted");
        Ok(true)
    }

    // ───────────────────────────────── Membership ─────────────────────────────────────────

    /// Add `target` with `role`. Requester must be Creator or Admin, else
    /// `Ok(None)`. Only `Member` and `Admin` can be granted here; the Creator
    /// role exists solely through group creation or an executed transfer.
    pub async fn add_member(
        &self,
        group_id: &GroupId,
        requester: &UserId,
        target: &UserId,
        role: GroupRole,
    ) -> Result<Option<GroupMember>, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(None);
        }
        match self.member_role(group_id, requester).await? {
            Some(r) if r.can_manage_members() => {}
            _ => return Ok(None),
        }
        if role == GroupRole::Creator {
            return Err(ServiceError::InvalidOperation(
                "cannot add a member as creator".into(),
            ));
        }

        let user = match optional(self.store.get_user(target).await)? {
            Some(user) => user,
            None => return Ok(None),
        };
        if self.member_role(group_id, target).await?.is_some() {
            return Err(ServiceError::DuplicateMember);
        }
        if !user.is_premium {
            let joined = self.store.count_joined_only_groups(target).await?;
            if joined >= self.quotas.free_joined_group_limit {
                return Err(ServiceError::QuotaExceeded(format!(
                    "free tier allows joining {} group(s)",
                    self.quotas.free_joined_group_limit
                )));
            }
        }

        let change = MembershipChange {
            group_id: group_id.clone(),
            user_id: target.clone(),
            actor_id: requester.clone(),
            kind: MembershipChangeKind::Add { role },
        };
        match self.store.apply_membership_change(&change).await {
            Ok(()) => {}
            // A concurrent add may win the race between our check and the
            // insert; the unique index reports it.
            Err(StoreError::AlreadyExists) => return Err(ServiceError::DuplicateMember),
            Err(e) => return Err(e.into()),
        }
        tracing::info!(
            group_id = %group_id.0,
            user = %target.0,
            role = role.as_str(),
            "member added"
        );

        Ok(Some(self.store.get_group_member(group_id, target).await?))
    }

    /// Remove `target` from the group. The Creator may remove anyone but
    /// themself; any member may remove themself (recorded as `Left`).
    /// `Ok(false)` for unauthorized requesters or absent memberships.
    pub async fn remove_member(
        &self,
        group_id: &GroupId,
        requester: &UserId,
        target: &UserId,
    ) -> Result<bool, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(false);
        }
        let target_role = match self.member_role(group_id, target).await? {
            Some(role) => role,
            None => return Ok(false),
        };
        if target_role == GroupRole::Creator {
            return Err(ServiceError::InvalidOperation(
                "creator cannot be removed".into(),
            ));
        }

        let action = if requester == target {
            MembershipAction::Left
        } else {
            if self.member_role(group_id, requester).await? != Some(GroupRole::Creator) {
                return Ok(false);
            }
            MembershipAction::Removed
        };

        self.store
            .apply_membership_change(&MembershipChange {
                group_id: group_id.clone(),
                user_id: target.clone(),
                actor_id: requester.clone(),
                kind: MembershipChangeKind::Remove { action },
            })
            .await?;
        tracing::info!(
            group_id = %group_id.0,
            user = %target.0,
            action = action.as_str(),
            "member removed"
        );
        Ok(true)
    }

    /// Change `target`'s role between Member and Admin. Requester must be
    /// Creator or Admin, else `Ok(None)`. The Creator's role is immutable and
    /// nobody can be promoted to Creator.
    pub async fn update_member_role(
        &self,
        group_id: &GroupId,
        requester: &UserId,
        target: &UserId,
        new_role: GroupRole,
    ) -> Result<Option<GroupMember>, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(None);
        }
        match self.member_role(group_id, requester).await? {
            Some(r) if r.can_manage_members() => {}
            _ => return Ok(None),
        }
        let target_role = match self.member_role(group_id, target).await? {
            Some(role) => role,
            None => return Ok(None),
        };
        if target_role == GroupRole::Creator {
            return Err(ServiceError::InvalidOperation(
                "creator role is immutable".into(),
            ));
        }
        if new_role == GroupRole::Creator {
            return Err(ServiceError::InvalidOperation(
                "cannot promote a member to creator".into(),
            ));
        }

        self.store
            .apply_membership_change(&MembershipChange {
                group_id: group_id.clone(),
                user_id: target.clone(),
                actor_id: requester.clone(),
                kind: MembershipChangeKind::ChangeRole { new_role },
            })
            .await?;
        tracing::info!(
            group_id = %group_id.0,
            user = %target.0,
            role = new_role.as_str(),
            "member role changed"
        );

        Ok(Some(self.store.get_group_member(group_id, target).await?))
    }

    /// Audit history of the group, newest first. Members only; `Ok(None)`
    /// for outsiders and missing groups.
    pub async fn member_history(
        &self,
        group_id: &GroupId,
        requester: &UserId,
    ) -> Result<Option<Vec<GroupMemberHistory>>, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(None);
        }
        if self.member_role(group_id, requester).await?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.store.list_member_history(group_id).await?))
    }

    // ──────────────────────────────────── Quotas ──────────────────────────────────────────

    /// Whether the user may create another group under their tier.
    pub async fn can_user_create_group(&self, user_id: &UserId) -> Result<bool, ServiceError> {
        let user = self.store.get_user(user_id).await?;
        if user.is_premium {
            return Ok(true);
        }
        let owned = self.store.count_owned_groups(user_id).await?;
        Ok(owned < self.quotas.free_owned_group_limit)
    }

    /// Whether the user may join another group they don't own.
    pub async fn can_user_join_group(&self, user_id: &UserId) -> Result<bool, ServiceError> {
        let user = self.store.get_user(user_id).await?;
        if user.is_premium {
            return Ok(true);
        }
        let joined = self.store.count_joined_only_groups(user_id).await?;
        Ok(joined < self.quotas.free_joined_group_limit)
    }

    // ───────────────────────────── Deactivation staging ───────────────────────────────────

    /// Owned groups with their transfer candidates, for choosing dispositions
    /// before staging account deletion.
    pub async fn created_groups_with_transfer_eligibility(
        &self,
        owner: &UserId,
    ) -> Result<Vec<GroupTransferEligibility>, ServiceError> {
        let groups = self.store.list_owned_groups(owner).await?;
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            let members = self.store.list_group_members(&group.id).await?;
            let mut eligible = Vec::new();
            for member in members {
                if member.user_id == *owner {
                    continue;
                }
                if let Some(user) = optional(self.store.get_user(&member.user_id).await)? {
                    if !user.is_deactivated {
                        eligible.push(member);
                    }
                }
            }
            out.push(GroupTransferEligibility {
                group,
                can_transfer: !eligible.is_empty(),
                eligible_members: eligible,
            });
        }
        Ok(out)
    }

    /// Validate and persist the user's group dispositions, then mark the
    /// account deactivated. Every owned group must be covered exactly once;
    /// transfer targets must be active members of that group. Execution is
    /// left to the reaper that runs after the grace window.
    pub async fn stage_account_deletion(
        &self,
        user_id: &UserId,
        actions: Vec<PendingGroupAction>,
    ) -> Result<(), ServiceError> {
        self.store.get_user(user_id).await?;
        let owned: HashSet<GroupId> = self
            .store
            .list_owned_groups(user_id)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        let mut covered = HashSet::new();
        for action in &actions {
            let group_id = action.group_id();
            if !owned.contains(group_id) {
                return Err(ServiceError::InvalidOperation(
                    "action references a group the user does not own".into(),
                ));
            }
            if !covered.insert(group_id.clone()) {
                return Err(ServiceError::InvalidOperation(
                    "group has more than one staged action".into(),
                ));
            }
            if let PendingGroupAction::Transfer { new_owner_id, .. } = action {
                if new_owner_id == user_id {
                    return Err(ServiceError::InvalidOperation(
                        "cannot transfer a group to its departing owner".into(),
                    ));
                }
                let is_member = optional(self.store.get_group_member(group_id, new_owner_id).await)?
                    .is_some();
                let active = match optional(self.store.get_user(new_owner_id).await)? {
                    Some(user) => !user.is_deactivated,
                    None => false,
                };
                if !is_member || !active {
                    return Err(ServiceError::InvalidOperation(
                        "not eligible to receive group ownership".into(),
                    ));
                }
            }
        }
        if covered.len() != owned.len() {
            return Err(ServiceError::InvalidOperation(
                "every owned group needs a staged action".into(),
            ));
        }

        self.store.deactivate_user(user_id, &actions).await?;
        tracing::info!(
            user = %user_id.0,
            staged = actions.len(),
            "account deletion staged"
        );
        Ok(())
    }

    /// Cancel a staged deletion: clears the deactivation flag and discards
    /// the pending dispositions.
    pub async fn reactivate(&self, user_id: &UserId) -> Result<(), ServiceError> {
        self.store.reactivate_user(user_id).await?;
        tracing::info!(user = %user_id.0, "account reactivated");
        Ok(())
    }
}
