//! SQLite backend for the reelog [`Store`] trait.
//!
//! Ids are stored as UUID strings, timestamps as unix seconds, and the
//! pending-group-action queue as a JSON array on the user row. Membership
//! mutations and their history appends run in a single transaction.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

use reelog_storage::{
    CreateGroupParams, CreateUserParams, CreateWatchParams, Group, GroupId, GroupMember,
    GroupMemberHistory, GroupRole, HistoryId, MembershipChange, MembershipChangeKind, MovieId,
    PendingGroupAction, SharingPreferences, Store, StoreError, UpdateWatchParams, User, UserId,
    Watch, WatchId,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(url, "sqlite store opened");
        Ok(Self { pool })
    }
}

// ───────────────────────────── Row mapping helpers ─────────────────────────────

fn dt(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("bad timestamp: {secs}")))
}

fn opt_dt(secs: Option<i64>) -> Result<Option<DateTime<Utc>>, StoreError> {
    secs.map(dt).transpose()
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn parse_role(s: &str) -> Result<GroupRole, StoreError> {
    s.parse().map_err(|_| StoreError::Backend(format!("bad role: {s}")))
}

fn map_insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

type UserRow = (
    String,         // id
    String,         // display_name
    i64,            // is_premium
    i64,            // share_watches
    i64,            // share_ratings
    i64,            // share_notes
    i64,            // is_deactivated
    Option<i64>,    // deactivated_at
    String,         // pending_group_actions (JSON)
    Option<i64>,    // deleted_at
    i64,            // created_at
    i64,            // updated_at
);

fn user_from_row(row: UserRow) -> Result<User, StoreError> {
    let (id, display_name, premium, sw, sr, sn, deact, deact_at, pending, deleted, created, updated) =
        row;
    let pending_group_actions: Vec<PendingGroupAction> =
        serde_json::from_str(&pending).map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(User {
        id: UserId(parse_uuid(&id)?),
        display_name,
        is_premium: premium != 0,
        sharing: SharingPreferences {
            share_watches: sw != 0,
            share_ratings: sr != 0,
            share_notes: sn != 0,
        },
        is_deactivated: deact != 0,
        deactivated_at: opt_dt(deact_at)?,
        pending_group_actions,
        deleted_at: opt_dt(deleted)?,
        created_at: dt(created)?,
        updated_at: dt(updated)?,
    })
}

type GroupRow = (
    String,         // id
    String,         // name
    Option<String>, // description
    String,         // created_by
    Option<i64>,    // deleted_at
    i64,            // created_at
    i64,            // updated_at
);

fn group_from_row(row: GroupRow) -> Result<Group, StoreError> {
    let (id, name, description, created_by, deleted, created, updated) = row;
    Ok(Group {
        id: GroupId(parse_uuid(&id)?),
        name,
        description,
        created_by: UserId(parse_uuid(&created_by)?),
        deleted_at: opt_dt(deleted)?,
        created_at: dt(created)?,
        updated_at: dt(updated)?,
    })
}

const GROUP_COLS: &str = "id,name,description,created_by,deleted_at,created_at,updated_at";

type WatchRow = (
    String,         // id
    String,         // owner_id
    String,         // movie_id
    String,         // movie_title
    i64,            // watched_date
    Option<i64>,    // rating
    Option<String>, // notes
    Option<String>, // location
    Option<String>, // companions
    i64,            // is_rewatch
    i64,            // is_private
    Option<i64>,    // deleted_at
    i64,            // created_at
);

fn watch_from_row(row: WatchRow) -> Result<Watch, StoreError> {
    let (
        id,
        owner_id,
        movie_id,
        movie_title,
        watched,
        rating,
        notes,
        location,
        companions,
        rewatch,
        private,
        deleted,
        created,
    ) = row;
    Ok(Watch {
        id: WatchId(parse_uuid(&id)?),
        owner_id: UserId(parse_uuid(&owner_id)?),
        movie_id: MovieId(parse_uuid(&movie_id)?),
        movie_title,
        watched_date: dt(watched)?,
        rating: rating.map(|r| r as i32),
        notes,
        location,
        companions,
        is_rewatch: rewatch != 0,
        is_private: private != 0,
        deleted_at: opt_dt(deleted)?,
        created_at: dt(created)?,
    })
}

const WATCH_COLS: &str = "id,owner_id,movie_id,movie_title,watched_date,rating,notes,location,\
                          companions,is_rewatch,is_private,deleted_at,created_at";

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────────────── Users ──────────────────────────────────────────

    async fn create_user(&self, params: &CreateUserParams) -> Result<UserId, StoreError> {
        let user_id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO users(id,display_name,is_premium,pending_group_actions,created_at,updated_at)
             VALUES(?,?,?,'[]',?,?)",
        )
        .bind(user_id.to_string())
        .bind(&params.display_name)
        .bind(params.is_premium as i64)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(UserId(user_id))
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id,display_name,is_premium,share_watches,share_ratings,share_notes,
                    is_deactivated,deactivated_at,pending_group_actions,deleted_at,
                    created_at,updated_at
             FROM users WHERE id=? AND deleted_at IS NULL",
        )
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .ok_or(StoreError::NotFound)?;

        user_from_row(row)
    }

    async fn set_sharing_preferences(
        &self,
        user_id: &UserId,
        prefs: &SharingPreferences,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET share_watches=?,share_ratings=?,share_notes=?,updated_at=?
             WHERE id=? AND deleted_at IS NULL",
        )
        .bind(prefs.share_watches as i64)
        .bind(prefs.share_ratings as i64)
        .bind(prefs.share_notes as i64)
        .bind(Utc::now().timestamp())
        .bind(user_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_premium(&self, user_id: &UserId, is_premium: bool) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET is_premium=?,updated_at=? WHERE id=? AND deleted_at IS NULL",
        )
        .bind(is_premium as i64)
        .bind(Utc::now().timestamp())
        .bind(user_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn deactivate_user(
        &self,
        user_id: &UserId,
        actions: &[PendingGroupAction],
    ) -> Result<(), StoreError> {
        let queue =
            serde_json::to_string(actions).map_err(|e| StoreError::Backend(e.to_string()))?;
        let result = sqlx::query(
            "UPDATE users SET is_deactivated=1,deactivated_at=?,pending_group_actions=?,updated_at=?
             WHERE id=? AND deleted_at IS NULL",
        )
        .bind(Utc::now().timestamp())
        .bind(queue)
        .bind(Utc::now().timestamp())
        .bind(user_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn reactivate_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET is_deactivated=0,deactivated_at=NULL,pending_group_actions='[]',
                    updated_at=?
             WHERE id=? AND deleted_at IS NULL",
        )
        .bind(Utc::now().timestamp())
        .bind(user_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn soft_delete_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at=?,updated_at=? WHERE id=? AND deleted_at IS NULL",
        )
        .bind(Utc::now().timestamp())
        .bind(Utc::now().timestamp())
        .bind(user_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    async fn create_group(&self, params: &CreateGroupParams) -> Result<GroupId, StoreError> {
        let group_id = Uuid::now_v7();
        let now = Utc::now().timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            "INSERT INTO groups(id,name,description,created_by,created_at,updated_at)
             VALUES(?,?,?,?,?,?)",
        )
        .bind(group_id.to_string())
        .bind(&params.name)
        .bind(&params.description)
        .bind(params.created_by.0.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query("INSERT INTO group_members(group_id,user_id,role,joined_at) VALUES(?,?,?,?)")
            .bind(group_id.to_string())
            .bind(params.created_by.0.to_string())
            .bind(GroupRole::Creator.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_insert_err)?;

        sqlx::query(
            "INSERT INTO group_member_history(id,group_id,user_id,action,actor_id,new_role,occurred_at)
             VALUES(?,?,?,?,?,?,?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(group_id.to_string())
        .bind(params.created_by.0.to_string())
        .bind("added")
        .bind(params.created_by.0.to_string())
        .bind(GroupRole::Creator.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(GroupId(group_id))
    }

    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLS} FROM groups WHERE id=? AND deleted_at IS NULL"
        ))
        .bind(group_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .ok_or(StoreError::NotFound)?;

        group_from_row(row)
    }

    async fn update_group(
        &self,
        group_id: &GroupId,
        name: &str,
        description: Option<String>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE groups SET name=?,description=?,updated_at=? WHERE id=? AND deleted_at IS NULL",
        )
        .bind(name)
        .bind(description)
        .bind(Utc::now().timestamp())
        .bind(group_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn soft_delete_group(&self, group_id: &GroupId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE groups SET deleted_at=?,updated_at=? WHERE id=? AND deleted_at IS NULL",
        )
        .bind(Utc::now().timestamp())
        .bind(Utc::now().timestamp())
        .bind(group_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_owned_groups(&self, user_id: &UserId) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM groups WHERE created_by=? AND deleted_at IS NULL",
        )
        .bind(user_id.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(count)
    }

    async fn count_joined_only_groups(&self, user_id: &UserId) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM group_members m
             JOIN groups g ON g.id=m.group_id
             WHERE m.user_id=? AND g.deleted_at IS NULL AND g.created_by!=?",
        )
        .bind(user_id.0.to_string())
        .bind(user_id.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(count)
    }

    async fn list_owned_groups(&self, user_id: &UserId) -> Result<Vec<Group>, StoreError> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLS} FROM groups
             WHERE created_by=? AND deleted_at IS NULL
             ORDER BY created_at"
        ))
        .bind(user_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(group_from_row).collect()
    }

    // ─────────────────────────────────── Membership ───────────────────────────────────────

    async fn get_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<GroupMember, StoreError> {
        let row = sqlx::query_as::<_, (String, i64)>(
            "SELECT role,joined_at FROM group_members WHERE group_id=? AND user_id=?",
        )
        .bind(group_id.0.to_string())
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .ok_or(StoreError::NotFound)?;

        Ok(GroupMember {
            group_id: group_id.clone(),
            user_id: user_id.clone(),
            role: parse_role(&row.0)?,
            joined_at: dt(row.1)?,
        })
    }

    async fn list_group_members(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<GroupMember>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, i64)>(
            "SELECT user_id,role,joined_at FROM group_members WHERE group_id=? ORDER BY joined_at",
        )
        .bind(group_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (user_id, role, joined_at) in rows {
            out.push(GroupMember {
                group_id: group_id.clone(),
                user_id: UserId(parse_uuid(&user_id)?),
                role: parse_role(&role)?,
                joined_at: dt(joined_at)?,
            });
        }
        Ok(out)
    }

    async fn apply_membership_change(&self, change: &MembershipChange) -> Result<(), StoreError> {
        let now = Utc::now().timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // For removals and role changes, read the current role inside the
        // transaction so the history row records an accurate delta.
        let current_role: Option<String> = sqlx::query_as::<_, (String,)>(
            "SELECT role FROM group_members WHERE group_id=? AND user_id=?",
        )
        .bind(change.group_id.0.to_string())
        .bind(change.user_id.0.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .map(|(role,)| role);

        let (action, previous_role, new_role) = match &change.kind {
            MembershipChangeKind::Add { role } => {
                sqlx::query(
                    "INSERT INTO group_members(group_id,user_id,role,joined_at) VALUES(?,?,?,?)",
                )
                .bind(change.group_id.0.to_string())
                .bind(change.user_id.0.to_string())
                .bind(role.as_str())
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(map_insert_err)?;

                ("added", None, Some(role.as_str()))
            }
            MembershipChangeKind::Remove { action } => {
                let previous = current_role.ok_or(StoreError::NotFound)?;
                sqlx::query("DELETE FROM group_members WHERE group_id=? AND user_id=?")
                    .bind(change.group_id.0.to_string())
                    .bind(change.user_id.0.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;

                (action.as_str(), Some(previous), None)
            }
            MembershipChangeKind::ChangeRole { new_role } => {
                let previous = current_role.ok_or(StoreError::NotFound)?;
                sqlx::query("UPDATE group_members SET role=? WHERE group_id=? AND user_id=?")
                    .bind(new_role.as_str())
                    .bind(change.group_id.0.to_string())
                    .bind(change.user_id.0.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;

                ("role_changed", Some(previous), Some(new_role.as_str()))
            }
        };

        sqlx::query(
            "INSERT INTO group_member_history
                 (id,group_id,user_id,action,actor_id,previous_role,new_role,occurred_at)
             VALUES(?,?,?,?,?,?,?,?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(change.group_id.0.to_string())
        .bind(change.user_id.0.to_string())
        .bind(action)
        .bind(change.actor_id.0.to_string())
        .bind(previous_role)
        .bind(new_role)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn list_member_history(
        &self,
        group_id: &GroupId,
    ) -> Result<Vec<GroupMemberHistory>, StoreError> {
        type HistoryRow = (
            String,
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            i64,
        );
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT id,user_id,action,actor_id,previous_role,new_role,occurred_at
             FROM group_member_history
             WHERE group_id=?
             ORDER BY occurred_at DESC, id DESC",
        )
        .bind(group_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, user_id, action, actor_id, previous_role, new_role, occurred_at) in rows {
            out.push(GroupMemberHistory {
                id: HistoryId(parse_uuid(&id)?),
                group_id: group_id.clone(),
                user_id: UserId(parse_uuid(&user_id)?),
                action: action
                    .parse()
                    .map_err(|_| StoreError::Backend(format!("bad action: {action}")))?,
                actor_id: UserId(parse_uuid(&actor_id)?),
                previous_role: previous_role.as_deref().map(parse_role).transpose()?,
                new_role: new_role.as_deref().map(parse_role).transpose()?,
                occurred_at: dt(occurred_at)?,
            });
        }
        Ok(out)
    }

    async fn list_user_group_ids(&self, user_id: &UserId) -> Result<Vec<GroupId>, StoreError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT g.id
             FROM group_members m
             JOIN groups g ON g.id=m.group_id
             WHERE m.user_id=? AND g.deleted_at IS NULL
             ORDER BY m.joined_at",
        )
        .bind(user_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id,) in rows {
            out.push(GroupId(parse_uuid(&id)?));
        }
        Ok(out)
    }

    async fn users_share_group(&self, a: &UserId, b: &UserId) -> Result<bool, StoreError> {
        // Indexed join on group_members(user_id); neither membership set is
        // materialized.
        let (shared,): (i64,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1
                 FROM group_members ma
                 JOIN group_members mb ON mb.group_id=ma.group_id
                 JOIN groups g ON g.id=ma.group_id
                 WHERE ma.user_id=? AND mb.user_id=? AND g.deleted_at IS NULL
             )",
        )
        .bind(a.0.to_string())
        .bind(b.0.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(shared != 0)
    }

    // ───────────────────────────────────── Watches ────────────────────────────────────────

    async fn create_watch(&self, params: &CreateWatchParams) -> Result<WatchId, StoreError> {
        let watch_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO watches(id,owner_id,movie_id,movie_title,watched_date,rating,notes,
                                 location,companions,is_rewatch,is_private,created_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(watch_id.to_string())
        .bind(params.owner_id.0.to_string())
        .bind(params.movie_id.0.to_string())
        .bind(&params.movie_title)
        .bind(params.watched_date.timestamp())
        .bind(params.rating.map(|r| r as i64))
        .bind(&params.notes)
        .bind(&params.location)
        .bind(&params.companions)
        .bind(params.is_rewatch as i64)
        .bind(params.is_private as i64)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(WatchId(watch_id))
    }

    async fn get_watch(&self, watch_id: &WatchId) -> Result<Watch, StoreError> {
        let row = sqlx::query_as::<_, WatchRow>(&format!(
            "SELECT {WATCH_COLS} FROM watches WHERE id=? AND deleted_at IS NULL"
        ))
        .bind(watch_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .ok_or(StoreError::NotFound)?;

        watch_from_row(row)
    }

    async fn list_watches_by_owner(&self, owner_id: &UserId) -> Result<Vec<Watch>, StoreError> {
        let rows = sqlx::query_as::<_, WatchRow>(&format!(
            "SELECT {WATCH_COLS} FROM watches
             WHERE owner_id=? AND deleted_at IS NULL
             ORDER BY watched_date DESC"
        ))
        .bind(owner_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(watch_from_row).collect()
    }

    async fn update_watch(
        &self,
        watch_id: &WatchId,
        params: &UpdateWatchParams,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE watches SET watched_date=?,rating=?,notes=?,location=?,companions=?,
                    is_rewatch=?,is_private=?
             WHERE id=? AND deleted_at IS NULL",
        )
        .bind(params.watched_date.timestamp())
        .bind(params.rating.map(|r| r as i64))
        .bind(&params.notes)
        .bind(&params.location)
        .bind(&params.companions)
        .bind(params.is_rewatch as i64)
        .bind(params.is_private as i64)
        .bind(watch_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn soft_delete_watch(&self, watch_id: &WatchId) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE watches SET deleted_at=? WHERE id=? AND deleted_at IS NULL")
                .bind(Utc::now().timestamp())
                .bind(watch_id.0.to_string())
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn share_watch_to_group(
        &self,
        watch_id: &WatchId,
        group_id: &GroupId,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO watch_groups(watch_id,group_id,shared_at) VALUES(?,?,?)")
            .bind(watch_id.0.to_string())
            .bind(group_id.0.to_string())
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(map_insert_err)?;
        Ok(())
    }

    async fn unshare_watch_from_group(
        &self,
        watch_id: &WatchId,
        group_id: &GroupId,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM watch_groups WHERE watch_id=? AND group_id=?")
            .bind(watch_id.0.to_string())
            .bind(group_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_group_watches(&self, group_id: &GroupId) -> Result<Vec<Watch>, StoreError> {
        let rows = sqlx::query_as::<_, WatchRow>(
            "SELECT w.id,w.owner_id,w.movie_id,w.movie_title,w.watched_date,w.rating,w.notes,
                    w.location,w.companions,w.is_rewatch,w.is_private,w.deleted_at,w.created_at
             FROM watches w
             JOIN watch_groups wg ON wg.watch_id=w.id
             JOIN users u ON u.id=w.owner_id
             WHERE wg.group_id=? AND w.deleted_at IS NULL AND u.deleted_at IS NULL
             ORDER BY w.watched_date DESC",
        )
        .bind(group_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(watch_from_row).collect()
    }
}
