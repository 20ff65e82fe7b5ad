//! Watch types: a logged viewing of a movie, optionally shared into groups.

use chrono::{DateTime, Utc};

use super::{GroupId, MovieId, UserId, WatchId};

/// Watch record. Created and mutated only by its owner; ownership never
/// transfers.
#[derive(Clone, Debug)]
pub struct Watch {
    pub id: WatchId,
    pub owner_id: UserId,
    pub movie_id: MovieId,
    /// Catalog title, denormalized onto the row so feeds and aggregation
    /// never consult the external catalog resolver.
    pub movie_title: String,
    pub watched_date: DateTime<Utc>,
    /// 1-10 when present.
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub companions: Option<String>,
    pub is_rewatch: bool,
    /// Hard visibility override: hides the watch from everyone but the
    /// owner, regardless of sharing toggles or group shares.
    pub is_private: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Watch-to-group share. A watch may be shared into any number of groups.
#[derive(Clone, Debug)]
pub struct WatchGroup {
    pub watch_id: WatchId,
    pub group_id: GroupId,
    pub shared_at: DateTime<Utc>,
}

/// Parameters for creating a watch
#[derive(Clone, Debug)]
pub struct CreateWatchParams {
    pub owner_id: UserId,
    pub movie_id: MovieId,
    pub movie_title: String,
    pub watched_date: DateTime<Utc>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub companions: Option<String>,
    pub is_rewatch: bool,
    pub is_private: bool,
}

/// Mutable fields of a watch, replaced wholesale on update.
#[derive(Clone, Debug)]
pub struct UpdateWatchParams {
    pub watched_date: DateTime<Utc>,
    pub rating: Option<i32>,
    pub notes: Option<String>,
    pub location: Option<String>,
    pub companions: Option<String>,
    pub is_rewatch: bool,
    pub is_private: bool,
}
