//! Shared fixtures for the service tests, backed by the in-memory SQLite
//! store.

use std::sync::Arc;

use chrono::{Duration, Utc};
use reelog_storage::{
    CreateUserParams, CreateWatchParams, GroupId, MovieId, SharingPreferences, Store, UserId,
    WatchId,
};
use reelog_store_sqlite::SqliteStore;

use crate::config::QuotaConfig;
use crate::feed::GroupFeedService;
use crate::groups::GroupService;
use crate::privacy::PrivacyService;
use crate::stats::WatchStatsService;

pub struct Fixture {
    pub store: Arc<SqliteStore>,
    pub groups: GroupService<SqliteStore>,
    pub privacy: PrivacyService<SqliteStore>,
    pub feed: GroupFeedService<SqliteStore>,
    pub stats: WatchStatsService<SqliteStore>,
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(
        SqliteStore::open_in_memory()
            .await
            .expect("in-memory store"),
    );
    Fixture {
        groups: GroupService::new(store.clone(), QuotaConfig::default()),
        privacy: PrivacyService::new(store.clone()),
        feed: GroupFeedService::new(store.clone()),
        stats: WatchStatsService::new(store.clone()),
        store,
    }
}

pub async fn user(store: &SqliteStore, name: &str, premium: bool) -> UserId {
    store
        .create_user(&CreateUserParams {
            display_name: name.to_string(),
            is_premium: premium,
        })
        .await
        .unwrap()
}

/// User with all three sharing toggles set as given.
pub async fn sharing_user(
    store: &SqliteStore,
    name: &str,
    watches: bool,
    ratings: bool,
    notes: bool,
) -> UserId {
    let id = user(store, name, false).await;
    store
        .set_sharing_preferences(
            &id,
            &SharingPreferences {
                share_watches: watches,
                share_ratings: ratings,
                share_notes: notes,
            },
        )
        .await
        .unwrap();
    id
}

pub fn watch_params(owner: &UserId, title: &str, days_ago: i64) -> CreateWatchParams {
    CreateWatchParams {
        owner_id: owner.clone(),
        movie_id: MovieId(uuid::Uuid::new_v4()),
        movie_title: title.to_string(),
        watched_date: Utc::now() - Duration::days(days_ago),
        rating: Some(7),
        notes: Some("notes".to_string()),
        location: None,
        companions: None,
        is_rewatch: false,
        is_private: false,
    }
}

/// Create a watch and share it into the group.
pub async fn shared_watch(
    store: &SqliteStore,
    owner: &UserId,
    group_id: &GroupId,
    title: &str,
    days_ago: i64,
) -> WatchId {
    let watch_id = store
        .create_watch(&watch_params(owner, title, days_ago))
        .await
        .unwrap();
    store.share_watch_to_group(&watch_id, group_id).await.unwrap();
    watch_id
}
