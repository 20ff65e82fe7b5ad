//! Group feeds: privacy-filtered watch lists per group, the combined feed
//! across a user's groups, and the per-group stats view.

use std::collections::HashSet;
use std::sync::Arc;

use reelog_storage::{GroupId, MovieId, Store, UserId, Watch};

use crate::error::{optional, Access, ServiceError};
use crate::privacy::PrivacyService;

/// A movie ranked by visible watch count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopMovie {
    pub movie_id: MovieId,
    pub movie_title: String,
    pub watch_count: usize,
}

/// Stats computed over the watches the requester is allowed to see, so two
/// members of the same group may legitimately see different numbers.
#[derive(Clone, Debug)]
pub struct GroupFeedStats {
    pub group_name: String,
    pub total_watches: usize,
    pub unique_movies: usize,
    /// None when no visible watch carries a rating.
    pub average_group_rating: Option<f64>,
    /// Distinct owners among the visible watches, not the member count.
    pub active_members: usize,
    pub top_movies: Vec<TopMovie>,
    pub watches: Vec<Watch>,
}

pub struct GroupFeedService<S> {
    store: Arc<S>,
    privacy: PrivacyService<S>,
}

impl<S: Store> GroupFeedService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            privacy: PrivacyService::new(store.clone()),
            store,
        }
    }

    /// Page of the group's feed, newest watched first. Pagination runs after
    /// privacy filtering so pages never come up short for visible content.
    /// Empty for non-members and missing groups.
    pub async fn group_feed(
        &self,
        group_id: &GroupId,
        requester: &UserId,
        skip: usize,
        take: usize,
    ) -> Result<Vec<Watch>, ServiceError> {
        if optional(self.store.get_group(group_id).await)?.is_none() {
            return Ok(Vec::new());
        }
        if optional(self.store.get_group_member(group_id, requester).await)?.is_none() {
            return Ok(Vec::new());
        }

        let watches = self.store.list_group_watches(group_id).await?;
        let visible = self.privacy.filter_watches(watches, requester).await?;
        Ok(visible.into_iter().skip(skip).take(take).collect())
    }

    /// Union of the feeds of every group the requester belongs to, with each
    /// watch appearing once no matter how many groups it was shared into.
    pub async fn combined_feed(&self, requester: &UserId) -> Result<Vec<Watch>, ServiceError> {
        let group_ids = self.store.list_user_group_ids(requester).await?;

        let mut seen = HashSet::new();
        let mut combined = Vec::new();
        for group_id in &group_ids {
            for watch in self.store.list_group_watches(group_id).await? {
                if seen.insert(watch.id.clone()) {
                    combined.push(watch);
                }
            }
        }

        let mut visible = self.privacy.filter_watches(combined, requester).await?;
        visible.sort_by(|a, b| b.watched_date.cmp(&a.watched_date));
        Ok(visible)
    }

    /// The group's feed plus aggregate stats over the visible watches.
    pub async fn feed_with_stats(
        &self,
        group_id: &GroupId,
        requester: &UserId,
    ) -> Result<Access<GroupFeedStats>, ServiceError> {
        let group = match optional(self.store.get_group(group_id).await)? {
            Some(group) => group,
            None => return Ok(Access::NotFound),
        };
        if optional(self.store.get_group_member(group_id, requester).await)?.is_none() {
            return Ok(Access::NotMember);
        }

        let watches = self.store.list_group_watches(group_id).await?;
        let visible = self.privacy.filter_watches(watches, requester).await?;

        let unique_movies = visible
            .iter()
            .map(|w| w.movie_id.clone())
            .collect::<HashSet<_>>()
            .len();
        let ratings: Vec<i32> = visible.iter().filter_map(|w| w.rating).collect();
        let average_group_rating = if ratings.is_empty() {
            None
        } else {
            let avg = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
            Some((avg * 10.0).round() / 10.0)
        };

        let active_members = visible
            .iter()
            .map(|w| w.owner_id.clone())
            .collect::<HashSet<_>>()
            .len();

        Ok(Access::Granted(GroupFeedStats {
            group_name: group.name,
            total_watches: visible.len(),
            unique_movies,
            average_group_rating,
            active_members,
            top_movies: top_movies(&visible),
            watches: visible,
        }))
    }
}

/// Rank movies by watch count, descending, ties broken by first appearance
/// in the input.
fn top_movies(watches: &[Watch]) -> Vec<TopMovie> {
    let mut order: Vec<MovieId> = Vec::new();
    let mut counts: std::collections::HashMap<MovieId, TopMovie> = std::collections::HashMap::new();
    for watch in watches {
        counts
            .entry(watch.movie_id.clone())
            .and_modify(|m| m.watch_count += 1)
            .or_insert_with(|| {
                order.push(watch.movie_id.clone());
                TopMovie {
                    movie_id: watch.movie_id.clone(),
                    movie_title: watch.movie_title.clone(),
                    watch_count: 1,
                }
            });
    }

    let mut ranked: Vec<TopMovie> = order
        .into_iter()
        .filter_map(|id| counts.remove(&id))
        .collect();
    ranked.sort_by(|a, b| b.watch_count.cmp(&a.watch_count));
    ranked
}
