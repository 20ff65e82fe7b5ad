//! Aggregation over a user's own watch history: per-movie grouping with
//! filters and sorts, and the lifetime stats view.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use reelog_storage::{MovieId, Store, UserId, Watch};

use crate::error::ServiceError;
use crate::feed::TopMovie;

/// One labeled histogram bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistogramBucket {
    pub label: String,
    pub count: usize,
}

/// Sort order for grouped watches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WatchSort {
    /// Most recently watched movie first.
    #[default]
    RecentlyWatched,
    /// Alphabetical by title, case-insensitive.
    Title,
    /// Highest average rating first; unrated movies last.
    HighestRated,
    /// Most watches first.
    MostWatched,
}

/// Watch-level and group-level filters, AND-composed. Absent fields leave
/// that dimension unconstrained.
#[derive(Clone, Debug, Default)]
pub struct WatchGroupFilter {
    /// Case-insensitive title substring.
    pub title: Option<String>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    pub watched_from: Option<DateTime<Utc>>,
    pub watched_to: Option<DateTime<Utc>>,
    /// Keeps only movies that do (or don't) contain a rewatch.
    pub has_rewatch: Option<bool>,
    pub sort: WatchSort,
}

/// One movie's watches, newest first, with per-movie aggregates.
#[derive(Clone, Debug)]
pub struct GroupedWatches {
    pub movie_id: MovieId,
    pub movie_title: String,
    pub watch_count: usize,
    /// Average over rated watches only; None when none are rated.
    pub average_rating: Option<f64>,
    /// Rating of the most recently dated watch, which may itself be unrated.
    pub latest_rating: Option<i32>,
    pub watches: Vec<Watch>,
}

/// Lifetime stats over a user's watch history.
#[derive(Clone, Debug)]
pub struct UserStats {
    pub total_watches: usize,
    pub unique_movies: usize,
    /// Rounded to one decimal; None when no watch is rated.
    pub average_rating: Option<f64>,
    /// Ten buckets, "1" through "10", zero-filled.
    pub rating_histogram: Vec<HistogramBucket>,
    /// Twelve buckets for the current calendar year, "Jan" through "Dec".
    pub monthly_histogram: Vec<HistogramBucket>,
    /// One bucket per year from earliest to latest watch, zero-filled.
    pub yearly_histogram: Vec<HistogramBucket>,
    /// One bucket per decade, "1990s" style labels, zero-filled.
    pub decade_histogram: Vec<HistogramBucket>,
    /// Counts by location; missing or empty locations bucket as "Unknown".
    pub location_histogram: Vec<HistogramBucket>,
    /// Movies watched more than once, most rewatched first, at most five.
    pub top_rewatched: Vec<TopMovie>,
}

pub struct WatchStatsService<S> {
    store: Arc<S>,
}

impl<S: Store> WatchStatsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The owner's watches grouped by movie, filtered and sorted. Operates
    /// on the owner's own history only, so no privacy filtering applies.
    pub async fn grouped_watches(
        &self,
        owner: &UserId,
        filter: &WatchGroupFilter,
    ) -> Result<Vec<GroupedWatches>, ServiceError> {
        let watches = self.store.list_watches_by_owner(owner).await?;
        Ok(group_watches(watches, filter))
    }

    pub async fn user_stats(&self, owner: &UserId) -> Result<UserStats, ServiceError> {
        let watches = self.store.list_watches_by_owner(owner).await?;
        Ok(compute_user_stats(&watches, Utc::now().year()))
    }
}

fn matches_watch(watch: &Watch, filter: &WatchGroupFilter) -> bool {
    if let Some(title) = &filter.title {
        if !watch
            .movie_title
            .to_lowercase()
            .contains(&title.to_lowercase())
        {
            return false;
        }
    }
    if let Some(min) = filter.min_rating {
        match watch.rating {
            Some(r) if r >= min => {}
            _ => return false,
        }
    }
    if let Some(max) = filter.max_rating {
        match watch.rating {
            Some(r) if r <= max => {}
            _ => return false,
        }
    }
    if let Some(from) = filter.watched_from {
        if watch.watched_date < from {
            return false;
        }
    }
    if let Some(to) = filter.watched_to {
        if watch.watched_date > to {
            return false;
        }
    }
    true
}

/// Group a newest-first watch list by movie, apply the group-level rewatch
/// filter, and sort.
fn group_watches(watches: Vec<Watch>, filter: &WatchGroupFilter) -> Vec<GroupedWatches> {
    let mut order: Vec<MovieId> = Vec::new();
    let mut by_movie: HashMap<MovieId, Vec<Watch>> = HashMap::new();
    for watch in watches {
        if !matches_watch(&watch, filter) {
            continue;
        }
        by_movie
            .entry(watch.movie_id.clone())
            .or_insert_with(|| {
                order.push(watch.movie_id.clone());
                Vec::new()
            })
            .push(watch);
    }

    // First-appearance order in a newest-first list is already the
    // recently-watched order.
    let mut groups: Vec<GroupedWatches> = order
        .into_iter()
        .filter_map(|id| by_movie.remove(&id))
        .filter_map(|group| {
            let any_rewatch = group.iter().any(|w| w.is_rewatch);
            if let Some(wanted) = filter.has_rewatch {
                if any_rewatch != wanted {
                    return None;
                }
            }
            let rated: Vec<i32> = group.iter().filter_map(|w| w.rating).collect();
            let average_rating = if rated.is_empty() {
                None
            } else {
                Some(rated.iter().sum::<i32>() as f64 / rated.len() as f64)
            };
            Some(GroupedWatches {
                movie_id: group[0].movie_id.clone(),
                movie_title: group[0].movie_title.clone(),
                watch_count: group.len(),
                average_rating,
                latest_rating: group[0].rating,
                watches: group,
            })
        })
        .collect();

    match filter.sort {
        WatchSort::RecentlyWatched => {}
        WatchSort::Title => {
            groups.sort_by(|a, b| {
                a.movie_title
                    .to_lowercase()
                    .cmp(&b.movie_title.to_lowercase())
            });
        }
        WatchSort::HighestRated => {
            groups.sort_by(|a, b| {
                b.average_rating
                    .partial_cmp(&a.average_rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        WatchSort::MostWatched => {
            groups.sort_by(|a, b| b.watch_count.cmp(&a.watch_count));
        }
    }
    groups
}

fn compute_user_stats(watches: &[Watch], current_year: i32) -> UserStats {
    let rated: Vec<i32> = watches.iter().filter_map(|w| w.rating).collect();
    let average_rating = if rated.is_empty() {
        None
    } else {
        let avg = rated.iter().sum::<i32>() as f64 / rated.len() as f64;
        Some((avg * 10.0).round() / 10.0)
    };

    let unique_movies = watches
        .iter()
        .map(|w| w.movie_id.clone())
        .collect::<std::collections::HashSet<_>>()
        .len();

    UserStats {
        total_watches: watches.len(),
        unique_movies,
        average_rating,
        rating_histogram: rating_histogram(watches),
        monthly_histogram: monthly_histogram(watches, current_year),
        yearly_histogram: yearly_histogram(watches),
        decade_histogram: decade_histogram(watches),
        location_histogram: location_histogram(watches),
        top_rewatched: top_rewatched(watches),
    }
}

/// Buckets "1" through "10", always all ten present.
fn rating_histogram(watches: &[Watch]) -> Vec<HistogramBucket> {
    let mut buckets: Vec<HistogramBucket> = (1..=10)
        .map(|r| HistogramBucket {
            label: r.to_string(),
            count: 0,
        })
        .collect();
    for rating in watches.iter().filter_map(|w| w.rating) {
        if (1..=10).contains(&rating) {
            buckets[(rating - 1) as usize].count += 1;
        }
    }
    buckets
}

/// Twelve buckets for `year`, labeled with three-letter month names, always
/// all twelve present.
fn monthly_histogram(watches: &[Watch], year: i32) -> Vec<HistogramBucket> {
    let mut buckets: Vec<HistogramBucket> = (1..=12)
        .map(|m| HistogramBucket {
            label: Utc
                .with_ymd_and_hms(2000, m, 1, 0, 0, 0)
                .unwrap()
                .format("%b")
                .to_string(),
            count: 0,
        })
        .collect();
    for watch in watches {
        if watch.watched_date.year() == year {
            buckets[watch.watched_date.month0() as usize].count += 1;
        }
    }
    buckets
}

/// One bucket per year between the earliest and latest watch, inclusive,
/// so gap years show as zero.
fn yearly_histogram(watches: &[Watch]) -> Vec<HistogramBucket> {
    let years: Vec<i32> = watches.iter().map(|w| w.watched_date.year()).collect();
    let (Some(&min), Some(&max)) = (years.iter().min(), years.iter().max()) else {
        return Vec::new();
    };
    let mut buckets: Vec<HistogramBucket> = (min..=max)
        .map(|y| HistogramBucket {
            label: y.to_string(),
            count: 0,
        })
        .collect();
    for year in years {
        buckets[(year - min) as usize].count += 1;
    }
    buckets
}

/// One bucket per decade between the earliest and latest watch, inclusive.
fn decade_histogram(watches: &[Watch]) -> Vec<HistogramBucket> {
    let decades: Vec<i32> = watches
        .iter()
        .map(|w| w.watched_date.year() / 10 * 10)
        .collect();
    let (Some(&min), Some(&max)) = (decades.iter().min(), decades.iter().max()) else {
        return Vec::new();
    };
    let mut buckets: Vec<HistogramBucket> = (min..=max)
        .step_by(10)
        .map(|d| HistogramBucket {
            label: format!("{d}s"),
            count: 0,
        })
        .collect();
    for decade in decades {
        buckets[((decade - min) / 10) as usize].count += 1;
    }
    buckets
}

/// Counts by location, most frequent first, ties alphabetical. Missing or
/// empty locations land in the "Unknown" bucket.
fn location_histogram(watches: &[Watch]) -> Vec<HistogramBucket> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for watch in watches {
        let label = match watch.location.as_deref() {
            Some(loc) if !loc.trim().is_empty() => loc.to_string(),
            _ => "Unknown".to_string(),
        };
        *counts.entry(label).or_default() += 1;
    }
    let mut buckets: Vec<HistogramBucket> = counts
        .into_iter()
        .map(|(label, count)| HistogramBucket { label, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
    buckets
}

/// Movies with more than one watch, most watched first, capped at five.
fn top_rewatched(watches: &[Watch]) -> Vec<TopMovie> {
    let mut order: Vec<MovieId> = Vec::new();
    let mut counts: HashMap<MovieId, TopMovie> = HashMap::new();
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
        .filter(|m| m.watch_count > 1)
        .collect();
    ranked.sort_by(|a, b| b.watch_count.cmp(&a.watch_count));
    ranked.truncate(5);
    ranked
}
