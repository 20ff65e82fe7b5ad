//! Service layer for reelog: group administration, per-field privacy,
//! group feeds, and watch aggregation, all over a [`reelog_storage::Store`]
//! backend.

pub mod config;
pub mod error;
pub mod feed;
pub mod groups;
pub mod privacy;
pub mod stats;

pub use config::QuotaConfig;
pub use error::{Access, ServiceError};
pub use feed::{GroupFeedService, GroupFeedStats, TopMovie};
pub use groups::{GroupService, GroupTransferEligibility, GroupWithMembers};
pub use privacy::PrivacyService;
pub use stats::{
    GroupedWatches, HistogramBucket, UserStats, WatchGroupFilter, WatchSort, WatchStatsService,
};

#[cfg(test)]
mod tests;
