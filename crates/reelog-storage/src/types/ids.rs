//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// User identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

/// Group identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId(pub Uuid);

/// Watch identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WatchId(pub Uuid);

/// Movie identifier (assigned by the external catalog resolver).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MovieId(pub Uuid);

/// Membership-history row identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HistoryId(pub Uuid);
