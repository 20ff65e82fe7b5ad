//! Per-field privacy cascade for watches.
//!
//! Visibility of a watch to a non-owner requires, in order: the watch is not
//! marked private, the owner still exists, the owner shares watches at all,
//! and the two users share at least one group. Ratings and notes are then
//! gated independently by their own toggles.

use std::collections::HashMap;
use std::sync::Arc;

use reelog_storage::{SharingPreferences, Store, UserId, Watch};

use crate::error::{optional, ServiceError};

pub struct PrivacyService<S> {
    store: Arc<S>,
}

/// What one owner exposes to one viewer, resolved once per owner when
/// filtering a batch.
struct OwnerExposure {
    sharing: SharingPreferences,
    shares_group: bool,
}

impl<S: Store> PrivacyService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Whether `viewer` may see the watch exist at all.
    pub async fn can_view_watch(&self, watch: &Watch, viewer: &UserId) -> Result<bool, ServiceError> {
        if watch.owner_id == *viewer {
            return Ok(true);
        }
        // The private flag wins over every sharing toggle.
        if watch.is_private {
            return Ok(false);
        }
        let owner = match optional(self.store.get_user(&watch.owner_id).await)? {
            Some(owner) => owner,
            None => return Ok(false),
        };
        if !owner.sharing.share_watches {
            return Ok(false);
        }
        Ok(self.store.users_share_group(&watch.owner_id, viewer).await?)
    }

    /// Whether `viewer` may see the watch's rating. Independent of the notes
    /// toggle.
    pub async fn can_view_rating(&self, watch: &Watch, viewer: &UserId) -> Result<bool, ServiceError> {
        if watch.owner_id == *viewer {
            return Ok(true);
        }
        if !self.can_view_watch(watch, viewer).await? {
            return Ok(false);
        }
        let owner = self.store.get_user(&watch.owner_id).await?;
        Ok(owner.sharing.share_ratings)
    }

    /// Whether `viewer` may see the watch's notes. Independent of the rating
    /// toggle.
    pub async fn can_view_notes(&self, watch: &Watch, viewer: &UserId) -> Result<bool, ServiceError> {
        if watch.owner_id == *viewer {
            return Ok(true);
        }
        if !self.can_view_watch(watch, viewer).await? {
            return Ok(false);
        }
        let owner = self.store.get_user(&watch.owner_id).await?;
        Ok(owner.sharing.share_notes)
    }

    pub async fn are_users_in_same_group(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.users_share_group(a, b).await?)
    }

    /// Drop watches `viewer` may not see and null out ratings and notes the
    /// owner does not share. Output records are always well formed; a viewer
    /// cannot tell a withheld field from an absent one.
    pub async fn filter_watches(
        &self,
        watches: Vec<Watch>,
        viewer: &UserId,
    ) -> Result<Vec<Watch>, ServiceError> {
        let mut exposures: HashMap<UserId, Option<OwnerExposure>> = HashMap::new();
        let mut out = Vec::with_capacity(watches.len());

        for mut watch in watches {
            if watch.owner_id == *viewer {
                out.push(watch);
                continue;
            }
            if watch.is_private {
                continue;
            }

            if !exposures.contains_key(&watch.owner_id) {
                let resolved = match optional(self.store.get_user(&watch.owner_id).await)? {
                    Some(owner) => Some(OwnerExposure {
                        sharing: owner.sharing,
                        shares_group: self
                            .store
                            .users_share_group(&watch.owner_id, viewer)
                            .await?,
                    }),
                    None => None,
                };
                exposures.insert(watch.owner_id.clone(), resolved);
            }

            let Some(exposure) = &exposures[&watch.owner_id] else {
                continue;
            };
            if !exposure.sharing.share_watches || !exposure.shares_group {
                continue;
            }
            if !exposure.sharing.share_ratings {
                watch.rating = None;
            }
            if !exposure.sharing.share_notes {
                watch.notes = None;
            }
            out.push(watch);
        }
        Ok(out)
    }
}
