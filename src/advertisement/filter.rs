use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::user::UserId;

use super::policy::Visibility;
use super::{Advertisement, AdvertisementId, AdvertisementStatus};

/// Caller-supplied field filters, read from the query string.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AdvertisementFilter {
    pub creator_id: Option<UserId>,
    pub status: Option<AdvertisementStatus>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl AdvertisementFilter {
    pub fn matches(&self, advertisement: &Advertisement) -> bool {
        if let Some(creator_id) = self.creator_id {
            if advertisement.creator_id != creator_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if advertisement.status != status {
                return false;
            }
        }
        if let Some(created_after) = self.created_after {
            if advertisement.created_at < created_after {
                return false;
            }
        }
        if let Some(created_before) = self.created_before {
            if advertisement.created_at > created_before {
                return false;
            }
        }

        true
    }
}

/// Everything a listing is restricted by. All parts combine conjunctively.
/// Only lookups by a known id set may go without a visibility part.
#[derive(Clone, Debug)]
pub struct AdvertisementQuery {
    pub visibility: Option<Visibility>,
    pub filter: AdvertisementFilter,
    pub ids: Option<Vec<AdvertisementId>>,
}

impl AdvertisementQuery {
    pub fn new(visibility: Visibility) -> AdvertisementQuery {
        AdvertisementQuery {
            visibility: Some(visibility),
            filter: AdvertisementFilter::default(),
            ids: None,
        }
    }

    /// Exactly the given advertisements, whatever their status.
    pub fn by_ids(ids: Vec<AdvertisementId>) -> AdvertisementQuery {
        AdvertisementQuery {
            visibility: None,
            filter: AdvertisementFilter::default(),
            ids: Some(ids),
        }
    }

    pub fn with_filter(mut self, filter: AdvertisementFilter) -> AdvertisementQuery {
        self.filter = filter;
        self
    }

    pub fn matches(&self, advertisement: &Advertisement) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&advertisement.id) {
                return false;
            }
        }

        if let Some(visibility) = &self.visibility {
            if !visibility.permits(advertisement) {
                return false;
            }
        }

        self.filter.matches(advertisement)
    }
}
