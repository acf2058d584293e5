use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};
use crate::user::UserId;

pub mod db;
pub mod endpoints;
pub mod filter;
pub mod manager;
pub mod policy;
pub use endpoints::*;

pub type AdvertisementId = TypedId<Advertisement>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Advertisement {
    #[serde(rename = "_id")]
    pub id: AdvertisementId,
    pub creator_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub status: AdvertisementStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl Advertisement {
    pub fn is_created_by(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }

    /// Strictly later than the current `modified_at`, at millisecond
    /// granularity since that is all bson keeps.
    pub fn next_modified_at(&self) -> DateTime<Utc> {
        Utc::now().max(self.modified_at + Duration::milliseconds(1))
    }
}

impl TypedIdMarker for Advertisement {
    fn tag() -> &'static str {
        "ADV"
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum AdvertisementStatus {
    Draft,
    Open,
    Closed,
}

impl AdvertisementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvertisementStatus::Draft => "DRAFT",
            AdvertisementStatus::Open => "OPEN",
            AdvertisementStatus::Closed => "CLOSED",
        }
    }

    /// Published advertisements are visible to everyone, drafts only to
    /// their creator.
    pub fn is_published(self) -> bool {
        !matches!(self, AdvertisementStatus::Draft)
    }
}

impl Default for AdvertisementStatus {
    fn default() -> AdvertisementStatus {
        AdvertisementStatus::Open
    }
}

/// Field values for a new advertisement, already stripped of anything the
/// caller does not control (id, creator, timestamps).
#[derive(Clone, Debug)]
pub struct NewAdvertisement {
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub status: AdvertisementStatus,
}

/// A set of field changes. `None` leaves the field untouched; for `price`,
/// `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct AdvertisementChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Option<i64>>,
    pub status: Option<AdvertisementStatus>,
}

impl AdvertisementChanges {
    pub fn apply_to(self, advertisement: &mut Advertisement) {
        if let Some(title) = self.title {
            advertisement.title = title;
        }
        if let Some(description) = self.description {
            advertisement.description = description;
        }
        if let Some(price) = self.price {
            advertisement.price = price;
        }
        if let Some(status) = self.status {
            advertisement.status = status;
        }
    }
}
