use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::advertisement::AdvertisementId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub use endpoints::*;

pub type UserId = TypedId<User>;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Bookmarked advertisements. Kept free of duplicates and of the user's
    /// own advertisements.
    #[serde(default)]
    pub favourites: Vec<AdvertisementId>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for User {
    fn tag() -> &'static str {
        "USR"
    }
}

const TOKEN_LENGTH: usize = 40;

/// A bearer token and the user it authenticates.
#[derive(Clone, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub token: String,
    pub user_id: UserId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn generate(user_id: UserId) -> Session {
        let token = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();

        Session {
            token,
            user_id,
            created_at: Utc::now(),
        }
    }
}

// tokens stay out of logs
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
