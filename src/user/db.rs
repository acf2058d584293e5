use async_trait::async_trait;
use chrono::Utc;
use mongodb::{bson, Database};
use tokio::sync::Mutex;

use crate::advertisement::AdvertisementId;
use crate::database::{MongoSessionStore, MongoUserStore};
use crate::error::Error;

use super::{Session, User, UserId};

pub const USERS: &str = "users";
pub const SESSIONS: &str = "sessions";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": USERS,
            "indexes": [
                { "key": { "favourites": 1 }, "name": "by_favourite" },
            ]
        },
        None,
    )
    .await?;

    db.run_command(
        bson::doc! {
            "createIndexes": SESSIONS,
            "indexes": [
                { "key": { "user_id": 1 }, "name": "by_user_id" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

/// Favourites are changed with single-record set operations so concurrent
/// bookmark changes on one user cannot overwrite each other.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), Error>;

    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error>;

    /// No-op if already present.
    async fn add_favourite(
        &self,
        user_id: UserId,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error>;

    /// No-op if not present.
    async fn remove_favourite(
        &self,
        user_id: UserId,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error>;

    async fn remove_favourite_from_all(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<(), Error>;

    async fn fetch_session_by_token(&self, token: &str) -> Result<Option<Session>, Error>;
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[tracing::instrument(skip(self))]
    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        self.insert_one(user, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let user = self.find_one(bson::doc! { "_id": user_id }, None).await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn add_favourite(
        &self,
        user_id: UserId,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        self.update_one(
            bson::doc! { "_id": user_id, "favourites": { "$ne": advertisement_id } },
            bson::doc! {
                "$addToSet": { "favourites": advertisement_id },
                "$set": { "modified_at": now },
            },
            None,
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_favourite(
        &self,
        user_id: UserId,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        self.update_one(
            bson::doc! { "_id": user_id, "favourites": advertisement_id },
            bson::doc! {
                "$pull": { "favourites": advertisement_id },
                "$set": { "modified_at": now },
            },
            None,
        )
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn remove_favourite_from_all(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error> {
        let now = bson::DateTime::from_chrono(Utc::now());

        self.update_many(
            bson::doc! { "favourites": advertisement_id },
            bson::doc! {
                "$pull": { "favourites": advertisement_id },
                "$set": { "modified_at": now },
            },
            None,
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    #[tracing::instrument(skip(self))]
    async fn insert_session(&self, session: &Session) -> Result<(), Error> {
        self.insert_one(session, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn fetch_session_by_token(&self, token: &str) -> Result<Option<Session>, Error> {
        let session = self.find_one(bson::doc! { "_id": token }, None).await?;

        Ok(session)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub async fn clear(&self) {
        self.users.lock().await.clear();
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, user: &User) -> Result<(), Error> {
        self.users.lock().await.push(user.clone());

        Ok(())
    }

    async fn fetch_user_by_id(&self, user_id: UserId) -> Result<Option<User>, Error> {
        let users = self.users.lock().await;

        Ok(users.iter().find(|user| user.id == user_id).cloned())
    }

    async fn add_favourite(
        &self,
        user_id: UserId,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error> {
        let mut users = self.users.lock().await;

        if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
            if !user.favourites.contains(&advertisement_id) {
                user.favourites.push(advertisement_id);
                user.modified_at = Utc::now();
            }
        }

        Ok(())
    }

    async fn remove_favourite(
        &self,
        user_id: UserId,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error> {
        let mut users = self.users.lock().await;

        if let Some(user) = users.iter_mut().find(|user| user.id == user_id) {
            if user.favourites.contains(&advertisement_id) {
                user.favourites.retain(|id| *id != advertisement_id);
                user.modified_at = Utc::now();
            }
        }

        Ok(())
    }

    async fn remove_favourite_from_all(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<(), Error> {
        let mut users = self.users.lock().await;

        for user in users.iter_mut() {
            if user.favourites.contains(&advertisement_id) {
                user.favourites.retain(|id| *id != advertisement_id);
                user.modified_at = Utc::now();
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemorySessionStore {
    pub async fn clear(&self) {
        self.sessions.lock().await.clear();
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert_session(&self, session: &Session) -> Result<(), Error> {
        self.sessions.lock().await.push(session.clone());

        Ok(())
    }

    async fn fetch_session_by_token(&self, token: &str) -> Result<Option<Session>, Error> {
        let sessions = self.sessions.lock().await;

        Ok(sessions
            .iter()
            .find(|session| session.token == token)
            .cloned())
    }
}
