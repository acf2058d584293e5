use async_trait::async_trait;
use mongodb::{bson, Collection, Database as MongoClientDatabase};

use crate::advertisement::db::{AdvertisementStore, MemoryAdvertisementStore};
use crate::advertisement::{self, Advertisement};
use crate::error::Error;
use crate::user::db::{MemorySessionStore, MemoryUserStore, SessionStore, UserStore};
use crate::user::{self, Session, User};

pub type MongoAdvertisementStore = Collection<Advertisement>;
pub type MongoUserStore = Collection<User>;
pub type MongoSessionStore = Collection<Session>;

#[async_trait]
pub trait Database: Send + Sync {
    fn advertisements(&self) -> &dyn AdvertisementStore;

    fn users(&self) -> &dyn UserStore;

    fn sessions(&self) -> &dyn SessionStore;

    /// Removes every record. Only used when seeding.
    async fn clear(&self) -> Result<(), Error>;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    advertisements: MongoAdvertisementStore,
    users: MongoUserStore,
    sessions: MongoSessionStore,
}

impl MongoDatabase {
    pub async fn initialize(db: MongoClientDatabase) -> Result<MongoDatabase, Error> {
        // ping the database to ensure connection is established
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        advertisement::db::initialize(&db).await?;
        user::db::initialize(&db).await?;

        Ok(MongoDatabase {
            advertisements: db.collection(advertisement::db::ADVERTISEMENTS),
            users: db.collection(user::db::USERS),
            sessions: db.collection(user::db::SESSIONS),
        })
    }
}

#[async_trait]
impl Database for MongoDatabase {
    fn advertisements(&self) -> &dyn AdvertisementStore {
        &self.advertisements
    }

    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    fn sessions(&self) -> &dyn SessionStore {
        &self.sessions
    }

    #[tracing::instrument(skip(self))]
    async fn clear(&self) -> Result<(), Error> {
        // delete documents rather than dropping so indexes survive
        self.advertisements.delete_many(bson::doc! {}, None).await?;
        self.users.delete_many(bson::doc! {}, None).await?;
        self.sessions.delete_many(bson::doc! {}, None).await?;
        Ok(())
    }
}

/// Process-local storage with the same semantics as the mongo stores.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    advertisements: MemoryAdvertisementStore,
    users: MemoryUserStore,
    sessions: MemorySessionStore,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn advertisements(&self) -> &dyn AdvertisementStore {
        &self.advertisements
    }

    fn users(&self) -> &dyn UserStore {
        &self.users
    }

    fn sessions(&self) -> &dyn SessionStore {
        &self.sessions
    }

    async fn clear(&self) -> Result<(), Error> {
        self.advertisements.clear().await;
        self.users.clear().await;
        self.sessions.clear().await;
        Ok(())
    }
}
