use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, Document};
use mongodb::options::FindOptions;
use mongodb::Database;
use tokio::sync::Mutex;

use crate::database::MongoAdvertisementStore;
use crate::error::Error;

use super::filter::AdvertisementQuery;
use super::policy::Visibility;
use super::{Advertisement, AdvertisementChanges, AdvertisementId, AdvertisementStatus};

pub const ADVERTISEMENTS: &str = "advertisements";

pub async fn initialize(db: &Database) -> Result<(), Error> {
    db.run_command(
        bson::doc! {
            "createIndexes": ADVERTISEMENTS,
            "indexes": [
                { "key": { "status": 1, "creator_id": 1 }, "name": "by_status_and_creator" },
                { "key": { "created_at": 1 }, "name": "by_created_at" },
            ]
        },
        None,
    )
    .await?;

    Ok(())
}

#[async_trait]
pub trait AdvertisementStore: Send + Sync {
    async fn insert_advertisement(&self, advertisement: &Advertisement) -> Result<(), Error>;

    /// Oldest first.
    async fn fetch_advertisements(
        &self,
        query: &AdvertisementQuery,
    ) -> Result<Vec<Advertisement>, Error>;

    /// Does not apply any visibility rules.
    async fn fetch_advertisement_by_id(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<Option<Advertisement>, Error>;

    /// Fails with `ConcurrentModificationDetected` if the stored record has
    /// changed since `advertisement` was read.
    async fn update_advertisement(
        &self,
        advertisement: Advertisement,
        changes: AdvertisementChanges,
    ) -> Result<Advertisement, Error>;

    async fn delete_advertisement(&self, advertisement_id: AdvertisementId)
        -> Result<bool, Error>;
}

fn visibility_document(visibility: &Visibility) -> Document {
    let published = bson::doc! {
        "status": {
            "$in": [AdvertisementStatus::Open.as_str(), AdvertisementStatus::Closed.as_str()]
        }
    };

    match visibility.viewer {
        Some(viewer) => bson::doc! {
            "$or": [
                published,
                { "status": AdvertisementStatus::Draft.as_str(), "creator_id": viewer },
            ]
        },
        None => published,
    }
}

fn query_document(query: &AdvertisementQuery) -> Document {
    let mut clauses = Vec::new();
    if let Some(visibility) = &query.visibility {
        clauses.push(visibility_document(visibility));
    }

    let filter = &query.filter;
    if let Some(creator_id) = filter.creator_id {
        clauses.push(bson::doc! { "creator_id": creator_id });
    }
    if let Some(status) = filter.status {
        clauses.push(bson::doc! { "status": status.as_str() });
    }

    let mut created_at = Document::new();
    if let Some(created_after) = filter.created_after {
        created_at.insert("$gte", bson::DateTime::from_chrono(created_after));
    }
    if let Some(created_before) = filter.created_before {
        created_at.insert("$lte", bson::DateTime::from_chrono(created_before));
    }
    if !created_at.is_empty() {
        clauses.push(bson::doc! { "created_at": created_at });
    }

    if let Some(ids) = &query.ids {
        let ids: Vec<Bson> = ids.iter().copied().map(Bson::from).collect();
        clauses.push(bson::doc! { "_id": { "$in": ids } });
    }

    if clauses.is_empty() {
        return Document::new();
    }

    bson::doc! { "$and": clauses }
}

#[async_trait]
impl AdvertisementStore for MongoAdvertisementStore {
    #[tracing::instrument(skip(self))]
    async fn insert_advertisement(&self, advertisement: &Advertisement) -> Result<(), Error> {
        self.insert_one(advertisement, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_advertisements(
        &self,
        query: &AdvertisementQuery,
    ) -> Result<Vec<Advertisement>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": 1 })
            .build();

        let advertisements: Vec<Advertisement> = self
            .find(query_document(query), options)
            .await?
            .try_collect()
            .await?;

        Ok(advertisements)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_advertisement_by_id(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<Option<Advertisement>, Error> {
        let advertisement = self
            .find_one(bson::doc! { "_id": advertisement_id }, None)
            .await?;

        Ok(advertisement)
    }

    #[tracing::instrument(skip(self))]
    async fn update_advertisement(
        &self,
        advertisement: Advertisement,
        changes: AdvertisementChanges,
    ) -> Result<Advertisement, Error> {
        let old_modified_at = bson::DateTime::from_chrono(advertisement.modified_at);

        let mut updated = advertisement;
        updated.modified_at = updated.next_modified_at();
        changes.apply_to(&mut updated);

        let result = self
            .replace_one(
                bson::doc! { "_id": updated.id, "modified_at": old_modified_at },
                &updated,
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_advertisement(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<bool, Error> {
        let result = self
            .delete_one(bson::doc! { "_id": advertisement_id }, None)
            .await?;

        Ok(result.deleted_count > 0)
    }
}

/// Keeps advertisements in insertion order, which is also creation order.
#[derive(Debug, Default)]
pub struct MemoryAdvertisementStore {
    advertisements: Mutex<Vec<Advertisement>>,
}

impl MemoryAdvertisementStore {
    pub async fn clear(&self) {
        self.advertisements.lock().await.clear();
    }
}

#[async_trait]
impl AdvertisementStore for MemoryAdvertisementStore {
    async fn insert_advertisement(&self, advertisement: &Advertisement) -> Result<(), Error> {
        self.advertisements.lock().await.push(advertisement.clone());

        Ok(())
    }

    async fn fetch_advertisements(
        &self,
        query: &AdvertisementQuery,
    ) -> Result<Vec<Advertisement>, Error> {
        let advertisements = self.advertisements.lock().await;

        Ok(advertisements
            .iter()
            .filter(|advertisement| query.matches(advertisement))
            .cloned()
            .collect())
    }

    async fn fetch_advertisement_by_id(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<Option<Advertisement>, Error> {
        let advertisements = self.advertisements.lock().await;

        Ok(advertisements
            .iter()
            .find(|advertisement| advertisement.id == advertisement_id)
            .cloned())
    }

    async fn update_advertisement(
        &self,
        advertisement: Advertisement,
        changes: AdvertisementChanges,
    ) -> Result<Advertisement, Error> {
        let mut advertisements = self.advertisements.lock().await;

        let stored = advertisements
            .iter_mut()
            .find(|stored| stored.id == advertisement.id)
            .filter(|stored| stored.modified_at == advertisement.modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        let mut updated = advertisement;
        updated.modified_at = updated.next_modified_at();
        changes.apply_to(&mut updated);
        *stored = updated.clone();

        Ok(updated)
    }

    async fn delete_advertisement(
        &self,
        advertisement_id: AdvertisementId,
    ) -> Result<bool, Error> {
        let mut advertisements = self.advertisements.lock().await;

        let before = advertisements.len();
        advertisements.retain(|advertisement| advertisement.id != advertisement_id);

        Ok(advertisements.len() < before)
    }
}
