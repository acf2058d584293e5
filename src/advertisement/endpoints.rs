use actix_web::web::{Data, Json, Path, Query};
use actix_web::{delete, get, patch, post, put};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::{Caller, Operation};
use crate::database::Database;
use crate::error::Error;
use crate::user::UserId;
use crate::utils::SuccessBody;

use super::filter::AdvertisementFilter;
use super::{
    manager, Advertisement, AdvertisementChanges, AdvertisementId, AdvertisementStatus,
    NewAdvertisement,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateAdvertisementBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub status: AdvertisementStatus,
}

/// Full replacement of the editable fields; omitted optional fields are
/// reset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateAdvertisementBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<i64>,
    pub status: AdvertisementStatus,
}

/// Omitted fields are left unchanged; `"price": null` clears the price.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PartialUpdateAdvertisementBody {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Option<i64>>,
    pub status: Option<AdvertisementStatus>,
}

// only called when the field is present, so `null` becomes `Some(None)`
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvertisementBody {
    pub id: AdvertisementId,
    pub creator_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub status: AdvertisementStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl AdvertisementBody {
    pub fn render(advertisement: Advertisement) -> AdvertisementBody {
        AdvertisementBody {
            id: advertisement.id,
            creator_id: advertisement.creator_id,
            title: advertisement.title,
            description: advertisement.description,
            price: advertisement.price,
            status: advertisement.status,
            created_at: advertisement.created_at,
            modified_at: advertisement.modified_at,
        }
    }
}

#[get("/advertisements")]
#[tracing::instrument(skip(db))]
pub async fn get_advertisements(
    db: Data<dyn Database>,
    caller: Caller,
    query: Query<AdvertisementFilter>,
) -> Result<Json<Vec<AdvertisementBody>>, Error> {
    let filter = query.into_inner();

    let advertisements = manager::get_advertisements(&**db, &caller, filter).await?;

    let body = advertisements
        .into_iter()
        .map(AdvertisementBody::render)
        .collect();

    Ok(Json(body))
}

#[get("/advertisements/{advertisement_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_advertisement_by_id(
    db: Data<dyn Database>,
    caller: Caller,
    params: Path<AdvertisementId>,
) -> Result<Json<AdvertisementBody>, Error> {
    let advertisement_id = params.into_inner();

    let advertisement = manager::get_advertisement_by_id(&**db, &caller, advertisement_id).await?;

    Ok(Json(AdvertisementBody::render(advertisement)))
}

#[post("/advertisements")]
#[tracing::instrument(skip(db))]
pub async fn create_advertisement(
    db: Data<dyn Database>,
    caller: Caller,
    body: Json<CreateAdvertisementBody>,
) -> Result<Json<AdvertisementBody>, Error> {
    let body = body.into_inner();

    let new = NewAdvertisement {
        title: body.title,
        description: body.description,
        price: body.price,
        status: body.status,
    };
    let advertisement = manager::create_advertisement(&**db, &caller, new).await?;

    Ok(Json(AdvertisementBody::render(advertisement)))
}

#[put("/advertisements/{advertisement_id}")]
#[tracing::instrument(skip(db))]
pub async fn update_advertisement(
    db: Data<dyn Database>,
    caller: Caller,
    params: Path<AdvertisementId>,
    body: Json<UpdateAdvertisementBody>,
) -> Result<Json<AdvertisementBody>, Error> {
    let advertisement_id = params.into_inner();
    let body = body.into_inner();

    let changes = AdvertisementChanges {
        title: Some(body.title),
        description: Some(body.description),
        price: Some(body.price),
        status: Some(body.status),
    };
    let advertisement = manager::update_advertisement(
        &**db,
        &caller,
        advertisement_id,
        changes,
        Operation::UpdateAdvertisement,
    )
    .await?;

    Ok(Json(AdvertisementBody::render(advertisement)))
}

#[patch("/advertisements/{advertisement_id}")]
#[tracing::instrument(skip(db))]
pub async fn partial_update_advertisement(
    db: Data<dyn Database>,
    caller: Caller,
    params: Path<AdvertisementId>,
    body: Json<PartialUpdateAdvertisementBody>,
) -> Result<Json<AdvertisementBody>, Error> {
    let advertisement_id = params.into_inner();
    let body = body.into_inner();

    let changes = AdvertisementChanges {
        title: body.title,
        description: body.description,
        price: body.price,
        status: body.status,
    };
    let advertisement = manager::update_advertisement(
        &**db,
        &caller,
        advertisement_id,
        changes,
        Operation::PartialUpdateAdvertisement,
    )
    .await?;

    Ok(Json(AdvertisementBody::render(advertisement)))
}

#[delete("/advertisements/{advertisement_id}")]
#[tracing::instrument(skip(db))]
pub async fn delete_advertisement(
    db: Data<dyn Database>,
    caller: Caller,
    params: Path<AdvertisementId>,
) -> Result<Json<SuccessBody>, Error> {
    let advertisement_id = params.into_inner();

    manager::delete_advertisement(&**db, &caller, advertisement_id).await?;

    Ok(Json(SuccessBody::ok()))
}
