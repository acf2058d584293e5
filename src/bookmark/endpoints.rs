use actix_web::web::{Data, Json, Path};
use actix_web::{get, patch};

use crate::advertisement::{AdvertisementBody, AdvertisementId};
use crate::auth::Caller;
use crate::database::Database;
use crate::error::Error;
use crate::utils::SuccessBody;

use super::manager;

#[patch("/advertisements/{advertisement_id}/add-bookmark")]
#[tracing::instrument(skip(db))]
pub async fn add_bookmark(
    db: Data<dyn Database>,
    caller: Caller,
    params: Path<AdvertisementId>,
) -> Result<Json<SuccessBody>, Error> {
    let advertisement_id = params.into_inner();

    manager::add_bookmark(&**db, &caller, advertisement_id).await?;

    Ok(Json(SuccessBody::ok()))
}

#[patch("/advertisements/{advertisement_id}/remove-bookmark")]
#[tracing::instrument(skip(db))]
pub async fn remove_bookmark(
    db: Data<dyn Database>,
    caller: Caller,
    params: Path<AdvertisementId>,
) -> Result<Json<SuccessBody>, Error> {
    let advertisement_id = params.into_inner();

    manager::remove_bookmark(&**db, &caller, advertisement_id).await?;

    Ok(Json(SuccessBody::ok()))
}

#[get("/advertisements/bookmarks-list")]
#[tracing::instrument(skip(db))]
pub async fn get_bookmarks(
    db: Data<dyn Database>,
    caller: Caller,
) -> Result<Json<Vec<AdvertisementBody>>, Error> {
    let advertisements = manager::get_bookmarks(&**db, &caller).await?;

    let body = advertisements
        .into_iter()
        .map(AdvertisementBody::render)
        .collect();

    Ok(Json(body))
}
