use chrono::Utc;

use crate::auth::{Caller, Operation};
use crate::database::Database;
use crate::error::Error;
use crate::user::User;

use super::filter::{AdvertisementFilter, AdvertisementQuery};
use super::policy::{self, Visibility};
use super::{Advertisement, AdvertisementChanges, AdvertisementId, NewAdvertisement};

#[tracing::instrument(skip(db))]
pub async fn get_advertisements(
    db: &dyn Database,
    caller: &Caller,
    filter: AdvertisementFilter,
) -> Result<Vec<Advertisement>, Error> {
    let query = AdvertisementQuery::new(Visibility::for_caller(caller)).with_filter(filter);
    let advertisements = db.advertisements().fetch_advertisements(&query).await?;

    Ok(advertisements)
}

/// Invisible drafts are reported as missing so their existence does not
/// leak.
#[tracing::instrument(skip(db))]
pub async fn get_advertisement_by_id(
    db: &dyn Database,
    caller: &Caller,
    advertisement_id: AdvertisementId,
) -> Result<Advertisement, Error> {
    let advertisement = db
        .advertisements()
        .fetch_advertisement_by_id(advertisement_id)
        .await?
        .filter(|advertisement| Visibility::for_caller(caller).permits(advertisement))
        .ok_or(Error::AdvertisementDoesNotExist { advertisement_id })?;

    Ok(advertisement)
}

#[tracing::instrument(skip(db))]
pub async fn create_advertisement(
    db: &dyn Database,
    caller: &Caller,
    new: NewAdvertisement,
) -> Result<Advertisement, Error> {
    let user = caller.require_user(Operation::CreateAdvertisement)?;
    validate_title(&new.title)?;
    validate_price(new.price)?;

    let now = Utc::now();
    let advertisement = Advertisement {
        id: AdvertisementId::new(),
        creator_id: user.id,
        title: new.title,
        description: new.description,
        price: new.price,
        status: new.status,
        created_at: now,
        modified_at: now,
    };

    db.advertisements()
        .insert_advertisement(&advertisement)
        .await?;

    Ok(advertisement)
}

/// Used for both full and partial updates; `operation` only says which one
/// was requested.
#[tracing::instrument(skip(db))]
pub async fn update_advertisement(
    db: &dyn Database,
    caller: &Caller,
    advertisement_id: AdvertisementId,
    changes: AdvertisementChanges,
    operation: Operation,
) -> Result<Advertisement, Error> {
    let user = caller.require_user(operation)?;
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    if let Some(price) = changes.price {
        validate_price(price)?;
    }

    let advertisement = expect_mutable_advertisement(db, user, advertisement_id, operation).await?;

    let advertisement = db
        .advertisements()
        .update_advertisement(advertisement, changes)
        .await?;

    Ok(advertisement)
}

#[tracing::instrument(skip(db))]
pub async fn delete_advertisement(
    db: &dyn Database,
    caller: &Caller,
    advertisement_id: AdvertisementId,
) -> Result<(), Error> {
    let operation = Operation::DeleteAdvertisement;
    let user = caller.require_user(operation)?;

    expect_mutable_advertisement(db, user, advertisement_id, operation).await?;

    if !db
        .advertisements()
        .delete_advertisement(advertisement_id)
        .await?
    {
        return Err(Error::AdvertisementDoesNotExist { advertisement_id });
    }

    // the bookmark relation does not outlive the advertisement
    db.users().remove_favourite_from_all(advertisement_id).await?;

    Ok(())
}

/// Admins may mutate drafts they cannot see; everyone else gets a not-found
/// for those before ownership is checked.
async fn expect_mutable_advertisement(
    db: &dyn Database,
    user: &User,
    advertisement_id: AdvertisementId,
    operation: Operation,
) -> Result<Advertisement, Error> {
    let visibility = Visibility {
        viewer: Some(user.id),
    };

    let advertisement = db
        .advertisements()
        .fetch_advertisement_by_id(advertisement_id)
        .await?
        .filter(|advertisement| user.is_admin || visibility.permits(advertisement))
        .ok_or(Error::AdvertisementDoesNotExist { advertisement_id })?;

    policy::ensure_can_mutate(user, &advertisement, operation)?;

    Ok(advertisement)
}

fn validate_title(title: &str) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::BlankTitle);
    }

    Ok(())
}

fn validate_price(price: Option<i64>) -> Result<(), Error> {
    match price {
        Some(price) if price < 0 => Err(Error::NegativePrice { price }),
        _ => Ok(()),
    }
}
