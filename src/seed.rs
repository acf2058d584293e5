use chrono::Utc;
use tracing::info;

use crate::advertisement::{Advertisement, AdvertisementId, AdvertisementStatus};
use crate::database::Database;
use crate::error::Error;
use crate::user::{Session, User, UserId};

const ALICE_TOKEN: &str = "alice0000000000000000000000000000000000";
const BOB_TOKEN: &str = "bob000000000000000000000000000000000000";
const ADMIN_TOKEN: &str = "admin000000000000000000000000000000000";

/// Replaces all data with a small fixture set: two regular users, one admin,
/// and an advertisement in each status.
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    db.clear().await?;

    let alice = seed_user(db, "Alice", false, ALICE_TOKEN).await?;
    let bob = seed_user(db, "Bob", false, BOB_TOKEN).await?;
    seed_user(db, "Admin", true, ADMIN_TOKEN).await?;

    let bicycle = seed_advertisement(
        db,
        &alice,
        "Bicycle",
        "City bike, recently serviced",
        Some(15000),
        AdvertisementStatus::Open,
    )
    .await?;
    seed_advertisement(
        db,
        &alice,
        "Sofa",
        "Not sure yet if I want to sell it",
        None,
        AdvertisementStatus::Draft,
    )
    .await?;
    seed_advertisement(
        db,
        &bob,
        "Winter tyres",
        "Set of four, 205/55 R16",
        Some(20000),
        AdvertisementStatus::Closed,
    )
    .await?;

    db.users().add_favourite(bob.id, bicycle.id).await?;

    info!("seeded users alice, bob and admin with fixed tokens");

    Ok(())
}

async fn seed_user(
    db: &dyn Database,
    name: &str,
    is_admin: bool,
    token: &str,
) -> Result<User, Error> {
    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        name: name.to_string(),
        is_admin,
        favourites: vec![],
        created_at: now,
        modified_at: now,
    };
    let session = Session {
        token: token.to_string(),
        user_id: user.id,
        created_at: now,
    };

    db.users().insert_user(&user).await?;
    db.sessions().insert_session(&session).await?;

    Ok(user)
}

async fn seed_advertisement(
    db: &dyn Database,
    creator: &User,
    title: &str,
    description: &str,
    price: Option<i64>,
    status: AdvertisementStatus,
) -> Result<Advertisement, Error> {
    let now = Utc::now();
    let advertisement = Advertisement {
        id: AdvertisementId::new(),
        creator_id: creator.id,
        title: title.to_string(),
        description: description.to_string(),
        price,
        status,
        created_at: now,
        modified_at: now,
    };

    db.advertisements()
        .insert_advertisement(&advertisement)
        .await?;

    Ok(advertisement)
}
