use crate::advertisement::filter::AdvertisementQuery;
use crate::advertisement::policy::Visibility;
use crate::advertisement::{Advertisement, AdvertisementId};
use crate::auth::{Caller, Operation};
use crate::database::Database;
use crate::error::Error;

/// Adding an existing bookmark again is a no-op. The caller's own
/// advertisements cannot be bookmarked, and drafts the caller cannot see are
/// reported as missing.
#[tracing::instrument(skip(db))]
pub async fn add_bookmark(
    db: &dyn Database,
    caller: &Caller,
    advertisement_id: AdvertisementId,
) -> Result<(), Error> {
    let user = caller.require_user(Operation::AddBookmark)?;

    let advertisement = db
        .advertisements()
        .fetch_advertisement_by_id(advertisement_id)
        .await?
        .filter(|advertisement| Visibility::for_caller(caller).permits(advertisement))
        .ok_or(Error::AdvertisementDoesNotExist { advertisement_id })?;

    if advertisement.is_created_by(user.id) {
        return Err(Error::CannotBookmarkOwnAdvertisement { advertisement_id });
    }

    db.users().add_favourite(user.id, advertisement_id).await?;

    Ok(())
}

/// Removing a bookmark that is not there is a no-op. The advertisement is
/// not looked up, so a bookmark left pointing at a deleted advertisement can
/// still be removed.
#[tracing::instrument(skip(db))]
pub async fn remove_bookmark(
    db: &dyn Database,
    caller: &Caller,
    advertisement_id: AdvertisementId,
) -> Result<(), Error> {
    let user = caller.require_user(Operation::RemoveBookmark)?;

    db.users().remove_favourite(user.id, advertisement_id).await?;

    Ok(())
}

/// The caller's favourites set, including advertisements that have since
/// gone back to draft.
#[tracing::instrument(skip(db))]
pub async fn get_bookmarks(db: &dyn Database, caller: &Caller) -> Result<Vec<Advertisement>, Error> {
    let user = caller.require_user(Operation::ListBookmarks)?;

    // the caller snapshot may predate its latest bookmark changes
    let favourites = db
        .users()
        .fetch_user_by_id(user.id)
        .await?
        .map(|user| user.favourites)
        .unwrap_or_default();

    if favourites.is_empty() {
        return Ok(vec![]);
    }

    let query = AdvertisementQuery::by_ids(favourites);
    let advertisements = db.advertisements().fetch_advertisements(&query).await?;

    Ok(advertisements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advertisement::manager::{
        create_advertisement, delete_advertisement, update_advertisement,
    };
    use crate::advertisement::{AdvertisementChanges, AdvertisementStatus, NewAdvertisement};
    use crate::database::MemoryDatabase;
    use crate::user::manager::create_user;

    async fn caller(db: &MemoryDatabase, name: &str) -> Caller {
        let (user, _session) = create_user(db, name.to_string()).await.unwrap();
        Caller::Authenticated(user)
    }

    async fn advertisement(
        db: &MemoryDatabase,
        creator: &Caller,
        status: AdvertisementStatus,
    ) -> Advertisement {
        let new = NewAdvertisement {
            title: "Road bike".to_string(),
            description: "56cm frame".to_string(),
            price: Some(30000),
            status,
        };
        create_advertisement(db, creator, new).await.unwrap()
    }

    async fn favourites(db: &MemoryDatabase, caller: &Caller) -> Vec<AdvertisementId> {
        db.users()
            .fetch_user_by_id(caller.user_id().unwrap())
            .await
            .unwrap()
            .unwrap()
            .favourites
    }

    fn ids(advertisements: &[Advertisement]) -> Vec<AdvertisementId> {
        advertisements.iter().map(|ad| ad.id).collect()
    }

    #[tokio::test]
    async fn cannot_bookmark_own_advertisement() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let bob = caller(&db, "Bob").await;
        let y = advertisement(&db, &alice, AdvertisementStatus::Open).await;

        assert_eq!(
            add_bookmark(&db, &alice, y.id).await.unwrap_err(),
            Error::CannotBookmarkOwnAdvertisement {
                advertisement_id: y.id
            }
        );
        assert!(favourites(&db, &alice).await.is_empty());

        add_bookmark(&db, &bob, y.id).await.unwrap();
        assert_eq!(ids(&get_bookmarks(&db, &bob).await.unwrap()), vec![y.id]);
        assert!(get_bookmarks(&db, &alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn adding_twice_is_a_no_op() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let bob = caller(&db, "Bob").await;
        let ad = advertisement(&db, &alice, AdvertisementStatus::Closed).await;

        add_bookmark(&db, &bob, ad.id).await.unwrap();
        add_bookmark(&db, &bob, ad.id).await.unwrap();

        assert_eq!(favourites(&db, &bob).await, vec![ad.id]);
    }

    #[tokio::test]
    async fn missing_or_hidden_advertisement_is_not_found() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let bob = caller(&db, "Bob").await;
        let draft = advertisement(&db, &alice, AdvertisementStatus::Draft).await;
        let missing = AdvertisementId::new();

        assert_eq!(
            add_bookmark(&db, &bob, draft.id).await.unwrap_err(),
            Error::AdvertisementDoesNotExist {
                advertisement_id: draft.id
            }
        );
        assert_eq!(
            add_bookmark(&db, &bob, missing).await.unwrap_err(),
            Error::AdvertisementDoesNotExist {
                advertisement_id: missing
            }
        );
        assert!(favourites(&db, &bob).await.is_empty());
    }

    #[tokio::test]
    async fn anonymous_callers_have_no_bookmarks() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let ad = advertisement(&db, &alice, AdvertisementStatus::Open).await;

        assert_eq!(
            get_bookmarks(&db, &Caller::Anonymous).await.unwrap_err(),
            Error::NotAuthenticated {
                operation: Operation::ListBookmarks
            }
        );
        assert_eq!(
            add_bookmark(&db, &Caller::Anonymous, ad.id)
                .await
                .unwrap_err(),
            Error::NotAuthenticated {
                operation: Operation::AddBookmark
            }
        );
    }

    #[tokio::test]
    async fn removing_a_bookmark() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let bob = caller(&db, "Bob").await;
        let first = advertisement(&db, &alice, AdvertisementStatus::Open).await;
        let second = advertisement(&db, &alice, AdvertisementStatus::Open).await;

        add_bookmark(&db, &bob, first.id).await.unwrap();
        add_bookmark(&db, &bob, second.id).await.unwrap();
        remove_bookmark(&db, &bob, first.id).await.unwrap();
        remove_bookmark(&db, &bob, first.id).await.unwrap();

        assert_eq!(
            ids(&get_bookmarks(&db, &bob).await.unwrap()),
            vec![second.id]
        );
    }

    #[tokio::test]
    async fn bookmarks_stay_listed_after_going_back_to_draft() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let bob = caller(&db, "Bob").await;
        let ad = advertisement(&db, &alice, AdvertisementStatus::Open).await;

        add_bookmark(&db, &bob, ad.id).await.unwrap();
        let changes = AdvertisementChanges {
            status: Some(AdvertisementStatus::Draft),
            ..Default::default()
        };
        update_advertisement(
            &db,
            &alice,
            ad.id,
            changes,
            Operation::PartialUpdateAdvertisement,
        )
        .await
        .unwrap();

        let listed = get_bookmarks(&db, &bob).await.unwrap();
        assert_eq!(ids(&listed), favourites(&db, &bob).await);
        assert_eq!(listed[0].status, AdvertisementStatus::Draft);
    }

    #[tokio::test]
    async fn deleting_an_advertisement_drops_its_bookmarks() {
        let db = MemoryDatabase::new();
        let alice = caller(&db, "Alice").await;
        let bob = caller(&db, "Bob").await;
        let ad = advertisement(&db, &alice, AdvertisementStatus::Open).await;

        add_bookmark(&db, &bob, ad.id).await.unwrap();
        delete_advertisement(&db, &alice, ad.id).await.unwrap();

        assert!(favourites(&db, &bob).await.is_empty());
        remove_bookmark(&db, &bob, ad.id).await.unwrap();
    }

    #[tokio::test]
    async fn removing_a_bookmark_to_a_deleted_advertisement() {
        let db = MemoryDatabase::new();
        let bob = caller(&db, "Bob").await;
        let gone = AdvertisementId::new();

        // a bookmark added concurrently with the advertisement's deletion
        db.users()
            .add_favourite(bob.user_id().unwrap(), gone)
            .await
            .unwrap();
        assert!(get_bookmarks(&db, &bob).await.unwrap().is_empty());

        remove_bookmark(&db, &bob, gone).await.unwrap();

        assert!(favourites(&db, &bob).await.is_empty());
    }
}
