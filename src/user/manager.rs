use chrono::Utc;

use crate::auth::{Caller, Operation};
use crate::database::Database;
use crate::error::Error;

use super::{Session, User, UserId};

/// Registers a regular user and opens a first session for it.
#[tracing::instrument(skip(db))]
pub async fn create_user(db: &dyn Database, name: String) -> Result<(User, Session), Error> {
    insert_user(db, name, false).await
}

/// Admins are never created through the api.
#[tracing::instrument(skip(db))]
pub async fn create_admin(db: &dyn Database, name: String) -> Result<(User, Session), Error> {
    insert_user(db, name, true).await
}

async fn insert_user(
    db: &dyn Database,
    name: String,
    is_admin: bool,
) -> Result<(User, Session), Error> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::BlankName);
    }

    let now = Utc::now();
    let user = User {
        id: UserId::new(),
        name,
        is_admin,
        favourites: vec![],
        created_at: now,
        modified_at: now,
    };
    let session = Session::generate(user.id);

    db.users().insert_user(&user).await?;
    db.sessions().insert_session(&session).await?;

    Ok((user, session))
}

#[tracing::instrument(skip_all)]
pub async fn authenticate(db: &dyn Database, token: &str) -> Result<User, Error> {
    let session = db
        .sessions()
        .fetch_session_by_token(token)
        .await?
        .ok_or(Error::InvalidToken)?;

    let user = db
        .users()
        .fetch_user_by_id(session.user_id)
        .await?
        .ok_or(Error::InvalidToken)?;

    Ok(user)
}

#[tracing::instrument(skip(db))]
pub async fn get_profile(db: &dyn Database, caller: &Caller) -> Result<User, Error> {
    let user = caller.require_user(Operation::ViewProfile)?;

    let user = db
        .users()
        .fetch_user_by_id(user.id)
        .await?
        .ok_or_else(|| Error::ExistentialState(format!("user {} vanished", user.id)))?;

    Ok(user)
}
