use actix_web::web::{Data, Json};
use actix_web::{get, post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::advertisement::AdvertisementId;
use crate::auth::Caller;
use crate::database::Database;
use crate::error::Error;

use super::{manager, User, UserId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateUserBody {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserBody {
    pub id: UserId,
    pub name: String,
    pub is_admin: bool,
    pub favourites: Vec<AdvertisementId>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl UserBody {
    pub fn render(user: User) -> UserBody {
        UserBody {
            id: user.id,
            name: user.name,
            is_admin: user.is_admin,
            favourites: user.favourites,
            created_at: user.created_at,
            modified_at: user.modified_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedUserBody {
    pub user: UserBody,
    pub token: String,
}

#[post("/users")]
#[tracing::instrument(skip(db))]
pub async fn create_user(
    db: Data<dyn Database>,
    body: Json<CreateUserBody>,
) -> Result<Json<CreatedUserBody>, Error> {
    let body = body.into_inner();

    let (user, session) = manager::create_user(&**db, body.name).await?;

    Ok(Json(CreatedUserBody {
        user: UserBody::render(user),
        token: session.token,
    }))
}

#[get("/users/me")]
#[tracing::instrument(skip(db))]
pub async fn get_current_user(
    db: Data<dyn Database>,
    caller: Caller,
) -> Result<Json<UserBody>, Error> {
    let user = manager::get_profile(&**db, &caller).await?;

    Ok(Json(UserBody::render(user)))
}
