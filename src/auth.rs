use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::Serialize;

use crate::database::Database;
use crate::error::Error;
use crate::user::{manager, User, UserId};

/// Every request kind the service handles. Handlers name their operation so
/// authentication requirements live in one place instead of per-route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Operation {
    ListAdvertisements,
    RetrieveAdvertisement,
    CreateAdvertisement,
    UpdateAdvertisement,
    PartialUpdateAdvertisement,
    DeleteAdvertisement,
    AddBookmark,
    RemoveBookmark,
    ListBookmarks,
    ViewProfile,
}

impl Operation {
    pub fn requires_authentication(self) -> bool {
        !matches!(
            self,
            Operation::ListAdvertisements | Operation::RetrieveAdvertisement
        )
    }

    /// Whether the caller must be the advertisement's creator (or an admin).
    pub fn requires_ownership(self) -> bool {
        matches!(
            self,
            Operation::UpdateAdvertisement
                | Operation::PartialUpdateAdvertisement
                | Operation::DeleteAdvertisement
        )
    }
}

/// Identity on whose behalf an operation runs.
#[derive(Clone, Debug)]
pub enum Caller {
    Anonymous,
    Authenticated(User),
}

impl Caller {
    pub fn user(&self) -> Option<&User> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(user) => Some(user),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user().map(|user| user.id)
    }

    pub fn is_admin(&self) -> bool {
        self.user().map_or(false, |user| user.is_admin)
    }

    pub fn require_user(&self, operation: Operation) -> Result<&User, Error> {
        match self.user() {
            Some(user) => Ok(user),
            None => Err(Error::NotAuthenticated { operation }),
        }
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Caller, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let db = req.app_data::<Data<dyn Database>>().cloned();

        Box::pin(async move {
            let token = match token? {
                Some(token) => token,
                None => return Ok(Caller::Anonymous),
            };

            let db = db.ok_or_else(|| {
                Error::ExistentialState("no database registered with the app".to_string())
            })?;

            let user = manager::authenticate(&**db, &token).await?;

            Ok(Caller::Authenticated(user))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, Error> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(header) => header,
        None => return Ok(None),
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(Error::InvalidAuthorizationHeader)?;

    Ok(Some(token.to_string()))
}
