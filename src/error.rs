use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use dotenvy::Error as ConfigFileError;
use envy::Error as ConfigError;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::advertisement::AdvertisementId;
use crate::auth::Operation;
use crate::user::UserId;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    BlankTitle,
    BlankName,
    NegativePrice {
        price: i64,
    },

    // 401
    NotAuthenticated {
        operation: Operation,
    },
    InvalidAuthorizationHeader,
    InvalidToken,

    // 403
    NotAdvertisementCreator {
        advertisement_id: AdvertisementId,
        user_id: UserId,
    },

    // 404
    PathDoesNotExist,
    AdvertisementDoesNotExist {
        advertisement_id: AdvertisementId,
    },

    // 409
    ConcurrentModificationDetected,
    CannotBookmarkOwnAdvertisement {
        advertisement_id: AdvertisementId,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    InvalidConfig(#[derivative(PartialEq = "ignore")] ConfigError),
    #[serde(serialize_with = "display")]
    InvalidConfigFile(#[derivative(PartialEq = "ignore")] ConfigFileError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

/// Coarse classification that callers can branch on without matching every
/// variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    DomainViolation,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidJson(_)
            | Error::InvalidPath(_)
            | Error::InvalidForm(_)
            | Error::InvalidQuery(_)
            | Error::BlankTitle
            | Error::BlankName
            | Error::NegativePrice { .. } => ErrorKind::BadRequest,
            Error::NotAuthenticated { .. }
            | Error::InvalidAuthorizationHeader
            | Error::InvalidToken => ErrorKind::Unauthorized,
            Error::NotAdvertisementCreator { .. } => ErrorKind::Forbidden,
            Error::PathDoesNotExist | Error::AdvertisementDoesNotExist { .. } => {
                ErrorKind::NotFound
            }
            Error::ConcurrentModificationDetected => ErrorKind::Conflict,
            Error::CannotBookmarkOwnAdvertisement { .. } => ErrorKind::DomainViolation,
            Error::ExistentialState(_)
            | Error::FailedDatabaseCall(_)
            | Error::FailedToSerializeToBson(_)
            | Error::InvalidConfig(_)
            | Error::InvalidConfigFile(_)
            | Error::IoError(_) => ErrorKind::Internal,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::InvalidQuery(_) => "E4001003",
            Error::BlankTitle => "E4001004",
            Error::BlankName => "E4001005",
            Error::NegativePrice { .. } => "E4001006",
            Error::NotAuthenticated { .. } => "E4011000",
            Error::InvalidAuthorizationHeader => "E4011001",
            Error::InvalidToken => "E4011002",
            Error::NotAdvertisementCreator { .. } => "E4031000",
            Error::PathDoesNotExist => "E4041000",
            Error::AdvertisementDoesNotExist { .. } => "E4041001",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::CannotBookmarkOwnAdvertisement { .. } => "E4091001",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::InvalidConfig(_) => "E5001003",
            Error::IoError(_) => "E5001004",
            Error::InvalidConfigFile(_) => "E5001005",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::BlankTitle => "An advertisement must have a non-blank title",
            Error::BlankName => "A user must have a non-blank name",
            Error::NegativePrice { .. } => "An advertisement price cannot be negative",
            Error::NotAuthenticated { .. } => "The requested operation requires authentication",
            Error::InvalidAuthorizationHeader => {
                "The authorization header must have the form 'Bearer <token>'"
            }
            Error::InvalidToken => "The provided token does not belong to an active session",
            Error::NotAdvertisementCreator { .. } => {
                "Only the creator or an admin may modify this advertisement"
            }
            Error::PathDoesNotExist => "The requested path does not exist",
            Error::AdvertisementDoesNotExist { .. } => "The requested advertisement does not exist",
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::CannotBookmarkOwnAdvertisement { .. } => {
                "You cannot add your own advertisement to your favourites"
            }
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::InvalidConfig(_) => "The server configuration could not be loaded",
            Error::IoError(_) => "An error occurred during an I/O operation",
            Error::InvalidConfigFile(_) => "The .env file could not be loaded",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::DomainViolation => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Dummy<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Dummy {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Error {
        Error::InvalidConfig(error)
    }
}

impl From<ConfigFileError> for Error {
    fn from(error: ConfigFileError) -> Error {
        Error::InvalidConfigFile(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::InvalidConfig(err) => Some(err),
            Error::InvalidConfigFile(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
