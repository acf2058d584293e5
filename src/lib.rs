use std::sync::Arc;

use actix_web::web::{self, Data, FormConfig, JsonConfig, PathConfig, QueryConfig, ServiceConfig};
use actix_web::{App, HttpServer, ResponseError};
use mongodb::Client;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod advertisement;
pub mod auth;
pub mod bookmark;
pub mod config;
pub mod database;
pub mod error;
pub mod seed;
pub mod typedid;
pub mod user;
pub mod utils;

pub use config::{Config, Storage};
pub use error::Error;

use crate::database::{Database, MemoryDatabase, MongoDatabase};

/// Registers extractor error formatting, every route, and the fallback for
/// unknown paths. The caller provides the `Data<dyn Database>`.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.app_data(JsonConfig::default().error_handler(|err, _req| {
        // format json errors with custom format
        Error::InvalidJson(err).into()
    }))
    .app_data(PathConfig::default().error_handler(|err, _req| {
        // format path errors with custom format
        Error::InvalidPath(err).into()
    }))
    .app_data(FormConfig::default().error_handler(|err, _req| {
        // format form errors with custom format
        Error::InvalidForm(err).into()
    }))
    .app_data(QueryConfig::default().error_handler(|err, _req| {
        // format query errors with custom format
        Error::InvalidQuery(err).into()
    }))
    // must be registered before the `{advertisement_id}` routes
    .service(bookmark::endpoints::get_bookmarks)
    .service(bookmark::endpoints::add_bookmark)
    .service(bookmark::endpoints::remove_bookmark)
    .service(advertisement::endpoints::get_advertisements)
    .service(advertisement::endpoints::get_advertisement_by_id)
    .service(advertisement::endpoints::create_advertisement)
    .service(advertisement::endpoints::update_advertisement)
    .service(advertisement::endpoints::partial_update_advertisement)
    .service(advertisement::endpoints::delete_advertisement)
    .service(user::endpoints::create_user)
    .service(user::endpoints::get_current_user)
    .default_service(web::to(|| async { Error::PathDoesNotExist.error_response() }));
}

pub async fn connect(config: &Config) -> Result<Arc<dyn Database>, Error> {
    let db: Arc<dyn Database> = match config.storage {
        Storage::Mongo => {
            info!("connecting to db: {}", config.mongo_uri);
            let db = Client::with_uri_str(&config.mongo_uri)
                .await?
                .database(&config.database_name);
            Arc::new(MongoDatabase::initialize(db).await?)
        }
        Storage::Memory => {
            info!("using in-memory storage");
            Arc::new(MemoryDatabase::new())
        }
    };

    Ok(db)
}

pub async fn run(config: Config) -> Result<(), Error> {
    let db = connect(&config).await?;

    if config.seed {
        seed::seed(&*db).await?;
    }

    let db = Data::from(db);

    info!("listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .wrap(TracingLogger::default())
            .configure(configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    Ok(())
}
