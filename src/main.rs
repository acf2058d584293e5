use adboard::{Config, Error};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log))
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    adboard::run(config).await
}
