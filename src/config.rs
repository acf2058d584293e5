use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::Error;

const ENV_PREFIX: &str = "ADBOARD_";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    Mongo,
    Memory,
}

/// Read from `ADBOARD_*` environment variables, e.g. `ADBOARD_STORAGE=memory`.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_storage")]
    pub storage: Storage,
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    #[serde(default)]
    pub seed: bool,
    #[serde(default = "default_log")]
    pub log: String,
}

impl Config {
    /// Loads a `.env` file first if there is one.
    pub fn from_env() -> Result<Config, Error> {
        loaded_dotenv(dotenvy::dotenv())?;
        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;

        Ok(config)
    }

    pub fn from_vars<I>(vars: I) -> Result<Config, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars)?;

        Ok(config)
    }
}

/// A missing `.env` file is fine, a malformed one is not.
fn loaded_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Result<(), Error> {
    match result {
        Ok(path) => {
            debug!("loaded {}", path.display());
            Ok(())
        }
        Err(err) if err.not_found() => {
            debug!("no .env file found");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_storage() -> Storage {
    Storage::Mongo
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "adboard".to_string()
}

fn default_log() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.storage, Storage::Mongo);
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
        assert_eq!(config.database_name, "adboard");
        assert!(!config.seed);
        assert_eq!(config.log, "info");
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_vars(vars(&[
            ("ADBOARD_STORAGE", "memory"),
            ("ADBOARD_SEED", "true"),
            ("ADBOARD_BIND_ADDRESS", "0.0.0.0:9000"),
            ("ADBOARD_LOG", "adboard=debug"),
            ("STORAGE", "mongo"),
        ]))
        .unwrap();

        assert_eq!(config.storage, Storage::Memory);
        assert!(config.seed);
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.log, "adboard=debug");
    }

    #[test]
    fn missing_dotenv_is_not_an_error() {
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));

        assert!(loaded_dotenv(Err(missing)).is_ok());
    }

    #[test]
    fn malformed_dotenv_is_reported() {
        let malformed = dotenvy::Error::LineParse("ADBOARD_SEED true".to_string(), 12);

        assert!(matches!(
            loaded_dotenv(Err(malformed)),
            Err(Error::InvalidConfigFile(_))
        ));
    }

    #[test]
    fn rejects_unknown_storage() {
        let result = Config::from_vars(vars(&[("ADBOARD_STORAGE", "postgres")]));

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
