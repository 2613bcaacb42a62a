use std::path::PathBuf;

use jiff::tz::TimeZone;
use thiserror::Error;

const APP_DIR: &str = "platecore";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown time zone '{name}': {source}")]
    UnknownTimeZone {
        name: String,
        #[source]
        source: jiff::Error,
    },

    #[error("Failed to create data directory '{path}': {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runtime settings resolved from flags, environment and platform defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the stores and the session token
    pub data_dir: PathBuf,
    /// Zone used for displayed times and journal date prefixes
    pub time_zone: TimeZone,
    /// Whether empty collections get a sample record on startup
    pub seed_samples: bool,
}

impl Settings {
    pub fn resolve(
        data_dir: Option<PathBuf>,
        time_zone: Option<&str>,
        seed_samples: bool,
    ) -> Result<Self, ConfigError> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        let time_zone = match time_zone {
            Some(name) => TimeZone::get(name).map_err(|source| ConfigError::UnknownTimeZone {
                name: name.to_string(),
                source,
            })?,
            None => TimeZone::system(),
        };

        Ok(Self {
            data_dir,
            time_zone,
            seed_samples,
        })
    }

    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::DataDir {
            path: self.data_dir.clone(),
            source,
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
