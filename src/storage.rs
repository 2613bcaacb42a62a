use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{history::History, journal::Journal, profile::Profiles, project::Projects};

pub mod json;
pub mod token;

use json::JsonFileStorage;
use token::SessionToken;

pub const LOGS_FILE: &str = "logs.json";
pub const PROFILES_FILE: &str = "profiles.json";
pub const PROJECTS_FILE: &str = "projects.json";
pub const HISTORY_FILE: &str = "session_history.json";
pub const TOKEN_FILE: &str = "session.txt";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize data to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to update session token '{path}': {source}")]
    TokenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait Storage<T> {
    /// Missing resources load as `T::default()`.
    fn load(&self) -> Result<T, StorageError>;
    fn save(&self, data: &T) -> Result<(), StorageError>;

    /// Like `load`, but a resource that exists and cannot be read falls back to
    /// the default with a warning instead of failing.
    fn load_or_default(&self) -> T
    where
        T: Default,
    {
        match self.load() {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "store unreadable, starting with default data");
                T::default()
            }
        }
    }
}

/// One handle per persisted collection, all rooted in the same data directory.
pub struct Storages {
    pub journal: JsonFileStorage<Journal>,
    pub profiles: JsonFileStorage<Profiles>,
    pub projects: JsonFileStorage<Projects>,
    pub history: JsonFileStorage<History>,
    pub token: SessionToken,
}

impl Storages {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            journal: JsonFileStorage::new(dir.join(LOGS_FILE)),
            profiles: JsonFileStorage::new(dir.join(PROFILES_FILE)),
            projects: JsonFileStorage::new(dir.join(PROJECTS_FILE)),
            history: JsonFileStorage::new(dir.join(HISTORY_FILE)),
            token: SessionToken::new(dir.join(TOKEN_FILE)),
        }
    }
}
