use serde::{Deserialize, Serialize};

use crate::{
    models::{history::History, journal::Journal, profile::Profiles, project::Projects},
    storage::{Storage, Storages},
};

/// Every collection the tool manages. Serialized as-is, this is also the
/// export snapshot format.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Store {
    #[serde(default)]
    pub profiles: Profiles,
    #[serde(rename = "logs", default)]
    pub journal: Journal,
    #[serde(default)]
    pub projects: Projects,
    #[serde(rename = "session_history", default)]
    pub history: History,
}

impl Store {
    /// Unreadable collections start empty; see `Storage::load_or_default`.
    pub fn load(storages: &Storages) -> Self {
        Self {
            profiles: storages.profiles.load_or_default(),
            journal: storages.journal.load_or_default(),
            projects: storages.projects.load_or_default(),
            history: storages.history.load_or_default(),
        }
    }
}
