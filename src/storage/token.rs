use std::{fs, path::PathBuf};

use crate::storage::StorageError;

/// Plain-text file holding the logged-in user id. Its presence is what makes
/// a session survive a relaunch.
pub struct SessionToken {
    path: PathBuf,
}

impl SessionToken {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let user_id = content.trim();
                Ok((!user_id.is_empty()).then(|| user_id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::TokenFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    pub fn write(&self, user_id: &str) -> Result<(), StorageError> {
        fs::write(&self.path, user_id).map_err(|e| StorageError::TokenFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::TokenFailed {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
