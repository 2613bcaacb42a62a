use crate::storage::StorageError;

pub mod journal;
pub mod profiles;
pub mod projects;
pub mod seed;
pub mod session;
pub mod tasks;
pub mod transfer;

/// Service errors that are either reported to the user or, for storage
/// failures, have to end the session.
pub trait Recoverable: std::fmt::Display + Sized {
    /// `Ok` with the storage failure when the error is fatal, `Err(self)`
    /// when it can be reported and the session can go on.
    fn into_fatal(self) -> Result<StorageError, Self>;
}

/// First half of a delete: the record exists and is waiting for the user
/// to type `token` back.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion<K> {
    pub key: K,
    pub token: String,
}

impl<K> PendingDeletion<K> {
    pub fn new(key: K, token: impl Into<String>) -> Self {
        Self {
            key,
            token: token.into(),
        }
    }

    pub fn is_confirmed_by(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(&self.token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    Cancelled,
}

/// Uppercased, trimmed form of a caller-supplied id.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// `None` for blank input, which edit operations treat as "keep".
pub fn provided(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_deletion_confirmation() {
        let pending = PendingDeletion::new(4u64, "4");
        assert!(pending.is_confirmed_by(" 4 "));
        assert!(!pending.is_confirmed_by("5"));

        let pending = PendingDeletion::new(String::from("PROJ-1"), "y");
        assert!(pending.is_confirmed_by("Y"));
        assert!(!pending.is_confirmed_by("yes"));
    }
}
