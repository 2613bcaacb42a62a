use std::{fmt::Write as _, fs, path::PathBuf};

use thiserror::Error;

use crate::{
    models::journal::{Journal, LogEntry},
    services::{Deletion, PendingDeletion, Recoverable},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("No logbook found with ID {0}.")]
    NotFound(u64),

    #[error("No content entered.")]
    Empty,

    #[error("No log ID left after {}. Delete the highest entry to continue.", u64::MAX)]
    IdSpaceExhausted,

    #[error("Error exporting logs to '{path}': {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Recoverable for JournalError {
    fn into_fatal(self) -> Result<StorageError, Self> {
        match self {
            JournalError::Storage(e) => Ok(e),
            other => Err(other),
        }
    }
}

pub struct CreateLogParameters {
    pub lines: Vec<String>,
    /// Date prefix used when the first line has none
    pub today: String,
}

pub fn create_log(
    journal: &mut Journal,
    storage: &impl Storage<Journal>,
    parameters: CreateLogParameters,
) -> Result<u64, JournalError> {
    if parameters.lines.is_empty() {
        return Err(JournalError::Empty);
    }

    let id = journal.next_id().ok_or(JournalError::IdSpaceExhausted)?;
    let mut entry = LogEntry::new(parameters.lines);
    entry.ensure_dated(&parameters.today);
    journal.insert(id, entry);

    storage.save(journal)?;

    tracing::info!(id, "log entry created");
    Ok(id)
}

pub struct EditLogParameters {
    pub id: u64,
    pub lines: Vec<String>,
    pub today: String,
}

/// Replaces the entry's content. A new first line without a date keeps the
/// old entry's date, or gets `today` when the old entry had none.
pub fn edit_log(
    journal: &mut Journal,
    storage: &impl Storage<Journal>,
    parameters: EditLogParameters,
) -> Result<(), JournalError> {
    let existing = journal
        .get(parameters.id)
        .ok_or(JournalError::NotFound(parameters.id))?;

    if parameters.lines.is_empty() {
        return Err(JournalError::Empty);
    }

    let date = existing
        .date_part()
        .map(str::to_string)
        .unwrap_or(parameters.today);

    let mut entry = LogEntry::new(parameters.lines);
    entry.ensure_dated(&date);
    journal.insert(parameters.id, entry);

    storage.save(journal)?;

    tracing::info!(id = parameters.id, "log entry edited");
    Ok(())
}

/// Deleting a log is confirmed by typing its id again.
pub fn propose_log_deletion(
    journal: &Journal,
    id: u64,
) -> Result<PendingDeletion<u64>, JournalError> {
    if !journal.contains(id) {
        return Err(JournalError::NotFound(id));
    }
    Ok(PendingDeletion::new(id, id.to_string()))
}

pub fn commit_log_deletion(
    journal: &mut Journal,
    storage: &impl Storage<Journal>,
    pending: PendingDeletion<u64>,
    answer: &str,
) -> Result<Deletion, JournalError> {
    if !pending.is_confirmed_by(answer) {
        return Ok(Deletion::Cancelled);
    }

    journal
        .remove(pending.key)
        .ok_or(JournalError::NotFound(pending.key))?;

    storage.save(journal)?;

    tracing::info!(id = pending.key, "log entry deleted");
    Ok(Deletion::Deleted)
}

/// Plain-text rendering of the whole journal used by `exportlogs`.
pub fn render_text(journal: &Journal) -> String {
    let mut out = String::new();
    for (id, entry) in journal.iter() {
        let _ = writeln!(out, "--- Log Entry {id} ---");
        for line in &entry.lines {
            let _ = writeln!(out, "{line}");
        }
        out.push('\n');
    }
    out
}

/// Returns how many entries were written.
pub fn export_text(journal: &Journal, path: PathBuf) -> Result<usize, JournalError> {
    fs::write(&path, render_text(journal))
        .map_err(|source| JournalError::ExportFailed { path, source })?;
    Ok(journal.len())
}
