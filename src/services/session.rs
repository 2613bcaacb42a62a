use jiff::Timestamp;
use thiserror::Error;

use crate::{
    models::history::{History, SessionEvent, SessionEventKind, UNKNOWN_USER},
    services::Recoverable,
    storage::{Storage, StorageError, Storages},
};

const LOGIN_ID: &str = "demoplate";
const LOGIN_PASSWORD: &str = "245225";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("You are already logged in as {0}. Type 'logout' to switch users.")]
    AlreadyLoggedIn(String),

    #[error("Access Denied.")]
    AccessDenied,

    #[error("You are not currently logged in.")]
    NotLoggedIn,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Recoverable for SessionError {
    fn into_fatal(self) -> Result<StorageError, Self> {
        match self {
            SessionError::Storage(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Who is logged in and since when. Owned by the dispatcher for the life of
/// the process.
#[derive(Debug, Clone)]
pub struct Session {
    user_id: Option<String>,
    started_at: Timestamp,
}

impl Session {
    pub fn new() -> Self {
        Self {
            user_id: None,
            started_at: Timestamp::now(),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    fn user_or_unknown(&self) -> String {
        self.user_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Credentials {
    pub id: String,
    pub password: String,
}

fn record(
    history: &mut History,
    storage: &impl Storage<History>,
    user_id: String,
    kind: SessionEventKind,
    session_start: Timestamp,
    session_end: Option<Timestamp>,
) -> Result<(), StorageError> {
    history.append(SessionEvent {
        recorded_at: Timestamp::now(),
        user_id,
        kind,
        session_start,
        session_end,
    });
    storage.save(history)
}

/// Picks up a login left behind by a previous process. The resumed session
/// starts now; the original login time is not recovered.
pub fn resume(
    session: &mut Session,
    history: &mut History,
    storages: &Storages,
) -> Result<Option<String>, SessionError> {
    let Some(user_id) = storages.token.read()? else {
        return Ok(None);
    };

    session.user_id = Some(user_id.clone());
    session.started_at = Timestamp::now();
    record(
        history,
        &storages.history,
        user_id.clone(),
        SessionEventKind::SessionResumed,
        session.started_at,
        None,
    )?;

    tracing::info!(user = %user_id, "session resumed");
    Ok(Some(user_id))
}

pub fn login(
    session: &mut Session,
    history: &mut History,
    storages: &Storages,
    credentials: Credentials,
) -> Result<String, SessionError> {
    if let Some(current) = session.user_id() {
        return Err(SessionError::AlreadyLoggedIn(current.to_string()));
    }

    if credentials.id != LOGIN_ID || credentials.password != LOGIN_PASSWORD {
        let now = Timestamp::now();
        let user_id = match credentials.id.trim() {
            "" => UNKNOWN_USER.to_string(),
            id => id.to_string(),
        };
        tracing::warn!(user = %user_id, "login denied");
        record(
            history,
            &storages.history,
            user_id,
            SessionEventKind::LoginDenied,
            now,
            Some(now),
        )?;
        return Err(SessionError::AccessDenied);
    }

    storages.token.write(&credentials.id)?;
    session.user_id = Some(credentials.id.clone());
    session.started_at = Timestamp::now();
    record(
        history,
        &storages.history,
        credentials.id.clone(),
        SessionEventKind::LoginSuccess,
        session.started_at,
        None,
    )?;

    tracing::info!(user = %credentials.id, "login succeeded");
    Ok(credentials.id)
}

pub fn logout(
    session: &mut Session,
    history: &mut History,
    storages: &Storages,
) -> Result<String, SessionError> {
    let Some(user_id) = session.user_id.clone() else {
        return Err(SessionError::NotLoggedIn);
    };

    record(
        history,
        &storages.history,
        user_id.clone(),
        SessionEventKind::Logout,
        session.started_at,
        Some(Timestamp::now()),
    )?;
    storages.token.clear()?;
    session.user_id = None;

    tracing::info!(user = %user_id, "logged out");
    Ok(user_id)
}

/// Ends the process session with an `Exit`, `Restart` or `Error Exit` record
/// and forgets the login.
pub fn close(
    session: &mut Session,
    history: &mut History,
    storages: &Storages,
    kind: SessionEventKind,
) -> Result<(), SessionError> {
    record(
        history,
        &storages.history,
        session.user_or_unknown(),
        kind,
        session.started_at,
        Some(Timestamp::now()),
    )?;
    storages.token.clear()?;
    session.user_id = None;

    tracing::info!(event = %kind, "session closed");
    Ok(())
}
