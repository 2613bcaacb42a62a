use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::stamp;

/// User id recorded when nobody is logged in.
pub const UNKNOWN_USER: &str = "UNKNOWN";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEventKind {
    #[serde(rename = "Login Success")]
    LoginSuccess,
    #[serde(rename = "Login Denied")]
    LoginDenied,
    Logout,
    #[serde(rename = "Session Resumed")]
    SessionResumed,
    Exit,
    Restart,
    #[serde(rename = "Error Exit")]
    ErrorExit,
}

impl fmt::Display for SessionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionEventKind::LoginSuccess => "Login Success",
            SessionEventKind::LoginDenied => "Login Denied",
            SessionEventKind::Logout => "Logout",
            SessionEventKind::SessionResumed => "Session Resumed",
            SessionEventKind::Exit => "Exit",
            SessionEventKind::Restart => "Restart",
            SessionEventKind::ErrorExit => "Error Exit",
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionEvent {
    /// When the event was written
    #[serde(rename = "timestamp", with = "stamp")]
    pub recorded_at: Timestamp,
    pub user_id: String,
    #[serde(rename = "event_type")]
    pub kind: SessionEventKind,
    #[serde(with = "stamp")]
    pub session_start: Timestamp,
    #[serde(default, with = "stamp::optional")]
    pub session_end: Option<Timestamp>,
}

/// Append-only audit log, oldest first.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(transparent)]
pub struct History {
    events: Vec<SessionEvent>,
}

impl History {
    pub fn append(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    pub fn contains(&self, event: &SessionEvent) -> bool {
        self.events.contains(event)
    }

    /// Up to `n` events, newest first.
    pub fn most_recent(&self, n: usize) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter().rev().take(n)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl IntoIterator for History {
    type Item = SessionEvent;
    type IntoIter = std::vec::IntoIter<SessionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
