use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub const UNASSIGNED: &str = "Unassigned";

const TASK_ID_PREFIX: &str = "T-";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    /// `T-<n>`, unique within the owning project
    #[serde(rename = "TaskID")]
    pub id: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "AssignedTo", default)]
    pub assigned_to: Assignee,
    #[serde(rename = "Status", default)]
    pub status: TaskStatus,
}

impl Task {
    /// Numeric part of a `T-<n>` id, if it has one.
    pub fn number(&self) -> Option<u64> {
        self.id
            .strip_prefix(TASK_ID_PREFIX)
            .and_then(|n| n.parse().ok())
    }
}

/// Builds the id for the `n`th task of a project.
pub fn task_id(n: u64) -> String {
    format!("{TASK_ID_PREFIX}{n}")
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Complete,
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid status '{0}'. Use 'pending', 'in progress', or 'complete'.")]
pub struct InvalidTaskStatus(pub String);

impl FromStr for TaskStatus {
    type Err = InvalidTaskStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in progress" => Ok(TaskStatus::InProgress),
            "complete" => Ok(TaskStatus::Complete),
            _ => Err(InvalidTaskStatus(s.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Complete => "Complete",
        })
    }
}

/// Profile a task is assigned to. The profile id is checked when assigned
/// and may dangle afterwards.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Assignee {
    #[default]
    Unassigned,
    Profile(String),
}

impl From<String> for Assignee {
    fn from(value: String) -> Self {
        if value.is_empty() || value.eq_ignore_ascii_case(UNASSIGNED) {
            Assignee::Unassigned
        } else {
            Assignee::Profile(value)
        }
    }
}

impl From<Assignee> for String {
    fn from(value: Assignee) -> Self {
        match value {
            Assignee::Unassigned => UNASSIGNED.to_string(),
            Assignee::Profile(id) => id,
        }
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignee::Unassigned => f.write_str(UNASSIGNED),
            Assignee::Profile(id) => f.write_str(id),
        }
    }
}
