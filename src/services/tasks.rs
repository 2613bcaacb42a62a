use thiserror::Error;

use crate::{
    models::{
        profile::Profiles,
        project::Projects,
        task::{Assignee, InvalidTaskStatus, Task, TaskStatus},
    },
    services::{Recoverable, normalize_id},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Project '{0}' not found.")]
    ProjectNotFound(String),

    #[error("Task '{task}' not found in Project '{project}'.")]
    TaskNotFound { project: String, task: String },

    #[error("Task description cannot be empty.")]
    EmptyDescription,

    #[error("Project '{0}' has no task ID left. Delete its highest-numbered task to continue.")]
    TaskIdsExhausted(String),

    #[error(transparent)]
    InvalidStatus(#[from] InvalidTaskStatus),

    #[error("Invalid update type '{0}'. Use 'status' or 'assigned'.")]
    InvalidField(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Recoverable for TaskError {
    fn into_fatal(self) -> Result<StorageError, Self> {
        match self {
            TaskError::Storage(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Resolves raw assignee input against the known profiles. Unknown ids fall
/// back to unassigned and are returned so the caller can warn about them.
pub fn resolve_assignee(profiles: &Profiles, raw: &str) -> (Assignee, Option<String>) {
    let id = normalize_id(raw);
    if id.is_empty() {
        (Assignee::Unassigned, None)
    } else if profiles.contains(&id) {
        (Assignee::Profile(id), None)
    } else {
        (Assignee::Unassigned, Some(id))
    }
}

/// Checks the project before the user is asked for task details.
pub fn check_task_project(projects: &Projects, project_id: &str) -> Result<String, TaskError> {
    let id = normalize_id(project_id);
    if projects.contains(&id) {
        Ok(id)
    } else {
        Err(TaskError::ProjectNotFound(id))
    }
}

pub struct AddTaskParameters {
    pub project_id: String,
    pub description: String,
    pub assignee: String,
}

pub struct TaskChange {
    pub project_id: String,
    pub task: Task,
    /// Profile id that did not exist, leaving the task unassigned
    pub unknown_assignee: Option<String>,
}

pub fn add_task(
    projects: &mut Projects,
    profiles: &Profiles,
    storage: &impl Storage<Projects>,
    parameters: AddTaskParameters,
) -> Result<TaskChange, TaskError> {
    let project_id = check_task_project(projects, &parameters.project_id)?;

    let description = parameters.description.trim();
    if description.is_empty() {
        return Err(TaskError::EmptyDescription);
    }

    let (assigned_to, unknown_assignee) = resolve_assignee(profiles, &parameters.assignee);

    let Some(project) = projects.get_mut(&project_id) else {
        return Err(TaskError::ProjectNotFound(project_id));
    };
    let Some(id) = project.next_task_id() else {
        return Err(TaskError::TaskIdsExhausted(project_id));
    };
    let task = Task {
        id,
        description: description.to_string(),
        assigned_to,
        status: TaskStatus::Pending,
    };
    project.tasks.push(task.clone());

    storage.save(projects)?;

    tracing::info!(project = %project_id, task = %task.id, "task added");
    Ok(TaskChange {
        project_id,
        task,
        unknown_assignee,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    Status(TaskStatus),
    /// Raw profile id; blank unassigns
    Assigned(String),
}

impl TaskUpdate {
    pub fn parse(field: &str, value: &str) -> Result<Self, TaskError> {
        match field.trim().to_lowercase().as_str() {
            "status" => Ok(TaskUpdate::Status(value.parse()?)),
            "assigned" => Ok(TaskUpdate::Assigned(value.trim().to_string())),
            other => Err(TaskError::InvalidField(other.to_string())),
        }
    }
}

pub fn update_task(
    projects: &mut Projects,
    profiles: &Profiles,
    storage: &impl Storage<Projects>,
    project_id: &str,
    task_id: &str,
    update: TaskUpdate,
) -> Result<TaskChange, TaskError> {
    let project_id = check_task_project(projects, project_id)?;
    let task_id = normalize_id(task_id);

    let Some(task) = projects
        .get_mut(&project_id)
        .and_then(|p| p.get_task_mut(&task_id))
    else {
        return Err(TaskError::TaskNotFound {
            project: project_id,
            task: task_id,
        });
    };

    let mut unknown_assignee = None;
    match update {
        TaskUpdate::Status(status) => task.status = status,
        TaskUpdate::Assigned(raw) => {
            let (assignee, unknown) = resolve_assignee(profiles, &raw);
            task.assigned_to = assignee;
            unknown_assignee = unknown;
        }
    }
    let task = task.clone();

    storage.save(projects)?;

    tracing::info!(project = %project_id, task = %task.id, "task updated");
    Ok(TaskChange {
        project_id,
        task,
        unknown_assignee,
    })
}

pub fn delete_task(
    projects: &mut Projects,
    storage: &impl Storage<Projects>,
    project_id: &str,
    task_id: &str,
) -> Result<Task, TaskError> {
    let project_id = check_task_project(projects, project_id)?;
    let task_id = normalize_id(task_id);

    let Some(project) = projects.get_mut(&project_id) else {
        return Err(TaskError::ProjectNotFound(project_id));
    };
    let Some(position) = project.tasks.iter().position(|t| t.id == task_id) else {
        return Err(TaskError::TaskNotFound {
            project: project_id,
            task: task_id,
        });
    };
    let task = project.tasks.remove(position);

    storage.save(projects)?;

    tracing::info!(project = %project_id, task = %task.id, "task deleted");
    Ok(task)
}
