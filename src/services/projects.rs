use jiff::civil::Date;
use thiserror::Error;

use crate::{
    models::{
        project::{DEFAULT_STATUS, DueDate, Project, Projects},
        unset::UNSET,
    },
    services::{Deletion, PendingDeletion, Recoverable, normalize_id, provided},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project '{0}' not found.")]
    NotFound(String),

    #[error("Project ID '{0}' already exists. Use 'projectedit' to modify.")]
    AlreadyExists(String),

    #[error("Project ID cannot be empty.")]
    EmptyId,

    #[error("Invalid due date '{0}': {1}. Expected YYYY-MM-DD or N/A.")]
    InvalidDueDate(String, String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Recoverable for ProjectError {
    fn into_fatal(self) -> Result<StorageError, Self> {
        match self {
            ProjectError::Storage(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Raw header input. On create, a blank status becomes "Active" and a blank
/// due date stays unset; on update, blank fields are kept.
#[derive(Default)]
pub struct ProjectParameters {
    pub name: String,
    pub description: String,
    pub status: String,
    pub due_date: String,
}

pub fn get_project<'a>(projects: &'a Projects, id: &str) -> Result<&'a Project, ProjectError> {
    let id = normalize_id(id);
    projects.get(&id).ok_or(ProjectError::NotFound(id))
}

pub fn check_new_project_id(projects: &Projects, id: &str) -> Result<String, ProjectError> {
    let id = normalize_id(id);
    if id.is_empty() {
        return Err(ProjectError::EmptyId);
    }
    if projects.contains(&id) {
        return Err(ProjectError::AlreadyExists(id));
    }
    Ok(id)
}

pub fn create_project(
    projects: &mut Projects,
    storage: &impl Storage<Projects>,
    id: &str,
    parameters: ProjectParameters,
) -> Result<String, ProjectError> {
    let id = check_new_project_id(projects, id)?;
    let due_date = match provided(&parameters.due_date) {
        Some(raw) => parse_due_date(raw)?,
        None => None,
    };

    let project = Project {
        name: parameters.name.trim().to_string(),
        description: parameters.description.trim().to_string(),
        status: provided(&parameters.status)
            .unwrap_or(DEFAULT_STATUS)
            .to_string(),
        due_date,
        tasks: vec![],
    };

    projects.insert(id.clone(), project);

    storage.save(projects)?;

    tracing::info!(%id, "project created");
    Ok(id)
}

pub fn update_project(
    projects: &mut Projects,
    storage: &impl Storage<Projects>,
    id: &str,
    parameters: ProjectParameters,
) -> Result<(), ProjectError> {
    let id = normalize_id(id);
    if !projects.contains(&id) {
        return Err(ProjectError::NotFound(id));
    }

    // Validate before touching the record so a bad date changes nothing.
    let due_date = provided(&parameters.due_date).map(parse_due_date).transpose()?;

    let Some(project) = projects.get_mut(&id) else {
        return Err(ProjectError::NotFound(id));
    };
    if let Some(name) = provided(&parameters.name) {
        project.name = name.to_string();
    }
    if let Some(description) = provided(&parameters.description) {
        project.description = description.to_string();
    }
    if let Some(status) = provided(&parameters.status) {
        project.status = status.to_string();
    }
    if let Some(due_date) = due_date {
        project.due_date = due_date;
    }

    storage.save(projects)?;

    tracing::info!(%id, "project updated");
    Ok(())
}

/// `N/A` clears the date. Typed dates must be `YYYY-MM-DD`; free text only
/// survives from files written elsewhere.
fn parse_due_date(raw: &str) -> Result<Option<DueDate>, ProjectError> {
    if raw.eq_ignore_ascii_case(UNSET) {
        return Ok(None);
    }
    raw.parse::<Date>()
        .map(|date| Some(DueDate::Date(date)))
        .map_err(|e| ProjectError::InvalidDueDate(raw.to_string(), e.to_string()))
}

pub fn propose_project_deletion(
    projects: &Projects,
    id: &str,
) -> Result<PendingDeletion<String>, ProjectError> {
    let id = normalize_id(id);
    if !projects.contains(&id) {
        return Err(ProjectError::NotFound(id));
    }
    Ok(PendingDeletion::new(id, "y"))
}

pub struct DeleteProjectResult {
    pub deletion: Deletion,
    pub cascaded_tasks_count: usize,
}

/// Removes the project together with its tasks.
pub fn commit_project_deletion(
    projects: &mut Projects,
    storage: &impl Storage<Projects>,
    pending: PendingDeletion<String>,
    answer: &str,
) -> Result<DeleteProjectResult, ProjectError> {
    if !pending.is_confirmed_by(answer) {
        return Ok(DeleteProjectResult {
            deletion: Deletion::Cancelled,
            cascaded_tasks_count: 0,
        });
    }

    let project = projects
        .remove(&pending.key)
        .ok_or_else(|| ProjectError::NotFound(pending.key.clone()))?;

    storage.save(projects)?;

    tracing::info!(id = %pending.key, tasks = project.tasks.len(), "project deleted");
    Ok(DeleteProjectResult {
        deletion: Deletion::Deleted,
        cascaded_tasks_count: project.tasks.len(),
    })
}
