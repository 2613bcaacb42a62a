use std::{collections::BTreeMap, fmt};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::models::{
    task::{Task, task_id},
    unset,
};

pub const DEFAULT_STATUS: &str = "Active";

/// A deadline as stored. Anything that is not a `YYYY-MM-DD` date is kept
/// as the text it was written with.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum DueDate {
    Date(Date),
    Text(String),
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueDate::Date(date) => write!(f, "{date}"),
            DueDate::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Project {
    /// Name of the project
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Free-form description
    #[serde(rename = "Description", default)]
    pub description: String,
    /// Free-form status such as "Active" or "On Hold"
    #[serde(rename = "Status", default = "default_status")]
    pub status: String,
    /// Due date of the project
    #[serde(rename = "DueDate", default, with = "unset")]
    pub due_date: Option<DueDate>,
    /// Tasks in creation order
    #[serde(rename = "Tasks", default)]
    pub tasks: Vec<Task>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            status: default_status(),
            due_date: None,
            tasks: vec![],
        }
    }
}

impl Project {
    /// `T-<max + 1>` over this project's numbered tasks, `T-1` when none.
    /// `None` once `T-<u64::MAX>` is taken.
    pub fn next_task_id(&self) -> Option<String> {
        let max = self.tasks.iter().filter_map(Task::number).max().unwrap_or(0);
        max.checked_add(1).map(task_id)
    }

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn get_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }
}

/// Projects keyed by their uppercased id.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
#[serde(transparent)]
pub struct Projects {
    projects: BTreeMap<String, Project>,
}

impl Projects {
    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.projects.contains_key(id)
    }

    pub fn insert(&mut self, id: String, project: Project) {
        self.projects.insert(id, project);
    }

    pub fn remove(&mut self, id: &str) -> Option<Project> {
        self.projects.remove(id)
    }

    /// Projects in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Project)> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl IntoIterator for Projects {
    type Item = (String, Project);
    type IntoIter = std::collections::btree_map::IntoIter<String, Project>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{Assignee, TaskStatus};

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            description: String::from("work"),
            assigned_to: Assignee::Unassigned,
            status: TaskStatus::Pending,
        }
    }

    #[test]
    fn test_next_task_id() {
        let mut project = Project::default();
        assert_eq!(project.next_task_id().as_deref(), Some("T-1"));

        project.tasks = vec![task("T-2"), task("odd"), task("T-10")];
        assert_eq!(project.next_task_id().as_deref(), Some("T-11"));
    }

    #[test]
    fn test_next_task_id_stops_at_the_last_number() {
        let mut project = Project::default();
        project.tasks = vec![task(&task_id(u64::MAX))];
        assert_eq!(project.next_task_id(), None);
    }

    #[test]
    fn test_reads_due_date_sentinel() {
        let json = r#"{"Name": "P", "Description": "", "Status": "Active", "DueDate": "N/A", "Tasks": []}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.due_date, None);

        let json = r#"{"Name": "P", "DueDate": "2025-08-15"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(
            project.due_date,
            Some(DueDate::Date(jiff::civil::date(2025, 8, 15)))
        );
        assert_eq!(project.status, "Active");
    }

    #[test]
    fn test_free_text_due_date_is_kept() {
        let json = r#"{"Name": "P", "DueDate": "end of Q3"}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.due_date, Some(DueDate::Text(String::from("end of Q3"))));

        let written = serde_json::to_value(&project).unwrap();
        assert_eq!(written["DueDate"], "end of Q3");
        assert_eq!(unset::show(&project.due_date), "end of Q3");
    }
}
