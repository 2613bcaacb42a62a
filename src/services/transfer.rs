//! Whole-store export and the import that reconciles a snapshot with the
//! live collections.
//!
//! Merge policy per collection:
//! - profiles and logs: an id that already exists locally is skipped;
//! - projects: a new id is added with its tasks; an existing project keeps
//!   its header, while each imported task replaces the local task with the
//!   same id or is appended;
//! - session history: appended unless an identical entry is already there.
//!
//! Each collection is saved as soon as it is merged.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    models::{
        history::History, journal::Journal, profile::Profiles, project::Projects, store::Store,
    },
    services::Recoverable,
    storage::{Storage, StorageError, Storages, json::JsonFileStorage},
};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("File '{}' not found.", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading '{}'. File might be corrupted or not a valid JSON.", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Error exporting data: {0}")]
    ExportFailed(#[source] StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Recoverable for TransferError {
    fn into_fatal(self) -> Result<StorageError, Self> {
        match self {
            TransferError::Storage(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Counts for collections merged by id where local records win.
#[derive(Debug, Default, PartialEq)]
pub struct CollectionMerge {
    pub added: usize,
    /// Ids that already existed locally
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ProjectMerge {
    pub added: usize,
    pub skipped: Vec<String>,
    pub tasks_updated: usize,
    pub tasks_added: usize,
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportReport {
    pub profiles: CollectionMerge,
    pub logs: CollectionMerge,
    pub projects: ProjectMerge,
    pub history_added: usize,
}

impl ImportReport {
    pub fn changed_anything(&self) -> bool {
        self.profiles.added > 0
            || self.logs.added > 0
            || self.projects.added > 0
            || self.projects.tasks_added > 0
            || self.projects.tasks_updated > 0
            || self.history_added > 0
    }
}

pub fn export_store(store: &Store, path: PathBuf) -> Result<(), TransferError> {
    let target = JsonFileStorage::<Store>::new(path).without_backups();
    target.save(store).map_err(TransferError::ExportFailed)?;

    tracing::info!(path = %target.path().display(), "data exported");
    Ok(())
}

/// Reads the whole snapshot before merging, so a file that does not parse
/// changes nothing.
pub fn read_snapshot(path: PathBuf) -> Result<Store, TransferError> {
    match fs::exists(&path) {
        Ok(true) => {}
        Ok(false) => return Err(TransferError::NotFound(path)),
        Err(source) => {
            let source = StorageError::LoadFailed {
                path: path.clone(),
                source,
            };
            return Err(TransferError::Format { path, source });
        }
    }
    JsonFileStorage::<Store>::new(path.clone())
        .load()
        .map_err(|source| TransferError::Format { path, source })
}

pub fn import_store(
    store: &mut Store,
    storages: &Storages,
    path: PathBuf,
) -> Result<ImportReport, TransferError> {
    let snapshot = read_snapshot(path.clone())?;

    let profiles = merge_profiles(&mut store.profiles, snapshot.profiles);
    storages.profiles.save(&store.profiles)?;

    let logs = merge_journal(&mut store.journal, snapshot.journal);
    storages.journal.save(&store.journal)?;

    let projects = merge_projects(&mut store.projects, snapshot.projects);
    storages.projects.save(&store.projects)?;

    let history_added = merge_history(&mut store.history, snapshot.history);
    storages.history.save(&store.history)?;

    let report = ImportReport {
        profiles,
        logs,
        projects,
        history_added,
    };
    tracing::info!(path = %path.display(), ?report, "data imported");
    Ok(report)
}

pub fn merge_profiles(local: &mut Profiles, imported: Profiles) -> CollectionMerge {
    let mut merge = CollectionMerge::default();
    for (id, profile) in imported {
        if local.contains(&id) {
            merge.skipped.push(id);
        } else {
            local.insert_keyed(id, profile);
            merge.added += 1;
        }
    }
    merge
}

pub fn merge_journal(local: &mut Journal, imported: Journal) -> CollectionMerge {
    let mut merge = CollectionMerge::default();
    for (id, entry) in imported {
        if local.contains(id) {
            merge.skipped.push(id.to_string());
        } else {
            local.insert(id, entry);
            merge.added += 1;
        }
    }
    merge
}

pub fn merge_projects(local: &mut Projects, imported: Projects) -> ProjectMerge {
    let mut merge = ProjectMerge::default();
    for (id, project) in imported {
        let Some(existing) = local.get_mut(&id) else {
            local.insert(id, project);
            merge.added += 1;
            continue;
        };

        for task in project.tasks {
            match existing.get_task_mut(&task.id) {
                Some(current) if *current == task => {}
                Some(current) => {
                    *current = task;
                    merge.tasks_updated += 1;
                }
                None => {
                    existing.tasks.push(task);
                    merge.tasks_added += 1;
                }
            }
        }
        merge.skipped.push(id);
    }
    merge
}

/// Returns how many entries were appended.
pub fn merge_history(local: &mut History, imported: History) -> usize {
    let mut added = 0;
    for event in imported {
        if !local.contains(&event) {
            local.append(event);
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        history::{SessionEvent, SessionEventKind},
        journal::LogEntry,
        profile::Profile,
        project::{DueDate, Project},
        task::{Assignee, Task, TaskStatus},
    };
    use tempfile::TempDir;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            description: format!("task {id}"),
            assigned_to: Assignee::Unassigned,
            status,
        }
    }

    fn project(name: &str, tasks: Vec<Task>) -> Project {
        Project {
            name: name.to_string(),
            tasks,
            ..Project::default()
        }
    }

    fn event(user: &str) -> SessionEvent {
        let at = jiff::Timestamp::from_second(1_700_000_000).unwrap();
        SessionEvent {
            recorded_at: at,
            user_id: user.to_string(),
            kind: SessionEventKind::LoginSuccess,
            session_start: at,
            session_end: None,
        }
    }

    fn snapshot() -> Store {
        let mut store = Store::default();
        store.profiles.insert(Profile {
            name: Some(String::from("Imported")),
            ..Profile::new("Z-1")
        });
        store.profiles.insert(Profile::new("N-1"));
        store
            .journal
            .insert(1, LogEntry::new(vec![String::from("imported one")]));
        store
            .journal
            .insert(9, LogEntry::new(vec![String::from("imported nine")]));
        store.projects.insert(
            String::from("P"),
            project(
                "Imported header",
                vec![task("T-1", TaskStatus::Complete), task("T-2", TaskStatus::Pending)],
            ),
        );
        store
            .projects
            .insert(String::from("Q"), project("New", vec![task("T-1", TaskStatus::Pending)]));
        store.history.append(event("a"));
        store.history.append(event("b"));
        store
    }

    fn local() -> Store {
        let mut store = Store::default();
        store.profiles.insert(Profile {
            name: Some(String::from("Local")),
            ..Profile::new("Z-1")
        });
        store
            .journal
            .insert(1, LogEntry::new(vec![String::from("local one")]));
        store.projects.insert(
            String::from("P"),
            project("Local header", vec![task("T-1", TaskStatus::Pending)]),
        );
        store.history.append(event("a"));
        store
    }

    fn write_snapshot(dir: &TempDir, store: &Store) -> PathBuf {
        let path = dir.path().join("all_data.json");
        export_store(store, path.clone()).unwrap();
        path
    }

    #[test]
    fn test_merge_precedence() {
        let dir = TempDir::new().unwrap();
        let storages = Storages::in_dir(dir.path());
        let path = write_snapshot(&dir, &snapshot());
        let mut store = local();

        let report = import_store(&mut store, &storages, path).unwrap();

        assert_eq!(report.profiles.added, 1);
        assert_eq!(report.profiles.skipped, vec![String::from("Z-1")]);
        assert_eq!(report.logs.added, 1);
        assert_eq!(report.logs.skipped, vec![String::from("1")]);
        assert_eq!(report.projects.added, 1);
        assert_eq!(report.projects.skipped, vec![String::from("P")]);
        assert_eq!(report.projects.tasks_updated, 1);
        assert_eq!(report.projects.tasks_added, 1);
        assert_eq!(report.history_added, 1);

        // Local wins for profiles and logs
        assert_eq!(store.profiles.get("Z-1").unwrap().name.as_deref(), Some("Local"));
        assert_eq!(store.journal.get(1).unwrap().lines[0], "local one");
        assert!(store.journal.get(9).is_some());

        // Header stays local, tasks take the imported version
        let p = store.projects.get("P").unwrap();
        assert_eq!(p.name, "Local header");
        assert_eq!(p.get_task("T-1").unwrap().status, TaskStatus::Complete);
        assert_eq!(p.tasks.len(), 2);

        // Everything was persisted
        assert_eq!(storages.profiles.load().unwrap().len(), 2);
        assert_eq!(storages.journal.load().unwrap().len(), 2);
        assert_eq!(storages.projects.load().unwrap().len(), 2);
        assert_eq!(storages.history.load().unwrap().len(), 2);
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storages = Storages::in_dir(dir.path());
        let path = write_snapshot(&dir, &snapshot());
        let mut store = local();

        import_store(&mut store, &storages, path.clone()).unwrap();
        let after_first = serde_json::to_value(&store).unwrap();

        let second = import_store(&mut store, &storages, path).unwrap();
        assert!(!second.changed_anything());
        assert_eq!(serde_json::to_value(&store).unwrap(), after_first);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let storages = Storages::in_dir(dir.path());
        let mut store = local();

        let result = import_store(&mut store, &storages, dir.path().join("nope.json"));
        assert!(matches!(result, Err(TransferError::NotFound(_))));
    }

    #[test]
    fn test_unreachable_path_is_not_reported_as_missing() {
        let dir = TempDir::new().unwrap();
        let plain = dir.path().join("plain.txt");
        fs::write(&plain, "not a directory").unwrap();

        let result = read_snapshot(plain.join("snapshot.json"));
        assert!(matches!(
            result,
            Err(TransferError::Format {
                source: StorageError::LoadFailed { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_imports_snapshot_written_by_older_releases() {
        let dir = TempDir::new().unwrap();
        let storages = Storages::in_dir(dir.path());
        let path = dir.path().join("all_platecore_data.json");
        fs::write(
            &path,
            r#"{
  "profiles": {"K-2": {"ID": "K-2", "Name": "Kay", "Role": "N/A", "IC": "N/A", "PN": "N/A", "CB": 4}},
  "logs": {"4": ["March 12, 2025 — Checked the rig"]},
  "projects": {
    "PR-7": {"Name": "Rig", "Description": "", "Status": "On Hold", "DueDate": "after the audit",
             "Tasks": [{"TaskID": "T-1", "Description": "Inspect", "AssignedTo": "K-2", "Status": "Pending"}]}
  },
  "session_history": [
    {"timestamp": "2025-03-12 10:04:05 +08+0800", "user_id": "demoplate", "event_type": "Login Success",
     "session_start": "2025-03-12 10:04:05 +08+0800", "session_end": "N/A"},
    {"timestamp": "2025-03-12 11:00:00 +08+0800", "user_id": "demoplate", "event_type": "Exit",
     "session_start": "2025-03-12 10:04:05 +08+0800", "session_end": "2025-03-12 11:00:00 +08+0800"}
  ]
}"#,
        )
        .unwrap();
        let mut store = local();

        let report = import_store(&mut store, &storages, path.clone()).unwrap();

        assert_eq!(report.profiles.added, 1);
        assert_eq!(report.logs.added, 1);
        assert_eq!(report.projects.added, 1);
        assert_eq!(report.history_added, 2);
        assert_eq!(store.profiles.get("K-2").unwrap().certification, Some(4));
        assert_eq!(
            store.projects.get("PR-7").unwrap().due_date,
            Some(DueDate::Text(String::from("after the audit")))
        );

        // Saved in the current format and read back as the same values
        let saved = storages.history.load().unwrap();
        assert_eq!(saved.len(), 3);
        let exit = saved.most_recent(1).next().unwrap();
        assert_eq!(exit.kind, SessionEventKind::Exit);
        assert_eq!(
            exit.session_end,
            Some("2025-03-12T03:00:00Z".parse::<jiff::Timestamp>().unwrap())
        );
        let projects = storages.projects.load().unwrap();
        assert_eq!(store.projects.get("PR-7"), projects.get("PR-7"));

        let again = import_store(&mut store, &storages, path).unwrap();
        assert!(!again.changed_anything());
    }

    #[test]
    fn test_unparseable_file_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let storages = Storages::in_dir(dir.path());
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = local();

        let result = import_store(&mut store, &storages, path);
        assert!(matches!(result, Err(TransferError::Format { .. })));
        assert_eq!(store.profiles.len(), 1);
        assert!(!storages.profiles.path().exists());
    }

    #[test]
    fn test_history_dedup_is_exact() {
        let mut local_history = History::default();
        local_history.append(event("a"));

        let mut imported = History::default();
        imported.append(event("a"));
        let mut changed = event("a");
        changed.session_end = Some(changed.session_start);
        imported.append(changed);
        imported.append(event("c"));
        imported.append(event("c"));

        assert_eq!(merge_history(&mut local_history, imported), 2);
        assert_eq!(local_history.len(), 3);
    }

    #[test]
    fn test_export_writes_string_log_keys() {
        let dir = TempDir::new().unwrap();
        let path = write_snapshot(&dir, &local());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw["logs"]["1"][0], "local one");
        assert_eq!(raw["projects"]["P"]["Tasks"][0]["TaskID"], "T-1");
        assert!(raw["session_history"].is_array());
    }
}
