use crate::{
    models::{
        journal::LogEntry,
        profile::Profile,
        project::{DueDate, Project},
        store::Store,
        task::{Assignee, Task, TaskStatus},
    },
    storage::{Storage, StorageError, Storages},
};

/// Gives each empty collection one sample record so a first run has
/// something to look at. History is never seeded.
pub fn seed_empty_collections(store: &mut Store, storages: &Storages) -> Result<(), StorageError> {
    if store.journal.is_empty() {
        store.journal.insert(
            1,
            LogEntry::new(vec![
                String::from("March 12, 2025 — Mia smiled at me during the group work."),
                String::from("She looked shy but happy."),
            ]),
        );
        storages.journal.save(&store.journal)?;
    }

    if store.profiles.is_empty() {
        store.profiles.insert(Profile {
            name: Some(String::from("Zaheerul Islam")),
            role: Some(String::from("Creator of this log system")),
            certification: Some(12345),
            ..Profile::new("Z-1")
        });
        storages.profiles.save(&store.profiles)?;
    }

    if store.projects.is_empty() {
        let owner = Assignee::Profile(String::from("Z-1"));
        store.projects.insert(
            String::from("PROJ-001"),
            Project {
                name: String::from("Phase 1: Terminal UI Overhaul"),
                description: String::from(
                    "Improve the user interface and add core corporate functionalities.",
                ),
                status: String::from("Active"),
                due_date: Some(DueDate::Date(jiff::civil::date(2025, 8, 15))),
                tasks: vec![
                    Task {
                        id: String::from("T-1"),
                        description: String::from("Implement Project Management Module"),
                        assigned_to: owner.clone(),
                        status: TaskStatus::InProgress,
                    },
                    Task {
                        id: String::from("T-2"),
                        description: String::from("Design new splash screen"),
                        assigned_to: Assignee::Unassigned,
                        status: TaskStatus::Pending,
                    },
                    Task {
                        id: String::from("T-3"),
                        description: String::from("Integrate user roles and permissions"),
                        assigned_to: owner,
                        status: TaskStatus::Pending,
                    },
                ],
            },
        );
        storages.projects.save(&store.projects)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seeds_only_empty_collections() {
        let dir = TempDir::new().unwrap();
        let storages = Storages::in_dir(dir.path());
        let mut store = Store::default();
        store.profiles.insert(Profile::new("MINE"));

        seed_empty_collections(&mut store, &storages).unwrap();

        assert_eq!(store.journal.len(), 1);
        assert!(store.profiles.get("Z-1").is_none());
        assert_eq!(store.projects.get("PROJ-001").unwrap().tasks.len(), 3);
        assert!(store.history.is_empty());
        assert!(!storages.profiles.path().exists());
        assert!(storages.projects.path().exists());
    }
}
