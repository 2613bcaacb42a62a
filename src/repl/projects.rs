use std::io::{BufRead, Write};

use crate::{
    models::unset,
    repl::{Repl, ReplError, command::split_args},
    services::{
        Deletion,
        projects::{self, ProjectParameters},
        tasks::{self, AddTaskParameters, TaskChange, TaskError, TaskUpdate},
    },
    ui,
};

impl<R: BufRead, W: Write> Repl<R, W> {
    pub(super) fn projects_list(&mut self) -> Result<(), ReplError> {
        if self.store.projects.is_empty() {
            self.console.notice("No projects found.")?;
            return Ok(());
        }

        let lines: Vec<String> = self
            .store
            .projects
            .iter()
            .map(|(id, project)| ui::project_line(id, project))
            .collect();

        self.console
            .line(ui::view_header("PlateCore Projects", lines.len()))?;
        for line in lines {
            self.console.line(line)?;
        }
        Ok(())
    }

    pub(super) fn project_view(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: projectview <ID>")?;
            return Ok(());
        }

        let project = match projects::get_project(&self.store.projects, args) {
            Ok(project) => project.clone(),
            Err(e) => return self.recover(e),
        };
        let id = crate::services::normalize_id(args);

        self.console
            .notice(format!("Project Details: {} ({})", project.name, id))?;
        self.console.field("Description", &project.description)?;
        self.console.field("Status", &project.status)?;
        self.console.field("Due Date", unset::show(&project.due_date))?;
        self.console
            .line(ui::view_header("  Tasks", project.tasks.len()))?;
        if project.tasks.is_empty() {
            self.console.line("    No tasks for this project.")?;
        }
        for task in &project.tasks {
            self.console.line(format!(
                "    - {}: {} (Assigned: {}, Status: {})",
                task.id, task.description, task.assigned_to, task.status
            ))?;
        }
        Ok(())
    }

    pub(super) fn project_add(&mut self) -> Result<(), ReplError> {
        self.console.notice("Creating a new project.")?;
        let raw_id = self.ask("Enter Project ID (e.g., PROJ-002): ")?;
        let id = match projects::check_new_project_id(&self.store.projects, &raw_id) {
            Ok(id) => id,
            Err(e) => return self.recover(e),
        };

        let parameters = ProjectParameters {
            name: self.ask("Project Name: ")?,
            description: self.ask("Description: ")?,
            status: self.ask("Status (e.g., Active, On Hold, Completed) [Active]: ")?,
            due_date: self.ask("Due Date (YYYY-MM-DD, or N/A): ")?,
        };

        match projects::create_project(
            &mut self.store.projects,
            &self.storages.projects,
            &id,
            parameters,
        ) {
            Ok(id) => self
                .console
                .notice(format!("Project '{id}' added successfully!"))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn project_edit(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: projectedit <ID>")?;
            return Ok(());
        }

        let current = match projects::get_project(&self.store.projects, args) {
            Ok(project) => project.clone(),
            Err(e) => return self.recover(e),
        };
        let id = crate::services::normalize_id(args);

        self.console.notice(format!(
            "Editing project '{id}'. Leave a field blank to keep its value."
        ))?;
        let parameters = ProjectParameters {
            name: self.ask_keep("Project Name", &current.name)?,
            description: self.ask_keep("Description", &current.description)?,
            status: self.ask_keep("Status", &current.status)?,
            due_date: self.ask_keep("Due Date", &unset::show(&current.due_date))?,
        };

        match projects::update_project(
            &mut self.store.projects,
            &self.storages.projects,
            &id,
            parameters,
        ) {
            Ok(()) => self
                .console
                .notice(format!("Project '{id}' updated successfully!"))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn project_delete(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: projectdelete <ID>")?;
            return Ok(());
        }

        let pending = match projects::propose_project_deletion(&self.store.projects, args) {
            Ok(pending) => pending,
            Err(e) => return self.recover(e),
        };
        let id = pending.key.clone();
        let answer = self.ask(&format!(
            "Are you sure you want to delete project '{id}' and all its tasks? (y/n): "
        ))?;

        match projects::commit_project_deletion(
            &mut self.store.projects,
            &self.storages.projects,
            pending,
            &answer,
        ) {
            Ok(result) if result.deletion == Deletion::Deleted => {
                self.console.notice(format!(
                    "Project '{id}' deleted ({} task(s) removed).",
                    result.cascaded_tasks_count
                ))?
            }
            Ok(_) => self.console.notice("Deletion cancelled.")?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn task_add(&mut self, args: &str) -> Result<(), ReplError> {
        let Some(raw_project) = split_args(args, 2).first().copied() else {
            self.console.error("Usage: taskadd <ProjectID>")?;
            return Ok(());
        };
        let project_id = match tasks::check_task_project(&self.store.projects, raw_project) {
            Ok(id) => id,
            Err(e) => return self.recover(e),
        };

        self.console
            .notice(format!("Adding a task to project '{project_id}'."))?;
        let description = self.ask("Task Description: ")?;
        if description.is_empty() {
            return self.recover(TaskError::EmptyDescription);
        }
        let assignee = self.ask("Assign to Profile ID (leave blank for Unassigned): ")?;

        match tasks::add_task(
            &mut self.store.projects,
            &self.store.profiles,
            &self.storages.projects,
            AddTaskParameters {
                project_id,
                description,
                assignee,
            },
        ) {
            Ok(change) => {
                self.warn_unknown_assignee(&change)?;
                self.console.notice(format!(
                    "Task '{}' added to Project '{}' successfully!",
                    change.task.id, change.project_id
                ))?;
            }
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn task_update(&mut self, args: &str) -> Result<(), ReplError> {
        let parts = split_args(args, 4);
        let [project_id, task_id, field, rest @ ..] = parts.as_slice() else {
            self.console.error(
                "Usage: taskupdate <ProjectID> <TaskID> <status|assigned> <value>",
            )?;
            return Ok(());
        };
        let value = rest.first().copied().unwrap_or("");

        let update = match TaskUpdate::parse(field, value) {
            Ok(update) => update,
            Err(e) => return self.recover(e),
        };

        match tasks::update_task(
            &mut self.store.projects,
            &self.store.profiles,
            &self.storages.projects,
            project_id,
            task_id,
            update,
        ) {
            Ok(change) => {
                self.warn_unknown_assignee(&change)?;
                self.console.notice(format!(
                    "Task '{}' in Project '{}' updated (Assigned: {}, Status: {}).",
                    change.task.id, change.project_id, change.task.assigned_to, change.task.status
                ))?;
            }
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn task_delete(&mut self, args: &str) -> Result<(), ReplError> {
        let parts = split_args(args, 2);
        let [project_id, task_id] = parts.as_slice() else {
            self.console.error("Usage: taskdelete <ProjectID> <TaskID>")?;
            return Ok(());
        };

        match tasks::delete_task(
            &mut self.store.projects,
            &self.storages.projects,
            project_id,
            task_id,
        ) {
            Ok(task) => self.console.notice(format!(
                "Task '{}' deleted from Project '{}'.",
                task.id,
                crate::services::normalize_id(project_id)
            ))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    fn warn_unknown_assignee(&mut self, change: &TaskChange) -> Result<(), ReplError> {
        if let Some(unknown) = &change.unknown_assignee {
            self.console.error(format!(
                "Warning: Profile '{unknown}' not found. Task will remain unassigned."
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::{
        models::task::{Assignee, TaskStatus},
        repl::tests::{output, repl},
    };

    const LOGIN: &str = "login\ndemoplate\n245225\n";
    const PROJECT: &str = "projectadd\nPR-1\nLaunch\nFirst launch\n\n\n";

    #[test]
    fn test_taskupdate_value_may_contain_spaces() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "{LOGIN}{PROJECT}taskadd pr-1\nWire it\n\ntaskupdate pr-1 t-1 status in   progress\n"
        );
        let mut repl = repl(&dir, &script);

        repl.run().unwrap();

        let task = &repl.store.projects.get("PR-1").unwrap().tasks[0];
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assigned_to, Assignee::Unassigned);
    }

    #[test]
    fn test_task_errors_leave_project_untouched() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "{LOGIN}{PROJECT}\
             taskadd PR-1\n\n\
             taskadd PR-9\n\
             taskadd PR-1\nWire it\nGHOST\n\
             taskupdate PR-1 T-1 status done\n\
             taskupdate PR-1 T-1 colour red\n\
             taskupdate PR-1 T-1\n\
             taskdelete PR-1 T-7\n"
        );
        let mut repl = repl(&dir, &script);

        repl.run().unwrap();

        let out = output(&repl);
        assert!(out.contains("Task description cannot be empty."));
        assert!(out.contains("Project 'PR-9' not found."));
        assert!(out.contains("Warning: Profile 'GHOST' not found."));
        assert!(out.contains("Invalid status 'done'."));
        assert!(out.contains("Invalid update type 'colour'."));
        assert!(out.contains("Usage: taskupdate"));
        assert!(out.contains("Task 'T-7' not found in Project 'PR-1'."));

        let project = repl.store.projects.get("PR-1").unwrap();
        assert_eq!(project.tasks.len(), 1);
        assert_eq!(project.tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_projectedit_blank_keeps_and_bad_date_rejects() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "{LOGIN}{PROJECT}\
             projectedit PR-1\n\n\nOn Hold\n\n\
             projectedit PR-1\nRenamed\n\n\n31-12-2025\n"
        );
        let mut repl = repl(&dir, &script);

        repl.run().unwrap();

        let project = repl.store.projects.get("PR-1").unwrap();
        assert_eq!(project.name, "Launch");
        assert_eq!(project.description, "First launch");
        assert_eq!(project.status, "On Hold");
        assert_eq!(project.due_date, None);
        assert!(output(&repl).contains("Invalid due date '31-12-2025'"));
    }

    #[test]
    fn test_projectdelete_cascades() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "{LOGIN}{PROJECT}taskadd PR-1\nOne\n\ntaskadd PR-1\nTwo\n\nprojectdelete PR-1\ny\nprojectslist\n"
        );
        let mut repl = repl(&dir, &script);

        repl.run().unwrap();

        let out = output(&repl);
        assert!(out.contains("Project 'PR-1' deleted (2 task(s) removed)."));
        assert!(out.contains("No projects found."));
        assert!(repl.store.projects.is_empty());
    }
}
