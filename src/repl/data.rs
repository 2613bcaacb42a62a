use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use crate::{
    repl::{Repl, ReplError},
    services::transfer::{self, ImportReport},
};

impl<R: BufRead, W: Write> Repl<R, W> {
    pub(super) fn export_data(&mut self) -> Result<(), ReplError> {
        let file_name =
            self.ask("Enter filename for data export (e.g., all_platecore_data.json): ")?;
        if file_name.is_empty() {
            self.console.error("Export cancelled: No filename provided.")?;
            return Ok(());
        }

        match transfer::export_store(&self.store, PathBuf::from(&file_name)) {
            Ok(()) => self
                .console
                .notice(format!("All data exported successfully to '{file_name}'."))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn import_data(&mut self) -> Result<(), ReplError> {
        let file_name = self.ask("Enter filename to import data from: ")?;
        if file_name.is_empty() {
            self.console.error("Import cancelled: No filename provided.")?;
            return Ok(());
        }

        match transfer::import_store(&mut self.store, &self.storages, PathBuf::from(&file_name)) {
            Ok(report) => self.print_import_report(&file_name, &report)?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    fn print_import_report(
        &mut self,
        file_name: &str,
        report: &ImportReport,
    ) -> Result<(), ReplError> {
        for id in &report.profiles.skipped {
            self.console
                .error(format!("Profile '{id}' already exists locally. Skipping import."))?;
        }
        for id in &report.logs.skipped {
            self.console
                .error(format!("Log Entry {id} already exists locally. Skipping import."))?;
        }
        for id in &report.projects.skipped {
            self.console.error(format!(
                "Project '{id}' already exists locally. Merging its tasks."
            ))?;
        }

        if !report.changed_anything() {
            self.console
                .notice(format!("Nothing new to import from '{file_name}'."))?;
            return Ok(());
        }

        self.console
            .notice(format!("Data imported from '{file_name}':"))?;
        self.console
            .field("Profiles added", report.profiles.added)?;
        self.console.field("Logs added", report.logs.added)?;
        self.console
            .field("Projects added", report.projects.added)?;
        self.console
            .field("Tasks added", report.projects.tasks_added)?;
        self.console
            .field("Tasks updated", report.projects.tasks_updated)?;
        self.console
            .field("History entries added", report.history_added)?;
        Ok(())
    }
}
