use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use colored::*;

use crate::{
    repl::{Repl, ReplError},
    services::{
        Deletion,
        journal::{self, CreateLogParameters, EditLogParameters, JournalError},
    },
    ui,
};

const END_MARKER: &str = "END";

impl<R: BufRead, W: Write> Repl<R, W> {
    pub(super) fn log_list(&mut self) -> Result<(), ReplError> {
        if self.store.journal.is_empty() {
            self.console.notice("No log entries found.")?;
            return Ok(());
        }

        let lines: Vec<String> = self
            .store
            .journal
            .iter()
            .map(|(id, entry)| format!("{} : {}", id, entry.date_label()))
            .collect();

        self.console.line(ui::view_header("Logbook", lines.len()))?;
        for line in lines {
            self.console.line(format!("  {}", line.cyan()))?;
        }
        Ok(())
    }

    pub(super) fn log_book(&mut self, args: &str) -> Result<(), ReplError> {
        let Some(id) = self.log_id(args, "logbook <ID>")? else {
            return Ok(());
        };

        let Some(entry) = self.store.journal.get(id) else {
            return self.recover(JournalError::NotFound(id));
        };
        let lines = entry.lines.clone();

        self.console.notice(format!("Log Entry {id}:"))?;
        for line in lines {
            self.console.line(format!(">> {line}"))?;
        }
        Ok(())
    }

    pub(super) fn new_log(&mut self) -> Result<(), ReplError> {
        self.console
            .notice("Enter your log entry (type 'END' on a new line to finish):")?;
        let lines = self.read_entry_lines()?;

        let parameters = CreateLogParameters {
            lines,
            today: ui::journal_date(&self.settings.time_zone),
        };
        match journal::create_log(&mut self.store.journal, &self.storages.journal, parameters) {
            Ok(id) => self
                .console
                .notice(format!("Log entry saved with ID {id}."))?,
            Err(JournalError::Empty) => self.console.error("Log entry cancelled (no content).")?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn edit_log(&mut self, args: &str) -> Result<(), ReplError> {
        let Some(id) = self.log_id(args, "editlog <ID>")? else {
            return Ok(());
        };

        let Some(entry) = self.store.journal.get(id) else {
            return self.recover(JournalError::NotFound(id));
        };
        let current = entry.lines.clone();

        self.console.notice(format!("Current content of Log Entry {id}:"))?;
        for line in current {
            self.console.line(format!(">> {}", line.dimmed()))?;
        }
        self.console
            .notice("Enter the new content (type 'END' on a new line to finish):")?;
        let lines = self.read_entry_lines()?;

        let parameters = EditLogParameters {
            id,
            lines,
            today: ui::journal_date(&self.settings.time_zone),
        };
        match journal::edit_log(&mut self.store.journal, &self.storages.journal, parameters) {
            Ok(()) => self.console.notice(format!("Log Entry {id} updated."))?,
            Err(JournalError::Empty) => self
                .console
                .error("No new content entered. Log entry not updated.")?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn delete_log(&mut self, args: &str) -> Result<(), ReplError> {
        let Some(id) = self.log_id(args, "deletelog <ID>")? else {
            return Ok(());
        };

        let pending = match journal::propose_log_deletion(&self.store.journal, id) {
            Ok(pending) => pending,
            Err(e) => return self.recover(e),
        };
        let answer = self.ask(&format!(
            "To confirm deletion of Log Entry {id}, type its ID again: "
        ))?;

        match journal::commit_log_deletion(
            &mut self.store.journal,
            &self.storages.journal,
            pending,
            &answer,
        ) {
            Ok(Deletion::Deleted) => self.console.notice(format!("Log Entry {id} deleted."))?,
            Ok(Deletion::Cancelled) => self
                .console
                .notice("Deletion cancelled (IDs did not match).")?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn export_logs(&mut self) -> Result<(), ReplError> {
        if self.store.journal.is_empty() {
            self.console.notice("No log entries to export.")?;
            return Ok(());
        }

        let file_name = self.ask("Enter filename for log export (e.g., logs_export.txt): ")?;
        if file_name.is_empty() {
            self.console.error("Export cancelled: No filename provided.")?;
            return Ok(());
        }

        match journal::export_text(&self.store.journal, PathBuf::from(&file_name)) {
            Ok(count) => self
                .console
                .notice(format!("Exported {count} log entries to '{file_name}'."))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    /// Lines up to an `END` marker. An empty list means nothing was typed.
    fn read_entry_lines(&mut self) -> Result<Vec<String>, ReplError> {
        let mut lines = Vec::new();
        loop {
            let line = self.ask(">> ")?;
            if line.eq_ignore_ascii_case(END_MARKER) {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Parses a log id argument, printing usage or a parse error when it is
    /// missing or not a number.
    fn log_id(&mut self, args: &str, usage: &str) -> Result<Option<u64>, ReplError> {
        if args.is_empty() {
            self.console.error(format!("Usage: {usage}"))?;
            return Ok(None);
        }
        match args.parse::<u64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                self.console
                    .error("Invalid logbook ID. Please enter a number.")?;
                Ok(None)
            }
        }
    }
}
