//! The interactive command loop: reads a line, checks the session gate and
//! hands the line to the handler for its command.

use std::io::{self, BufRead, Write};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    config::Settings,
    models::{
        history::SessionEventKind,
        store::Store,
        unset,
    },
    services::{
        Recoverable,
        seed::seed_empty_collections,
        session::{self, Credentials, Session, SessionError},
    },
    storage::{StorageError, Storages},
    ui::{self, Console},
};

pub mod command;
mod data;
mod help;
mod journal;
mod profiles;
mod projects;

use command::{Command, CommandLine};

const HISTORY_SHOWN: usize = 10;

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
    Restart,
}

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("Input closed.")]
    InputClosed,
}

pub struct Repl<R, W> {
    console: Console<R, W>,
    store: Store,
    storages: Storages,
    session: Session,
    settings: Settings,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    /// Loads every collection, seeds the empty ones and picks up a session
    /// left by a previous process.
    pub fn open(settings: Settings, console: Console<R, W>) -> Result<Self, ReplError> {
        let storages = Storages::in_dir(&settings.data_dir);
        let mut store = Store::load(&storages);
        if settings.seed_samples {
            seed_empty_collections(&mut store, &storages)?;
        }

        let mut repl = Self {
            console,
            store,
            storages,
            session: Session::new(),
            settings,
        };

        repl.console.banner()?;
        match session::resume(&mut repl.session, &mut repl.store.history, &repl.storages) {
            Ok(Some(user_id)) => repl
                .console
                .notice(format!("Session found. Logged in as {user_id}."))?,
            Ok(None) => {}
            Err(e) => {
                if let Err(fatal) = repl.recover(e) {
                    repl.abort(&fatal);
                    return Err(fatal);
                }
            }
        }

        Ok(repl)
    }

    /// Runs until `exit`, `restart`, closed input or a fatal error. Every way
    /// out records a history event and clears the session token.
    pub fn run(&mut self) -> Result<Flow, ReplError> {
        loop {
            let result = self.next_line().and_then(|line| self.dispatch(&line));
            match result {
                Ok(Flow::Continue) => {}
                Ok(flow) => return Ok(flow),
                Err(ReplError::InputClosed) => {
                    tracing::debug!("input closed, ending session");
                    self.close_session(SessionEventKind::Exit)?;
                    return Ok(Flow::Exit);
                }
                Err(e) => {
                    self.abort(&e);
                    return Err(e);
                }
            }
        }
    }

    fn next_line(&mut self) -> Result<String, ReplError> {
        let prompt = format!("{}@platecore ", self.session.user_id().unwrap_or("guest"));
        self.console
            .read_line(&prompt)?
            .ok_or(ReplError::InputClosed)
    }

    pub fn dispatch(&mut self, line: &str) -> Result<Flow, ReplError> {
        let input = CommandLine::parse(line);
        if input.name.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(command) = Command::from_name(&input.name) else {
            self.console.error(format!(
                "'{}' is not recognized as an internal or external command,",
                line.trim()
            ))?;
            self.console.error("operable program or batch file.")?;
            return Ok(Flow::Continue);
        };

        if let Err(denied) = command.authorize(&self.session, &input.name) {
            self.console.error(denied)?;
            return Ok(Flow::Continue);
        }

        let args = input.args;
        match command {
            Command::LogList => self.log_list()?,
            Command::LogBook => self.log_book(args)?,
            Command::NewLog => self.new_log()?,
            Command::EditLog => self.edit_log(args)?,
            Command::DeleteLog => self.delete_log(args)?,
            Command::ExportLogs => self.export_logs()?,
            Command::ProfilesList => self.profiles_list()?,
            Command::ProfilesView => self.profiles_view(args)?,
            Command::ProfilesAdd => self.profiles_add()?,
            Command::ProfilesEdit => self.profiles_edit(args)?,
            Command::ProfilesDelete => self.profiles_delete(args)?,
            Command::SearchProfile => self.search_profile(args)?,
            Command::ProjectsList => self.projects_list()?,
            Command::ProjectView => self.project_view(args)?,
            Command::ProjectAdd => self.project_add()?,
            Command::ProjectEdit => self.project_edit(args)?,
            Command::ProjectDelete => self.project_delete(args)?,
            Command::TaskAdd => self.task_add(args)?,
            Command::TaskUpdate => self.task_update(args)?,
            Command::TaskDelete => self.task_delete(args)?,
            Command::Login => self.login()?,
            Command::Logout => self.logout()?,
            Command::Clear => self.console.clear()?,
            Command::WhoAmI => self.whoami()?,
            Command::History => self.history()?,
            Command::ExportData => self.export_data()?,
            Command::ImportData => self.import_data()?,
            Command::Help => help::show(&mut self.console, args)?,
            Command::Exit => {
                self.console.notice("Exiting session...")?;
                self.close_session(SessionEventKind::Exit)?;
                return Ok(Flow::Exit);
            }
            Command::Restart => {
                self.console.notice("Restarting PlateCore...")?;
                self.close_session(SessionEventKind::Restart)?;
                return Ok(Flow::Restart);
            }
        }

        Ok(Flow::Continue)
    }

    /// Prompts and reads one answer, trimmed. Closed input ends the loop.
    fn ask(&mut self, prompt: &str) -> Result<String, ReplError> {
        self.console
            .read_line(prompt)?
            .map(|answer| answer.trim().to_string())
            .ok_or(ReplError::InputClosed)
    }

    /// `ask` with the answer masked on a terminal.
    fn ask_secret(&mut self, prompt: &str) -> Result<String, ReplError> {
        self.console
            .read_secret(prompt)?
            .map(|answer| answer.trim().to_string())
            .ok_or(ReplError::InputClosed)
    }

    /// Prints a recoverable service error, or escalates a storage failure.
    fn recover<E: Recoverable>(&mut self, error: E) -> Result<(), ReplError> {
        match error.into_fatal() {
            Ok(fatal) => Err(ReplError::Storage(fatal)),
            Err(reported) => {
                self.console.error(reported)?;
                Ok(())
            }
        }
    }

    fn close_session(&mut self, kind: SessionEventKind) -> Result<(), ReplError> {
        match session::close(&mut self.session, &mut self.store.history, &self.storages, kind) {
            Ok(()) => Ok(()),
            Err(e) => self.recover(e),
        }
    }

    /// Last-ditch bookkeeping on the fatal path. Failures here are only
    /// logged, the original error is what gets reported.
    fn abort(&mut self, error: &ReplError) {
        tracing::error!(%error, "session ended by an unrecovered error");
        let _ = self
            .console
            .error(format!("An unexpected error occurred: {error}"));
        if let Err(e) = session::close(
            &mut self.session,
            &mut self.store.history,
            &self.storages,
            SessionEventKind::ErrorExit,
        ) {
            tracing::error!(error = %e, "could not record error exit");
        }
    }

    fn login(&mut self) -> Result<(), ReplError> {
        if let Some(current) = self.session.user_id() {
            let refused = SessionError::AlreadyLoggedIn(current.to_string());
            return self.recover(refused);
        }

        self.console.notice("Insert PlateCore Interactive ID:")?;
        let id = self.ask("ID: ")?;
        self.console.notice("Password:")?;
        let password = self.ask_secret("Password: ")?;

        match session::login(
            &mut self.session,
            &mut self.store.history,
            &self.storages,
            Credentials { id, password },
        ) {
            Ok(user_id) => self
                .console
                .notice(format!("Access Granted. Welcome, {user_id}."))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    fn logout(&mut self) -> Result<(), ReplError> {
        match session::logout(&mut self.session, &mut self.store.history, &self.storages) {
            Ok(user_id) => self
                .console
                .notice(format!("User '{user_id}' logged out successfully."))?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    fn whoami(&mut self) -> Result<(), ReplError> {
        let tz = self.settings.time_zone.clone();
        let user = self.session.user_id().unwrap_or("Not Logged In").to_string();

        self.console.notice("Current Session:")?;
        self.console.field("PlateCore ID", &user)?;
        if self.session.is_logged_in() {
            let started = ui::format_timestamp(self.session.started_at(), &tz);
            self.console.field("Session Start", started)?;
        }
        self.console
            .field("Current Time", ui::format_clock(Timestamp::now(), &tz))?;
        self.console
            .field("Time Zone", tz.iana_name().unwrap_or("system"))?;
        Ok(())
    }

    fn history(&mut self) -> Result<(), ReplError> {
        if self.store.history.is_empty() {
            self.console.notice("No session history recorded.")?;
            return Ok(());
        }

        let tz = self.settings.time_zone.clone();
        let lines: Vec<String> = self
            .store
            .history
            .most_recent(HISTORY_SHOWN)
            .map(|event| {
                let end = event
                    .session_end
                    .map(|end| ui::format_timestamp(end, &tz));
                format!(
                    "[{}] {} by {} (start {}, end {})",
                    ui::format_timestamp(event.recorded_at, &tz),
                    event.kind,
                    event.user_id,
                    ui::format_timestamp(event.session_start, &tz),
                    unset::show(&end),
                )
            })
            .collect();

        self.console
            .line(ui::view_header("Recent Session History", lines.len()))?;
        for line in lines {
            self.console.line(format!("  {line}"))?;
        }
        Ok(())
    }
}
