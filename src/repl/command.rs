use thiserror::Error;

use crate::services::session::Session;

#[derive(Debug, Error, PartialEq)]
#[error("Command '{command}' needs privileges. Please 'login' first.")]
pub struct Unauthorized {
    pub command: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    LogList,
    LogBook,
    NewLog,
    EditLog,
    DeleteLog,
    ExportLogs,
    ProfilesList,
    ProfilesView,
    ProfilesAdd,
    ProfilesEdit,
    ProfilesDelete,
    SearchProfile,
    ProjectsList,
    ProjectView,
    ProjectAdd,
    ProjectEdit,
    ProjectDelete,
    TaskAdd,
    TaskUpdate,
    TaskDelete,
    Login,
    Logout,
    Clear,
    WhoAmI,
    History,
    ExportData,
    ImportData,
    Help,
    Exit,
    Restart,
}

impl Command {
    pub fn from_name(name: &str) -> Option<Self> {
        let command = match name {
            "loglist" => Command::LogList,
            "logbook" => Command::LogBook,
            "newlog" => Command::NewLog,
            "editlog" => Command::EditLog,
            "deletelog" => Command::DeleteLog,
            "exportlogs" => Command::ExportLogs,
            "profileslist" => Command::ProfilesList,
            "profilesview" => Command::ProfilesView,
            "profilesadd" => Command::ProfilesAdd,
            "profilesedit" => Command::ProfilesEdit,
            "profilesdelete" => Command::ProfilesDelete,
            "searchprofile" => Command::SearchProfile,
            "projectslist" => Command::ProjectsList,
            "projectview" => Command::ProjectView,
            "projectadd" => Command::ProjectAdd,
            "projectedit" => Command::ProjectEdit,
            "projectdelete" => Command::ProjectDelete,
            "taskadd" => Command::TaskAdd,
            "taskupdate" => Command::TaskUpdate,
            "taskdelete" => Command::TaskDelete,
            "login" => Command::Login,
            "logout" => Command::Logout,
            "clear" => Command::Clear,
            "whoami" => Command::WhoAmI,
            "history" => Command::History,
            "exportdata" => Command::ExportData,
            "importdata" => Command::ImportData,
            "help" => Command::Help,
            "exit" => Command::Exit,
            "restart" => Command::Restart,
            _ => return None,
        };
        Some(command)
    }

    /// Commands outside the guest allow-list need an active session.
    pub fn is_guarded(self) -> bool {
        !matches!(
            self,
            Command::Login
                | Command::Help
                | Command::Clear
                | Command::Exit
                | Command::Restart
                | Command::ImportData
        )
    }

    pub fn authorize(self, session: &Session, name: &str) -> Result<(), Unauthorized> {
        if self.is_guarded() && !session.is_logged_in() {
            return Err(Unauthorized {
                command: name.to_string(),
            });
        }
        Ok(())
    }
}

/// A REPL line split into its lowercased command name and the raw rest.
#[derive(Debug, PartialEq)]
pub struct CommandLine<'a> {
    pub name: String,
    pub args: &'a str,
}

impl<'a> CommandLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.split_once(char::is_whitespace) {
            Some((name, args)) => Self {
                name: name.to_lowercase(),
                args: args.trim(),
            },
            None => Self {
                name: line.to_lowercase(),
                args: "",
            },
        }
    }
}

/// Splits on whitespace runs into at most `limit` parts; the last part keeps
/// any remaining spaces.
pub fn split_args(args: &str, limit: usize) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = args.trim();
    while !rest.is_empty() {
        if parts.len() + 1 == limit {
            parts.push(rest);
            break;
        }
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                parts.push(head);
                rest = tail.trim_start();
            }
            None => {
                parts.push(rest);
                break;
            }
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases_only_the_command() {
        let parsed = CommandLine::parse("  TaskUpdate   PR-1 T-1 status In Progress ");
        assert_eq!(parsed.name, "taskupdate");
        assert_eq!(parsed.args, "PR-1 T-1 status In Progress");

        let bare = CommandLine::parse("LOGLIST");
        assert_eq!(bare.name, "loglist");
        assert_eq!(bare.args, "");
    }

    #[test]
    fn test_split_args_is_bounded() {
        assert_eq!(
            split_args("PR-1  T-1 status in   progress", 4),
            vec!["PR-1", "T-1", "status", "in   progress"]
        );
        assert_eq!(split_args("PR-1 T-1", 4), vec!["PR-1", "T-1"]);
        assert!(split_args("   ", 2).is_empty());
    }

    #[test]
    fn test_guest_allow_list() {
        let session = Session::new();
        for name in ["login", "help", "clear", "exit", "restart", "importdata"] {
            let command = Command::from_name(name).unwrap();
            assert!(command.authorize(&session, name).is_ok(), "{name} should be allowed");
        }
        for name in ["loglist", "projectadd", "exportdata", "logout", "whoami", "history"] {
            let command = Command::from_name(name).unwrap();
            assert_eq!(
                command.authorize(&session, name),
                Err(Unauthorized {
                    command: name.to_string()
                })
            );
        }
        assert_eq!(Command::from_name("hyprctl"), None);
    }
}
