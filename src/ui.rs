use std::{
    fmt::Display,
    io::{self, BufRead, IsTerminal, Write},
};

use colored::*;
use jiff::{Timestamp, tz::TimeZone};

use crate::models::{project::Project, unset};

mod editor;

pub const BANNER: &str = r"
 ____  _       _        ____
|  _ \| | __ _| |_ ___ / ___|___  _ __ ___
| |_) | |/ _` | __/ _ \ |   / _ \| '__/ _ \
|  __/| | (_| | ||  __/ |__| (_) | | |  __/
|_|   |_|\__,_|\__\___|\____\___/|_|  \___|
";

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

enum Input<R> {
    Piped(R),
    Editor(Box<editor::LineEditor>),
}

/// Line-oriented terminal: prompts on `output`, answers from `input`.
pub struct Console<R, W> {
    input: Input<R>,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Input::Piped(input),
            output,
        }
    }

    /// Uses a line editor when stdin is a terminal, `input` otherwise.
    pub fn interactive(input: R, output: W) -> Self {
        if !io::stdin().is_terminal() {
            return Self::new(input, output);
        }
        match editor::line_editor() {
            Ok(line_editor) => Self {
                input: Input::Editor(Box::new(line_editor)),
                output,
            },
            Err(e) => {
                tracing::warn!(error = %e, "line editing unavailable, reading plain input");
                Self::new(input, output)
            }
        }
    }

    /// `None` once the input is closed.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match &mut self.input {
            Input::Piped(input) => {
                write!(self.output, "{}", prompt.bright_black())?;
                self.output.flush()?;
                read_piped(input)
            }
            Input::Editor(line_editor) => {
                self.output.flush()?;
                editor::read(line_editor, prompt)
            }
        }
    }

    /// Like `read_line`, but a terminal shows `*` for each typed character.
    pub fn read_secret(&mut self, prompt: &str) -> io::Result<Option<String>> {
        if let Input::Editor(line_editor) = &mut self.input {
            self.output.flush()?;
            return editor::read_masked(line_editor, prompt);
        }
        self.read_line(prompt)
    }

    /// Status output, prefixed with a cyan `$`.
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{} {}", "$".cyan(), text)
    }

    pub fn notice(&mut self, text: impl Display) -> io::Result<()> {
        self.say(text.to_string().yellow())
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    pub fn field(&mut self, label: &str, value: impl Display) -> io::Result<()> {
        writeln!(self.output, "  {} {}", format!("{label}:").cyan(), value)
    }

    pub fn error(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", text.to_string().red())
    }

    pub fn clear(&mut self) -> io::Result<()> {
        write!(self.output, "{CLEAR_SCREEN}")?;
        self.banner()
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", BANNER.cyan())?;
        self.notice("Type 'login' to log in or 'help' for available commands.")
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

fn read_piped(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Project id and name on the left, status and due date right-aligned when
/// the terminal is wide enough.
pub fn project_line(id: &str, project: &Project) -> String {
    let left = format!("  - {}: {}", id, project.name);
    let right = format!("{}  ·  Due {}", project.status, unset::show(&project.due_date));

    let left_len = left.chars().count();
    let right_len = right.chars().count();
    let terminal_width = get_terminal_width();

    if left_len + right_len + 4 < terminal_width {
        let padding = terminal_width - left_len - right_len - 2;
        format!("{}{}{}", left.cyan(), " ".repeat(padding), right.dimmed())
    } else {
        format!("{} ({})", left.cyan(), right)
    }
}

/// Header for list views, e.g. "Projects (3)"
pub fn view_header(title: &str, count: usize) -> String {
    format!("{} ({})", title.cyan().bold(), count)
}

/// e.g. "2025-03-12 10:04:05 +08 +0800"
pub fn format_timestamp(timestamp: Timestamp, tz: &TimeZone) -> String {
    timestamp
        .to_zoned(tz.clone())
        .strftime("%Y-%m-%d %H:%M:%S %Z %z")
        .to_string()
}

/// e.g. "Wednesday, March 12, 2025 10:04:05 AM +08"
pub fn format_clock(timestamp: Timestamp, tz: &TimeZone) -> String {
    timestamp
        .to_zoned(tz.clone())
        .strftime("%A, %B %d, %Y %I:%M:%S %p %Z")
        .to_string()
}

/// Today's date in the journal prefix format, e.g. "March 12, 2025"
pub fn journal_date(tz: &TimeZone) -> String {
    Timestamp::now()
        .to_zoned(tz.clone())
        .strftime(crate::models::journal::DATE_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_line_strips_newline_and_reports_eof() {
        let mut console = Console::new(Cursor::new("first\r\nsecond\n"), Vec::new());

        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("first"));
        assert_eq!(console.read_line("> ").unwrap().as_deref(), Some("second"));
        assert_eq!(console.read_line("> ").unwrap(), None);
    }

    #[test]
    fn test_read_secret_from_pipe_reads_plain_line() {
        let mut console = Console::new(Cursor::new("245225\n"), Vec::new());

        assert_eq!(
            console.read_secret("Password: ").unwrap().as_deref(),
            Some("245225")
        );
        assert_eq!(console.read_secret("Password: ").unwrap(), None);
        assert!(String::from_utf8_lossy(console.output()).contains("Password: "));
    }

    #[test]
    fn test_format_timestamp_uses_zone() {
        let ts = Timestamp::from_second(0).unwrap();
        let formatted = format_timestamp(ts, &TimeZone::UTC);
        assert!(formatted.starts_with("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_project_line_mentions_status_and_due() {
        let project = Project {
            name: String::from("Launch"),
            ..Project::default()
        };
        let line = project_line("PR-1", &project);
        assert!(line.contains("PR-1"));
        assert!(line.contains("Active"));
        assert!(line.contains("N/A"));
    }
}
