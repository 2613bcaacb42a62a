//! Line editing for interactive terminals: history, cursor movement and a
//! masked mode for passwords.

use std::{borrow::Cow, io};

use colored::*;
use rustyline::{
    Editor, Helper,
    completion::Completer,
    config::{ColorMode, Config},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
};

pub type LineEditor = Editor<PromptHelper, DefaultHistory>;

const MASK: &str = "*";

#[derive(Default)]
pub struct PromptHelper {
    masking: bool,
}

impl Completer for PromptHelper {
    type Candidate = String;
}

impl Hinter for PromptHelper {
    type Hint = String;
}

impl Validator for PromptHelper {}

impl Highlighter for PromptHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Cow::Owned(MASK.repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(prompt.bright_black().to_string())
    }

    // Every keystroke has to be redrawn while masking, or the typed
    // character shows up before the mask replaces it.
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

impl Helper for PromptHelper {}

/// Masking only works when the editor is allowed to repaint the line, so
/// colour mode is forced on. History is added by hand to keep secrets out.
pub fn line_editor() -> Result<LineEditor, ReadlineError> {
    let config = Config::builder()
        .color_mode(ColorMode::Forced)
        .auto_add_history(false)
        .build();
    let mut editor = LineEditor::with_config(config)?;
    editor.set_helper(Some(PromptHelper::default()));
    Ok(editor)
}

/// Reads a command or answer and remembers non-blank lines.
pub fn read(editor: &mut LineEditor, prompt: &str) -> io::Result<Option<String>> {
    let answer = into_answer(editor.readline(prompt))?;
    if let Some(line) = answer.as_deref().filter(|line| !line.trim().is_empty()) {
        if let Err(e) = editor.add_history_entry(line) {
            tracing::debug!(error = %e, "could not add line to history");
        }
    }
    Ok(answer)
}

/// Reads a line with every character echoed as `*`. Never enters history.
pub fn read_masked(editor: &mut LineEditor, prompt: &str) -> io::Result<Option<String>> {
    set_masking(editor, true);
    let answer = editor.readline(prompt);
    set_masking(editor, false);
    into_answer(answer)
}

fn set_masking(editor: &mut LineEditor, masking: bool) {
    if let Some(helper) = editor.helper_mut() {
        helper.masking = masking;
    }
}

/// Ctrl-D closes the input like EOF on a pipe. Ctrl-C drops the current
/// line and answers blank, which every prompt treats as "cancel".
fn into_answer(result: Result<String, ReadlineError>) -> io::Result<Option<String>> {
    match result {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Eof) => Ok(None),
        Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
        Err(ReadlineError::Io(e)) => Err(e),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking_hides_every_character() {
        let mut helper = PromptHelper::default();
        assert_eq!(helper.highlight("245225", 6), "245225");
        assert!(!helper.highlight_char("245225", 6, false));

        helper.masking = true;
        assert_eq!(helper.highlight("2452é5", 6), "******");
        assert!(helper.highlight_char("2452", 4, false));
    }

    #[test]
    fn test_editor_errors_map_to_answers() {
        assert_eq!(into_answer(Err(ReadlineError::Eof)).unwrap(), None);
        assert_eq!(
            into_answer(Err(ReadlineError::Interrupted)).unwrap().as_deref(),
            Some("")
        );
        assert_eq!(
            into_answer(Ok(String::from("loglist"))).unwrap().as_deref(),
            Some("loglist")
        );

        let broken = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let err = into_answer(Err(ReadlineError::Io(broken))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
