use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

const HISTORY_LIMIT: usize = 500;

/// What a key press did to the line being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Edit {
    Redraw,
    Submit(String),
    /// Ctrl+C: drop the line, keep the session.
    Interrupt,
    /// Ctrl+D on an empty line.
    Eof,
    /// Tab produced more than one candidate.
    Suggest(Vec<String>),
    Ignore,
}

/// Text and cursor of the line being typed. The cursor counts characters,
/// not bytes.
#[derive(Debug, Default)]
struct Line {
    text: String,
    cursor: usize,
}

impl Line {
    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(idx, _)| idx)
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn replace(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    fn remove_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
        true
    }

    fn remove_at(&mut self) -> bool {
        if self.cursor >= self.len() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.text.remove(at);
        true
    }
}

/// Key-event line reader with history and tab completion of command names.
#[derive(Default)]
pub struct LineEditor {
    history: Vec<String>,
    history_path: Option<PathBuf>,
    history_index: Option<usize>,
    draft: Option<String>,
    completions: Vec<String>,
    line: Line,
}

impl LineEditor {
    pub fn new() -> Self {
        let mut editor = Self {
            history_path: default_history_path(),
            ..Self::default()
        };
        editor.load_history();
        editor
    }

    /// Replaces the words offered on tab.
    pub fn set_completions(&mut self, completions: Vec<String>) {
        self.completions = completions;
    }

    /// Reads one line. `None` means end of input.
    pub fn read_line(&mut self, prompt: &str) -> Option<String> {
        if !(io::stdin().is_terminal() && io::stdout().is_terminal()) {
            return self.read_line_basic(prompt);
        }
        let Ok(_raw) = RawMode::enable() else {
            return self.read_line_basic(prompt);
        };
        self.line = Line::default();
        self.history_index = None;
        self.draft = None;
        let mut stdout = io::stdout();
        redraw(&mut stdout, prompt, &self.line);
        loop {
            let key = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => key,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "terminal read failed");
                    return None;
                }
            };
            match self.handle_key(key) {
                Edit::Submit(line) => {
                    let _ = execute!(stdout, Print("\r\n"));
                    return Some(line);
                }
                Edit::Interrupt => {
                    let _ = execute!(stdout, Print("\r\n"));
                    return Some(String::new());
                }
                Edit::Eof => {
                    let _ = execute!(stdout, Print("\r\n"));
                    return None;
                }
                Edit::Suggest(items) => {
                    let _ = execute!(stdout, Print("\r\n"), Print(items.join("  ")), Print("\r\n"));
                }
                Edit::Redraw | Edit::Ignore => {}
            }
            redraw(&mut stdout, prompt, &self.line);
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Edit {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.line).text;
                self.push_history(&line);
                Edit::Submit(line)
            }
            KeyCode::Char('c') if control => {
                self.line = Line::default();
                Edit::Interrupt
            }
            KeyCode::Char('d') if control => {
                if self.line.text.is_empty() {
                    Edit::Eof
                } else {
                    Edit::Ignore
                }
            }
            KeyCode::Char('u') if control => {
                self.line = Line::default();
                self.history_index = None;
                Edit::Redraw
            }
            KeyCode::Char(_) if control => Edit::Ignore,
            KeyCode::Char(ch) => {
                self.line.insert(ch);
                self.history_index = None;
                Edit::Redraw
            }
            KeyCode::Backspace => {
                if self.line.remove_before() {
                    self.history_index = None;
                }
                Edit::Redraw
            }
            KeyCode::Delete => {
                if self.line.remove_at() {
                    self.history_index = None;
                }
                Edit::Redraw
            }
            KeyCode::Left => {
                self.line.cursor = self.line.cursor.saturating_sub(1);
                Edit::Redraw
            }
            KeyCode::Right => {
                self.line.cursor = (self.line.cursor + 1).min(self.line.len());
                Edit::Redraw
            }
            KeyCode::Home => {
                self.line.cursor = 0;
                Edit::Redraw
            }
            KeyCode::End => {
                self.line.cursor = self.line.len();
                Edit::Redraw
            }
            KeyCode::Up => {
                self.history_prev();
                Edit::Redraw
            }
            KeyCode::Down => {
                self.history_next();
                Edit::Redraw
            }
            KeyCode::Tab => self.complete(),
            _ => Edit::Ignore,
        }
    }

    fn complete(&mut self) -> Edit {
        if self.line.cursor != self.line.len() {
            return Edit::Ignore;
        }
        let completion = complete_line(&self.line.text, &self.completions);
        if let Some(updated) = completion.updated_line {
            self.line.replace(updated);
        }
        if completion.suggestions.is_empty() {
            Edit::Redraw
        } else {
            Edit::Suggest(completion.suggestions)
        }
    }

    fn read_line_basic(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().read_line(&mut line).ok()? == 0 {
            return None;
        }
        let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
        self.push_history(&line);
        Some(line)
    }

    fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            Some(index) => index.saturating_sub(1),
            None => {
                self.draft = Some(self.line.text.clone());
                self.history.len() - 1
            }
        };
        self.history_index = Some(index);
        self.line.replace(self.history[index].clone());
    }

    fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.line.replace(self.history[index + 1].clone());
        } else {
            self.history_index = None;
            self.line.replace(self.draft.take().unwrap_or_default());
        }
    }

    fn push_history(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || self.history.last().is_some_and(|last| last == line) {
            return;
        }
        self.history.push(line.to_string());
        if self.history.len() > HISTORY_LIMIT {
            let drop = self.history.len() - HISTORY_LIMIT;
            self.history.drain(0..drop);
        }
    }

    fn load_history(&mut self) {
        let Some(path) = self.history_path.as_ref() else {
            return;
        };
        let Ok(contents) = fs::read_to_string(path) else {
            return;
        };
        self.history = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect();
    }

    pub fn save_history(&self) {
        let Some(path) = self.history_path.as_ref() else {
            return;
        };
        let mut contents = self.history.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        if let Err(err) = fs::write(path, contents) {
            tracing::warn!(path = %path.display(), error = %err, "could not write history");
        }
    }
}

fn default_history_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("SYLLADEX_HISTORY") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".sylladex_history"))
}

fn redraw(out: &mut impl Write, prompt: &str, line: &Line) {
    let column = prompt.chars().count() + line.cursor;
    let _ = queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(prompt),
        Print(&line.text),
        MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX)),
    );
    let _ = out.flush();
}

/// Raw mode for the lifetime of the guard.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CompletionResult {
    pub updated_line: Option<String>,
    pub suggestions: Vec<String>,
}

/// Completes the command word. Arguments are free text and never completed.
pub(crate) fn complete_line(line: &str, table: &[String]) -> CompletionResult {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return CompletionResult {
            updated_line: None,
            suggestions: table.to_vec(),
        };
    }
    if trimmed.contains(char::is_whitespace) {
        return CompletionResult::default();
    }
    let folded = trimmed.to_lowercase();
    let matches: Vec<&str> = table
        .iter()
        .map(String::as_str)
        .filter(|item| item.to_lowercase().starts_with(&folded))
        .collect();
    match matches.as_slice() {
        [] => CompletionResult::default(),
        [only] => CompletionResult {
            updated_line: Some(format!("{only} ")),
            suggestions: Vec::new(),
        },
        _ => {
            let common = shared_prefix(&matches);
            CompletionResult {
                updated_line: (common.chars().count() > trimmed.chars().count())
                    .then_some(common),
                suggestions: matches.iter().map(|item| item.to_string()).collect(),
            }
        }
    }
}

fn shared_prefix(words: &[&str]) -> String {
    let Some((first, rest)) = words.split_first() else {
        return String::new();
    };
    first
        .chars()
        .enumerate()
        .take_while(|(idx, ch)| rest.iter().all(|word| word.chars().nth(*idx) == Some(*ch)))
        .map(|(_, ch)| ch)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<String> {
        ["syll.help", "syll.selectModus", "syll.saveDeckToFile", "modus.capture"]
            .iter()
            .map(|item| item.to_string())
            .collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut LineEditor, text: &str) {
        for ch in text.chars() {
            editor.handle_key(key(KeyCode::Char(ch)));
        }
    }

    macro_rules! completion_case {
        ($name:ident, $line:expr, $updated:expr, $suggestions:expr) => {
            #[test]
            fn $name() {
                let result = complete_line($line, &table());
                assert_eq!(result.updated_line.as_deref(), $updated);
                assert_eq!(result.suggestions.len(), $suggestions);
            }
        };
    }

    completion_case!(complete_unique, "modus.c", Some("modus.capture "), 0);
    completion_case!(complete_case_insensitive, "SYLL.H", Some("syll.help "), 0);
    completion_case!(complete_common_prefix, "syll.s", None, 2);
    completion_case!(complete_extends_prefix, "sy", Some("syll."), 3);
    completion_case!(complete_empty_lists_all, "", None, 4);
    completion_case!(complete_skips_arguments, "modus.capture sw", None, 0);
    completion_case!(complete_unknown, "quit", None, 0);

    #[test]
    fn non_ascii_items_arrive_intact() {
        let mut editor = LineEditor::default();
        type_text(&mut editor, "modus.capture épée");
        assert_eq!(
            editor.handle_key(key(KeyCode::Enter)),
            Edit::Submit("modus.capture épée".to_string())
        );
    }

    #[test]
    fn editing_moves_by_characters() {
        let mut editor = LineEditor::default();
        type_text(&mut editor, "añb");
        editor.handle_key(key(KeyCode::Left));
        editor.handle_key(key(KeyCode::Backspace));
        editor.handle_key(key(KeyCode::Char('n')));
        editor.handle_key(key(KeyCode::Home));
        editor.handle_key(key(KeyCode::Delete));
        assert_eq!(
            editor.handle_key(key(KeyCode::Enter)),
            Edit::Submit("nb".to_string())
        );
    }

    #[test]
    fn control_keys() {
        let mut editor = LineEditor::default();
        assert_eq!(editor.handle_key(ctrl('d')), Edit::Eof);
        type_text(&mut editor, "syll");
        assert_eq!(editor.handle_key(ctrl('d')), Edit::Ignore);
        assert_eq!(editor.handle_key(ctrl('c')), Edit::Interrupt);
        assert!(editor.line.text.is_empty());
        type_text(&mut editor, "x");
        editor.handle_key(ctrl('u'));
        assert!(editor.line.text.is_empty());
    }

    #[test]
    fn tab_completes_or_suggests() {
        let mut editor = LineEditor::default();
        editor.set_completions(table());
        type_text(&mut editor, "modus.c");
        assert_eq!(editor.handle_key(key(KeyCode::Tab)), Edit::Redraw);
        assert_eq!(editor.line.text, "modus.capture ");
        editor.line = Line::default();
        type_text(&mut editor, "syll.s");
        assert!(matches!(
            editor.handle_key(key(KeyCode::Tab)),
            Edit::Suggest(items) if items.len() == 2
        ));
    }

    #[test]
    fn history_skips_blanks_and_repeats() {
        let mut editor = LineEditor::default();
        editor.push_history("syll.help");
        editor.push_history("syll.help");
        editor.push_history("   ");
        editor.push_history("modus.save");
        assert_eq!(editor.history, vec!["syll.help", "modus.save"]);
        type_text(&mut editor, "draft");
        editor.handle_key(key(KeyCode::Up));
        assert_eq!(editor.line.text, "modus.save");
        editor.handle_key(key(KeyCode::Up));
        editor.handle_key(key(KeyCode::Up));
        assert_eq!(editor.line.text, "syll.help");
        editor.handle_key(key(KeyCode::Down));
        editor.handle_key(key(KeyCode::Down));
        assert_eq!(editor.line.text, "draft");
        assert_eq!(editor.line.cursor, 5);
    }
}
