use anyhow::{Context, Result};
use std::collections::VecDeque;
use sylladex_core::{Dispatch, InventoryView, SylladexConfig, MODUS_PREFIX, SYLL_PREFIX};
use sylladex_modi::Session;

const MAX_OUTPUT_LINES: usize = 500;
const MAX_HISTORY: usize = 200;

pub struct App {
    pub session: Session,
    pub input: String,
    pub output: VecDeque<String>,
    /// Lines scrolled back from the newest output.
    pub scroll: usize,
    pub status_line: String,
    pub show_help: bool,
    pub should_quit: bool,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl App {
    pub fn bootstrap(config: &SylladexConfig) -> Result<Self> {
        let session = Session::open(config).context("build sylladex session")?;
        Ok(Self::with_session(session))
    }

    pub fn with_session(session: Session) -> Self {
        let mut app = Self {
            session,
            input: String::new(),
            output: VecDeque::new(),
            scroll: 0,
            status_line: format!("type {SYLL_PREFIX}help and press enter"),
            show_help: false,
            should_quit: false,
            history: Vec::new(),
            history_index: None,
        };
        let startup = app.session.log.drain();
        app.push_output(&startup);
        app
    }

    pub fn active_modus(&self) -> &str {
        self.session.container.active_name().unwrap_or("none")
    }

    pub fn inventory(&self) -> Option<InventoryView> {
        self.session.display.current()
    }

    pub fn loose_items(&self) -> Vec<String> {
        self.session.container.buffer().open_hand().snapshot()
    }

    pub fn deck_summary(&self) -> (usize, usize) {
        let deck = self.session.container.buffer().deck();
        (deck.in_use_count(), deck.len())
    }

    pub fn awaiting_reply(&self) -> bool {
        self.session.container.buffer().pending().is_some()
    }

    pub fn submit(&mut self) {
        let line = std::mem::take(&mut self.input);
        let trimmed = line.trim();
        self.history_index = None;
        self.scroll = 0;
        if trimmed.is_empty() {
            return;
        }
        if self.history.last().map(String::as_str) != Some(trimmed) {
            self.history.push(trimmed.to_string());
            if self.history.len() > MAX_HISTORY {
                self.history.remove(0);
            }
        }
        self.push_output(&format!("> {trimmed}"));
        let (dispatch, text) = self.session.submit(trimmed);
        self.push_output(&text);
        self.status_line = match dispatch {
            Dispatch::Ignored => {
                format!("lines need a `{SYLL_PREFIX}` or `{MODUS_PREFIX}` prefix")
            }
            Dispatch::Rejected => "rejected".to_string(),
            Dispatch::Executed | Dispatch::Resumed if self.awaiting_reply() => {
                "waiting for a reply".to_string()
            }
            Dispatch::Executed | Dispatch::Resumed => "ok".to_string(),
            Dispatch::Failed(kind) => format!("failed: {kind}"),
            Dispatch::Recovered => "modus reset after a fatal error".to_string(),
            Dispatch::Catastrophic => "modus unloaded".to_string(),
        };
    }

    pub fn push_output(&mut self, text: &str) {
        for line in text.lines() {
            self.output.push_back(line.to_string());
        }
        while self.output.len() > MAX_OUTPUT_LINES {
            self.output.pop_front();
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.push(ch);
        self.history_index = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.history_index = None;
    }

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            Some(index) => index.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.history_index = Some(index);
        self.input = self.history[index].clone();
    }

    pub fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.input = self.history[index + 1].clone();
        } else {
            self.history_index = None;
            self.input.clear();
        }
    }

    /// Completes the command word against the current command names.
    pub fn complete(&mut self) {
        if self.input.contains(char::is_whitespace) {
            return;
        }
        let folded = self.input.to_lowercase();
        let matches: Vec<String> = self
            .command_table()
            .into_iter()
            .filter(|name| name.to_lowercase().starts_with(&folded))
            .collect();
        match matches.as_slice() {
            [] => self.status_line = "no completion".to_string(),
            [only] => self.input = format!("{only} "),
            many => self.status_line = many.join("  "),
        }
    }

    fn command_table(&self) -> Vec<String> {
        let container = &self.session.container;
        container
            .host_command_names()
            .into_iter()
            .map(|name| format!("{SYLL_PREFIX}{name}"))
            .chain(
                container
                    .active_commands()
                    .into_iter()
                    .map(|name| format!("{MODUS_PREFIX}{name}")),
            )
            .collect()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let limit = self.output.len().saturating_sub(1);
        self.scroll = (self.scroll + lines).min(limit);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.session.container.on_display_resized(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::bootstrap(&SylladexConfig::default()).expect("app")
    }

    fn type_line(app: &mut App, line: &str) {
        for ch in line.chars() {
            app.insert_char(ch);
        }
        app.submit();
    }

    #[test]
    fn submit_echoes_and_collects_output() {
        let mut app = app();
        type_line(&mut app, "syll.selectModus PentaFile");
        assert!(app.input.is_empty());
        assert!(app.output.iter().any(|line| line == "> syll.selectModus PentaFile"));
        assert!(app.output.iter().any(|line| line == "Modus selected: PentaFile"));
        assert_eq!(app.active_modus(), "PentaFile");
        assert_eq!(app.status_line, "ok");
        assert!(app.inventory().is_some());
    }

    #[test]
    fn status_reflects_dispatch() {
        let mut app = app();
        type_line(&mut app, "hello there");
        assert!(app.status_line.contains("prefix"));
        type_line(&mut app, "modus.capture sword");
        assert_eq!(app.status_line, "rejected");
        type_line(&mut app, "syll.selectModus TarotDeck");
        type_line(&mut app, "modus.load");
        assert_eq!(app.status_line, "waiting for a reply");
        assert!(app.awaiting_reply());
        type_line(&mut app, "sideways");
        assert_eq!(app.status_line, "failed: command runtime failure");
    }

    #[test]
    fn captured_items_show_in_the_summary() {
        let mut app = app();
        type_line(&mut app, "syll.selectModus TarotDeck");
        type_line(&mut app, "modus.capture cup");
        type_line(&mut app, "modus.capture wand");
        assert_eq!(app.deck_summary(), (2, 2));
        type_line(&mut app, "modus.drawCard");
        assert_eq!(app.loose_items().len(), 1);
    }

    #[test]
    fn history_walks_back_and_forth() {
        let mut app = app();
        type_line(&mut app, "syll.listModi");
        type_line(&mut app, "syll.help");
        app.history_prev();
        assert_eq!(app.input, "syll.help");
        app.history_prev();
        assert_eq!(app.input, "syll.listModi");
        app.history_next();
        assert_eq!(app.input, "syll.help");
        app.history_next();
        assert!(app.input.is_empty());
    }

    #[test]
    fn tab_completes_unique_commands() {
        let mut app = app();
        app.input = "SYLL.listm".to_string();
        app.complete();
        assert_eq!(app.input, "syll.listModi ");
        app.input = "syll.s".to_string();
        app.complete();
        assert_eq!(app.input, "syll.s");
        assert!(app.status_line.contains("syll.selectModus"));
    }

    #[test]
    fn output_is_bounded_and_scroll_clamped() {
        let mut app = app();
        let text: String = (0..MAX_OUTPUT_LINES + 20).map(|idx| format!("{idx}\n")).collect();
        app.push_output(&text);
        assert_eq!(app.output.len(), MAX_OUTPUT_LINES);
        app.scroll_up(10_000);
        assert_eq!(app.scroll, MAX_OUTPUT_LINES - 1);
        app.scroll_down(10_000);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn resize_redraws_the_active_modus() {
        let mut app = app();
        type_line(&mut app, "syll.selectModus PentaFile");
        let before = app.session.display.draws();
        app.on_resize(120, 40);
        assert_eq!(app.session.display.draws(), before + 1);
    }
}
