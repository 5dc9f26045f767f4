mod actions;
mod app;
mod input;
mod view;

use anyhow::{bail, Context, Result};
use app::App;
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::execute;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, IsTerminal, Stdout};
use std::path::PathBuf;
use std::time::Duration;
use sylladex_core::SylladexConfig;

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub config: SylladexConfig,
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let mut app = App::bootstrap(&options.config)?;
    let mut screen = Screen::enter()?;
    run_loop(&mut screen.terminal, &mut app)
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args)?;
    run(options)
}

fn parse_options(args: &[String]) -> Result<LaunchOptions> {
    let mut config_path = std::env::var_os("SYLLADEX_CONFIG").map(PathBuf::from);
    let mut idx = 0usize;
    while idx < args.len() {
        if matches!(args[idx].as_str(), "--config" | "-c") {
            if let Some(value) = args.get(idx + 1) {
                config_path = Some(PathBuf::from(value));
                idx += 1;
            }
        }
        idx += 1;
    }
    let config = match config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("read config from {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parse config from {}", path.display()))?
        }
        None => SylladexConfig::default(),
    };
    Ok(LaunchOptions { config })
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(120);
    while !app.should_quit {
        terminal.draw(|frame| view::draw(frame, app))?;
        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            CEvent::Key(key) if key.kind == KeyEventKind::Press => {
                actions::dispatch(app, input::map_key(key));
            }
            CEvent::Resize(width, height) => app.on_resize(width, height),
            _ => {}
        }
    }
    Ok(())
}

/// The alternate screen in raw mode; dropping it hands the terminal back,
/// also when the loop bails out with an error.
struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Screen {
    fn enter() -> Result<Self> {
        let stdin_tty = io::stdin().is_terminal();
        if !(stdin_tty && io::stdout().is_terminal()) {
            bail!("sylladex-cui needs an interactive terminal; stdin or stdout is redirected");
        }
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err).context("enter alternate screen");
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                Err(err).context("create terminal")
            }
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let restored = disable_raw_mode()
            .and_then(|()| execute!(self.terminal.backend_mut(), LeaveAlternateScreen))
            .and_then(|()| self.terminal.show_cursor());
        if let Err(err) = restored {
            tracing::warn!(error = %err, "terminal not fully restored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "sylladex_cui_{}_{}_{}.json",
            std::process::id(),
            name,
            nanos
        ));
        std::fs::write(&path, contents).expect("write");
        path
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn config_flag_loads_json() {
        let path = temp_config("ok", r#"{ "default_modus": "TarotDeck" }"#);
        let options =
            parse_options(&args(&["--config", &path.display().to_string()])).expect("options");
        assert_eq!(options.config.default_modus.as_deref(), Some("TarotDeck"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn broken_config_is_reported() {
        let path = temp_config("broken", "{ nope");
        let err = parse_options(&args(&["-c", &path.display().to_string()])).unwrap_err();
        assert!(format!("{err:#}").contains("parse config"));
        let _ = std::fs::remove_file(&path);
    }
}
