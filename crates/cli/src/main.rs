mod line_editor;

use anyhow::{bail, Context, Result};
use line_editor::LineEditor;
use std::fs;
use std::path::{Path, PathBuf};
use sylladex_core::{Dispatch, SylladexConfig, MODUS_PREFIX, SYLL_PREFIX};
use sylladex_modi::Session;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_FILE: &str = "sylladex.json";
const PROMPT: &str = "sylladex> ";
const QUIT_COMMANDS: &[&str] = &["quit", "exit"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CliOptions {
    config: Option<PathBuf>,
    cui: bool,
    verbose: bool,
    help: bool,
}

fn parse_cli_options(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--cui" => options.cui = true,
            "--verbose" | "-v" => options.verbose = true,
            "--help" | "-h" => options.help = true,
            "--config" | "-c" => {
                let Some(value) = args.get(idx + 1) else {
                    bail!("--config needs a path");
                };
                options.config = Some(PathBuf::from(value));
                idx += 1;
            }
            other => tracing::debug!(argument = other, "ignoring unknown argument"),
        }
        idx += 1;
    }
    Ok(options)
}

/// `explicit` wins, then `env_path`, then `sylladex.json` in `cwd` when it
/// exists. A missing explicit file is an error.
fn resolve_config_path(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_path {
        return Some(path);
    }
    let local = cwd.join(DEFAULT_CONFIG_FILE);
    local.is_file().then_some(local)
}

fn load_config(path: Option<&Path>) -> Result<SylladexConfig> {
    let Some(path) = path else {
        return Ok(SylladexConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn apply_env_overrides(config: &mut SylladexConfig, save_override: Option<PathBuf>) {
    if let Some(path) = save_override {
        config.save_file = path;
    }
}

fn init_logging(config: &SylladexConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn print_usage() {
    println!("usage: sylladex [--config <path>] [--cui] [--verbose]");
    println!();
    println!("Lines starting with `{SYLL_PREFIX}` address the sylladex, lines starting with");
    println!("`{MODUS_PREFIX}` address the selected fetch modus. Try `{SYLL_PREFIX}help`.");
    println!("`quit` leaves.");
}

fn completion_table(session: &Session) -> Vec<String> {
    let host = session
        .container
        .host_command_names()
        .into_iter()
        .map(|name| format!("{SYLL_PREFIX}{name}"));
    let modus = session
        .container
        .active_commands()
        .into_iter()
        .map(|name| format!("{MODUS_PREFIX}{name}"));
    host.chain(modus).collect()
}

fn print_output(text: &str) {
    if !text.is_empty() {
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
    }
}

fn run_repl(mut session: Session) {
    let mut editor = LineEditor::new();
    let mut last_draw = session.display.draws();
    print_output(&session.log.drain());
    if let Some(view) = session.render() {
        print!("{view}");
    }
    loop {
        editor.set_completions(completion_table(&session));
        let Some(line) = editor.read_line(PROMPT) else {
            break;
        };
        let trimmed = line.trim();
        if QUIT_COMMANDS
            .iter()
            .any(|quit| quit.eq_ignore_ascii_case(trimmed))
            && session.container.buffer().pending().is_none()
        {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        let (dispatch, text) = session.submit(trimmed);
        print_output(&text);
        if dispatch == Dispatch::Ignored {
            println!("(lines need a `{SYLL_PREFIX}` or `{MODUS_PREFIX}` prefix)");
        }
        let draws = session.display.draws();
        if draws != last_draw {
            last_draw = draws;
            match session.render() {
                Some(view) => print!("{view}"),
                None => println!("(display cleared)"),
            }
        }
    }
    editor.save_history();
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args)?;
    if options.help {
        print_usage();
        return Ok(());
    }
    let cwd = std::env::current_dir().context("reading working directory")?;
    let config_path = resolve_config_path(
        options.config.as_deref(),
        std::env::var_os("SYLLADEX_CONFIG").map(PathBuf::from),
        &cwd,
    );
    let mut config = load_config(config_path.as_deref())?;
    apply_env_overrides(&mut config, std::env::var_os("SYLLADEX_SAVE").map(PathBuf::from));

    if options.cui {
        let launch = sylladex_cui::LaunchOptions { config };
        return sylladex_cui::run(launch).context("terminal ui");
    }

    init_logging(&config, options.verbose);
    tracing::info!(config = ?config_path, save_file = %config.save_file.display(), "starting sylladex");
    let session = Session::open(&config).context("building the sylladex")?;
    run_repl(session);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("sylladex: {err:#}");
        std::process::exit(1);
    }
}
