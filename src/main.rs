mod app;
mod config;
mod data;
mod event;
mod model;
mod ui;

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self as ct_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::Serialize;

use crate::app::{App, Selection};
use crate::config::Config;
use crate::data::fetch;
use crate::data::tmux::{self, TmuxClient};
use crate::event::AppEvent;
use crate::model::status::Status;
use crate::model::tree::RepoGroup;
use crate::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "cb",
    version,
    about = "ClawdBay - live tmux dashboard for Claude Code worktree sessions",
    override_help = HELP_TEXT,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Seconds between background refreshes (1-3600)
    #[arg(long, global = true, value_parser = config::parse_refresh_secs)]
    interval: Option<u64>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Open the interactive dashboard (default)
    Dash,
    /// Print the current sessions and exit
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

const HELP_TEXT: &str = "\
ClawdBay - live tmux dashboard for Claude Code worktree sessions

USAGE:
  cb [OPTIONS]               Open the dashboard
  cb dash [OPTIONS]          Open the dashboard
  cb list [--json]           Print sessions and exit

Sessions are tmux sessions named cb:<name>. Windows named claude or
claude:<label> are monitored and get a status badge; sessions are grouped
by the git repository of their working directory.

OPTIONS:
  --interval <SECS>   Refresh interval, 1-3600 [default: 3, or config]
  -h, --help          Print this help
  -V, --version       Print version

KEYBINDINGS:
  j/k  Up/Down       Move cursor
  g / G              Jump to top / bottom
  l  Right           Expand repo / session
  h  Left            Collapse (on a window: collapse its session)
  Enter              Attach to session / window, toggle repo
  r                  Refresh now
  ?                  Toggle help overlay
  q / Esc / Ctrl+C   Quit

CONFIG:
  ~/.config/cb/config.toml
    [dashboard]
    refresh_interval_secs = 3
    tick_rate_ms = 250
    [logging]
    level = \"cb=debug\"

  Logs are written to ~/.config/cb/logs/cb.log (RUST_LOG overrides).";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match config::load_config(&config::config_dir()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let config = config.with_refresh_override(cli.interval);
    setup_logging(&config);
    tracing::info!("cb {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("ignoring unparseable config.toml: {}", e);
    }

    let client = TmuxClient::default();
    client
        .check_available()
        .context("tmux is required but could not be executed")?;

    match cli.command {
        Some(Command::List { json }) => print_list(&client, json),
        Some(Command::Dash) | None => {
            let Some(selection) = run_tui(client.clone(), &config)? else {
                return Ok(());
            };
            attach(&client, &selection)
        }
    }
}

/// File-backed tracing; the terminal belongs to the TUI. Any failure to set
/// up the file leaves logging disabled.
fn setup_logging(config: &Config) {
    use std::fs::OpenOptions;
    use std::sync::Mutex;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_dir = config::config_dir().join("logs");
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("cb.log"))
    else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level().unwrap_or(config::DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .try_init();
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn run_tui(client: TmuxClient, config: &Config) -> Result<Option<Selection>> {
    // Leave the terminal usable if anything panics mid-frame.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        tracing::error!("panicked: {}", info);
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, config.refresh_interval());
    let theme = Theme::default();
    let result = run_app(&mut terminal, &mut app, &theme, config.tick_rate());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| app.selection)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
    tick_rate: Duration,
) -> Result<()> {
    let (tx, rx) = mpsc::channel::<AppEvent>();
    app.event_tx = Some(tx);

    // First fetch runs in the background; the tree shows a loading state.
    app.request_refresh();

    let mut last_tick = Instant::now();

    loop {
        // Draw only when dirty
        if app.dirty {
            terminal.draw(|f| ui::draw(f, app, theme))?;
            app.dirty = false;
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if ct_event::poll(timeout)? {
            match ct_event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key);
                    app.mark_dirty();
                }
                Event::Resize(..) => app.mark_dirty(),
                _ => {}
            }
        }

        while let Ok(evt) = rx.try_recv() {
            match evt {
                AppEvent::SnapshotLoaded(snapshot) => app.handle_snapshot_loaded(snapshot),
            }
            app.mark_dirty();
        }

        if app.should_quit {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            if app.tick(last_tick) {
                app.mark_dirty();
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    // Help overlay swallows everything except its toggles
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => app.navigate_down(),
        KeyCode::Char('k') | KeyCode::Up => app.navigate_up(),
        KeyCode::Char('g') | KeyCode::Home => app.jump_top(),
        KeyCode::Char('G') | KeyCode::End => app.jump_bottom(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('r') => {
            app.request_refresh();
        }
        _ => {}
    }
}

/// Hand the terminal to tmux for the chosen session or window.
fn attach(client: &TmuxClient, selection: &Selection) -> Result<()> {
    let target = selection.target();
    println!("Attaching to {}...", target);
    if tmux::inside_tmux() {
        tracing::info!("switch-client -t {}", target);
        client.switch_client(&target)?;
    } else {
        tracing::info!("attach-session -t {}", target);
        client.attach_session(&target)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ListedSession<'a> {
    name: &'a str,
    repo: &'a str,
    status: Status,
    windows: Vec<ListedWindow<'a>>,
}

#[derive(Serialize)]
struct ListedWindow<'a> {
    index: u32,
    name: &'a str,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<Status>,
}

fn listed_sessions<'a>(
    groups: &'a [RepoGroup],
    statuses: &std::collections::HashMap<String, Status>,
) -> Vec<ListedSession<'a>> {
    groups
        .iter()
        .flat_map(|group| group.sessions.iter().map(move |s| (group, s)))
        .map(|(group, session)| ListedSession {
            name: &session.name,
            repo: &group.name,
            status: session.status,
            windows: session
                .windows
                .iter()
                .map(|w| ListedWindow {
                    index: w.index,
                    name: &w.name,
                    active: w.active,
                    status: w
                        .is_monitored()
                        .then(|| statuses.get(&model::session::status_key(&session.name, &w.name)).copied())
                        .flatten(),
                })
                .collect(),
        })
        .collect()
}

fn print_list(client: &TmuxClient, json: bool) -> Result<()> {
    let snapshot = fetch::fetch_snapshot(client);
    if let Some(err) = snapshot.error {
        anyhow::bail!(err);
    }
    let sessions = listed_sessions(&snapshot.groups, &snapshot.statuses);

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No active sessions.");
        println!("Start one with: tmux new-session -s {}<branch-name>", config::SESSION_PREFIX);
        return Ok(());
    }
    for group in &snapshot.groups {
        println!("{}", group.name);
        for session in &group.sessions {
            println!("  {:<32} {}", session.name, session.status.badge());
        }
    }
    Ok(())
}
