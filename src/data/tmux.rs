use std::sync::Arc;

use crate::config::{MONITORED_WINDOW_PREFIX, SESSION_PREFIX, UNKNOWN_REPO};
use crate::data::git;
use crate::data::process_runner::{CommandError, CommandRunner, SystemRunner};
use crate::model::session::{Session, Window};
use crate::model::status::{classify_pane_command, Status};

/// Format passed to `list-windows -F`; parsed by [`parse_window_list`].
const WINDOW_FORMAT: &str = "#{window_index}:#{window_name}:#{window_active}";

/// stderr fragments tmux prints when there is simply nothing to list.
const NO_SERVER_MARKERS: [&str; 3] = ["no server running", "no sessions", "error connecting to"];

/// Parse `tmux list-sessions` output, keeping only sessions owned by this tool.
///
/// Lines look like `cb:proj-123-auth: 3 windows (created ...)`; the name is
/// everything before the first `": "`. Lines without that separator are
/// skipped. Input order is preserved.
pub fn parse_session_list(output: &str) -> Vec<Session> {
    output
        .lines()
        .filter(|line| line.starts_with(SESSION_PREFIX))
        .filter_map(|line| {
            let (name, _) = line.split_once(": ")?;
            Some(Session {
                name: name.to_string(),
            })
        })
        .collect()
}

/// Parse `tmux list-windows -F "#{window_index}:#{window_name}:#{window_active}"`.
///
/// Window names may contain colons (`claude:research`), so the active flag
/// is taken after the last colon and the index before the first colon of
/// what remains. A non-numeric index becomes 0.
pub fn parse_window_list(output: &str) -> Vec<Window> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_window_line)
        .collect()
}

fn parse_window_line(line: &str) -> Option<Window> {
    let (rest, active) = line.rsplit_once(':')?;
    let (index, name) = rest.split_once(':')?;
    Some(Window::new(
        index.trim().parse().unwrap_or(0),
        name,
        active.trim() == "1",
    ))
}

/// Whether this process is itself running inside tmux.
pub fn inside_tmux() -> bool {
    std::env::var_os("TMUX").is_some_and(|v| !v.is_empty())
}

/// Thin client over the tmux CLI.
#[derive(Clone)]
pub struct TmuxClient {
    runner: Arc<dyn CommandRunner>,
}

impl Default for TmuxClient {
    fn default() -> Self {
        Self::new(Arc::new(SystemRunner))
    }
}

impl TmuxClient {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Probe that the tmux binary can be executed at all.
    pub fn check_available(&self) -> Result<(), CommandError> {
        match self.runner.output("tmux", &["-V"]) {
            Err(e) if e.is_spawn() => Err(e),
            _ => Ok(()),
        }
    }

    /// All sessions owned by this tool. No server / no sessions is an empty
    /// list, not an error.
    pub fn list_sessions(&self) -> Result<Vec<Session>, CommandError> {
        match self.runner.output("tmux", &["list-sessions"]) {
            Ok(out) => Ok(parse_session_list(&out)),
            Err(e) if NO_SERVER_MARKERS.iter().any(|m| e.stderr().contains(*m)) => {
                tracing::debug!("tmux has no sessions: {}", e.stderr());
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn list_windows(&self, session: &str) -> Result<Vec<Window>, CommandError> {
        let out = self
            .runner
            .output("tmux", &["list-windows", "-t", session, "-F", WINDOW_FORMAT])?;
        Ok(parse_window_list(&out))
    }

    /// Status of one window, from its pane's foreground command. Any query
    /// failure is `Done`.
    pub fn pane_status(&self, session: &str, window: &Window) -> Status {
        let target = window_target(session, window);
        match self
            .runner
            .output("tmux", &["display-message", "-t", &target, "-p", "#{pane_current_command}"])
        {
            Ok(out) => classify_pane_command(&out, MONITORED_WINDOW_PREFIX),
            Err(e) => {
                tracing::debug!("pane status for {} unavailable: {}", target, e);
                Status::Done
            }
        }
    }

    /// Working directory of the session's first window, empty on error.
    pub fn pane_working_dir(&self, session: &str) -> String {
        let target = format!("{}:0", session);
        self.runner
            .output("tmux", &["display-message", "-t", &target, "-p", "#{pane_current_path}"])
            .map(|out| out.trim().to_string())
            .unwrap_or_default()
    }

    /// Repository name for a session, `"Unknown"` if it can't be derived.
    pub fn repo_name(&self, session: &str) -> String {
        let dir = self.pane_working_dir(session);
        if dir.is_empty() {
            return UNKNOWN_REPO.to_string();
        }
        git::repo_name_for_dir(self.runner.as_ref(), &dir)
    }

    pub fn switch_client(&self, target: &str) -> Result<(), CommandError> {
        self.runner
            .interactive("tmux", &["switch-client", "-t", target])
    }

    pub fn attach_session(&self, target: &str) -> Result<(), CommandError> {
        self.runner
            .interactive("tmux", &["attach-session", "-t", target])
    }
}

/// tmux target for a window. Addressed by index since names may contain
/// colons.
pub fn window_target(session: &str, window: &Window) -> String {
    format!("{}:{}", session, window.index)
}
