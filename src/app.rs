use std::collections::HashMap;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::data::fetch::{self, Snapshot};
use crate::data::tmux::{window_target, TmuxClient};
use crate::event::AppEvent;
use crate::model::session::{status_key, Window};
use crate::model::status::Status;
use crate::model::tree::{self, RepoGroup, TreeNode, WorktreeSession};

/// What the user picked with Enter; the caller attaches to it after the
/// UI has shut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub session: String,
    pub window: Option<Window>,
}

impl Selection {
    /// tmux target: the session, or `<session>:<index>` for a window.
    pub fn target(&self) -> String {
        match &self.window {
            Some(window) => window_target(&self.session, window),
            None => self.session.clone(),
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub dirty: bool,

    // Tree
    pub groups: Vec<RepoGroup>,
    pub nodes: Vec<TreeNode>,
    pub cursor: usize,
    pub window_statuses: HashMap<String, Status>,
    pub selection: Option<Selection>,

    // Refresh
    pub fetch_pending: bool,
    pub loaded: bool,
    pub last_refresh: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    pub refresh_interval: Duration,
    pub next_refresh: Instant,

    /// Sender handed to background fetches; set once the loop owns the receiver.
    pub event_tx: Option<mpsc::Sender<AppEvent>>,
    client: TmuxClient,
}

impl App {
    pub fn new(client: TmuxClient, refresh_interval: Duration) -> Self {
        App {
            should_quit: false,
            show_help: false,
            dirty: true,

            groups: Vec::new(),
            nodes: Vec::new(),
            cursor: 0,
            window_statuses: HashMap::new(),
            selection: None,

            fetch_pending: false,
            loaded: false,
            last_refresh: None,
            last_error: None,
            refresh_interval,
            next_refresh: Instant::now(),

            event_tx: None,
            client,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // --- Refresh cycle ---

    /// Start a background fetch unless one is already outstanding.
    /// Returns whether a fetch was started.
    pub fn request_refresh(&mut self) -> bool {
        if self.fetch_pending {
            return false;
        }
        let Some(tx) = self.event_tx.clone() else {
            return false;
        };
        tracing::debug!("starting background fetch");
        fetch::spawn_fetch(self.client.clone(), tx);
        self.fetch_pending = true;
        true
    }

    /// Timer work: start the next fetch once the interval since the last
    /// completion has elapsed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.fetch_pending && now >= self.next_refresh {
            return self.request_refresh();
        }
        false
    }

    /// Apply a completed fetch: keep the user's expand flags, rebuild the
    /// rows, clamp the cursor and re-arm the timer.
    pub fn handle_snapshot_loaded(&mut self, snapshot: Snapshot) {
        self.fetch_pending = false;
        self.loaded = true;

        let previous = std::mem::take(&mut self.groups);
        self.groups = tree::merge_expand_state(&previous, snapshot.groups);
        self.window_statuses = snapshot.statuses;
        self.last_error = snapshot.error;
        self.last_refresh = Some(Local::now());
        self.rebuild_nodes();

        self.next_refresh = Instant::now() + self.refresh_interval;
        tracing::debug!(
            "applied snapshot: {} repos, {} rows, cursor {}",
            self.groups.len(),
            self.nodes.len(),
            self.cursor
        );
    }

    fn rebuild_nodes(&mut self) {
        self.nodes = tree::build_nodes(&self.groups);
        self.clamp_cursor();
    }

    /// Rebuild and put the cursor on `target` if it is still visible.
    fn rebuild_and_focus(&mut self, target: TreeNode) {
        self.rebuild_nodes();
        if let Some(idx) = self.nodes.iter().position(|n| *n == target) {
            self.cursor = idx;
        }
    }

    fn clamp_cursor(&mut self) {
        if self.nodes.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.nodes.len() {
            self.cursor = self.nodes.len() - 1;
        }
    }

    // --- Lookups ---

    pub fn selected_node(&self) -> Option<TreeNode> {
        self.nodes.get(self.cursor).copied()
    }

    pub fn repo_for(&self, node: TreeNode) -> Option<&RepoGroup> {
        self.groups.get(node.repo_index())
    }

    pub fn session_for(&self, node: TreeNode) -> Option<&WorktreeSession> {
        self.repo_for(node)?.sessions.get(node.session_index()?)
    }

    pub fn window_for(&self, node: TreeNode) -> Option<&Window> {
        self.session_for(node)?.windows.get(node.window_index()?)
    }

    /// Last polled status of a window, if it is monitored.
    pub fn window_status(&self, session: &str, window: &Window) -> Option<Status> {
        if !window.is_monitored() {
            return None;
        }
        self.window_statuses
            .get(&status_key(session, &window.name))
            .copied()
    }

    // --- Navigation ---

    pub fn navigate_down(&mut self) {
        if !self.nodes.is_empty() {
            self.cursor = (self.cursor + 1).min(self.nodes.len() - 1);
        }
    }

    pub fn navigate_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn jump_top(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_bottom(&mut self) {
        self.cursor = self.nodes.len().saturating_sub(1);
    }

    // --- Tree mutations ---

    /// Expand the repo or session under the cursor. No-op on a window.
    pub fn expand_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        if self.set_expanded(node, true) {
            self.rebuild_and_focus(node);
        }
    }

    /// Collapse the repo or session under the cursor; on a window, collapse
    /// its session and move the cursor onto it.
    pub fn collapse_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        let target = match node {
            TreeNode::Window { repo, session, .. } => TreeNode::Session { repo, session },
            other => other,
        };
        if self.set_expanded(target, false) {
            self.rebuild_and_focus(target);
        }
    }

    /// Enter: toggle a repo, or select a session/window and finish.
    pub fn activate_selected(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };
        match node {
            TreeNode::Repo { repo } => {
                if let Some(group) = self.groups.get_mut(repo) {
                    group.expanded = !group.expanded;
                    self.rebuild_and_focus(node);
                }
            }
            TreeNode::Session { .. } | TreeNode::Window { .. } => {
                let Some(session) = self.session_for(node) else {
                    return;
                };
                let selection = Selection {
                    session: session.name.clone(),
                    window: self.window_for(node).cloned(),
                };
                tracing::info!("selected {}", selection.target());
                self.selection = Some(selection);
                self.should_quit = true;
            }
        }
    }

    /// Leave without a selection.
    pub fn quit(&mut self) {
        self.selection = None;
        self.should_quit = true;
    }

    fn set_expanded(&mut self, node: TreeNode, expanded: bool) -> bool {
        match node {
            TreeNode::Repo { repo } => match self.groups.get_mut(repo) {
                Some(group) => {
                    group.expanded = expanded;
                    true
                }
                None => false,
            },
            TreeNode::Session { repo, session } => {
                match self
                    .groups
                    .get_mut(repo)
                    .and_then(|g| g.sessions.get_mut(session))
                {
                    Some(s) => {
                        s.expanded = expanded;
                        true
                    }
                    None => false,
                }
            }
            TreeNode::Window { .. } => false,
        }
    }
}
