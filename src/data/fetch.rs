use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use crate::data::tmux::TmuxClient;
use crate::event::AppEvent;
use crate::model::session::{status_key, Window};
use crate::model::status::Status;
use crate::model::tree::{group_by_repo, RepoGroup};

/// Result of one poll of tmux.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Freshly grouped tree; every expand flag at its default.
    pub groups: Vec<RepoGroup>,
    /// Per-window status keyed by `"<session>:<window>"`.
    pub statuses: HashMap<String, Status>,
    /// Set when the session listing itself failed; the tree is then empty.
    pub error: Option<String>,
}

/// Query tmux (and git) for the full dashboard state.
///
/// Only the session listing can fail the snapshot. Per-session and
/// per-window failures degrade to defaults so one bad session never hides
/// the rest.
pub fn fetch_snapshot(client: &TmuxClient) -> Snapshot {
    let started = Instant::now();

    let sessions = match client.list_sessions() {
        Ok(sessions) => sessions,
        Err(e) => {
            tracing::warn!("listing tmux sessions failed: {}", e);
            return Snapshot {
                error: Some(format!("tmux: {}", e)),
                ..Snapshot::default()
            };
        }
    };

    let mut windows: HashMap<String, Vec<Window>> = HashMap::new();
    let mut repo_names: HashMap<String, String> = HashMap::new();
    let mut statuses: HashMap<String, Status> = HashMap::new();

    for session in &sessions {
        let wins = client.list_windows(&session.name).unwrap_or_else(|e| {
            tracing::warn!("listing windows of {} failed: {}", session.name, e);
            Vec::new()
        });

        for window in wins.iter().filter(|w| w.is_monitored()) {
            statuses.insert(
                status_key(&session.name, &window.name),
                client.pane_status(&session.name, window),
            );
        }

        repo_names.insert(session.name.clone(), client.repo_name(&session.name));
        windows.insert(session.name.clone(), wins);
    }

    let groups = group_by_repo(&sessions, &repo_names, &windows, &statuses);
    tracing::debug!(
        "fetched {} sessions in {} repos ({:?})",
        sessions.len(),
        groups.len(),
        started.elapsed()
    );

    Snapshot {
        groups,
        statuses,
        error: None,
    }
}

/// Run [`fetch_snapshot`] on a worker thread and deliver the result as a
/// single `SnapshotLoaded` event.
pub fn spawn_fetch(client: TmuxClient, tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let snapshot = fetch_snapshot(&client);
        // Receiver is gone once the UI has exited; the result is discarded.
        let _ = tx.send(AppEvent::SnapshotLoaded(snapshot));
    });
}
