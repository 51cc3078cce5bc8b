use crate::data::fetch::Snapshot;

/// Events delivered to the UI loop from background workers.
#[derive(Debug)]
pub enum AppEvent {
    /// A background poll of tmux finished.
    SnapshotLoaded(Snapshot),
}
