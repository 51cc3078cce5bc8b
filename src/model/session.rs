use crate::config::MONITORED_WINDOW_PREFIX;

/// A tmux session owned by this tool (name starts with `cb:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
}

/// A window inside a session, as reported by `tmux list-windows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub index: u32,
    pub name: String,
    pub active: bool,
}

impl Window {
    pub fn new(index: u32, name: impl Into<String>, active: bool) -> Self {
        Self {
            index,
            name: name.into(),
            active,
        }
    }

    /// Whether this window runs the monitored process: named `claude`
    /// or `claude:<label>`.
    pub fn is_monitored(&self) -> bool {
        match self.name.strip_prefix(MONITORED_WINDOW_PREFIX) {
            Some(rest) => rest.is_empty() || rest.starts_with(':'),
            None => false,
        }
    }
}

/// Key for a window in the status map: `"<session>:<window>"`.
pub fn status_key(session: &str, window: &str) -> String {
    format!("{}:{}", session, window)
}
