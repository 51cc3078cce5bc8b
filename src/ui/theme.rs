use ratatui::style::{Color, Modifier, Style};

use crate::model::status::Status;

/// Every style the dashboard draws with. Built once at startup and passed
/// by reference into the renderer.
#[derive(Debug, Clone)]
pub struct Theme {
    // Header
    pub title: Style,
    pub header: Style,
    pub refreshing: Style,

    // Tree rows
    pub repo: Style,
    pub repo_count: Style,
    pub session: Style,
    pub window: Style,
    pub window_active: Style,
    pub selected: Style,
    pub border: Style,

    // Status badges
    pub working: Style,
    pub idle: Style,
    pub done: Style,

    // Status bar
    pub status_bar: Style,
    pub error: Style,
    pub hint_key: Style,
    pub hint_desc: Style,

    pub empty_state: Style,

    // Help overlay
    pub help_title: Style,
    pub help_key: Style,
    pub help_desc: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            title: Style::new()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header: Style::new().fg(Color::Gray).bg(Color::DarkGray),
            refreshing: Style::new().fg(Color::Yellow).bg(Color::DarkGray),

            repo: Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            repo_count: Style::new().fg(Color::DarkGray),
            session: Style::new().fg(Color::White).add_modifier(Modifier::BOLD),
            window: Style::new().fg(Color::Gray),
            window_active: Style::new().fg(Color::White),
            selected: Style::new()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            border: Style::new().fg(Color::Cyan),

            working: Style::new().fg(Color::Green).add_modifier(Modifier::BOLD),
            idle: Style::new().fg(Color::Yellow),
            done: Style::new().fg(Color::DarkGray),

            status_bar: Style::new().fg(Color::White).bg(Color::DarkGray),
            error: Style::new().fg(Color::Red).bg(Color::DarkGray),
            hint_key: Style::new()
                .fg(Color::Yellow)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
            hint_desc: Style::new().fg(Color::Gray).bg(Color::DarkGray),

            empty_state: Style::new().fg(Color::DarkGray),

            help_title: Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            help_key: Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            help_desc: Style::new().fg(Color::White),
        }
    }
}

impl Theme {
    pub fn status(&self, status: Status) -> Style {
        match status {
            Status::Working => self.working,
            Status::Idle => self.idle,
            Status::Done => self.done,
        }
    }
}
