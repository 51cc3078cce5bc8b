use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::theme::Theme;
use super::util::truncate_width;
use super::{help_overlay, tree_view};
use crate::app::App;
use crate::model::tree::NodeKind;

pub fn draw_layout(f: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Tree
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app, theme);
    tree_view::draw_tree(f, chunks[1], app, theme);
    draw_status_bar(f, chunks[2], app, theme);

    // Help overlay (on top of everything)
    if app.show_help {
        help_overlay::draw_help(f, f.area(), theme);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let title = Span::styled(" ClawdBay ", theme.title);

    let right = if app.fetch_pending {
        Span::styled(" refreshing… ", theme.refreshing)
    } else {
        match app.last_refresh {
            Some(at) => Span::styled(format!(" updated {} ", at.format("%H:%M:%S")), theme.header),
            None => Span::styled(" ", theme.header),
        }
    };

    let fill = (area.width as usize).saturating_sub(title.width() + right.width());
    let line = Line::from(vec![title, Span::styled(" ".repeat(fill), theme.header), right]);
    f.render_widget(Paragraph::new(line), area);
}

/// Footer key hints for the node under the cursor.
pub fn hint_text(app: &App) -> Vec<(&'static str, &'static str)> {
    if app.show_help {
        return vec![("Esc", "close help")];
    }
    let mut hints = vec![("j/k", "move")];
    match app.selected_node().map(|n| n.kind()) {
        Some(NodeKind::Repo) => {
            hints.push(("Enter", "toggle"));
            hints.push(("h/l", "collapse/expand"));
        }
        Some(NodeKind::Session) => {
            hints.push(("Enter", "attach"));
            hints.push(("h/l", "collapse/expand"));
        }
        Some(NodeKind::Window) => {
            hints.push(("Enter", "attach window"));
            hints.push(("h", "collapse"));
        }
        None => {}
    }
    hints.push(("r", "refresh"));
    hints.push(("?", "help"));
    hints.push(("q", "quit"));
    hints
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    // Build right-aligned hint spans
    let hints = hint_text(app);
    let mut hint_spans: Vec<Span> = Vec::new();
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            hint_spans.push(Span::styled("  ", theme.status_bar));
        }
        hint_spans.push(Span::styled(*key, theme.hint_key));
        hint_spans.push(Span::styled(":", theme.hint_desc));
        hint_spans.push(Span::styled(*desc, theme.hint_desc));
    }
    hint_spans.push(Span::styled(" ", theme.status_bar));

    let total = area.width as usize;
    let hint_width: usize = hint_spans.iter().map(|s| s.width()).sum();

    // Error takes whatever the hints leave.
    let mut spans: Vec<Span> = Vec::new();
    if let Some(ref err) = app.last_error {
        let room = total.saturating_sub(hint_width + 8);
        if room > 0 {
            spans.push(Span::styled(
                format!(" ERR: {} ", truncate_width(err, room)),
                theme.error,
            ));
        }
    }

    let left_width: usize = spans.iter().map(|s| s.width()).sum();
    let gap = total.saturating_sub(left_width + hint_width);
    spans.push(Span::styled(" ".repeat(gap), theme.status_bar));
    spans.extend(hint_spans);

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
