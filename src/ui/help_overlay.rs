use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::theme::Theme;

const BINDINGS: [(&str, &str); 9] = [
    ("j/k or Up/Down", "Move cursor"),
    ("g / G", "Jump to top / bottom"),
    ("l or Right", "Expand repo / session"),
    ("h or Left", "Collapse (window: collapse its session)"),
    ("Enter", "Attach to session / window, toggle repo"),
    ("r", "Refresh now"),
    ("?", "Toggle this help"),
    ("Esc", "Close help / quit"),
    ("q / Ctrl+C", "Quit"),
];

pub fn draw_help(f: &mut Frame, area: Rect, theme: &Theme) {
    let width = 60u16.min(area.width.saturating_sub(4));
    let height = (BINDINGS.len() as u16 + 4).min(area.height.saturating_sub(2));
    let popup_area = centered(area, width, height);

    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(" Keybindings", theme.help_title)),
        Line::from(""),
    ];

    for (key, desc) in &BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:18}", key), theme.help_key),
            Span::styled(*desc, theme.help_desc),
        ]));
    }

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(theme.border);

    f.render_widget(Paragraph::new(lines).block(block), popup_area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}
