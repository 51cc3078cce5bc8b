use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use super::util::{gap, truncate_width};
use crate::app::App;
use crate::config::SESSION_PREFIX;
use crate::model::tree::TreeNode;

const EXPANDED: &str = "▼";
const COLLAPSED: &str = "▸";
const HIGHLIGHT_SYMBOL: &str = "> ";

pub fn draw_tree(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let session_count: usize = app.groups.iter().map(|g| g.sessions.len()).sum();
    let block = Block::default()
        .title(format!(" Sessions [{}] ", session_count))
        .borders(Borders::ALL)
        .border_style(theme.border);

    if app.nodes.is_empty() {
        let msg = Paragraph::new(empty_state(app))
            .style(theme.empty_state)
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(msg, area);
        return;
    }

    let width = (area.width as usize)
        .saturating_sub(2)
        .saturating_sub(HIGHLIGHT_SYMBOL.width());
    let items: Vec<ListItem> = app
        .nodes
        .iter()
        .filter_map(|node| node_line(app, *node, theme, width))
        .map(ListItem::new)
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.cursor));

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selected)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always);

    f.render_stateful_widget(list, area, &mut state);
}

fn empty_state(app: &App) -> String {
    if !app.loaded {
        return "Loading sessions...".to_string();
    }
    format!(
        "No active sessions.\n\nStart one with: tmux new-session -s {}<branch-name>",
        SESSION_PREFIX
    )
}

/// One rendered row, `width` columns wide, with the status badge
/// right-aligned. `None` if the node no longer resolves.
pub fn node_line<'a>(app: &'a App, node: TreeNode, theme: &Theme, width: usize) -> Option<Line<'a>> {
    match node {
        TreeNode::Repo { .. } => {
            let group = app.repo_for(node)?;
            let icon = if group.expanded { EXPANDED } else { COLLAPSED };
            Some(Line::from(vec![
                Span::styled(format!("{} {}", icon, group.name), theme.repo),
                Span::styled(format!(" ({})", group.sessions.len()), theme.repo_count),
            ]))
        }
        TreeNode::Session { .. } => {
            let session = app.session_for(node)?;
            let icon = if session.expanded { EXPANDED } else { COLLAPSED };
            let badge = session.status.badge();
            let name_room = width.saturating_sub(badge.width() + 5);
            let left = format!("  {} {}", icon, truncate_width(&session.name, name_room));
            let pad = gap(width, left.width(), badge.width());
            Some(Line::from(vec![
                Span::styled(left, theme.session),
                Span::raw(" ".repeat(pad)),
                Span::styled(badge, theme.status(session.status)),
            ]))
        }
        TreeNode::Window { .. } => {
            let session = app.session_for(node)?;
            let window = app.window_for(node)?;
            let badge = app
                .window_status(&session.name, window)
                .map(|s| (s.badge(), theme.status(s)));
            let badge_width = badge.as_ref().map_or(0, |(b, _)| b.width());
            let marker = if window.active { "*" } else { "" };
            let name_room = width.saturating_sub(badge_width + 8);
            let left = format!(
                "      {}{}",
                truncate_width(&window.name, name_room),
                marker
            );
            let style = if window.active {
                theme.window_active
            } else {
                theme.window
            };
            let mut spans = vec![Span::styled(left.clone(), style)];
            if let Some((text, badge_style)) = badge {
                spans.push(Span::raw(" ".repeat(gap(width, left.width(), badge_width))));
                spans.push(Span::styled(text, badge_style));
            }
            Some(Line::from(spans))
        }
    }
}
