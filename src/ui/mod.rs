pub mod help_overlay;
pub mod layout;
pub mod theme;
pub mod tree_view;
pub mod util;

use ratatui::Frame;

use crate::app::App;
use theme::Theme;

/// Main draw dispatcher.
pub fn draw(f: &mut Frame, app: &App, theme: &Theme) {
    layout::draw_layout(f, app, theme);
}
