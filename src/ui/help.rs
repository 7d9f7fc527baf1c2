//! Help overlay: static key reference.

use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const HELP_LINES: [(&str, &str); 11] = [
    ("j/k, Up/Down", "Move within the focused panel"),
    ("Enter, l", "Open the highlighted item"),
    ("Tab / Shift-Tab", "Cycle panel focus"),
    ("Esc, h", "Close the focused panel (cascades)"),
    ("a", "Open the admin menu"),
    ("u", "Upload an image"),
    ("n", "Add a discourse"),
    ("J", "Join (register)"),
    ("e", "Open the editor in the browser"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, _app: &App) {
    let area = f.area();
    let width = 52u16.min(area.width.saturating_sub(4));
    let height = (HELP_LINES.len() as u16 + 3).min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<16}", key),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from("Press ? or Esc to close"));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Keys "),
    );
    f.render_widget(paragraph, overlay);
}
