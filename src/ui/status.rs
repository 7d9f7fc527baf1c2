use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.loads_in_flight > 0 {
        Cow::Borrowed("Loading discourse...")
    } else if app.modal.is_some() {
        Cow::Borrowed("[Tab]field [Enter]submit [Esc]close")
    } else if app.dropdown_open {
        Cow::Borrowed("[j/k]move [Enter]select [Esc]close")
    } else {
        match app.focus {
            Focus::Categories => {
                Cow::Borrowed("[j/k]move [Enter]open [a]dmin [?]help [q]uit")
            }
            Focus::Subcategories | Focus::Discourses => {
                Cow::Borrowed("[j/k]move [Enter]open [Esc]close panel [a]dmin [q]uit")
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
