use crate::app::{App, Focus};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the discourse panel: titles for the active subcategory, newest
/// first (the list is pre-sorted by the panel controller).
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Discourses;
    // Leave room for marker, borders, and the date column.
    let max_title_width = area.width.saturating_sub(16) as usize;

    let items: Vec<ListItem> = app
        .discourses
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_active = app.active_discourse.as_deref() == Some(entry.id.as_str());
            let marker = if is_active { "▸ " } else { "  " };

            let style = if i == app.selected_discourse && is_focused {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if is_active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let title = strip_control_chars(&entry.title);
            let title = truncate_to_width(&title, max_title_width);
            let mut spans = vec![Span::styled(format!("{}{}", marker, title), style)];
            if let Some(date) = &entry.date_posted {
                spans.push(Span::styled(
                    format!("  {}", date),
                    Style::default().fg(Color::DarkGray),
                ));
            }

            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = app
        .active_subcategory
        .and_then(|id| app.catalog.subcategory_name(id))
        .map(|name| format!(" {} ", name))
        .unwrap_or_else(|| " Discourses ".to_string());

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    f.render_widget(list, area);
}
