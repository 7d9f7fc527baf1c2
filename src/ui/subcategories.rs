use crate::app::{App, Focus};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the subcategory panel. Only called while the cascade has an
/// active category, so the list is never empty here.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Subcategories;
    let max_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .subcategories
        .iter()
        .enumerate()
        .map(|(i, sub)| {
            let is_active = app.active_subcategory == Some(sub.id);
            let marker = if is_active { "▸ " } else { "  " };

            let style = if i == app.selected_subcategory && is_focused {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if is_active {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let name = strip_control_chars(&sub.name);
            let name = truncate_to_width(&name, max_width);
            ListItem::new(Line::from(Span::styled(
                format!("{}{}", marker, name),
                style,
            )))
        })
        .collect();

    // Panel title carries the active category name, like the page header
    // above the second navigation column.
    let title = app
        .active_category
        .and_then(|id| app.catalog.category(id))
        .map(|c| format!(" {} ", c.name))
        .unwrap_or_else(|| " Subcategories ".to_string());

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
