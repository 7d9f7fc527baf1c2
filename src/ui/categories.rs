use crate::app::{App, Focus};
use crate::util::{strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the category panel (always visible, first in the cascade).
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Categories;
    let max_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = if app.catalog.categories.is_empty() {
        vec![ListItem::new("No categories")]
    } else {
        app.catalog
            .categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let is_active = app.active_category == Some(category.id);
                let marker = if is_active { "▸ " } else { "  " };

                let style = if i == app.selected_category && is_focused {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else if is_active {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                let name = strip_control_chars(&category.name);
                let name = truncate_to_width(&name, max_width);
                ListItem::new(Line::from(Span::styled(
                    format!("{}{}", marker, name),
                    style,
                )))
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Categories "),
    );

    f.render_widget(list, area);
}
