//! Render functions for the TUI.
//!
//! One dispatch function paints the whole frame: the navigation cascade on
//! the left (one to three panels, per the panel state), the reader pane,
//! the status bar, and any overlay on top.

use crate::app::{App, PanelState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::{categories, discourses, help, overlay, reader, status, subcategories};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_main(f, app, chunks[0]);
    status::render(f, app, chunks[1]);

    // Overlays stack on top of the base layout.
    if app.show_help {
        help::render(f, app);
    }
    if app.dropdown_open {
        overlay::render_dropdown(f, app);
    }
    if app.modal.is_some() {
        overlay::render_modal(f, app);
    }
}

/// Render the navigation cascade and (when bound) the reader pane.
///
/// The number of visible panels follows the panel state, so the layout
/// itself enforces the cascade invariant: no subcategory panel without a
/// selected category, no discourse panel without a selected subcategory.
fn render_main(f: &mut Frame, app: &mut App, area: Rect) {
    let with_reader = app.bindings.reader;

    let constraints: Vec<Constraint> = match (app.state, with_reader) {
        (PanelState::Collapsed, true) => vec![Constraint::Percentage(24), Constraint::Min(0)],
        (PanelState::CategorySelected, true) => vec![
            Constraint::Percentage(18),
            Constraint::Percentage(18),
            Constraint::Min(0),
        ],
        (PanelState::SubcategorySelected, true) => vec![
            Constraint::Percentage(16),
            Constraint::Percentage(16),
            Constraint::Percentage(22),
            Constraint::Min(0),
        ],
        (PanelState::Collapsed, false) => vec![Constraint::Min(0)],
        (PanelState::CategorySelected, false) => {
            vec![Constraint::Percentage(50), Constraint::Min(0)]
        }
        (PanelState::SubcategorySelected, false) => vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Min(0),
        ],
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    categories::render(f, app, chunks[0]);

    let mut next = 1;
    if app.state != PanelState::Collapsed {
        subcategories::render(f, app, chunks[next]);
        next += 1;
    }
    if app.state == PanelState::SubcategorySelected {
        discourses::render(f, app, chunks[next]);
        next += 1;
    }
    if with_reader {
        reader::render(f, app, chunks[next]);
    }
}
