//! Overlay widgets: the admin dropdown menu and the three form modals.
//!
//! A modal and its backdrop are one unit: both are drawn (and both
//! disappear) off the single `app.modal` value. The dropdown and the modals
//! are never visible at the same time; opening a modal forces the dropdown
//! closed in the overlay controller.

use crate::app::{App, FormStatus, ModalKind, DROPDOWN_ITEMS};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the admin dropdown menu under the top-right corner.
pub fn render_dropdown(f: &mut Frame, app: &App) {
    let area = f.area();
    let width = 22u16.min(area.width.saturating_sub(2));
    let height = (DROPDOWN_ITEMS.len() as u16 + 2).min(area.height.saturating_sub(2));
    if width < 10 || height < 3 {
        return;
    }
    let x = area.x + area.width.saturating_sub(width + 1);
    let overlay = Rect::new(x, area.y + 1, width, height);

    f.render_widget(Clear, overlay);

    let lines: Vec<Line> = DROPDOWN_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if i == app.dropdown_selected {
                Line::from(Span::styled(
                    format!("> {}", item),
                    Style::default().bg(Color::DarkGray).fg(Color::White),
                ))
            } else {
                Line::from(format!("  {}", item))
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Admin "),
    );
    f.render_widget(paragraph, overlay);
}

/// One form field as the modal shows it.
struct FieldView<'a> {
    label: &'static str,
    value: &'a str,
    masked: bool,
}

/// Render the open modal (if any) with its backdrop.
pub fn render_modal(f: &mut Frame, app: &App) {
    let Some(kind) = app.modal else {
        return;
    };
    let area = f.area();

    // Backdrop: dim the whole screen behind the dialog.
    let backdrop = Block::default().style(Style::default().fg(Color::DarkGray));
    f.render_widget(backdrop, area);

    let (title, lines) = match kind {
        ModalKind::ImageUpload => modal_lines(
            " Upload Image ",
            &[
                FieldView {
                    label: "Filename",
                    value: &app.image_form.filename,
                    masked: false,
                },
                FieldView {
                    label: "File path",
                    value: &app.image_form.file_path,
                    masked: false,
                },
            ],
            None,
            app.image_form.field,
            &app.image_form.status,
        ),
        ModalKind::AddDiscourse => {
            let picker = app
                .discourse_form
                .options
                .get(app.discourse_form.selected_option)
                .map(|(_, label)| label.as_str())
                .unwrap_or("(no subcategories)");
            modal_lines(
                " Add Discourse ",
                &[
                    FieldView {
                        label: "Title",
                        value: &app.discourse_form.title,
                        masked: false,
                    },
                    FieldView {
                        label: "Body",
                        value: &app.discourse_form.body,
                        masked: false,
                    },
                ],
                Some((picker, app.discourse_form.field == 2)),
                app.discourse_form.field,
                &app.discourse_form.status,
            )
        }
        ModalKind::Join => modal_lines(
            " Join ",
            &[
                FieldView {
                    label: "Username",
                    value: &app.join_form.username,
                    masked: false,
                },
                FieldView {
                    label: "Email",
                    value: &app.join_form.email,
                    masked: false,
                },
                FieldView {
                    label: "First name",
                    value: &app.join_form.first_name,
                    masked: false,
                },
                FieldView {
                    label: "Last name",
                    value: &app.join_form.last_name,
                    masked: false,
                },
                FieldView {
                    label: "Organization",
                    value: &app.join_form.organization,
                    masked: false,
                },
                FieldView {
                    label: "Website",
                    value: &app.join_form.website,
                    masked: false,
                },
                FieldView {
                    label: "Password",
                    value: &app.join_form.password,
                    masked: true,
                },
            ],
            None,
            app.join_form.field,
            &app.join_form.status,
        ),
    };

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let width = 56u16.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .alignment(Alignment::Left);
    f.render_widget(paragraph, overlay);
}

/// Build the text lines of a form modal: fields with a cursor on the active
/// one, an optional picker row, the status line, and the key hints.
fn modal_lines<'a>(
    title: &'static str,
    fields: &[FieldView<'a>],
    picker: Option<(&'a str, bool)>,
    active_field: usize,
    status: &FormStatus,
) -> (&'static str, Vec<Line<'static>>) {
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(fields.len() + 5);

    for (i, field) in fields.iter().enumerate() {
        let is_active = i == active_field;
        let marker = if is_active { "> " } else { "  " };
        let shown = if field.masked {
            "•".repeat(field.value.chars().count())
        } else {
            field.value.to_string()
        };
        let cursor = if is_active { "_" } else { "" };
        let style = if is_active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{:<13}{}{}", marker, field.label, shown, cursor),
            style,
        )));
    }

    if let Some((label, is_active)) = picker {
        let marker = if is_active { "> " } else { "  " };
        let style = if is_active {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{:<13}< {} >", marker, "Subcategory", label),
            style,
        )));
    }

    lines.push(Line::from(""));
    let status_style = match status {
        FormStatus::Error(_) => Style::default().fg(Color::Red),
        FormStatus::Success { .. } => Style::default().fg(Color::Green),
        FormStatus::Busy(_) => Style::default().fg(Color::Yellow),
        FormStatus::Idle => Style::default(),
    };
    lines.push(Line::from(Span::styled(
        status.line().into_owned(),
        status_style,
    )));
    lines.push(Line::from(Span::styled(
        "(Tab) Next field  (Enter) Submit  (Esc) Close",
        Style::default().fg(Color::DarkGray),
    )));

    (title, lines)
}
