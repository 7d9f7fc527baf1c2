//! Input handling for the TUI.
//!
//! One dispatcher resolves every key event, in priority order: help overlay,
//! then the open modal, then the admin dropdown, then the navigation panels.
//! The panels repopulate dynamically as the cascade changes, so routing by
//! current state here replaces any notion of per-widget handlers.

use crate::app::{App, DiscourseResolution, Focus, ModalKind, Panel, PanelState};
use crate::app::{AppEvent, FormStatus};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    form_is_busy, open_in_browser, spawn_discourse_load, spawn_discourse_save, spawn_image_upload,
    spawn_join, spawn_subcategory_options,
};
use super::Action;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Ctrl-C always quits, regardless of overlay state.
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Ok(Action::Quit);
    }

    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return Ok(Action::Continue);
    }

    if let Some(kind) = app.modal {
        handle_modal_input(app, kind, code, event_tx);
        return Ok(Action::Continue);
    }

    if app.dropdown_open {
        handle_dropdown_input(app, code, event_tx);
        return Ok(Action::Continue);
    }

    handle_panel_input(app, code, event_tx)
}

/// Keys while a form modal is open. All input is captured by the modal.
fn handle_modal_input(
    app: &mut App,
    kind: ModalKind,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if code == KeyCode::Esc {
        app.close_modal();
        return;
    }

    // Mid-submission the form is read-only; the result event will move it on.
    if form_is_busy(app, kind) {
        return;
    }

    match code {
        KeyCode::Tab | KeyCode::Down => cycle_field(app, kind, 1),
        KeyCode::BackTab | KeyCode::Up => cycle_field(app, kind, -1),
        KeyCode::Enter => submit_form(app, kind, event_tx),
        KeyCode::Backspace => {
            if let Some(value) = active_field_mut(app, kind) {
                value.pop();
            }
        }
        KeyCode::Left | KeyCode::Right
            if kind == ModalKind::AddDiscourse && app.discourse_form.field == 2 =>
        {
            let len = app.discourse_form.options.len();
            if len > 0 {
                let current = app.discourse_form.selected_option;
                app.discourse_form.selected_option = if code == KeyCode::Right {
                    (current + 1) % len
                } else {
                    (current + len - 1) % len
                };
            }
        }
        KeyCode::Char(c) => {
            if let Some(value) = active_field_mut(app, kind) {
                value.push(c);
            }
        }
        _ => {}
    }
}

fn cycle_field(app: &mut App, kind: ModalKind, direction: i32) {
    let (field, count) = match kind {
        ModalKind::ImageUpload => (&mut app.image_form.field, crate::app::ImageForm::FIELDS),
        ModalKind::AddDiscourse => (
            &mut app.discourse_form.field,
            crate::app::DiscourseForm::FIELDS,
        ),
        ModalKind::Join => (&mut app.join_form.field, crate::app::JoinForm::FIELDS),
    };
    *field = if direction > 0 {
        (*field + 1) % count
    } else {
        (*field + count - 1) % count
    };
}

/// The mutable string under the field cursor, or `None` for picker fields.
fn active_field_mut(app: &mut App, kind: ModalKind) -> Option<&mut String> {
    match kind {
        ModalKind::ImageUpload => match app.image_form.field {
            0 => Some(&mut app.image_form.filename),
            1 => Some(&mut app.image_form.file_path),
            _ => None,
        },
        ModalKind::AddDiscourse => match app.discourse_form.field {
            0 => Some(&mut app.discourse_form.title),
            1 => Some(&mut app.discourse_form.body),
            _ => None, // picker field
        },
        ModalKind::Join => match app.join_form.field {
            0 => Some(&mut app.join_form.username),
            1 => Some(&mut app.join_form.email),
            2 => Some(&mut app.join_form.first_name),
            3 => Some(&mut app.join_form.last_name),
            4 => Some(&mut app.join_form.organization),
            5 => Some(&mut app.join_form.website),
            6 => Some(&mut app.join_form.password),
            _ => None,
        },
    }
}

/// Validate and submit. Validation messages mirror what the backend would
/// answer for the same omission, so the modal reads the same either way.
fn submit_form(app: &mut App, kind: ModalKind, event_tx: &mpsc::Sender<AppEvent>) {
    match kind {
        ModalKind::ImageUpload => {
            if app.image_form.filename.trim().is_empty() {
                app.image_form.status = FormStatus::Error("Filename is required".to_string());
            } else if app.image_form.file_path.trim().is_empty() {
                app.image_form.status = FormStatus::Error("No selected file".to_string());
            } else {
                spawn_image_upload(app, event_tx);
            }
        }
        ModalKind::AddDiscourse => {
            if app.discourse_form.title.trim().is_empty()
                || app.discourse_form.body.trim().is_empty()
            {
                app.discourse_form.status =
                    FormStatus::Error("Title and Body are required".to_string());
            } else {
                spawn_discourse_save(app, event_tx);
            }
        }
        ModalKind::Join => {
            if app.join_form.username.trim().is_empty()
                || app.join_form.email.trim().is_empty()
                || app.join_form.password.is_empty()
            {
                app.join_form.status =
                    FormStatus::Error("Username, email, and password are required".to_string());
            } else {
                spawn_join(app, event_tx);
            }
        }
    }
}

/// Keys while the admin dropdown is open. Any key that is not part of the
/// menu interaction closes it, like a click landing outside the menu.
fn handle_dropdown_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('j') | KeyCode::Down => {
            let max = crate::app::DROPDOWN_ITEMS.len() - 1;
            app.dropdown_selected = app.dropdown_selected.saturating_add(1).min(max);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.dropdown_selected = app.dropdown_selected.saturating_sub(1);
        }
        KeyCode::Enter => {
            let selected = app.dropdown_selected;
            app.close_dropdown();
            match selected {
                0 => {
                    let url = app.api.editor_url();
                    open_in_browser(app, &url);
                }
                1 => app.open_modal(ModalKind::ImageUpload),
                2 => open_add_discourse(app, event_tx),
                3 => app.open_modal(ModalKind::Join),
                _ => {}
            }
        }
        _ => app.close_dropdown(),
    }
}

/// Open the add-discourse modal, fetching picker options from the editor
/// endpoint when the catalog could not provide any.
fn open_add_discourse(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    app.open_modal(ModalKind::AddDiscourse);
    if app.discourse_form_needs_options() {
        if let Some(category_id) = app.active_category {
            spawn_subcategory_options(app, category_id, event_tx);
        }
    }
}

/// Keys for the navigation panels.
fn handle_panel_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('a') => app.toggle_dropdown(),
        KeyCode::Char('u') => app.open_modal(ModalKind::ImageUpload),
        KeyCode::Char('n') => open_add_discourse(app, event_tx),
        KeyCode::Char('J') => app.open_modal(ModalKind::Join),
        KeyCode::Char('e') => {
            let url = app.api.editor_url();
            open_in_browser(app, &url);
        }
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Tab => cycle_focus(app, 1),
        KeyCode::BackTab => cycle_focus(app, -1),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            match app.activate_selected() {
                Some(DiscourseResolution::Fetch(id)) => {
                    spawn_discourse_load(&app.api, id, event_tx);
                }
                Some(DiscourseResolution::Redirect(url)) => open_in_browser(app, &url),
                Some(DiscourseResolution::Rendered) | None => {}
            }
            app.clamp_selections();
        }
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => match app.focus {
            Focus::Discourses => app.close_panel(Panel::Discourses),
            Focus::Subcategories => app.close_panel(Panel::Subcategories),
            Focus::Categories => {}
        },
        _ => {}
    }
    Ok(Action::Continue)
}

/// Cycle focus across the currently visible panels.
fn cycle_focus(app: &mut App, direction: i32) {
    let order: &[Focus] = match app.state {
        PanelState::Collapsed => &[Focus::Categories],
        PanelState::CategorySelected => &[Focus::Categories, Focus::Subcategories],
        PanelState::SubcategorySelected => {
            &[Focus::Categories, Focus::Subcategories, Focus::Discourses]
        }
    };
    let current = order.iter().position(|f| *f == app.focus).unwrap_or(0);
    let len = order.len();
    let next = if direction > 0 {
        (current + 1) % len
    } else {
        (current + len - 1) % len
    };
    app.focus = order[next];
}
