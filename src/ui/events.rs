//! Application event handling.
//!
//! Processes completion events from spawned API tasks: discourse fetches,
//! form submissions, and picker option loads.

use crate::api::{ApiError, StatusEnvelope};
use crate::app::{App, AppEvent, FormStatus};
use tokio::time::Instant;

/// Apply one background event to the application state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::DiscourseLoaded { id, result } => {
            app.complete_discourse_load(&id, result);
        }
        AppEvent::UploadFinished(result) => {
            apply_form_result(result, &mut app.image_form.status);
        }
        AppEvent::DiscourseSaved(result) => {
            apply_form_result(result, &mut app.discourse_form.status);
        }
        AppEvent::JoinFinished(result) => {
            apply_form_result(result, &mut app.join_form.status);
        }
        AppEvent::SubcategoriesLoaded {
            category_id,
            result,
        } => match result {
            Ok(subs) => app.extend_discourse_form_options(category_id, subs),
            Err(err) => {
                tracing::warn!(category_id, error = %err, "Subcategory fetch failed");
                app.set_status("Could not load subcategories");
            }
        },
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

/// Resolve a form submission result into the form's status line.
///
/// The backend's own message is surfaced whenever one exists; transport
/// failures get the generic client-authored line.
fn apply_form_result(result: Result<StatusEnvelope, ApiError>, status: &mut FormStatus) {
    *status = match result {
        Ok(envelope) if envelope.is_success() => FormStatus::Success {
            message: envelope.message().to_string(),
            since: Instant::now(),
        },
        Ok(envelope) => FormStatus::Error(envelope.message().to_string()),
        Err(ApiError::Server(message)) => FormStatus::Error(message),
        Err(err) => {
            tracing::warn!(error = %err, "Form submission failed");
            FormStatus::Error("A network error occurred.".to_string())
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_starts_close_countdown() {
        let mut status = FormStatus::Busy("Saving...");
        apply_form_result(
            Ok(StatusEnvelope {
                status: "success".to_string(),
                message: Some("Discourse added successfully. Please refresh.".to_string()),
            }),
            &mut status,
        );
        assert!(matches!(status, FormStatus::Success { .. }));
    }

    #[test]
    fn test_error_envelope_surfaces_backend_message() {
        let mut status = FormStatus::Busy("Uploading...");
        apply_form_result(
            Ok(StatusEnvelope {
                status: "error".to_string(),
                message: Some("Filename is required".to_string()),
            }),
            &mut status,
        );
        assert_eq!(
            status,
            FormStatus::Error("Filename is required".to_string())
        );
    }

    #[test]
    fn test_transport_failure_uses_generic_message() {
        let mut status = FormStatus::Busy("Saving...");
        apply_form_result(Err(ApiError::HttpStatus(502)), &mut status);
        assert_eq!(
            status,
            FormStatus::Error("A network error occurred.".to_string())
        );
    }
}
