//! Shared helpers for the UI layer: spawning API tasks that report back
//! over the event channel.
//!
//! Every spawned task is wrapped in [`catch_task_panic`] so a panic inside
//! it surfaces as an [`AppEvent::TaskPanicked`] instead of vanishing into
//! the runtime.

use crate::api::{ApiClient, DiscourseDraft, JoinRequest};
use crate::app::{App, AppEvent, FormStatus, ModalKind};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
    if tx.send(event).await.is_err() {
        tracing::warn!("Event receiver dropped, discarding task result");
    }
}

/// Spawn a discourse fetch. No cancellation and no generation counter:
/// overlapping fetches race and the last one to resolve wins the display.
pub(super) fn spawn_discourse_load(api: &ApiClient, id: String, tx: &mpsc::Sender<AppEvent>) {
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let task = api.get_discourse(&id);
        match catch_task_panic(task).await {
            Ok(result) => send_event(&tx, AppEvent::DiscourseLoaded { id, result }).await,
            Err(error) => {
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "discourse_load",
                        error,
                    },
                )
                .await
            }
        }
    });
}

/// Spawn the image upload for the current form state.
pub(super) fn spawn_image_upload(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.image_form.status = FormStatus::Busy("Uploading...");
    let api = app.api.clone();
    let tx = tx.clone();
    let filename = app.image_form.filename.clone();
    let file_path = app.image_form.file_path.clone();
    tokio::spawn(async move {
        let task = async {
            let original_name = Path::new(&file_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| filename.clone());
            let bytes = tokio::fs::read(&file_path).await?;
            api.upload_image(&filename, &original_name, bytes).await
        };
        match catch_task_panic(task).await {
            Ok(result) => send_event(&tx, AppEvent::UploadFinished(result)).await,
            Err(error) => {
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "image_upload",
                        error,
                    },
                )
                .await
            }
        }
    });
}

/// Spawn the add-discourse submission for the current form state.
pub(super) fn spawn_discourse_save(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.discourse_form.status = FormStatus::Busy("Saving...");
    let api = app.api.clone();
    let tx = tx.clone();
    let draft = DiscourseDraft {
        title: app.discourse_form.title.clone(),
        body: app.discourse_form.body.clone(),
        subcategory_id: app
            .discourse_form
            .options
            .get(app.discourse_form.selected_option)
            .map(|(id, _)| *id),
    };
    tokio::spawn(async move {
        let task = api.add_discourse(&draft);
        match catch_task_panic(task).await {
            Ok(result) => send_event(&tx, AppEvent::DiscourseSaved(result)).await,
            Err(error) => {
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "discourse_save",
                        error,
                    },
                )
                .await
            }
        }
    });
}

/// Spawn the registration submission for the current form state.
pub(super) fn spawn_join(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.join_form.status = FormStatus::Busy("Saving...");
    let api = app.api.clone();
    let tx = tx.clone();
    let non_empty = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };
    let request = JoinRequest {
        username: app.join_form.username.clone(),
        email: app.join_form.email.clone(),
        first_name: app.join_form.first_name.clone(),
        last_name: app.join_form.last_name.clone(),
        organization: non_empty(&app.join_form.organization),
        website: non_empty(&app.join_form.website),
        password: app.join_form.password_secret(),
    };
    tokio::spawn(async move {
        let task = api.join(&request);
        match catch_task_panic(task).await {
            Ok(result) => send_event(&tx, AppEvent::JoinFinished(result)).await,
            Err(error) => {
                send_event(&tx, AppEvent::TaskPanicked { task: "join", error }).await
            }
        }
    });
}

/// Fetch subcategory picker options from the editor endpoint when the
/// catalog had none for the add-discourse form.
pub(super) fn spawn_subcategory_options(
    app: &App,
    category_id: i64,
    tx: &mpsc::Sender<AppEvent>,
) {
    let api = app.api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let task = api.get_subcategories(category_id);
        match catch_task_panic(task).await {
            Ok(result) => {
                send_event(
                    &tx,
                    AppEvent::SubcategoriesLoaded {
                        category_id,
                        result,
                    },
                )
                .await
            }
            Err(error) => {
                send_event(
                    &tx,
                    AppEvent::TaskPanicked {
                        task: "subcategories",
                        error,
                    },
                )
                .await
            }
        }
    });
}

/// Open a URL in the system browser, reporting failures on the status line.
pub(super) fn open_in_browser(app: &mut App, url: &str) {
    match open::that(url) {
        Ok(()) => app.set_status("Opened in browser"),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to open browser");
            app.set_status("Failed to open browser");
        }
    }
}

/// True when the given modal's form is mid-submission.
pub(super) fn form_is_busy(app: &App, kind: ModalKind) -> bool {
    let status = match kind {
        ModalKind::ImageUpload => &app.image_form.status,
        ModalKind::AddDiscourse => &app.discourse_form.status,
        ModalKind::Join => &app.join_form.status,
    };
    matches!(status, FormStatus::Busy(_))
}
