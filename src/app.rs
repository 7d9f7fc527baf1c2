use crate::api::{ApiClient, ApiError, StatusEnvelope};
use crate::catalog::{Catalog, ContentSummary, Discourse, Subcategory};
use crate::config::Config;
use lru::LruCache;
use secrecy::SecretString;
use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;

/// How long a success message stays on screen before the modal closes
/// itself and the form resets.
pub const MODAL_CLOSE_DELAY: Duration = Duration::from_secs(2);

/// Capacity of the fetched-discourse cache.
const DISCOURSE_CACHE_CAPACITY: usize = 64;

// ============================================================================
// View Bindings
// ============================================================================

/// Which optional reader regions this session binds.
///
/// Bound once at startup from config; renderer methods no-op on absent
/// regions instead of re-checking presence in every handler. With the reader
/// pane itself unbound, opening a discourse falls back to the browser
/// redirect convention.
#[derive(Debug, Clone, Copy)]
pub struct ViewBindings {
    pub reader: bool,
    pub image: bool,
    pub resources: bool,
    pub prompt: bool,
}

impl Default for ViewBindings {
    fn default() -> Self {
        Self {
            reader: true,
            image: true,
            resources: true,
            prompt: true,
        }
    }
}

impl ViewBindings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            reader: config.reader_enabled,
            image: config.show_images,
            resources: config.show_resources,
            prompt: config.show_prompt,
        }
    }
}

// ============================================================================
// Panel State Machine
// ============================================================================

/// Cascade state of the navigation panels.
///
/// `Collapsed` shows only the category panel; each deeper state reveals one
/// more panel. A visible subcategory panel always implies a selected category
/// with at least one subcategory, and a visible discourse panel a selected
/// subcategory with at least one discourse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Collapsed,
    CategorySelected,
    SubcategorySelected,
}

/// Which navigation panel has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Subcategories,
    Discourses,
}

/// Closable panels. The category panel is part of the base layout and
/// never closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Subcategories,
    Discourses,
}

/// What the reader pane currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// Nothing selected yet: the fixed placeholder.
    Idle,
    /// A discourse, which may be a synthetic error/placeholder item.
    Shown(Discourse),
}

/// Outcome of a discourse selection, for the caller to act on.
#[derive(Debug, PartialEq)]
pub enum DiscourseResolution {
    /// Already rendered from the in-memory cache.
    Rendered,
    /// Caller must spawn a fetch for this id.
    Fetch(String),
    /// No reader region is bound; open this URL in the browser.
    Redirect(String),
}

// ============================================================================
// Overlay State
// ============================================================================

/// The three form modals. Each modal and its backdrop overlay toggle
/// together off this one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    ImageUpload,
    AddDiscourse,
    Join,
}

/// Entries of the admin dropdown menu.
pub const DROPDOWN_ITEMS: &[&str] = &["Open editor", "Upload image", "Add discourse", "Join"];

/// Submission state shared by all three forms.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    /// Request in flight; the label is shown in the modal status line.
    Busy(&'static str),
    /// Backend accepted the submission. The modal closes once
    /// [`MODAL_CLOSE_DELAY`] has elapsed since `since`.
    Success { message: String, since: Instant },
    Error(String),
}

impl FormStatus {
    pub fn line(&self) -> Cow<'_, str> {
        match self {
            FormStatus::Idle => Cow::Borrowed(""),
            FormStatus::Busy(label) => Cow::Borrowed(label),
            FormStatus::Success { message, .. } => Cow::Borrowed(message.as_str()),
            FormStatus::Error(message) => Cow::Owned(format!("Error: {}", message)),
        }
    }
}

/// Image upload form: target filename plus local file path.
#[derive(Debug, Default)]
pub struct ImageForm {
    pub filename: String,
    pub file_path: String,
    pub field: usize,
    pub status: FormStatus,
}

impl ImageForm {
    pub const FIELDS: usize = 2;

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Add-discourse form: title, body, and a subcategory picker.
#[derive(Debug, Default)]
pub struct DiscourseForm {
    pub title: String,
    pub body: String,
    /// Picker options as (subcategory id, display label).
    pub options: Vec<(i64, String)>,
    pub selected_option: usize,
    pub field: usize,
    pub status: FormStatus,
}

impl DiscourseForm {
    pub const FIELDS: usize = 3;

    /// Reset the typed fields but keep the picker options; they come from
    /// the catalog and stay valid across submissions.
    pub fn reset(&mut self) {
        let options = std::mem::take(&mut self.options);
        *self = Self {
            options,
            ..Self::default()
        };
    }
}

/// Registration form. The password is typed in the clear like any field but
/// is masked in Debug output and wrapped in a secret before it leaves the
/// process.
#[derive(Default)]
pub struct JoinForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organization: String,
    pub website: String,
    pub password: String,
    pub field: usize,
    pub status: FormStatus,
}

impl JoinForm {
    pub const FIELDS: usize = 7;

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn password_secret(&self) -> SecretString {
        SecretString::from(self.password.as_str())
    }
}

impl std::fmt::Debug for JoinForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("organization", &self.organization)
            .field("website", &self.website)
            .field("password", &"[REDACTED]")
            .field("status", &self.status)
            .finish()
    }
}

// ============================================================================
// Events
// ============================================================================

/// Events from spawned API tasks.
pub enum AppEvent {
    /// A discourse fetch resolved. There is no generation counter on
    /// purpose: concurrent fetches race and the last response to resolve
    /// wins the display.
    DiscourseLoaded {
        id: String,
        result: Result<Discourse, ApiError>,
    },
    UploadFinished(Result<StatusEnvelope, ApiError>),
    DiscourseSaved(Result<StatusEnvelope, ApiError>),
    JoinFinished(Result<StatusEnvelope, ApiError>),
    /// Subcategory picker options fetched for the add-discourse form.
    SubcategoriesLoaded {
        category_id: i64,
        result: Result<Vec<Subcategory>, ApiError>,
    },
    /// A spawned task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    /// Read-only navigation context. Supplied at construction, never mutated.
    pub catalog: Catalog,
    pub api: ApiClient,
    pub bindings: ViewBindings,

    // Panel cascade
    pub state: PanelState,
    pub focus: Focus,
    pub selected_category: usize,
    pub selected_subcategory: usize,
    pub selected_discourse: usize,
    /// Contents of the subcategory panel (populated on category selection).
    pub subcategories: Vec<Subcategory>,
    /// Contents of the discourse panel, newest first.
    pub discourses: Vec<ContentSummary>,
    pub active_category: Option<i64>,
    pub active_subcategory: Option<i64>,
    pub active_discourse: Option<String>,

    // Reader
    pub display: DisplayState,
    /// Outstanding discourse fetches. Drives the loading indicator; the UI
    /// keeps accepting input while this is non-zero.
    pub loads_in_flight: usize,
    discourse_cache: LruCache<String, Discourse>,

    // Overlays
    pub dropdown_open: bool,
    pub dropdown_selected: usize,
    pub modal: Option<ModalKind>,
    pub image_form: ImageForm,
    pub discourse_form: DiscourseForm,
    pub join_form: JoinForm,

    // Status line with expiry
    pub status_message: Option<(Cow<'static, str>, Instant)>,

    pub needs_redraw: bool,
    pub spinner_frame: usize,
    pub show_help: bool,
}

impl App {
    pub fn new(catalog: Catalog, api: ApiClient, bindings: ViewBindings) -> Self {
        let cache_capacity =
            NonZeroUsize::new(DISCOURSE_CACHE_CAPACITY).expect("capacity is non-zero");
        Self {
            catalog,
            api,
            bindings,
            state: PanelState::Collapsed,
            focus: Focus::Categories,
            selected_category: 0,
            selected_subcategory: 0,
            selected_discourse: 0,
            subcategories: Vec::new(),
            discourses: Vec::new(),
            active_category: None,
            active_subcategory: None,
            active_discourse: None,
            display: DisplayState::Idle,
            loads_in_flight: 0,
            discourse_cache: LruCache::new(cache_capacity),
            dropdown_open: false,
            dropdown_selected: 0,
            modal: None,
            image_form: ImageForm::default(),
            discourse_form: DiscourseForm::default(),
            join_form: JoinForm::default(),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            show_help: false,
        }
    }

    // ------------------------------------------------------------------
    // Panel controller
    // ------------------------------------------------------------------

    /// Select a category by id.
    ///
    /// A category with at least one subcategory opens the subcategory panel
    /// and enters `CategorySelected`. A childless category leaves the deeper
    /// panels hidden and the machine in `Collapsed`.
    pub fn select_category(&mut self, id: i64) {
        // Close everything first for a clean cascade.
        self.close_all_panels();

        let Some(category) = self.catalog.category(id) else {
            tracing::warn!(category_id = id, "Selected category not in catalog");
            return;
        };

        if category.subcategories.is_empty() {
            return;
        }

        self.subcategories = category.subcategories.clone();
        self.active_category = Some(id);
        self.selected_subcategory = 0;
        self.state = PanelState::CategorySelected;
        self.focus = Focus::Subcategories;
    }

    /// Select a subcategory by id.
    ///
    /// With at least one discourse the discourse panel opens (titles newest
    /// first) and the machine enters `SubcategorySelected`. With none, the
    /// panel stays hidden and the reader shows the "no content yet"
    /// placeholder; the state does not change.
    pub fn select_subcategory(&mut self, id: i64) {
        // Hide the discourse panel before repopulating.
        self.discourses.clear();
        self.active_discourse = None;
        if self.state == PanelState::SubcategorySelected {
            self.state = PanelState::CategorySelected;
        }

        let entries: Vec<ContentSummary> = self
            .catalog
            .discourses_in(id)
            .into_iter()
            .cloned()
            .collect();

        if entries.is_empty() {
            let name = self
                .catalog
                .subcategory_name(id)
                .unwrap_or("this topic")
                .to_string();
            self.display = DisplayState::Shown(Discourse::empty_subcategory(&name));
            return;
        }

        self.discourses = entries;
        self.active_subcategory = Some(id);
        self.selected_discourse = 0;
        self.state = PanelState::SubcategorySelected;
        self.focus = Focus::Discourses;
    }

    /// Select a discourse by id, resolving it from the cache when possible.
    ///
    /// The panel state stays `SubcategorySelected`; only the reader changes.
    pub fn select_discourse(&mut self, id: &str) -> DiscourseResolution {
        self.active_discourse = Some(id.to_string());

        if !self.bindings.reader {
            // No in-place content region on this layout: hand off to the
            // full page instead.
            return DiscourseResolution::Redirect(self.api.dialogues_url(id));
        }

        if let Some(cached) = self.discourse_cache.get(id) {
            self.display = DisplayState::Shown(cached.clone());
            return DiscourseResolution::Rendered;
        }

        self.loads_in_flight += 1;
        DiscourseResolution::Fetch(id.to_string())
    }

    /// Apply the result of a discourse fetch. The last response to resolve
    /// wins the display.
    pub fn complete_discourse_load(&mut self, id: &str, result: Result<Discourse, ApiError>) {
        self.loads_in_flight = self.loads_in_flight.saturating_sub(1);
        match result {
            Ok(discourse) => {
                self.discourse_cache.put(id.to_string(), discourse.clone());
                self.display = DisplayState::Shown(discourse);
            }
            Err(err) => {
                tracing::warn!(discourse_id = id, error = %err, "Discourse fetch failed");
                self.display = DisplayState::Shown(crate::api::failure_discourse(&err));
            }
        }
    }

    /// Close a panel. Closing the subcategory panel cascade-closes the
    /// discourse panel and deactivates the originating category link,
    /// returning to `Collapsed`.
    pub fn close_panel(&mut self, which: Panel) {
        match which {
            Panel::Subcategories => self.close_all_panels(),
            Panel::Discourses => {
                self.discourses.clear();
                self.active_discourse = None;
                if self.state == PanelState::SubcategorySelected {
                    self.state = PanelState::CategorySelected;
                    self.focus = Focus::Subcategories;
                }
            }
        }
    }

    fn close_all_panels(&mut self) {
        self.subcategories.clear();
        self.discourses.clear();
        self.active_category = None;
        self.active_subcategory = None;
        self.active_discourse = None;
        self.state = PanelState::Collapsed;
        self.focus = Focus::Categories;
    }

    /// The discourse currently in the reader, if any.
    pub fn displayed(&self) -> Option<&Discourse> {
        match &self.display {
            DisplayState::Idle => None,
            DisplayState::Shown(d) => Some(d),
        }
    }

    // ------------------------------------------------------------------
    // Navigation cursors
    // ------------------------------------------------------------------

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Categories => {
                self.selected_category = self.selected_category.saturating_sub(1);
            }
            Focus::Subcategories => {
                self.selected_subcategory = self.selected_subcategory.saturating_sub(1);
            }
            Focus::Discourses => {
                self.selected_discourse = self.selected_discourse.saturating_sub(1);
            }
        }
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Categories => {
                if !self.catalog.categories.is_empty() {
                    let max = self.catalog.categories.len() - 1;
                    self.selected_category = self.selected_category.saturating_add(1).min(max);
                }
            }
            Focus::Subcategories => {
                if !self.subcategories.is_empty() {
                    let max = self.subcategories.len() - 1;
                    self.selected_subcategory =
                        self.selected_subcategory.saturating_add(1).min(max);
                }
            }
            Focus::Discourses => {
                if !self.discourses.is_empty() {
                    let max = self.discourses.len() - 1;
                    self.selected_discourse = self.selected_discourse.saturating_add(1).min(max);
                }
            }
        }
    }

    /// Clamp all selection cursors to valid ranges. Call after any operation
    /// that repopulates a panel.
    pub fn clamp_selections(&mut self) {
        let clamp = |idx: usize, len: usize| if len == 0 { 0 } else { idx.min(len - 1) };
        self.selected_category = clamp(self.selected_category, self.catalog.categories.len());
        self.selected_subcategory = clamp(self.selected_subcategory, self.subcategories.len());
        self.selected_discourse = clamp(self.selected_discourse, self.discourses.len());
    }

    /// Activate the item under the cursor in the focused panel.
    ///
    /// Returns a resolution only when a discourse was selected; category and
    /// subcategory activation is internal.
    pub fn activate_selected(&mut self) -> Option<DiscourseResolution> {
        match self.focus {
            Focus::Categories => {
                let id = self.catalog.categories.get(self.selected_category)?.id;
                self.select_category(id);
                None
            }
            Focus::Subcategories => {
                let id = self.subcategories.get(self.selected_subcategory)?.id;
                self.select_subcategory(id);
                None
            }
            Focus::Discourses => {
                let id = self.discourses.get(self.selected_discourse)?.id.clone();
                Some(self.select_discourse(&id))
            }
        }
    }

    // ------------------------------------------------------------------
    // Overlay controller
    // ------------------------------------------------------------------

    /// Open a modal. Always forces the admin dropdown closed; the two
    /// overlays are mutually exclusive.
    pub fn open_modal(&mut self, kind: ModalKind) {
        self.dropdown_open = false;
        self.modal = Some(kind);
        if kind == ModalKind::AddDiscourse {
            self.populate_discourse_form_options();
        }
    }

    /// Close the open modal and its backdrop together.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    pub fn toggle_dropdown(&mut self) {
        self.dropdown_open = !self.dropdown_open;
        self.dropdown_selected = 0;
    }

    pub fn close_dropdown(&mut self) {
        self.dropdown_open = false;
    }

    /// Fill the add-discourse picker from the catalog, labelling options as
    /// `Category / Subcategory`.
    fn populate_discourse_form_options(&mut self) {
        if !self.discourse_form.options.is_empty() {
            return;
        }
        let mut options = Vec::new();
        for category in &self.catalog.categories {
            for sub in &category.subcategories {
                options.push((sub.id, format!("{} / {}", category.name, sub.name)));
            }
        }
        self.discourse_form.options = options;
        self.discourse_form.selected_option = 0;
    }

    /// True when the add-discourse picker still needs options from the
    /// editor endpoint.
    pub fn discourse_form_needs_options(&self) -> bool {
        self.modal == Some(ModalKind::AddDiscourse) && self.discourse_form.options.is_empty()
    }

    pub fn extend_discourse_form_options(&mut self, category_id: i64, subs: Vec<Subcategory>) {
        let label_prefix = self
            .catalog
            .category(category_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("Category {}", category_id));
        for sub in subs {
            self.discourse_form
                .options
                .push((sub.id, format!("{} / {}", label_prefix, sub.name)));
        }
    }

    /// Close the modal and reset its form once the success message has been
    /// on screen for [`MODAL_CLOSE_DELAY`]. Returns true when it fired.
    pub fn tick_forms(&mut self) -> bool {
        let Some(kind) = self.modal else {
            return false;
        };
        let status = match kind {
            ModalKind::ImageUpload => &self.image_form.status,
            ModalKind::AddDiscourse => &self.discourse_form.status,
            ModalKind::Join => &self.join_form.status,
        };
        let elapsed = match status {
            FormStatus::Success { since, .. } => since.elapsed() >= MODAL_CLOSE_DELAY,
            _ => false,
        };
        if !elapsed {
            return false;
        }
        match kind {
            ModalKind::ImageUpload => self.image_form.reset(),
            ModalKind::AddDiscourse => self.discourse_form.reset(),
            ModalKind::Join => self.join_form.reset(),
        }
        self.close_modal();
        true
    }

    // ------------------------------------------------------------------
    // Status line
    // ------------------------------------------------------------------

    /// Set status message (auto-expires after 3 seconds).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
