//! Terminal client for a discourse content site.
//!
//! Browses a category → subcategory → discourse catalog in three cascading
//! panels, reads discourses in place, and submits the site's forms (image
//! upload, discourse creation, registration) to the backend API.

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod ui;
pub mod util;
