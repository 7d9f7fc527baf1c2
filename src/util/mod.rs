//! Utility functions for common operations.
//!
//! - **URL validation**: checks the configured server URL before any
//!   request is made with it
//! - **Text processing**: Unicode-aware width calculation and truncation
//!   for the navigation panels

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::validate_server_url;
