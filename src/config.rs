//! Configuration file parser for ~/.config/dialogues/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde, though we log a warning when
//! the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the discourse backend.
    pub server_url: String,

    /// Whether the reader pane is part of this layout. With the reader
    /// unbound, opening a discourse opens the full page in the browser.
    pub reader_enabled: bool,

    /// Whether the featured-image region is bound.
    pub show_images: bool,

    /// Whether the resource list region is bound.
    pub show_resources: bool,

    /// Whether the contribute-prompt region is bound.
    pub show_prompt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            reader_enabled: true,
            show_images: true,
            show_resources: true,
            show_prompt: true,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "server_url",
        "reader_enabled",
        "show_images",
        "show_resources",
        "show_prompt",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as a warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to warn about probable typos
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown config key (possible typo)");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:5000");
        assert!(config.reader_enabled);
        assert!(config.show_images);
        assert!(config.show_resources);
        assert!(config.show_prompt);
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str("server_url = \"https://example.org\"").unwrap();
        assert_eq!(config.server_url, "https://example.org");
        assert!(config.reader_enabled); // default preserved
    }

    #[test]
    fn test_binding_toggles_parse() {
        let config: Config =
            toml::from_str("reader_enabled = false\nshow_resources = false").unwrap();
        assert!(!config.reader_enabled);
        assert!(!config.show_resources);
        assert!(config.show_images);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.server_url, Config::default().server_url);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result: Result<Config, ConfigError> =
            toml::from_str("server_url = [broken").map_err(Into::into);
        assert!(result.is_err());
    }
}
