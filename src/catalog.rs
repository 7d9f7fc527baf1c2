//! The navigation catalog: the read-only context object handed to the
//! application at construction.
//!
//! The backend injects two collections into every page it serves: a category
//! tree and a flat content index. This client receives the same data as a
//! JSON file (`catalog.json` in the config directory) and exposes it through
//! [`Catalog`]. The catalog is never mutated after load; selection state lives
//! in the application, not here.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Data Model
// ============================================================================

/// A top-level navigation category.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// A subcategory within a category. Discourses reference it by id.
#[derive(Debug, Clone, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub name: String,
}

/// One entry of the flat content index used to populate the discourse panel.
///
/// Only the columns the navigation needs; the full discourse is resolved
/// by id when the user opens it.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSummary {
    pub id: String,
    pub title: String,
    pub subcategory_id: i64,
    #[serde(default)]
    pub date_posted: Option<String>,
}

/// A full discourse as returned by the API or carried in the catalog file.
///
/// Every display field tolerates absence; the renderer degrades missing
/// fields to placeholder text instead of failing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Discourse {
    pub id: String,
    #[serde(default)]
    pub subcategory_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Raw markup. Inserted into the reader verbatim; the backend is the
    /// trust boundary, nothing is sanitized here.
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Discourse {
    /// Synthetic discourse for a server-reported failure. The backend's
    /// message becomes the body so the user sees what the server said.
    pub fn server_error(message: &str) -> Self {
        Self::synthetic("error", "Error", &format!("<p>{}</p>", message))
    }

    /// Synthetic discourse for a transport-level failure, deliberately
    /// distinct from [`Discourse::server_error`] in its title.
    pub fn network_error() -> Self {
        Self::synthetic(
            "network-error",
            "Network Error",
            "<p>Could not connect to the server to load content.</p>",
        )
    }

    /// Synthetic discourse shown when a subcategory has nothing published.
    pub fn empty_subcategory(subcategory_name: &str) -> Self {
        Self::synthetic(
            "empty",
            &format!("No Discourses in {}", subcategory_name),
            "<p>Content is being prepared for this topic. Please check back later.</p>",
        )
    }

    fn synthetic(id: &str, title: &str, body: &str) -> Self {
        Self {
            id: id.to_string(),
            subcategory_id: None,
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            date_posted: None,
            reference: None,
            featured_image_url: None,
            resources: Vec::new(),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Controlled vocabulary for resource kinds, with an escape hatch for values
/// this client does not know yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ResourceKind {
    Scripture,
    Link,
    Repository,
    Journal,
    AcademicPaper,
    Blog,
    Commentary,
    Tutorial,
    Lecture,
    Video,
    Other(String),
}

impl From<String> for ResourceKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Scripture" => Self::Scripture,
            "Link" => Self::Link,
            "Repository" => Self::Repository,
            "Journal" => Self::Journal,
            "Academic Paper" => Self::AcademicPaper,
            "Blog" => Self::Blog,
            "Commentary" => Self::Commentary,
            "Tutorial" => Self::Tutorial,
            "Lecture" => Self::Lecture,
            "Video" => Self::Video,
            _ => Self::Other(s),
        }
    }
}

impl ResourceKind {
    /// Display name, matching the wire value.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scripture => "Scripture",
            Self::Link => "Link",
            Self::Repository => "Repository",
            Self::Journal => "Journal",
            Self::AcademicPaper => "Academic Paper",
            Self::Blog => "Blog",
            Self::Commentary => "Commentary",
            Self::Tutorial => "Tutorial",
            Self::Lecture => "Lecture",
            Self::Video => "Video",
            Self::Other(s) => s,
        }
    }

    /// One-letter badge shown next to a resource: the first character of the
    /// kind name, upper-cased. `?` when the kind name is empty.
    pub fn badge(&self) -> char {
        self.as_str()
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

/// A citation or external reference attached to a discourse.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
}

// ============================================================================
// Date handling
// ============================================================================

/// Parse a `date_posted` string in either of the formats the backend emits:
/// ISO (`2024-06-01`) or long form (`June 01, 2024`).
///
/// Unparseable or missing dates sort after dated entries.
pub fn parse_date_posted(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%B %d, %Y"))
        .ok()
}

// ============================================================================
// Catalog
// ============================================================================

/// The read-only navigation context: category tree plus flat content index.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub content: Vec<ContentSummary>,
}

impl Catalog {
    /// Maximum catalog file size (4 MB). The index carries only ids and
    /// titles; anything larger is a corrupted or wrong file.
    const MAX_FILE_SIZE: u64 = 4 * 1_048_576;

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(CatalogError::TooLarge(format!(
                    "Catalog file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) => return Err(CatalogError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        tracing::debug!(
            categories = catalog.categories.len(),
            content = catalog.content.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Look up a category by id.
    pub fn category(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Look up a subcategory name across all categories.
    pub fn subcategory_name(&self, id: i64) -> Option<&str> {
        self.categories
            .iter()
            .flat_map(|c| c.subcategories.iter())
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }

    /// Content entries for a subcategory, newest first.
    ///
    /// Ordering key is `date_posted` descending; entries whose date is
    /// missing or unparseable sort last, in index order.
    pub fn discourses_in(&self, subcategory_id: i64) -> Vec<&ContentSummary> {
        let mut entries: Vec<&ContentSummary> = self
            .content
            .iter()
            .filter(|c| c.subcategory_id == subcategory_id)
            .collect();
        entries.sort_by(|a, b| {
            let da = a.date_posted.as_deref().and_then(parse_date_posted);
            let db = b.date_posted.as_deref().and_then(parse_date_posted);
            db.cmp(&da)
        });
        entries
    }

    /// Look up a content index entry by discourse id.
    pub fn summary(&self, id: &str) -> Option<&ContentSummary> {
        self.content.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn summary(id: &str, title: &str, sub: i64, date: Option<&str>) -> ContentSummary {
        ContentSummary {
            id: id.to_string(),
            title: title.to_string(),
            subcategory_id: sub,
            date_posted: date.map(str::to_string),
        }
    }

    fn test_catalog() -> Catalog {
        Catalog {
            categories: vec![Category {
                id: 1,
                name: "Faith".to_string(),
                subcategories: vec![Subcategory {
                    id: 10,
                    name: "Grace".to_string(),
                }],
            }],
            content: vec![
                summary("a", "Old", 10, Some("2024-01-01")),
                summary("b", "New", 10, Some("2024-06-01")),
            ],
        }
    }

    #[test]
    fn test_discourses_sorted_newest_first() {
        let catalog = test_catalog();
        let titles: Vec<&str> = catalog
            .discourses_in(10)
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["New", "Old"]);
    }

    #[test]
    fn test_undated_entries_sort_last() {
        let mut catalog = test_catalog();
        catalog.content.insert(0, summary("c", "Undated", 10, None));
        let titles: Vec<&str> = catalog
            .discourses_in(10)
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, ["New", "Old", "Undated"]);
    }

    #[test]
    fn test_long_form_dates_parse() {
        assert_eq!(
            parse_date_posted("June 01, 2024"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(
            parse_date_posted("2024-06-01"),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
        assert_eq!(parse_date_posted("soon"), None);
    }

    #[test]
    fn test_empty_subcategory_yields_no_entries() {
        let catalog = test_catalog();
        assert!(catalog.discourses_in(99).is_empty());
    }

    #[test]
    fn test_subcategory_name_lookup() {
        let catalog = test_catalog();
        assert_eq!(catalog.subcategory_name(10), Some("Grace"));
        assert_eq!(catalog.subcategory_name(11), None);
    }

    #[test]
    fn test_resource_kind_round_trip() {
        let kind = ResourceKind::from("Academic Paper".to_string());
        assert_eq!(kind, ResourceKind::AcademicPaper);
        assert_eq!(kind.as_str(), "Academic Paper");

        let other = ResourceKind::from("Podcast".to_string());
        assert_eq!(other, ResourceKind::Other("Podcast".to_string()));
        assert_eq!(other.as_str(), "Podcast");
    }

    #[test]
    fn test_badge_known_kinds() {
        assert_eq!(ResourceKind::Scripture.badge(), 'S');
        assert_eq!(ResourceKind::Link.badge(), 'L');
        assert_eq!(ResourceKind::AcademicPaper.badge(), 'A');
        assert_eq!(ResourceKind::Other(String::new()).badge(), '?');
    }

    #[test]
    fn test_discourse_envelope_shape_parses() {
        let json = r#"{
            "id": "disc-1",
            "title": "On Light",
            "body": "<p>Body</p>",
            "date_posted": "June 01, 2024",
            "reference": "DISC-2024-06-01",
            "resources": [
                {"type": "Scripture", "name": "Psalm 19:1", "link": "https://example.com/ps19"}
            ]
        }"#;
        let d: Discourse = serde_json::from_str(json).unwrap();
        assert_eq!(d.resources[0].kind, ResourceKind::Scripture);
        assert_eq!(d.resources[0].kind.badge(), 'S');
    }

    proptest! {
        // The badge is always the upper-cased first character of the kind
        // name, for any value the wire could carry.
        #[test]
        fn prop_badge_matches_first_char(kind in "[A-Za-z][A-Za-z ]{0,20}") {
            let expected = kind.chars().next().unwrap().to_ascii_uppercase();
            let parsed = ResourceKind::from(kind);
            prop_assert_eq!(parsed.badge(), expected);
        }
    }
}
