//! Core data structures for the documentation store.
//!
//! These structs are the shared language between the store (serialized
//! blob), the CLI layer (clap), the output layer (serde_json) and the TUI.
//! Field names serialize in camelCase so a state blob written by the
//! browser application loads unchanged.

use serde::{Deserialize, Serialize};

/// A documentation page. `content` is an HTML string produced by the
/// editor; `category` is a weak reference to a category slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    /// Slug of the owning category. Not enforced; may dangle.
    pub category: String,
    pub tags: Vec<String>,
    pub icon: String,
    pub icon_color: String,
    pub content: String,
    /// Display position within the page's category.
    pub order: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A grouping of pages, referenced from pages by `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub icon_color: String,
    /// Display position among categories.
    pub order: i64,
    pub created_at: String,
}

/// The entire persisted document.
///
/// Collection order is storage order only; sort by `order` for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub pages: Vec<Page>,
    pub categories: Vec<Category>,
}

/// A search hit with a plain-text excerpt around the first content match.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub page: Page,
    /// Empty when the match was not in the content.
    pub excerpt: String,
}

/// Direction for moving a page or category one slot in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Parse from a CLI string. Returns None for anything but up/down.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current time as an ISO-8601 UTC timestamp with millisecond precision,
/// e.g. `2024-01-15T10:30:00.000Z`.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Derive a URL slug from a title: lowercase ASCII alphanumerics, with every
/// other run of characters collapsed into a single hyphen.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}
