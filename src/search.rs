//! Text search and structured filtering over pages.
//!
//! Matching runs over a loaded `AppState`: the query is compared
//! case-insensitively with each page's title, description, tags and the
//! plain text of its HTML content. Category and tag filters narrow the
//! candidate set first.

use crate::db::DocsError;
use crate::html;
use crate::models::{AppState, SearchResult};
use crate::repo;
use crate::store::Store;

/// Parameters for searching pages.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Text query. If None (or blank), only the filters apply.
    pub query: Option<String>,
    /// Filter by category slug.
    pub category: Option<String>,
    /// Filter by tag (exact match).
    pub tag: Option<String>,
}

/// Up to 40 characters either side of the first match of `needle` (already
/// lowercased) in `text`. Empty when there is no match.
fn make_excerpt(text: &str, needle: &str) -> String {
    if needle.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = text.chars().collect();

    // Lowercasing can turn one char into several; `owner` maps each byte of
    // `lower` back to the index of the char in `text` it came from.
    let mut lower = String::with_capacity(text.len());
    let mut owner = Vec::with_capacity(text.len());
    for (index, c) in chars.iter().enumerate() {
        for lc in c.to_lowercase() {
            lower.push(lc);
            owner.resize(lower.len(), index);
        }
    }
    let Some(pos) = lower.find(needle) else {
        return String::new();
    };
    let match_start = owner[pos];
    let match_end = owner[pos + needle.len() - 1] + 1;

    let start = match_start.saturating_sub(40);
    let end = (match_end + 40).min(chars.len());

    let mut excerpt = String::new();
    if start > 0 {
        excerpt.push_str("...");
    }
    let window: String = chars[start..end].iter().collect();
    excerpt.push_str(&window.replace('\n', " "));
    if end < chars.len() {
        excerpt.push_str("...");
    }
    excerpt
}

/// Search pages in the stored state.
pub fn search_pages(store: &Store, params: &SearchParams) -> Result<Vec<SearchResult>, DocsError> {
    let state = store.load()?;
    Ok(search_state(&state, params))
}

/// Search an already-loaded state.
///
/// Without a query every page passing the filters is returned in display
/// order with an empty excerpt. With a query, pages whose title matches
/// come first; within each group display order is kept.
pub fn search_state(state: &AppState, params: &SearchParams) -> Vec<SearchResult> {
    let needle = params
        .query
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let candidates = repo::sorted_pages(state, params.category.as_deref())
        .into_iter()
        .filter(|p| params.tag.as_ref().map_or(true, |t| p.tags.contains(t)));

    let Some(needle) = needle else {
        return candidates
            .map(|page| SearchResult {
                page,
                excerpt: String::new(),
            })
            .collect();
    };

    let mut title_hits = Vec::new();
    let mut other_hits = Vec::new();
    for page in candidates {
        let text = html::to_plain_text(&page.content);
        let excerpt = make_excerpt(&text, &needle);
        let in_title = page.title.to_lowercase().contains(&needle);
        let in_meta = page.description.to_lowercase().contains(&needle)
            || page.tags.iter().any(|t| t.to_lowercase().contains(&needle));

        if in_title {
            title_hits.push(SearchResult { page, excerpt });
        } else if in_meta || !excerpt.is_empty() {
            other_hits.push(SearchResult { page, excerpt });
        }
    }

    tracing::debug!(
        query = %needle,
        hits = title_hits.len() + other_hits.len(),
        "search complete"
    );
    title_hits.extend(other_hits);
    title_hits
}
