//! Output formatting for the CLI.
//!
//! Two output modes:
//! - **JSON**: compact machine-readable output (default)
//! - **Pretty**: human-readable output (enabled via `--pretty`)
//!
//! JSON output serializes the models directly, so it carries the same
//! camelCase field names as the stored state blob.

use crate::html;
use crate::models::{Category, Page, SearchResult};
use serde::Serialize;

/// Output mode for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Compact JSON output.
    Json,
    /// Human-readable formatted output.
    Pretty,
}

/// Serialize a value to compact JSON and print to stdout.
///
/// # Panics
///
/// Panics if serialization fails, which only happens with a broken
/// `Serialize` implementation.
pub fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string(value).expect("failed to serialize to JSON");
    println!("{}", json);
}

/// Print a category in human-readable format.
///
/// ```text
/// Category: Guides (guides)
/// ID:       1
/// Order:    0
/// Icon:     BookOpen #22c55e
/// Created:  2024-01-15T10:30:00.000Z
/// Desc:     Step-by-step guides and tutorials
/// ```
pub fn print_pretty_category(category: &Category) {
    println!("Category: {} ({})", category.name, category.slug);
    println!("ID:       {}", category.id);
    println!("Order:    {}", category.order);
    println!("Icon:     {} {}", category.icon, category.icon_color);
    println!("Created:  {}", category.created_at);
    if !category.description.is_empty() {
        println!("Desc:     {}", category.description);
    }
}

/// One line per category: `<order>. <name> (<slug>) [<id>]`.
pub fn print_pretty_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("(no categories)");
        return;
    }

    for c in categories {
        println!("{}. {} ({}) [{}]", c.order, c.name, c.slug, c.id);
    }
}

/// Print a page with its content rendered as plain text.
pub fn print_pretty_page(page: &Page) {
    println!("Title:    {}", page.title);
    println!("ID:       {}", page.id);
    println!("Slug:     {}", page.slug);
    println!("Category: {}", page.category);
    println!("Order:    {}", page.order);

    if page.tags.is_empty() {
        println!("Tags:     (none)");
    } else {
        println!("Tags:     {}", page.tags.join(", "));
    }

    println!("Icon:     {} {}", page.icon, page.icon_color);
    println!("Created:  {}", page.created_at);
    println!("Updated:  {}", page.updated_at);
    if !page.description.is_empty() {
        println!("Desc:     {}", page.description);
    }
    println!();
    println!("{}", html::to_plain_text(&page.content));
}

/// One line per page: `<id> | <category> | <order> | <title>`.
pub fn print_pretty_pages(pages: &[Page]) {
    if pages.is_empty() {
        println!("(no pages)");
        return;
    }

    for page in pages {
        println!("{} | {} | {} | {}", page.id, page.category, page.order, page.title);
    }
}

/// Print search results with their excerpt, or a short content preview when
/// the match was in the title or metadata.
pub fn print_pretty_search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("(no results)");
        return;
    }

    for (i, result) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }

        println!("Title:    {}", result.page.title);
        println!("ID:       {}", result.page.id);
        println!("Category: {}", result.page.category);

        if !result.page.tags.is_empty() {
            println!("Tags:     {}", result.page.tags.join(", "));
        }

        if !result.excerpt.is_empty() {
            println!("Match:    {}", result.excerpt);
        } else {
            println!("Preview:  {}", preview(&html::to_plain_text(&result.page.content), 200));
        }
    }
}

/// Pages whose category no longer exists.
pub fn print_pretty_dangling(pages: &[Page]) {
    if pages.is_empty() {
        println!("All pages reference an existing category.");
        return;
    }

    println!("Pages referencing a missing category:");
    for page in pages {
        println!("  {} | {} -> {}", page.id, page.title, page.category);
    }
}

/// First `max_chars` characters of `text` on one line, with an ellipsis when
/// cut short.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max_chars {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

/// Output dispatcher: JSON serialization or the given pretty printer.
pub fn print<T: Serialize>(mode: OutputMode, value: &T, pretty_fn: impl FnOnce()) {
    match mode {
        OutputMode::Json => print_json(value),
        OutputMode::Pretty => pretty_fn(),
    }
}
