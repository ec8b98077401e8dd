//! Repository layer: CRUD and ordering over pages and categories.
//!
//! Plain functions that take the store as their first parameter. Every
//! mutation loads the whole state, changes one collection, and saves the
//! whole state back.

use crate::db::DocsError;
use crate::models::{now_timestamp, AppState, Category, Direction, Page};
use crate::store::Store;

// =============================================================================
// Pages
// =============================================================================

/// Inserts or replaces a page by id.
///
/// An existing record is overwritten by `page` with `updated_at` set to now;
/// nothing from the old record is kept. A new record gets both `created_at`
/// and `updated_at` set to now and is appended.
///
/// # Returns
/// The page as stored.
pub fn save_page(store: &Store, page: Page) -> Result<Page, DocsError> {
    let mut state = store.load()?;
    let now = now_timestamp();

    let stored = match state.pages.iter().position(|p| p.id == page.id) {
        Some(index) => {
            let updated = Page {
                updated_at: now,
                ..page
            };
            state.pages[index] = updated.clone();
            tracing::debug!(id = %updated.id, "page replaced");
            updated
        }
        None => {
            let created = Page {
                created_at: now.clone(),
                updated_at: now,
                ..page
            };
            state.pages.push(created.clone());
            tracing::debug!(id = %created.id, "page inserted");
            created
        }
    };

    store.save(&state)?;
    Ok(stored)
}

/// Removes every page with the given id. Absent ids are not an error.
///
/// # Returns
/// The number of pages removed.
pub fn delete_page(store: &Store, id: &str) -> Result<usize, DocsError> {
    let mut state = store.load()?;
    let before = state.pages.len();
    state.pages.retain(|p| p.id != id);
    let removed = before - state.pages.len();
    store.save(&state)?;
    Ok(removed)
}

/// Replaces the whole page collection with `pages`, in the given sequence.
/// Callers assign `order` values beforehand.
pub fn reorder_pages(store: &Store, pages: Vec<Page>) -> Result<(), DocsError> {
    let mut state = store.load()?;
    state.pages = pages;
    store.save(&state)
}

/// Retrieves a page by id.
///
/// # Errors
/// Returns `DocsError::NotFound` if no page has that id.
pub fn get_page(store: &Store, id: &str) -> Result<Page, DocsError> {
    store
        .load()?
        .pages
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| DocsError::NotFound(format!("Page with ID '{}' not found", id)))
}

/// Retrieves a page by slug.
pub fn get_page_by_slug(store: &Store, slug: &str) -> Result<Page, DocsError> {
    store
        .load()?
        .pages
        .into_iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| DocsError::NotFound(format!("Page with slug '{}' not found", slug)))
}

/// Lists pages in display order, optionally restricted to one category slug.
pub fn list_pages(store: &Store, category: Option<&str>) -> Result<Vec<Page>, DocsError> {
    let state = store.load()?;
    Ok(sorted_pages(&state, category))
}

/// Pages of `state` sorted by `order`, optionally filtered by category slug.
/// The sort is stable, so equal orders keep storage order.
pub fn sorted_pages(state: &AppState, category: Option<&str>) -> Vec<Page> {
    let mut pages: Vec<Page> = state
        .pages
        .iter()
        .filter(|p| category.map_or(true, |slug| p.category == slug))
        .cloned()
        .collect();
    pages.sort_by_key(|p| p.order);
    pages
}

/// Swaps a page with its neighbour inside its category and renumbers that
/// category's pages `0..n`. Moving past either end changes nothing.
///
/// # Returns
/// True if the page moved.
pub fn move_page(store: &Store, id: &str, direction: Direction) -> Result<bool, DocsError> {
    let state = store.load()?;
    let page = state
        .pages
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| DocsError::NotFound(format!("Page with ID '{}' not found", id)))?;

    let category = page.category.clone();

    let mut group = sorted_pages(&state, Some(&category));
    let Some(index) = group.iter().position(|p| p.id == id) else {
        return Ok(false);
    };
    if !swap_neighbour(&mut group, index, direction) {
        return Ok(false);
    }

    let mut renumbered = group.into_iter().enumerate().map(|(order, page)| Page {
        order: order as i64,
        ..page
    });
    // Pages of other categories keep their slot and order
    let pages: Vec<Page> = state
        .pages
        .into_iter()
        .filter_map(|page| {
            if page.category == category {
                renumbered.next()
            } else {
                Some(page)
            }
        })
        .collect();

    reorder_pages(store, pages)?;
    Ok(true)
}

// =============================================================================
// Categories
// =============================================================================

/// Inserts or replaces a category by id.
///
/// An existing record is replaced as given, including its `order`. A new
/// record ignores the supplied `order`: it gets one past the highest
/// existing order (0 for the first category) and `created_at` set to now.
///
/// # Returns
/// The category as stored.
pub fn save_category(store: &Store, category: Category) -> Result<Category, DocsError> {
    let mut state = store.load()?;

    let stored = match state.categories.iter().position(|c| c.id == category.id) {
        Some(index) => {
            state.categories[index] = category.clone();
            tracing::debug!(id = %category.id, "category replaced");
            category
        }
        None => {
            let next_order = state
                .categories
                .iter()
                .map(|c| c.order)
                .max()
                .map_or(0, |max| max + 1);
            let created = Category {
                order: next_order,
                created_at: now_timestamp(),
                ..category
            };
            state.categories.push(created.clone());
            tracing::debug!(id = %created.id, order = next_order, "category inserted");
            created
        }
    };

    store.save(&state)?;
    Ok(stored)
}

/// Removes every category with the given id.
///
/// Pages that referenced the removed category's slug are left untouched and
/// now dangle; a warning is logged with their count.
///
/// # Returns
/// The number of categories removed.
pub fn delete_category(store: &Store, id: &str) -> Result<usize, DocsError> {
    let mut state = store.load()?;
    let (removed, kept): (Vec<Category>, Vec<Category>) =
        state.categories.into_iter().partition(|c| c.id == id);
    state.categories = kept;
    store.save(&state)?;

    if !removed.is_empty() {
        // Only pages orphaned by this delete; earlier orphans are not counted
        let dangling = orphaned_by(&state, &removed);
        if dangling > 0 {
            tracing::warn!(
                category = id,
                pages = dangling,
                "category deleted; pages now reference a missing category"
            );
        }
    }
    Ok(removed.len())
}

/// Pages whose category was one of `removed` and matches no remaining
/// category.
fn orphaned_by(state: &AppState, removed: &[Category]) -> usize {
    state
        .pages
        .iter()
        .filter(|p| removed.iter().any(|c| c.slug == p.category))
        .filter(|p| !state.categories.iter().any(|c| c.slug == p.category))
        .count()
}

/// Replaces the whole category collection with `categories`, verbatim.
pub fn reorder_categories(store: &Store, categories: Vec<Category>) -> Result<(), DocsError> {
    let mut state = store.load()?;
    state.categories = categories;
    store.save(&state)
}

/// Retrieves a category by id, falling back to slug.
///
/// # Errors
/// Returns `DocsError::NotFound` if neither matches.
pub fn get_category(store: &Store, id_or_slug: &str) -> Result<Category, DocsError> {
    let categories = store.load()?.categories;
    categories
        .iter()
        .find(|c| c.id == id_or_slug)
        .or_else(|| categories.iter().find(|c| c.slug == id_or_slug))
        .cloned()
        .ok_or_else(|| DocsError::NotFound(format!("Category '{}' not found", id_or_slug)))
}

/// Lists categories in display order.
pub fn list_categories(store: &Store) -> Result<Vec<Category>, DocsError> {
    let state = store.load()?;
    Ok(sorted_categories(&state))
}

/// Categories of `state` sorted by `order` (stable).
pub fn sorted_categories(state: &AppState) -> Vec<Category> {
    let mut categories = state.categories.clone();
    categories.sort_by_key(|c| c.order);
    categories
}

/// Swaps a category with its neighbour in display order and renumbers all
/// categories `0..n`. Moving past either end changes nothing.
pub fn move_category(store: &Store, id: &str, direction: Direction) -> Result<bool, DocsError> {
    let state = store.load()?;
    let mut categories = sorted_categories(&state);
    let index = categories
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| DocsError::NotFound(format!("Category '{}' not found", id)))?;

    if !swap_neighbour(&mut categories, index, direction) {
        return Ok(false);
    }
    for (order, category) in categories.iter_mut().enumerate() {
        category.order = order as i64;
    }

    reorder_categories(store, categories)?;
    Ok(true)
}

// =============================================================================
// Integrity
// =============================================================================

/// Pages whose category slug matches no existing category.
pub fn dangling_pages(state: &AppState) -> Vec<&Page> {
    state
        .pages
        .iter()
        .filter(|p| !state.categories.iter().any(|c| c.slug == p.category))
        .collect()
}

fn swap_neighbour<T>(items: &mut [T], index: usize, direction: Direction) -> bool {
    match direction {
        Direction::Up if index > 0 => {
            items.swap(index, index - 1);
            true
        }
        Direction::Down if index + 1 < items.len() => {
            items.swap(index, index + 1);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn setup_store() -> Store {
        Store::new(Box::new(MemoryBackend::new()))
    }

    /// A store holding exactly the given state (no seed data).
    fn store_with(state: AppState) -> Store {
        let store = setup_store();
        store.save(&state).expect("save fixture state");
        store
    }

    fn page(id: &str, category: &str, order: i64) -> Page {
        Page {
            id: id.to_string(),
            title: format!("Page {}", id),
            slug: format!("page-{}", id),
            description: String::new(),
            category: category.to_string(),
            tags: vec![],
            icon: "FileText".to_string(),
            icon_color: "#3b82f6".to_string(),
            content: format!("<p>{}</p>", id),
            order,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn category(id: &str, slug: &str, order: i64) -> Category {
        Category {
            id: id.to_string(),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            description: String::new(),
            icon: "Folder".to_string(),
            icon_color: "#22c55e".to_string(),
            order,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    // ===== Pages =====

    #[test]
    fn test_save_new_page_appends_with_fresh_timestamps() {
        let store = setup_store();
        let before = store.load().expect("load").pages.len();

        let stored = save_page(&store, page("new", "guides", 5)).expect("save page");

        let state = store.load().expect("reload");
        assert_eq!(state.pages.len(), before + 1);
        assert_eq!(state.pages.last().expect("last page").id, "new");
        assert_ne!(stored.created_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(stored.created_at, stored.updated_at);
        // Page order is taken from the caller
        assert_eq!(stored.order, 5);
    }

    #[test]
    fn test_save_existing_page_replaces_in_place() {
        let store = store_with(AppState {
            pages: vec![page("a", "guides", 0), page("b", "guides", 1)],
            categories: vec![],
        });

        let mut edited = page("a", "api", 7);
        edited.title = "Edited".to_string();
        edited.tags = vec!["x".to_string()];
        let stored = save_page(&store, edited).expect("save page");

        let state = store.load().expect("reload");
        assert_eq!(state.pages.len(), 2);
        assert_eq!(state.pages[0].id, "a");
        assert_eq!(state.pages[0].title, "Edited");
        assert_eq!(state.pages[0].category, "api");
        assert_eq!(state.pages[0].order, 7);
        // created_at comes from the caller, updated_at is refreshed
        assert_eq!(stored.created_at, "2024-01-01T00:00:00.000Z");
        assert_ne!(stored.updated_at, "2024-01-01T00:00:00.000Z");
        assert_eq!(state.pages[0], stored);
    }

    #[test]
    fn test_delete_page() {
        let store = store_with(AppState {
            pages: vec![page("a", "guides", 0), page("b", "guides", 1)],
            categories: vec![],
        });

        let removed = delete_page(&store, "a").expect("delete");
        assert_eq!(removed, 1);

        let state = store.load().expect("reload");
        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.pages[0].id, "b");
    }

    #[test]
    fn test_delete_missing_page_is_noop() {
        let store = setup_store();
        let before = store.load().expect("load");

        let removed = delete_page(&store, "does-not-exist").expect("delete");
        assert_eq!(removed, 0);
        assert_eq!(store.load().expect("reload"), before);
    }

    #[test]
    fn test_delete_page_removes_duplicate_ids() {
        let store = store_with(AppState {
            pages: vec![page("a", "g", 0), page("a", "g", 1), page("b", "g", 2)],
            categories: vec![],
        });
        assert_eq!(delete_page(&store, "a").expect("delete"), 2);
        assert_eq!(store.load().expect("reload").pages.len(), 1);
    }

    #[test]
    fn test_reorder_pages_is_verbatim() {
        let p1 = page("1", "guides", 0);
        let p2 = page("2", "guides", 1);
        let store = store_with(AppState {
            pages: vec![p1.clone(), p2.clone()],
            categories: vec![],
        });

        reorder_pages(&store, vec![p2.clone(), p1.clone()]).expect("reorder");

        let state = store.load().expect("reload");
        assert_eq!(state.pages, vec![p2, p1]);
    }

    #[test]
    fn test_get_page_and_by_slug() {
        let store = setup_store();
        let seeded = get_page(&store, "1").expect("seeded page");
        assert_eq!(seeded.title, "Getting Started");

        let by_slug = get_page_by_slug(&store, "getting-started").expect("by slug");
        assert_eq!(by_slug.id, "1");

        assert!(matches!(get_page(&store, "nope"), Err(DocsError::NotFound(_))));
        assert!(matches!(
            get_page_by_slug(&store, "nope"),
            Err(DocsError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_pages_sorts_and_filters() {
        let store = store_with(AppState {
            pages: vec![
                page("c", "guides", 2),
                page("x", "api", 0),
                page("a", "guides", 0),
                page("b", "guides", 1),
            ],
            categories: vec![],
        });

        let guides: Vec<String> = list_pages(&store, Some("guides"))
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(guides, vec!["a", "b", "c"]);

        let all = list_pages(&store, None).expect("list all");
        assert_eq!(all.len(), 4);
        // Storage order is untouched
        assert_eq!(store.load().expect("reload").pages[0].id, "c");
    }

    #[test]
    fn test_move_page_within_category() {
        let store = store_with(AppState {
            pages: vec![
                page("a", "guides", 0),
                page("x", "api", 9),
                page("b", "guides", 1),
                page("c", "guides", 2),
            ],
            categories: vec![],
        });

        assert!(move_page(&store, "c", Direction::Up).expect("move"));

        let ids: Vec<String> = list_pages(&store, Some("guides"))
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a", "c", "b"]);

        // Other categories are untouched
        let api = get_page(&store, "x").expect("x");
        assert_eq!(api.order, 9);
        assert_eq!(store.load().expect("reload").pages.len(), 4);
    }

    #[test]
    fn test_move_page_renumbers_gaps() {
        let store = store_with(AppState {
            pages: vec![page("a", "g", 10), page("b", "g", 20), page("c", "g", 30)],
            categories: vec![],
        });

        assert!(move_page(&store, "a", Direction::Down).expect("move"));

        let orders: Vec<(String, i64)> = list_pages(&store, Some("g"))
            .expect("list")
            .into_iter()
            .map(|p| (p.id, p.order))
            .collect();
        assert_eq!(
            orders,
            vec![("b".to_string(), 0), ("a".to_string(), 1), ("c".to_string(), 2)]
        );
    }

    #[test]
    fn test_move_page_at_edge_is_noop() {
        let store = store_with(AppState {
            pages: vec![page("a", "g", 0), page("b", "g", 1)],
            categories: vec![],
        });
        let before = store.load().expect("load");

        assert!(!move_page(&store, "a", Direction::Up).expect("move"));
        assert!(!move_page(&store, "b", Direction::Down).expect("move"));
        assert_eq!(store.load().expect("reload"), before);
    }

    #[test]
    fn test_move_missing_page_is_not_found() {
        let store = setup_store();
        assert!(matches!(
            move_page(&store, "nope", Direction::Up),
            Err(DocsError::NotFound(_))
        ));
    }

    // ===== Categories =====

    #[test]
    fn test_new_category_order_is_max_plus_one() {
        let store = store_with(AppState {
            pages: vec![],
            categories: vec![category("a", "a", 3), category("b", "b", 7)],
        });

        let stored = save_category(&store, category("c", "c", 0)).expect("save");
        assert_eq!(stored.order, 8);
        assert_ne!(stored.created_at, "2024-01-01T00:00:00.000Z");

        let state = store.load().expect("reload");
        assert_eq!(state.categories.len(), 3);
        assert_eq!(state.categories[2].order, 8);
    }

    #[test]
    fn test_first_category_gets_order_zero() {
        let store = store_with(AppState::default());
        let stored = save_category(&store, category("only", "only", 42)).expect("save");
        assert_eq!(stored.order, 0);
    }

    #[test]
    fn test_new_category_after_seed() {
        let store = setup_store();
        let stored = save_category(&store, category("3", "tutorials", 99)).expect("save");
        // Seed categories have orders 0 and 1
        assert_eq!(stored.order, 2);
    }

    #[test]
    fn test_update_category_keeps_caller_order() {
        let store = store_with(AppState {
            pages: vec![],
            categories: vec![category("a", "a", 0), category("b", "b", 1)],
        });

        let mut edited = category("a", "a-renamed", 5);
        edited.created_at = "1999-01-01T00:00:00.000Z".to_string();
        let stored = save_category(&store, edited.clone()).expect("save");
        assert_eq!(stored, edited);

        let state = store.load().expect("reload");
        assert_eq!(state.categories.len(), 2);
        assert_eq!(state.categories[0], edited);
    }

    #[test]
    fn test_delete_category_leaves_dangling_pages() {
        let store = setup_store();
        let removed = delete_category(&store, "1").expect("delete guides");
        assert_eq!(removed, 1);

        let state = store.load().expect("reload");
        assert_eq!(state.categories.len(), 1);
        // The seeded page still points at "guides"
        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.pages[0].category, "guides");
        let dangling = dangling_pages(&state);
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].id, "1");
    }

    #[test]
    fn test_orphan_count_ignores_earlier_orphans() {
        let state = AppState {
            pages: vec![
                page("a", "ops", 0),
                page("b", "ops", 1),
                page("old", "gone", 0),
                page("c", "guides", 0),
            ],
            categories: vec![category("2", "guides", 0)],
        };
        let removed = vec![category("1", "ops", 1)];
        assert_eq!(orphaned_by(&state, &removed), 2);
        assert_eq!(dangling_pages(&state).len(), 3);

        // A remaining category with the same slug still owns the pages
        let shared = AppState {
            categories: vec![category("2", "guides", 0), category("3", "ops", 1)],
            ..state
        };
        assert_eq!(orphaned_by(&shared, &removed), 0);
    }

    #[test]
    fn test_delete_category_with_prior_orphans() {
        let store = store_with(AppState {
            pages: vec![page("a", "ops", 0), page("old", "gone", 0)],
            categories: vec![category("1", "ops", 0)],
        });
        assert_eq!(delete_category(&store, "1").expect("delete ops"), 1);
        let state = store.load().expect("reload");
        assert!(state.categories.is_empty());
        assert_eq!(dangling_pages(&state).len(), 2);
    }

    #[test]
    fn test_delete_missing_category_is_noop() {
        let store = setup_store();
        let before = store.load().expect("load");
        assert_eq!(delete_category(&store, "missing").expect("delete"), 0);
        assert_eq!(store.load().expect("reload"), before);
    }

    #[test]
    fn test_reorder_categories_is_verbatim() {
        let store = setup_store();
        let mut categories = store.load().expect("load").categories;
        categories.reverse();

        reorder_categories(&store, categories.clone()).expect("reorder");
        assert_eq!(store.load().expect("reload").categories, categories);
    }

    #[test]
    fn test_get_category_by_id_or_slug() {
        let store = setup_store();
        assert_eq!(get_category(&store, "2").expect("by id").slug, "api-reference");
        assert_eq!(get_category(&store, "guides").expect("by slug").id, "1");
        assert!(matches!(
            get_category(&store, "nope"),
            Err(DocsError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_categories_sorted_by_order() {
        let store = store_with(AppState {
            pages: vec![],
            categories: vec![category("b", "b", 1), category("c", "c", 2), category("a", "a", 0)],
        });
        let slugs: Vec<String> = list_categories(&store)
            .expect("list")
            .into_iter()
            .map(|c| c.slug)
            .collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_category_renumbers_all() {
        let store = store_with(AppState {
            pages: vec![],
            categories: vec![category("a", "a", 0), category("b", "b", 4), category("c", "c", 9)],
        });

        assert!(move_category(&store, "c", Direction::Up).expect("move"));

        let categories = store.load().expect("reload").categories;
        let orders: Vec<(String, i64)> = categories.into_iter().map(|c| (c.id, c.order)).collect();
        assert_eq!(
            orders,
            vec![("a".to_string(), 0), ("c".to_string(), 1), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn test_move_category_at_edge_is_noop() {
        let store = setup_store();
        let before = store.load().expect("load");
        assert!(!move_category(&store, "1", Direction::Up).expect("move"));
        assert_eq!(store.load().expect("reload"), before);
    }

    #[test]
    fn test_dangling_pages_none_when_consistent() {
        let store = setup_store();
        let state = store.load().expect("load");
        assert!(dangling_pages(&state).is_empty());
    }

    // ===== Detached store =====

    #[test]
    fn test_detached_store_operations_are_silent() {
        let store = Store::detached();
        let stored = save_page(&store, page("a", "g", 0)).expect("save");
        assert_eq!(stored.id, "a");
        assert!(store.load().expect("load").pages.is_empty());

        assert_eq!(delete_page(&store, "a").expect("delete"), 0);
        let stored = save_category(&store, category("c", "c", 3)).expect("save");
        assert_eq!(stored.order, 0);
        assert!(list_categories(&store).expect("list").is_empty());
    }
}
