//! The persistent store: one serialized `AppState` under a fixed key.
//!
//! Every read deserializes the whole blob and every write replaces it. A
//! store without a backend ("detached") stands in for an execution context
//! with no storage facility: it loads an empty state and ignores saves.

use crate::backend::StorageBackend;
use crate::db::DocsError;
use crate::models::{now_timestamp, AppState, Category, Page};

/// Key under which the whole application state is stored.
pub const STORAGE_KEY: &str = "docs-app-state";

pub struct Store {
    backend: Option<Box<dyn StorageBackend>>,
}

impl Store {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A store with no backend.
    pub fn detached() -> Self {
        Self { backend: None }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Loads the application state.
    ///
    /// When nothing is stored yet, the default state is built, persisted and
    /// returned. Stored data is returned verbatim, without validation.
    ///
    /// # Errors
    /// Returns `DocsError::Parse` if the stored blob is not a valid state, or
    /// the backend's error if reading or seeding fails.
    pub fn load(&self) -> Result<AppState, DocsError> {
        let Some(backend) = &self.backend else {
            return Ok(AppState::default());
        };

        match backend.get_item(STORAGE_KEY)? {
            Some(blob) if !blob.is_empty() => {
                let state: AppState = serde_json::from_str(&blob)?;
                tracing::debug!(
                    pages = state.pages.len(),
                    categories = state.categories.len(),
                    "loaded state"
                );
                Ok(state)
            }
            _ => {
                let state = default_state();
                backend.set_item(STORAGE_KEY, &serde_json::to_string(&state)?)?;
                tracing::info!("no stored state found, seeded defaults");
                Ok(state)
            }
        }
    }

    /// Serializes `state` and overwrites the stored blob. No-op when detached.
    pub fn save(&self, state: &AppState) -> Result<(), DocsError> {
        if let Some(backend) = &self.backend {
            backend.set_item(STORAGE_KEY, &serde_json::to_string(state)?)?;
            tracing::debug!(
                pages = state.pages.len(),
                categories = state.categories.len(),
                "saved state"
            );
        }
        Ok(())
    }

    /// Removes the stored blob; the next `load` seeds defaults again.
    pub fn reset(&self) -> Result<(), DocsError> {
        if let Some(backend) = &self.backend {
            backend.remove_item(STORAGE_KEY)?;
            tracing::info!("stored state removed");
        }
        Ok(())
    }
}

const GETTING_STARTED_HTML: &str = "<h1>Getting Started</h1><p>Welcome to our documentation system! This guide will help you understand how to use and navigate through our documentation.</p><h2>Features</h2><ul><li>Rich text editing</li><li>Category organization</li><li>Search functionality</li><li>Dark/light mode</li></ul>";

/// The state a fresh store starts with: one guide page and two categories.
pub fn default_state() -> AppState {
    let now = now_timestamp();
    AppState {
        pages: vec![Page {
            id: "1".to_string(),
            title: "Getting Started".to_string(),
            slug: "getting-started".to_string(),
            description: "Learn how to get started with our documentation system".to_string(),
            category: "guides".to_string(),
            tags: vec!["beginner".to_string(), "setup".to_string()],
            icon: "BookOpen".to_string(),
            icon_color: "#3b82f6".to_string(),
            content: GETTING_STARTED_HTML.to_string(),
            order: 0,
            created_at: now.clone(),
            updated_at: now.clone(),
        }],
        categories: vec![
            Category {
                id: "1".to_string(),
                name: "Guides".to_string(),
                slug: "guides".to_string(),
                description: "Step-by-step guides and tutorials".to_string(),
                icon: "BookOpen".to_string(),
                icon_color: "#22c55e".to_string(),
                order: 0,
                created_at: now.clone(),
            },
            Category {
                id: "2".to_string(),
                name: "API Reference".to_string(),
                slug: "api-reference".to_string(),
                description: "Complete API documentation".to_string(),
                icon: "Code".to_string(),
                icon_color: "#8b5cf6".to_string(),
                order: 1,
                created_at: now,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FileBackend, MemoryBackend};

    fn memory_store() -> Store {
        Store::new(Box::new(MemoryBackend::new()))
    }

    #[test]
    fn test_first_load_seeds_defaults() {
        let store = memory_store();
        let state = store.load().expect("load");

        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.categories.len(), 2);
        assert_eq!(state.pages[0].slug, "getting-started");
        assert_eq!(state.pages[0].category, "guides");
        assert_eq!(state.categories[0].slug, "guides");
        assert_eq!(state.categories[1].slug, "api-reference");
        assert_eq!(state.categories[1].order, 1);
    }

    #[test]
    fn test_seeded_state_is_persisted() {
        let store = memory_store();
        let first = store.load().expect("first load");
        let second = store.load().expect("second load");
        // Same timestamps prove the second load read the persisted blob
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let store = memory_store();
        let mut state = store.load().expect("load");
        state.pages[0].title = "Renamed".to_string();
        state.categories.pop();

        store.save(&state).expect("save");
        assert_eq!(store.load().expect("reload"), state);
    }

    #[test]
    fn test_empty_state_is_stored_verbatim() {
        let store = memory_store();
        store.save(&AppState::default()).expect("save empty");
        let state = store.load().expect("load");
        assert!(state.pages.is_empty());
        assert!(state.categories.is_empty());
    }

    #[test]
    fn test_detached_store_loads_empty_and_ignores_saves() {
        let store = Store::detached();
        assert!(!store.is_available());

        let state = store.load().expect("load");
        assert_eq!(state, AppState::default());

        store.save(&default_state()).expect("save is a no-op");
        assert_eq!(store.load().expect("load"), AppState::default());
        store.reset().expect("reset is a no-op");
    }

    #[test]
    fn test_corrupt_blob_is_a_parse_error() {
        let backend = MemoryBackend::new();
        backend.set_item(STORAGE_KEY, "{not json").expect("set");
        let store = Store::new(Box::new(backend));

        let result = store.load();
        assert!(matches!(result, Err(DocsError::Parse(_))));
    }

    #[test]
    fn test_reset_reseeds_on_next_load() {
        let store = memory_store();
        store.save(&AppState::default()).expect("save empty");
        store.reset().expect("reset");

        let state = store.load().expect("load");
        assert_eq!(state.pages.len(), 1);
        assert_eq!(state.categories.len(), 2);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = {
            let store = Store::new(Box::new(FileBackend::open(dir.path()).expect("open")));
            store.load().expect("seed")
        };
        let store = Store::new(Box::new(FileBackend::open(dir.path()).expect("reopen")));
        assert_eq!(store.load().expect("load"), state);
    }
}
