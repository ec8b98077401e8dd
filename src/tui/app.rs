use crate::db::DocsError;
use crate::editor::ContentEditor;
use crate::models::{Category, Direction, Page, SearchResult};
use crate::store::Store;
use crate::{html, repo, search};

/// Which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Content,
}

/// Input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Search,
}

/// Which pages a page list shows.
#[derive(Debug, Clone)]
pub enum PageScope {
    Category(Category),
    /// Pages whose category slug matches no category.
    Unfiled,
}

/// What the left pane is currently showing.
#[derive(Debug, Clone)]
pub enum NavState {
    CategoryList,
    PageList {
        scope: PageScope,
    },
    SearchResults {
        query: String,
        /// The state to return to when pressing Esc.
        previous: Box<NavState>,
    },
}

/// Display item in the left pane list.
#[derive(Debug, Clone)]
pub enum ListItem {
    Category { category: Category, pages: usize },
    Unfiled { pages: usize },
    Page(Page),
    SearchResult(SearchResult),
}

impl ListItem {
    pub fn display_text(&self) -> String {
        match self {
            ListItem::Category { category, pages } => {
                format!("{} ({})", category.name, pages)
            }
            ListItem::Unfiled { pages } => format!("(unfiled) ({})", pages),
            ListItem::Page(page) => page.title.clone(),
            ListItem::SearchResult(r) => format!("{} [{}]", r.page.title, r.page.category),
        }
    }

    fn id(&self) -> Option<&str> {
        match self {
            ListItem::Category { category, .. } => Some(&category.id),
            ListItem::Page(page) => Some(&page.id),
            ListItem::SearchResult(r) => Some(&r.page.id),
            ListItem::Unfiled { .. } => None,
        }
    }
}

/// The main application state for the TUI browser.
pub struct App {
    pub running: bool,
    pub focus: Focus,
    pub mode: Mode,
    pub nav_state: NavState,
    pub items: Vec<ListItem>,
    pub cursor: usize,
    pub content_scroll: u16,
    pub search_input: String,
    /// Cached right-pane content lines for scrolling.
    pub content_lines: Vec<String>,
    /// True if waiting for second 'g' in gg sequence.
    pub pending_g: bool,
    /// Set when user presses 'e': the event loop suspends the TUI and opens
    /// the editor for this page id.
    pub pending_edit: Option<String>,
    /// One-line feedback shown in the status bar until the next key press.
    pub status_message: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            focus: Focus::List,
            mode: Mode::Normal,
            nav_state: NavState::CategoryList,
            items: Vec::new(),
            cursor: 0,
            content_scroll: 0,
            search_input: String::new(),
            content_lines: Vec::new(),
            pending_g: false,
            pending_edit: None,
            status_message: None,
        }
    }

    /// Load the initial data (category list).
    pub fn load_initial(&mut self, store: &Store) -> Result<(), DocsError> {
        self.nav_state = NavState::CategoryList;
        self.load_items(store)
    }

    /// Reload items, preserving cursor and scroll position.
    /// Used for periodic refresh to pick up changes from other processes.
    pub fn refresh(&mut self, store: &Store) -> Result<(), DocsError> {
        let prev_scroll = self.content_scroll;
        self.load_items(store)?;
        self.content_scroll = prev_scroll.min(self.content_lines.len().saturating_sub(1) as u16);
        Ok(())
    }

    /// Reload items for the current nav state.
    pub fn load_items(&mut self, store: &Store) -> Result<(), DocsError> {
        let state = store.load()?;
        self.items = match &self.nav_state {
            NavState::CategoryList => {
                let mut items: Vec<ListItem> = repo::sorted_categories(&state)
                    .into_iter()
                    .map(|category| {
                        let pages = state
                            .pages
                            .iter()
                            .filter(|p| p.category == category.slug)
                            .count();
                        ListItem::Category { category, pages }
                    })
                    .collect();
                let unfiled = repo::dangling_pages(&state).len();
                if unfiled > 0 {
                    items.push(ListItem::Unfiled { pages: unfiled });
                }
                items
            }
            NavState::PageList {
                scope: PageScope::Category(category),
            } => repo::sorted_pages(&state, Some(&category.slug))
                .into_iter()
                .map(ListItem::Page)
                .collect(),
            NavState::PageList {
                scope: PageScope::Unfiled,
            } => {
                let mut pages: Vec<Page> = repo::dangling_pages(&state).into_iter().cloned().collect();
                pages.sort_by_key(|p| p.order);
                pages.into_iter().map(ListItem::Page).collect()
            }
            NavState::SearchResults { query, .. } => {
                let params = search::SearchParams {
                    query: Some(query.clone()),
                    ..Default::default()
                };
                search::search_state(&state, &params)
                    .into_iter()
                    .map(ListItem::SearchResult)
                    .collect()
            }
        };

        if self.items.is_empty() {
            self.cursor = 0;
        } else if self.cursor >= self.items.len() {
            self.cursor = self.items.len() - 1;
        }

        self.update_content();
        Ok(())
    }

    /// Update the right pane content based on the currently selected item.
    pub fn update_content(&mut self) {
        self.content_lines.clear();
        self.content_scroll = 0;

        let Some(item) = self.items.get(self.cursor) else {
            self.content_lines.push("(empty)".to_string());
            return;
        };

        let mut lines = Vec::new();
        match item {
            ListItem::Category { category, pages } => {
                lines.push(format!("Category: {}", category.name));
                lines.push(format!("Slug:     {}", category.slug));
                lines.push(format!("ID:       {}", category.id));
                lines.push(format!("Order:    {}", category.order));
                lines.push(format!("Icon:     {} {}", category.icon, category.icon_color));
                lines.push(format!("Created:  {}", category.created_at));
                lines.push(format!("Pages:    {}", pages));
                if !category.description.is_empty() {
                    lines.push(String::new());
                    lines.push(category.description.clone());
                }
            }
            ListItem::Unfiled { pages } => {
                lines.push(format!(
                    "{} page(s) reference a category that no longer exists.",
                    pages
                ));
                lines.push(String::new());
                lines.push("Open to review them, then save each with a valid category.".to_string());
            }
            ListItem::Page(page) => page_lines(page, &mut lines),
            ListItem::SearchResult(r) => {
                page_lines(&r.page, &mut lines);
                if !r.excerpt.is_empty() {
                    lines.push(String::new());
                    lines.push("--- Match ---".to_string());
                    lines.push(r.excerpt.clone());
                }
            }
        }
        self.content_lines = lines;
    }

    // === Navigation ===

    pub fn move_cursor_down(&mut self) {
        if !self.items.is_empty() && self.cursor < self.items.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn jump_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_to_bottom(&mut self) {
        if !self.items.is_empty() {
            self.cursor = self.items.len() - 1;
        }
    }

    pub fn scroll_content_down(&mut self) {
        self.content_scroll = self.content_scroll.saturating_add(1);
    }

    pub fn scroll_content_up(&mut self) {
        self.content_scroll = self.content_scroll.saturating_sub(1);
    }

    pub fn scroll_content_to_top(&mut self) {
        self.content_scroll = 0;
    }

    pub fn scroll_content_to_bottom(&mut self, visible_height: u16) {
        let total = self.content_lines.len() as u16;
        if total > visible_height {
            self.content_scroll = total - visible_height;
        }
    }

    /// Select the current item (Enter key).
    pub fn select(&mut self, store: &Store) -> Result<(), DocsError> {
        let Some(item) = self.items.get(self.cursor).cloned() else {
            return Ok(());
        };

        match item {
            ListItem::Category { category, .. } => {
                self.nav_state = NavState::PageList {
                    scope: PageScope::Category(category),
                };
                self.cursor = 0;
                self.load_items(store)?;
            }
            ListItem::Unfiled { .. } => {
                self.nav_state = NavState::PageList {
                    scope: PageScope::Unfiled,
                };
                self.cursor = 0;
                self.load_items(store)?;
            }
            ListItem::Page(_) | ListItem::SearchResult(_) => {
                self.focus = Focus::Content;
            }
        }
        Ok(())
    }

    /// Go back one level (Esc key in list focus). Quits at the root.
    pub fn go_back(&mut self, store: &Store) -> Result<(), DocsError> {
        match &self.nav_state {
            NavState::CategoryList => {
                self.running = false;
            }
            NavState::PageList { .. } => {
                self.nav_state = NavState::CategoryList;
                self.cursor = 0;
                self.load_items(store)?;
            }
            NavState::SearchResults { previous, .. } => {
                self.nav_state = *previous.clone();
                self.cursor = 0;
                self.load_items(store)?;
            }
        }
        Ok(())
    }

    /// Enter search mode.
    pub fn enter_search(&mut self) {
        self.mode = Mode::Search;
        self.search_input.clear();
    }

    /// Submit the search query.
    pub fn submit_search(&mut self, store: &Store) -> Result<(), DocsError> {
        self.mode = Mode::Normal;
        if self.search_input.is_empty() {
            return Ok(());
        }
        let query = self.search_input.clone();
        // Searching from search results returns to the original list
        let previous = match &self.nav_state {
            NavState::SearchResults { previous, .. } => previous.clone(),
            other => Box::new(other.clone()),
        };
        self.nav_state = NavState::SearchResults { query, previous };
        self.cursor = 0;
        self.focus = Focus::List;
        self.load_items(store)
    }

    /// Cancel search mode.
    pub fn cancel_search(&mut self) {
        self.mode = Mode::Normal;
        self.search_input.clear();
    }

    /// The page id to edit for the current selection, if it is a page.
    pub fn prepare_edit(&self) -> Option<String> {
        match self.items.get(self.cursor)? {
            ListItem::Page(page) => Some(page.id.clone()),
            ListItem::SearchResult(r) => Some(r.page.id.clone()),
            _ => None,
        }
    }

    /// Open `page_id`'s content in `editor` and save the result through the
    /// page repository.
    ///
    /// # Returns
    /// True if the content changed and was saved.
    pub fn apply_edit(
        &mut self,
        store: &Store,
        page_id: &str,
        editor: &dyn ContentEditor,
    ) -> Result<bool, DocsError> {
        let page = repo::get_page(store, page_id)?;

        let mut edited: Option<String> = None;
        editor.edit(&page.content, &mut |html| edited = Some(html))?;

        let Some(content) = edited else {
            self.status_message = Some("No changes".to_string());
            return Ok(false);
        };
        let saved = repo::save_page(store, Page { content, ..page })?;
        self.status_message = Some(format!("Saved '{}'", saved.title));

        let prev_cursor = self.cursor;
        self.load_items(store)?;
        self.cursor = prev_cursor.min(self.items.len().saturating_sub(1));
        self.update_content();
        Ok(true)
    }

    /// Move the selected category or page one slot up or down in display
    /// order. The cursor follows the moved item.
    pub fn move_selected(&mut self, store: &Store, direction: Direction) -> Result<(), DocsError> {
        let moved = match (&self.nav_state, self.items.get(self.cursor)) {
            (NavState::CategoryList, Some(ListItem::Category { category, .. })) => {
                let id = category.id.clone();
                repo::move_category(store, &id, direction)?.then_some(id)
            }
            (NavState::PageList { .. }, Some(ListItem::Page(page))) => {
                let id = page.id.clone();
                repo::move_page(store, &id, direction)?.then_some(id)
            }
            _ => None,
        };

        if let Some(id) = moved {
            self.load_items(store)?;
            if let Some(index) = self.items.iter().position(|item| item.id() == Some(id.as_str())) {
                self.cursor = index;
                self.update_content();
            }
        }
        Ok(())
    }

    /// Returns the title for the left pane based on current nav state.
    pub fn left_pane_title(&self) -> String {
        match &self.nav_state {
            NavState::CategoryList => "Categories".to_string(),
            NavState::PageList {
                scope: PageScope::Category(category),
            } => format!("{} / Pages", category.name),
            NavState::PageList {
                scope: PageScope::Unfiled,
            } => "Unfiled / Pages".to_string(),
            NavState::SearchResults { query, .. } => format!("Search: {}", query),
        }
    }

    /// Returns the status line hint text.
    pub fn status_hint(&self) -> &'static str {
        match self.mode {
            Mode::Search => "Type query, Enter:submit, Esc:cancel",
            Mode::Normal => match self.focus {
                Focus::List => "j/k:nav  Enter:select  e:edit  J/K:move  Esc:back  /:search  q:quit",
                Focus::Content => "j/k:scroll  e:edit  h/Esc:back  /:search  q:quit",
            },
        }
    }
}

fn page_lines(page: &Page, lines: &mut Vec<String>) {
    lines.push(format!("Title:    {}", page.title));
    lines.push(format!("Slug:     {}", page.slug));
    lines.push(format!("ID:       {}", page.id));
    lines.push(format!("Category: {}", page.category));
    if !page.tags.is_empty() {
        lines.push(format!("Tags:     {}", page.tags.join(", ")));
    }
    lines.push(format!("Order:    {}", page.order));
    lines.push(format!("Created:  {}", page.created_at));
    lines.push(format!("Updated:  {}", page.updated_at));
    if !page.description.is_empty() {
        lines.push(format!("Desc:     {}", page.description));
    }
    lines.push(String::new());
    for line in html::to_plain_text(&page.content).lines() {
        lines.push(line.to_string());
    }
}
