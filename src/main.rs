//! pagekeep: a local documentation store for pages grouped into categories.
//!
//! The whole state (pages plus categories) lives in one JSON blob under a
//! fixed key in a pluggable backend. All output is JSON by default, with an
//! optional `--pretty` flag for human readability. Logs go to stderr.

mod backend;
mod config;
mod db;
mod editor;
mod html;
mod models;
mod output;
mod repo;
mod search;
mod store;
mod tui;

use clap::{Parser, Subcommand};
use config::Config;
use db::DocsError;
use editor::{ContentEditor, ExternalEditor};
use models::{AppState, Category, Direction, Page};
use output::OutputMode;
use std::io::{self, Read as _};
use std::path::PathBuf;
use std::process;
use store::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Input validation for values arriving from the command line.
mod validation {
    use crate::db::DocsError;

    pub const MAX_SLUG_LEN: usize = 128;
    pub const MAX_TITLE_LEN: usize = 500;
    pub const MAX_NAME_LEN: usize = 256;
    pub const MAX_DESCRIPTION_LEN: usize = 2000;
    pub const MAX_CONTENT_LEN: usize = 10_000_000; // 10 MB
    pub const MAX_TAG_LEN: usize = 100;
    pub const MAX_TAGS_COUNT: usize = 50;

    pub fn validate_slug(slug: &str) -> Result<(), DocsError> {
        if slug.is_empty() {
            return Err(DocsError::InvalidInput("Slug must not be empty".to_string()));
        }
        if slug.len() > MAX_SLUG_LEN {
            return Err(DocsError::InvalidInput(format!(
                "Slug too long (max {} characters)",
                MAX_SLUG_LEN
            )));
        }
        if !slug.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(DocsError::InvalidInput(
                "Slug must start with a lowercase letter or digit".to_string(),
            ));
        }
        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(DocsError::InvalidInput(
                "Slug must contain only lowercase letters, digits, hyphens, and underscores"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_title(title: &str) -> Result<(), DocsError> {
        if title.trim().is_empty() {
            return Err(DocsError::InvalidInput("Title must not be empty".to_string()));
        }
        if title.len() > MAX_TITLE_LEN {
            return Err(DocsError::InvalidInput(format!(
                "Title too long (max {} characters)",
                MAX_TITLE_LEN
            )));
        }
        Ok(())
    }

    pub fn validate_name(name: &str) -> Result<(), DocsError> {
        if name.trim().is_empty() {
            return Err(DocsError::InvalidInput("Name must not be empty".to_string()));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(DocsError::InvalidInput(format!(
                "Name too long (max {} characters)",
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    pub fn validate_description(desc: &str) -> Result<(), DocsError> {
        if desc.len() > MAX_DESCRIPTION_LEN {
            return Err(DocsError::InvalidInput(format!(
                "Description too long (max {} characters)",
                MAX_DESCRIPTION_LEN
            )));
        }
        Ok(())
    }

    pub fn validate_content(content: &str) -> Result<(), DocsError> {
        if content.len() > MAX_CONTENT_LEN {
            return Err(DocsError::InvalidInput(format!(
                "Content too long (max {} bytes)",
                MAX_CONTENT_LEN
            )));
        }
        Ok(())
    }

    /// Icon colours are `#rrggbb` hex triplets.
    pub fn validate_icon_color(color: &str) -> Result<(), DocsError> {
        let valid = color.len() == 7
            && color.starts_with('#')
            && color[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(DocsError::InvalidInput(format!(
                "Icon color '{}' must be a hex colour like #3b82f6",
                color
            )));
        }
        Ok(())
    }

    pub fn validate_tags(tags: &[String]) -> Result<(), DocsError> {
        if tags.len() > MAX_TAGS_COUNT {
            return Err(DocsError::InvalidInput(format!(
                "Too many tags (max {})",
                MAX_TAGS_COUNT
            )));
        }
        for tag in tags {
            if tag.len() > MAX_TAG_LEN {
                return Err(DocsError::InvalidInput(format!(
                    "Tag '{}' too long (max {} characters)",
                    tag, MAX_TAG_LEN
                )));
            }
        }
        Ok(())
    }
}

const DEFAULT_PAGE_ICON: &str = "FileText";
const DEFAULT_CATEGORY_ICON: &str = "Folder";
const DEFAULT_ICON_COLOR: &str = "#3b82f6";

/// A local documentation store.
///
/// Pages are HTML documents grouped into ordered categories. The whole
/// collection is kept as one JSON document in SQLite, a directory, or memory.
/// All output is JSON by default; use --pretty for human-readable format.
#[derive(Parser)]
#[command(name = "pagekeep", version, about)]
struct Cli {
    /// Output in human-readable format instead of JSON.
    #[arg(long, global = true)]
    pretty: bool,

    /// Storage backend: sqlite, file, memory or none (default: $PAGEKEEP_BACKEND or sqlite).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database file or state directory (default: $PAGEKEEP_PATH or ~/.pagekeep).
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pages (HTML documents).
    Page {
        #[command(subcommand)]
        action: PageAction,
    },
    /// Manage categories (ordered groups of pages).
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Text search with optional filters.
    Search {
        /// Search query text.
        query: Option<String>,
        /// Filter by category slug.
        #[arg(long)]
        category: Option<String>,
        /// Filter by tag.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Export, import, reset or check the stored state.
    State {
        #[command(subcommand)]
        action: StateAction,
    },
    /// Interactive TUI browser for categories and pages.
    Browse,
}

#[derive(Subcommand)]
enum PageAction {
    /// List pages in display order.
    List {
        /// Filter by category slug.
        #[arg(long)]
        category: Option<String>,
    },
    /// Get a page by ID or slug.
    Get {
        /// The page ID or slug.
        id: String,
    },
    /// Create a page, or overwrite the page with the given ID.
    Save {
        /// Page ID. A new UUID is generated when omitted.
        #[arg(long)]
        id: Option<String>,
        /// Page title.
        #[arg(long)]
        title: String,
        /// URL slug. Derived from the title when omitted.
        #[arg(long)]
        slug: Option<String>,
        /// Short description.
        #[arg(long, default_value = "")]
        description: String,
        /// Category slug. Defaults to the stored page's category, or the first
        /// category for a new page.
        #[arg(long)]
        category: Option<String>,
        /// Comma-separated tags.
        #[arg(long)]
        tags: Option<String>,
        /// Icon name.
        #[arg(long, default_value = DEFAULT_PAGE_ICON)]
        icon: String,
        /// Icon colour as #rrggbb.
        #[arg(long, default_value = DEFAULT_ICON_COLOR)]
        icon_color: String,
        /// Position within the category. Defaults to the end of the category.
        #[arg(long)]
        order: Option<i64>,
        /// Page content (HTML).
        #[arg(long, conflicts_with = "stdin")]
        content: Option<String>,
        /// Read content from stdin.
        #[arg(long)]
        stdin: bool,
    },
    /// Delete a page by ID. Deleting a missing page is not an error.
    Delete {
        /// The page ID.
        id: String,
    },
    /// Open a page's content in $VISUAL / $EDITOR and save the result.
    Edit {
        /// The page ID.
        id: String,
    },
    /// Move a page one slot up or down within its category.
    Move {
        /// The page ID.
        id: String,
        /// up or down.
        direction: String,
    },
    /// Put pages in the given order. Listed pages are numbered 0..n.
    Reorder {
        /// Page IDs in their new order.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories in display order.
    List,
    /// Get a category by ID or slug.
    Get {
        /// The category ID or slug.
        id: String,
    },
    /// Create a category, or overwrite the category with the given ID.
    Save {
        /// Category ID. A new UUID is generated when omitted.
        #[arg(long)]
        id: Option<String>,
        /// Display name.
        #[arg(long)]
        name: String,
        /// URL slug. Derived from the name when omitted.
        #[arg(long)]
        slug: Option<String>,
        /// Short description.
        #[arg(long, default_value = "")]
        description: String,
        /// Icon name.
        #[arg(long, default_value = DEFAULT_CATEGORY_ICON)]
        icon: String,
        /// Icon colour as #rrggbb.
        #[arg(long, default_value = DEFAULT_ICON_COLOR)]
        icon_color: String,
        /// Display position. Only applies when overwriting; new categories go last.
        #[arg(long)]
        order: Option<i64>,
    },
    /// Delete a category by ID. Its pages keep their category slug.
    Delete {
        /// The category ID.
        id: String,
    },
    /// Move a category one slot up or down.
    Move {
        /// The category ID.
        id: String,
        /// up or down.
        direction: String,
    },
    /// Put categories in the given order. Listed categories are numbered 0..n.
    Reorder {
        /// Category IDs in their new order.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand)]
enum StateAction {
    /// Print the whole stored state as JSON.
    Export,
    /// Replace the stored state with a JSON document.
    Import {
        /// File to read, or - for stdin.
        file: String,
    },
    /// Remove the stored state. The next command seeds the defaults again.
    Reset,
    /// List pages whose category no longer exists.
    Check,
}

fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Read content from --content or --stdin.
fn read_content(content: &Option<String>, stdin: bool) -> Result<String, DocsError> {
    if stdin {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(content.clone().unwrap_or_default())
    }
}

/// Split a comma-separated list, dropping empty entries.
fn parse_tags(tags: Option<&str>) -> Vec<String> {
    tags.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// One past the highest `order` among `category`'s pages, 0 when it has none.
fn next_page_order(state: &AppState, category: &str) -> i64 {
    state
        .pages
        .iter()
        .filter(|p| p.category == category)
        .map(|p| p.order)
        .max()
        .map_or(0, |max| max + 1)
}

fn parse_direction(s: &str) -> Result<Direction, DocsError> {
    Direction::from_str(s).ok_or_else(|| {
        DocsError::InvalidInput(format!("Unknown direction '{}'. Valid directions: up, down", s))
    })
}

/// Move the listed items to the front in the given order, numbering them
/// `0..n`. Unlisted items follow in their stored sequence with their order
/// untouched.
fn arrange<T: Clone>(
    items: &[T],
    ids: &[String],
    id_of: impl Fn(&T) -> &str,
    set_order: impl Fn(&mut T, i64),
    kind: &str,
) -> Result<Vec<T>, DocsError> {
    let mut arranged = Vec::with_capacity(items.len());
    for (position, id) in ids.iter().enumerate() {
        if ids[..position].contains(id) {
            return Err(DocsError::InvalidInput(format!("{} '{}' listed twice", kind, id)));
        }
        let mut item = items
            .iter()
            .find(|item| id_of(item) == id)
            .cloned()
            .ok_or_else(|| DocsError::NotFound(format!("{} with ID '{}' not found", kind, id)))?;
        set_order(&mut item, position as i64);
        arranged.push(item);
    }
    arranged.extend(
        items
            .iter()
            .filter(|item| !ids.iter().any(|id| id == id_of(item)))
            .cloned(),
    );
    Ok(arranged)
}

fn read_state_document(file: &str) -> Result<AppState, DocsError> {
    let text = if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn run() -> Result<(), DocsError> {
    let cli = Cli::parse();
    let mode = if cli.pretty {
        OutputMode::Pretty
    } else {
        OutputMode::Json
    };

    let config = Config::from_env()?.with_overrides(cli.backend.as_deref(), cli.path.as_deref())?;
    init_tracing(&config);
    let store = config.open_store()?;
    if !store.is_available() {
        tracing::warn!("no storage backend configured, changes will not be kept");
    }

    match &cli.command {
        // =====================================================================
        // Page commands
        // =====================================================================
        Commands::Page { action } => run_page(action, &store, &config, mode)?,

        // =====================================================================
        // Category commands
        // =====================================================================
        Commands::Category { action } => run_category(action, &store, mode)?,

        // =====================================================================
        // Search
        // =====================================================================
        Commands::Search {
            query,
            category,
            tag,
        } => {
            let params = search::SearchParams {
                query: query.clone(),
                category: category.clone(),
                tag: tag.clone(),
            };
            let results = search::search_pages(&store, &params)?;
            output::print(mode, &results, || output::print_pretty_search_results(&results));
        }

        // =====================================================================
        // State commands
        // =====================================================================
        Commands::State { action } => run_state(action, &store, mode)?,

        // =====================================================================
        // TUI
        // =====================================================================
        Commands::Browse => tui::run_browse(&store, &config.editor)?,
    }

    Ok(())
}

fn run_page(
    action: &PageAction,
    store: &Store,
    config: &Config,
    mode: OutputMode,
) -> Result<(), DocsError> {
    match action {
        PageAction::List { category } => {
            let pages = repo::list_pages(store, category.as_deref())?;
            output::print(mode, &pages, || output::print_pretty_pages(&pages));
        }
        PageAction::Get { id } => {
            let page = match repo::get_page(store, id) {
                Err(DocsError::NotFound(_)) => repo::get_page_by_slug(store, id)?,
                other => other?,
            };
            output::print(mode, &page, || output::print_pretty_page(&page));
        }
        PageAction::Save {
            id,
            title,
            slug,
            description,
            category,
            tags,
            icon,
            icon_color,
            order,
            content,
            stdin,
        } => {
            validation::validate_title(title)?;
            let slug = slug.clone().unwrap_or_else(|| models::slugify(title));
            validation::validate_slug(&slug)?;
            validation::validate_description(description)?;
            validation::validate_icon_color(icon_color)?;
            let tags = parse_tags(tags.as_deref());
            validation::validate_tags(&tags)?;
            let content = read_content(content, *stdin)?;
            validation::validate_content(&content)?;

            let state = store.load()?;
            let existing = id
                .as_ref()
                .and_then(|id| state.pages.iter().find(|p| &p.id == id));

            let category = match (category, existing) {
                (Some(c), _) => c.clone(),
                (None, Some(page)) => page.category.clone(),
                (None, None) => repo::sorted_categories(&state)
                    .into_iter()
                    .next()
                    .map(|c| c.slug)
                    .ok_or_else(|| {
                        DocsError::InvalidInput(
                            "No categories exist; pass --category or create one first".to_string(),
                        )
                    })?,
            };
            // A page keeps its slot only while it stays in the same category
            let order = order.unwrap_or_else(|| match existing {
                Some(page) if page.category == category => page.order,
                _ => next_page_order(&state, &category),
            });

            let page = Page {
                id: id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                title: title.clone(),
                slug,
                description: description.clone(),
                category,
                tags,
                icon: icon.clone(),
                icon_color: icon_color.clone(),
                content,
                order,
                created_at: existing.map(|p| p.created_at.clone()).unwrap_or_default(),
                updated_at: String::new(),
            };
            let page = repo::save_page(store, page)?;
            output::print(mode, &page, || output::print_pretty_page(&page));
        }
        PageAction::Delete { id } => {
            let count = repo::delete_page(store, id)?;
            let msg = serde_json::json!({"deleted": id, "count": count});
            output::print(mode, &msg, || println!("Deleted {} page(s) with ID '{}'", count, id));
        }
        PageAction::Edit { id } => {
            let page = repo::get_page(store, id)?;
            let editor = ExternalEditor::new(config.editor.clone());

            let mut edited: Option<String> = None;
            editor.edit(&page.content, &mut |html| edited = Some(html))?;

            let (changed, page) = match edited {
                Some(content) => {
                    validation::validate_content(&content)?;
                    (true, repo::save_page(store, Page { content, ..page })?)
                }
                None => (false, page),
            };
            let msg = serde_json::json!({"changed": changed, "page": page});
            output::print(mode, &msg, || {
                if changed {
                    println!("Saved '{}'", page.title);
                } else {
                    println!("No changes to '{}'", page.title);
                }
            });
        }
        PageAction::Move { id, direction } => {
            let direction = parse_direction(direction)?;
            let moved = repo::move_page(store, id, direction)?;
            let msg = serde_json::json!({"id": id, "direction": direction.as_str(), "moved": moved});
            output::print(mode, &msg, || {
                if moved {
                    println!("Moved page '{}' {}", id, direction);
                } else {
                    println!("Page '{}' is already at the {} end", id, direction);
                }
            });
        }
        PageAction::Reorder { ids } => {
            let state = store.load()?;
            let pages = arrange(&state.pages, ids, |p| p.id.as_str(), |p, o| p.order = o, "Page")?;
            repo::reorder_pages(store, pages)?;
            let msg = serde_json::json!({"reordered": ids});
            output::print(mode, &msg, || println!("Reordered {} page(s)", ids.len()));
        }
    }
    Ok(())
}

fn run_category(action: &CategoryAction, store: &Store, mode: OutputMode) -> Result<(), DocsError> {
    match action {
        CategoryAction::List => {
            let categories = repo::list_categories(store)?;
            output::print(mode, &categories, || output::print_pretty_categories(&categories));
        }
        CategoryAction::Get { id } => {
            let category = repo::get_category(store, id)?;
            output::print(mode, &category, || output::print_pretty_category(&category));
        }
        CategoryAction::Save {
            id,
            name,
            slug,
            description,
            icon,
            icon_color,
            order,
        } => {
            validation::validate_name(name)?;
            let slug = slug.clone().unwrap_or_else(|| models::slugify(name));
            validation::validate_slug(&slug)?;
            validation::validate_description(description)?;
            validation::validate_icon_color(icon_color)?;

            let state = store.load()?;
            let existing = id
                .as_ref()
                .and_then(|id| state.categories.iter().find(|c| &c.id == id));

            let category = Category {
                id: id.clone().unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                name: name.clone(),
                slug,
                description: description.clone(),
                icon: icon.clone(),
                icon_color: icon_color.clone(),
                order: order.or(existing.map(|c| c.order)).unwrap_or(0),
                created_at: existing.map(|c| c.created_at.clone()).unwrap_or_default(),
            };
            let category = repo::save_category(store, category)?;
            output::print(mode, &category, || output::print_pretty_category(&category));
        }
        CategoryAction::Delete { id } => {
            let count = repo::delete_category(store, id)?;
            let msg = serde_json::json!({"deleted": id, "count": count});
            output::print(mode, &msg, || {
                println!("Deleted {} category(s) with ID '{}'", count, id)
            });
        }
        CategoryAction::Move { id, direction } => {
            let direction = parse_direction(direction)?;
            let moved = repo::move_category(store, id, direction)?;
            let msg = serde_json::json!({"id": id, "direction": direction.as_str(), "moved": moved});
            output::print(mode, &msg, || {
                if moved {
                    println!("Moved category '{}' {}", id, direction);
                } else {
                    println!("Category '{}' is already at the {} end", id, direction);
                }
            });
        }
        CategoryAction::Reorder { ids } => {
            let state = store.load()?;
            let categories = arrange(
                &state.categories,
                ids,
                |c| c.id.as_str(),
                |c, o| c.order = o,
                "Category",
            )?;
            repo::reorder_categories(store, categories)?;
            let msg = serde_json::json!({"reordered": ids});
            output::print(mode, &msg, || println!("Reordered {} category(s)", ids.len()));
        }
    }
    Ok(())
}

fn run_state(action: &StateAction, store: &Store, mode: OutputMode) -> Result<(), DocsError> {
    match action {
        StateAction::Export => {
            let state = store.load()?;
            let json = match mode {
                OutputMode::Json => serde_json::to_string(&state)?,
                OutputMode::Pretty => serde_json::to_string_pretty(&state)?,
            };
            println!("{}", json);
        }
        StateAction::Import { file } => {
            let state = read_state_document(file)?;
            store.save(&state)?;
            tracing::info!(
                pages = state.pages.len(),
                categories = state.categories.len(),
                "imported state"
            );
            let msg = serde_json::json!({
                "imported": {"pages": state.pages.len(), "categories": state.categories.len()}
            });
            output::print(mode, &msg, || {
                println!(
                    "Imported {} page(s) and {} category(s)",
                    state.pages.len(),
                    state.categories.len()
                )
            });
        }
        StateAction::Reset => {
            store.reset()?;
            let msg = serde_json::json!({"reset": true});
            output::print(mode, &msg, || println!("Stored state removed"));
        }
        StateAction::Check => {
            let state = store.load()?;
            let dangling: Vec<Page> = repo::dangling_pages(&state).into_iter().cloned().collect();
            output::print(mode, &dangling, || output::print_pretty_dangling(&dangling));
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        let error_json = serde_json::json!({
            "error": e.to_string()
        });
        eprintln!("{}", error_json);
        process::exit(1);
    }
}
