use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::db::DocsError;
use crate::models::Direction;
use crate::store::Store;

use super::app::{App, Focus, Mode};

/// Semantic actions the TUI can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveDown,
    MoveUp,
    Select,
    GoBack,
    FocusContent,
    FocusList,
    JumpToTop,
    JumpToBottom,
    EnterSearch,
    SubmitSearch,
    CancelSearch,
    SearchInput(char),
    SearchBackspace,
    Edit,
    /// Shift the selected item one slot in display order.
    Reorder(Direction),
    None,
}

/// Map a key event to a semantic action based on current mode and focus.
pub fn map_key(app: &App, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match app.mode {
        Mode::Search => match key.code {
            KeyCode::Enter => Action::SubmitSearch,
            KeyCode::Esc => Action::CancelSearch,
            KeyCode::Backspace => Action::SearchBackspace,
            KeyCode::Char(c) => Action::SearchInput(c),
            _ => Action::None,
        },
        Mode::Normal => map_normal_key(app, key),
    }
}

fn map_normal_key(app: &App, key: KeyEvent) -> Action {
    // Keys shared by both panes
    match key.code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => return Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => return Action::MoveUp,
        KeyCode::Char('/') => return Action::EnterSearch,
        KeyCode::Char('e') => return Action::Edit,
        KeyCode::Char('G') => return Action::JumpToBottom,
        KeyCode::Char('g') if app.pending_g => return Action::JumpToTop,
        _ => {}
    }

    match app.focus {
        Focus::List => match key.code {
            KeyCode::Enter => Action::Select,
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => Action::GoBack,
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => Action::FocusContent,
            KeyCode::Char('J') => Action::Reorder(Direction::Down),
            KeyCode::Char('K') => Action::Reorder(Direction::Up),
            _ => Action::None,
        },
        Focus::Content => match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Tab => Action::FocusList,
            _ => Action::None,
        },
    }
}

/// Apply an action to the app state, reading or writing the store as needed.
pub fn apply_action(
    app: &mut App,
    action: Action,
    store: &Store,
    content_height: u16,
) -> Result<(), DocsError> {
    app.status_message = None;
    match action {
        Action::Quit => app.running = false,
        Action::MoveDown => match app.focus {
            Focus::List => {
                app.move_cursor_down();
                app.update_content();
            }
            Focus::Content => app.scroll_content_down(),
        },
        Action::MoveUp => match app.focus {
            Focus::List => {
                app.move_cursor_up();
                app.update_content();
            }
            Focus::Content => app.scroll_content_up(),
        },
        Action::Select => app.select(store)?,
        Action::GoBack => app.go_back(store)?,
        Action::FocusContent => {
            if !app.items.is_empty() {
                app.focus = Focus::Content;
            }
        }
        Action::FocusList => app.focus = Focus::List,
        Action::JumpToTop => match app.focus {
            Focus::List => {
                app.jump_to_top();
                app.update_content();
            }
            Focus::Content => app.scroll_content_to_top(),
        },
        Action::JumpToBottom => match app.focus {
            Focus::List => {
                app.jump_to_bottom();
                app.update_content();
            }
            Focus::Content => app.scroll_content_to_bottom(content_height),
        },
        Action::EnterSearch => app.enter_search(),
        Action::SubmitSearch => app.submit_search(store)?,
        Action::CancelSearch => app.cancel_search(),
        Action::SearchInput(c) => app.search_input.push(c),
        Action::SearchBackspace => {
            app.search_input.pop();
        }
        Action::Edit => app.pending_edit = app.prepare_edit(),
        Action::Reorder(direction) => app.move_selected(store, direction)?,
        Action::None => {}
    }
    Ok(())
}
