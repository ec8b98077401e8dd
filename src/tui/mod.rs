pub mod app;
pub mod event;
pub mod ui;

use std::io;
use std::panic;
use std::time::{Duration, Instant};

use crossterm::event::{self as ct_event, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::db::DocsError;
use crate::editor::ExternalEditor;
use crate::store::Store;

use self::app::App;
use self::event::{apply_action, map_key, Action};

const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// RAII guard that restores the terminal on drop (including panics).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enter_screen()?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        leave_screen();
    }
}

fn enter_screen() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)
}

fn leave_screen() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Entry point for the TUI browser (`browse` subcommand).
pub fn run_browse(store: &Store, editor_command: &str) -> Result<(), DocsError> {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        leave_screen();
        original_hook(info);
    }));

    let _guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = App::new();
    app.load_initial(store)?;
    let mut last_refresh = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if !app.running {
            break;
        }

        if let Some(page_id) = app.pending_edit.take() {
            // The editor owns the terminal until it exits
            leave_screen();
            let editor = ExternalEditor::new(editor_command.to_string());
            let outcome = app.apply_edit(store, &page_id, &editor);
            enter_screen()?;
            terminal.clear()?;
            if let Err(e) = outcome {
                tracing::warn!(page = %page_id, error = %e, "edit failed");
                app.status_message = Some(e.to_string());
            }
            last_refresh = Instant::now();
            continue;
        }

        if ct_event::poll(Duration::from_millis(100))? {
            let Event::Key(key) = ct_event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            let action = map_key(&app, key);

            // First 'g' of a 'gg' sequence only arms the jump
            if key.code == KeyCode::Char('g')
                && app.mode == app::Mode::Normal
                && action == Action::None
                && !app.pending_g
            {
                app.pending_g = true;
                continue;
            }
            app.pending_g = false;

            let content_height = terminal.size()?.height.saturating_sub(4);
            apply_action(&mut app, action, store, content_height)?;
            last_refresh = Instant::now();
        } else if last_refresh.elapsed() >= REFRESH_INTERVAL {
            app.refresh(store)?;
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
