use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::app::{App, Focus, Mode};

/// Render the entire UI into a ratatui frame.
pub fn draw(f: &mut Frame, app: &App) {
    let bottom_height = if app.mode == Mode::Search { 2 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(bottom_height)])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(chunks[0]);

    draw_list_pane(f, app, panes[0]);
    draw_content_pane(f, app, panes[1]);
    draw_bottom(f, app, chunks[1]);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let color = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn draw_list_pane(f: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(app.left_pane_title(), app.focus == Focus::List);
    let width = block.inner(area).width as usize;

    let items: Vec<ListItem> = app
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let text = truncate_to_width(&item.display_text(), width);
            let style = if i == app.cursor {
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn draw_content_pane(f: &mut Frame, app: &App, area: Rect) {
    let block = pane_block("Content".to_string(), app.focus == Focus::Content);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines: Vec<Line> = app
        .content_lines
        .iter()
        .skip(app.content_scroll as usize)
        .map(|l| Line::from(l.as_str()))
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_bottom(f: &mut Frame, app: &App, area: Rect) {
    let hint = match (&app.status_message, app.mode) {
        (Some(msg), Mode::Normal) => Span::styled(msg.as_str(), Style::default().fg(Color::Green)),
        _ => Span::styled(app.status_hint(), Style::default().fg(Color::DarkGray)),
    };

    if app.mode != Mode::Search {
        f.render_widget(Paragraph::new(Line::from(hint)), area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    f.render_widget(Paragraph::new(Line::from(hint)), rows[0]);

    let search = Paragraph::new(Line::from(Span::styled(
        format!("/{}", app.search_input),
        Style::default().fg(Color::Yellow),
    )));
    f.render_widget(search, rows[1]);

    // Cursor sits after the last typed cell, wide glyphs included
    let typed = app.search_input.width() as u16;
    f.set_cursor_position((rows[1].x + 1 + typed, rows[1].y));
}

/// Cut `text` to at most `max_width` terminal cells, ending with `…` when
/// anything was dropped.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
