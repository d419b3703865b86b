//! Main UI layout and rendering.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::client::PersistenceBridge;
use crate::view::ColumnKey;

pub mod components;

pub use components::*;

/// Render the entire UI.
pub fn render<B: PersistenceBridge>(frame: &mut Frame, app: &mut App<B>) {
    let area = frame.area();

    // Main layout: [grid] [status] [prompt / hints]
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // Grid
            Constraint::Length(1), // Status
            Constraint::Length(1), // Prompt
        ])
        .split(area);

    render_grid(
        frame,
        chunks[0],
        &mut app.grid,
        &app.store,
        &app.columns,
        app.store.view(),
    );
    render_status(frame, chunks[1], app);

    if app.prompt.is_active() {
        render_prompt(frame, chunks[2], &app.prompt);
    } else {
        let hints = Paragraph::new(app.location.to_string())
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hints, chunks[2]);
    }

    if app.show_help {
        render_help(frame, area);
    }

    if let Some(error) = &app.error_message {
        render_error(frame, area, error);
    }
}

/// Render the status line: load progress, view and the latest notice.
fn render_status<B: PersistenceBridge>(frame: &mut Frame, area: Rect, app: &App<B>) {
    let view = app.store.view();
    let label = Style::default().fg(Color::Cyan);
    let mut spans = vec![
        Span::styled(
            format!(" {}/{} ", app.store.loaded_count(), app.store.total()),
            label,
        ),
        Span::raw(format!(
            "{} {}",
            view.sort_column().label(),
            view.sort_direction.arrow()
        )),
    ];

    if let Some(seed) = view.random_seed() {
        spans.push(Span::styled(
            format!("  seed {}", seed),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if view.has_filter() {
        spans.push(Span::styled(
            format!("  filter \"{}\"", view.filter),
            Style::default().fg(Color::Yellow),
        ));
    }
    if app.filter_pending() {
        spans.push(Span::styled("  filtering…", Style::default().fg(Color::DarkGray)));
    }
    if view.show_hidden {
        spans.push(Span::raw("  +hidden"));
    }
    if !app.grid.marked.is_empty() {
        spans.push(Span::styled(
            format!("  {} marked", app.grid.marked.len()),
            Style::default().fg(Color::Cyan),
        ));
    }
    if app.mutations.pending_count() > 0 {
        spans.push(Span::styled(
            format!("  saving {}", app.mutations.pending_count()),
            Style::default().fg(Color::Magenta),
        ));
    }
    let undo_depth = app.mutations.undo_depth();
    if undo_depth > 0 {
        spans.push(Span::styled(
            format!("  undo {}", undo_depth),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if app.store.is_loading_more() {
        spans.push(Span::styled("  loading", Style::default().fg(Color::DarkGray)));
    }
    if let Some(notice) = &app.notice {
        let color = if notice.is_error {
            Color::Red
        } else {
            Color::Green
        };
        spans.push(Span::styled(
            format!("  {}", notice.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the help overlay.
fn render_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let mut help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Navigation"),
        Line::from("  j/k or ↑/↓    Move up/down"),
        Line::from("  g/G           Jump to top/bottom"),
        Line::from("  Ctrl+d/u      Scroll half page down/up"),
        Line::from("  h/l or ←/→    Focus column"),
        Line::from("  </>           Narrow/widen focused column"),
        Line::from(""),
        heading("View"),
        Line::from("  s             Sort by focused column (again to flip)"),
        Line::from("  S             Flip sort direction"),
        Line::from("  z             Shuffle (new seed)"),
        Line::from("  0             Back to playlist order"),
        Line::from("  /             Filter"),
        Line::from("  .             Show/hide hidden entries"),
        Line::from("  o             Open another playlist"),
        Line::from("  R             Retry loading"),
        Line::from(""),
        heading("Editing"),
        Line::from("  Space         Mark entry"),
        Line::from("  Esc           Clear marks"),
        Line::from("  d/Delete      Remove marked or selected"),
        Line::from("  H             Hide/unhide marked or selected"),
        Line::from("  J/K           Move down/up"),
        Line::from("  a             Add requested track"),
        Line::from("  n             Edit notes"),
        Line::from("  e             Replace entry"),
        Line::from("  u / Ctrl+r    Undo / redo"),
        Line::from(""),
        heading("Columns"),
    ];

    for (i, key) in ColumnKey::ALL.iter().enumerate() {
        help_text.push(Line::from(format!(
            "  F{:<12} Toggle {}",
            i + 1,
            key.label()
        )));
    }

    help_text.extend([
        Line::from(""),
        heading("Other"),
        Line::from("  ?             Show this help"),
        Line::from("  x             Clear error message"),
        Line::from("  q             Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help")
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// Render an error message overlay.
fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Error (x to dismiss)")
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Red))
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, popup_area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
