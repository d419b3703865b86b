//! Virtualized playlist grid.

use std::collections::BTreeSet;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::collection::{CollectionEntry, EntryId, LoadState, Slot, WindowedCollectionStore};
use crate::view::{ColumnKey, ColumnLayout, ViewState};

/// Selection, marks and viewport of the grid.
#[derive(Debug, Default)]
pub struct GridState {
    /// Selected row index
    pub selected: usize,

    /// First row drawn
    pub offset: usize,

    /// Rows that fit in the last rendered frame
    pub viewport_rows: usize,

    /// Entries marked for batch operations
    pub marked: BTreeSet<EntryId>,
}

impl GridState {
    pub fn new() -> Self {
        Self {
            viewport_rows: 20,
            ..Self::default()
        }
    }

    /// Forget selection and marks, e.g. after the view was reset.
    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
        self.marked.clear();
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, total: usize) {
        if self.selected + 1 < total {
            self.selected += 1;
        }
    }

    pub fn jump_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_to_bottom(&mut self, total: usize) {
        self.selected = total.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self, total: usize) {
        let half_page = (self.viewport_rows / 2).max(1);
        self.selected = (self.selected + half_page).min(total.saturating_sub(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = (self.viewport_rows / 2).max(1);
        self.selected = self.selected.saturating_sub(half_page);
    }

    /// Scroll the viewport, dragging the selection along when it leaves.
    pub fn scroll_by(&mut self, delta: isize, total: usize) {
        let max_offset = total.saturating_sub(self.viewport_rows);
        self.offset = (self.offset as isize + delta).clamp(0, max_offset as isize) as usize;
        let last_visible = (self.offset + self.viewport_rows).saturating_sub(1);
        self.selected = self.selected.clamp(self.offset, last_visible.max(self.offset));
        self.clamp(total);
    }

    /// Put `offset` at the top of the viewport.
    pub fn scroll_to(&mut self, offset: usize, total: usize) {
        self.offset = offset.min(total.saturating_sub(self.viewport_rows));
        self.selected = self.offset;
        self.clamp(total);
    }

    /// Keep selection and offset inside `total` rows.
    pub fn clamp(&mut self, total: usize) {
        self.selected = self.selected.min(total.saturating_sub(1));
        self.offset = self.offset.min(total.saturating_sub(1));
    }

    /// Move the viewport the least amount that shows the selection.
    pub fn ensure_visible(&mut self, total: usize) {
        self.clamp(total);
        let rows = self.viewport_rows.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
    }

    /// First and last row index on screen.
    pub fn visible_range(&self, total: usize) -> Option<(usize, usize)> {
        if total == 0 {
            return None;
        }
        let start = self.offset.min(total - 1);
        let stop = (start + self.viewport_rows.max(1)).min(total) - 1;
        Some((start, stop))
    }

    pub fn toggle_mark(&mut self, id: EntryId) {
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    /// Entries an edit applies to: the marked ones, or else the selected row.
    pub fn targets(&self, store: &WindowedCollectionStore) -> Vec<EntryId> {
        if !self.marked.is_empty() {
            return self.marked.iter().copied().collect();
        }
        self.selected_entry(store)
            .map(|entry| vec![entry.id])
            .unwrap_or_default()
    }

    pub fn selected_entry<'a>(
        &self,
        store: &'a WindowedCollectionStore,
    ) -> Option<&'a CollectionEntry> {
        store.get(self.selected).and_then(Slot::entry)
    }
}

/// Cut `text` to `width` cells, ending in an ellipsis when shortened.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

fn cell_text(entry: &CollectionEntry, column: ColumnKey) -> String {
    let item = &entry.item;
    match column {
        ColumnKey::Order => (entry.order + 1).to_string(),
        ColumnKey::Title => item.title().to_string(),
        ColumnKey::Artist => item.artist().unwrap_or_default().to_string(),
        ColumnKey::Album => item.album().unwrap_or_default().to_string(),
        ColumnKey::AlbumArtist => item.album_artist().unwrap_or_default().to_string(),
        ColumnKey::Year => item.year().map(|y| y.to_string()).unwrap_or_default(),
        ColumnKey::Duration => entry.duration_string(),
        ColumnKey::Genres => item.genres().join(", "),
        ColumnKey::Type => {
            if entry.hidden {
                format!("{} (hidden)", entry.entry_type().label())
            } else {
                entry.entry_type().label().to_string()
            }
        }
        ColumnKey::Notes => entry.notes.replace('\n', " "),
    }
}

fn placeholder_text(column: ColumnKey, index: usize) -> String {
    match column {
        ColumnKey::Order => (index + 1).to_string(),
        ColumnKey::Title => String::from("…"),
        _ => String::new(),
    }
}

/// Render the grid and record how many rows fit.
pub fn render_grid(
    frame: &mut Frame,
    area: Rect,
    state: &mut GridState,
    store: &WindowedCollectionStore,
    columns: &ColumnLayout,
    view: &ViewState,
) {
    let title = match store.collection_id() {
        Some(id) => format!(" Playlist {} ", id),
        None => String::from(" Playlist "),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));

    // borders + header
    state.viewport_rows = area.height.saturating_sub(3) as usize;

    match store.load_state() {
        LoadState::Idle | LoadState::Counting => {
            let loading = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(loading, area);
            return;
        }
        LoadState::Failed(e) => {
            let message = format!("Failed to load playlist: {}\n\nPress R to retry.", e);
            let failed = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .block(block);
            frame.render_widget(failed, area);
            return;
        }
        LoadState::Ready => {}
    }

    let total = store.total();
    if total == 0 {
        let empty = Paragraph::new("No entries")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    state.ensure_visible(total);
    let visible = columns.visible();
    let focused = columns.focused();

    let header = Row::new(visible.iter().map(|key| {
        let sorted = key.sort_column() == Some(view.sort_column());
        let label = if sorted {
            format!("{} {}", key.label(), view.sort_direction.arrow())
        } else {
            key.label().to_string()
        };
        let mut style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        if *key == focused {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(Span::styled(label, style))
    }));

    let end = (state.offset + state.viewport_rows).min(total);
    let rows: Vec<Row> = (state.offset..end)
        .map(|index| {
            let slot = &store.slots()[index];
            let cells = visible.iter().map(|key| {
                let width = columns.width(*key) as usize;
                let text = match slot {
                    Slot::Loaded(entry) => cell_text(entry, *key),
                    Slot::Placeholder(_) => placeholder_text(*key, index),
                };
                Cell::from(truncate(&text, width))
            });

            let style = match slot {
                Slot::Placeholder(_) => Style::default().fg(Color::DarkGray),
                Slot::Loaded(entry) if state.marked.contains(&entry.id) => {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                }
                Slot::Loaded(entry) if entry.hidden => Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC | Modifier::DIM),
                Slot::Loaded(_) => Style::default().fg(Color::White),
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = visible
        .iter()
        .map(|key| match key {
            ColumnKey::Title => Constraint::Min(columns.width(*key)),
            _ => Constraint::Length(columns.width(*key)),
        })
        .collect();

    let mut table_state = TableState::default();
    table_state.select(Some(state.selected - state.offset));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(table, area, &mut table_state);
}
