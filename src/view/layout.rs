//! Visible grid columns and their widths.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::SortColumn;
use crate::collection::CollectionId;
use crate::storage::{DurableStore, StorageKey};

/// Narrowest a column can be resized to.
pub const MIN_COLUMN_WIDTH: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Order,
    Title,
    Artist,
    Album,
    AlbumArtist,
    Year,
    Duration,
    Genres,
    Type,
    Notes,
}

impl ColumnKey {
    pub const ALL: [ColumnKey; 10] = [
        Self::Order,
        Self::Title,
        Self::Artist,
        Self::Album,
        Self::AlbumArtist,
        Self::Year,
        Self::Duration,
        Self::Genres,
        Self::Type,
        Self::Notes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Order => "#",
            Self::Title => "Title",
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::AlbumArtist => "Album Artist",
            Self::Year => "Year",
            Self::Duration => "Time",
            Self::Genres => "Genres",
            Self::Type => "Type",
            Self::Notes => "Notes",
        }
    }

    /// Server sort backing this column, if it is sortable.
    pub fn sort_column(&self) -> Option<SortColumn> {
        match self {
            Self::Order => Some(SortColumn::Order),
            Self::Title => Some(SortColumn::Title),
            Self::Artist => Some(SortColumn::Artist),
            Self::Album => Some(SortColumn::Album),
            Self::AlbumArtist => Some(SortColumn::AlbumArtist),
            Self::Year => Some(SortColumn::Year),
            Self::Duration => Some(SortColumn::Duration),
            Self::Genres | Self::Type | Self::Notes => None,
        }
    }

    fn default_width(&self) -> u16 {
        match self {
            Self::Order => 6,
            Self::Title => 32,
            Self::Artist => 22,
            Self::Album => 22,
            Self::AlbumArtist => 18,
            Self::Year => 6,
            Self::Duration => 7,
            Self::Genres => 16,
            Self::Type => 10,
            Self::Notes => 20,
        }
    }
}

const DEFAULT_VISIBLE: [ColumnKey; 7] = [
    ColumnKey::Order,
    ColumnKey::Title,
    ColumnKey::Artist,
    ColumnKey::Album,
    ColumnKey::Duration,
    ColumnKey::Type,
    ColumnKey::Notes,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    visible: Vec<ColumnKey>,
    widths: BTreeMap<ColumnKey, u16>,
    /// Index into `visible`
    focus: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            visible: DEFAULT_VISIBLE.to_vec(),
            widths: ColumnKey::ALL
                .iter()
                .map(|key| (*key, key.default_width()))
                .collect(),
            focus: 0,
        }
    }
}

impl ColumnLayout {
    /// Load the persisted layout, falling back to defaults for anything
    /// missing or unreadable.
    pub fn load(storage: &DurableStore, collection_id: CollectionId) -> Self {
        let mut layout = Self::default();

        let stored_visible =
            storage.get_json::<Vec<ColumnKey>>(collection_id, StorageKey::VisibleColumns);
        if let Some(visible) = stored_visible {
            let mut deduped = Vec::with_capacity(visible.len());
            for key in visible {
                if !deduped.contains(&key) {
                    deduped.push(key);
                }
            }
            if !deduped.is_empty() {
                layout.visible = deduped;
            }
        }

        if let Some(widths) =
            storage.get_json::<BTreeMap<ColumnKey, u16>>(collection_id, StorageKey::ColumnWidths)
        {
            for (key, width) in widths {
                layout.widths.insert(key, width.max(MIN_COLUMN_WIDTH));
            }
        }

        layout
    }

    pub fn persist(&self, storage: &mut DurableStore, collection_id: CollectionId) {
        storage.set_json(collection_id, StorageKey::VisibleColumns, &self.visible);
        storage.set_json(collection_id, StorageKey::ColumnWidths, &self.widths);
    }

    pub fn visible(&self) -> &[ColumnKey] {
        &self.visible
    }

    pub fn width(&self, key: ColumnKey) -> u16 {
        self.widths
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_width())
    }

    pub fn focused(&self) -> ColumnKey {
        self.visible[self.focus.min(self.visible.len() - 1)]
    }

    pub fn move_focus(&mut self, delta: isize) {
        let last = self.visible.len() as isize - 1;
        self.focus = (self.focus as isize + delta).clamp(0, last) as usize;
    }

    /// Show or hide a column. Hiding the last visible column is refused.
    pub fn toggle(&mut self, key: ColumnKey) -> bool {
        match self.visible.iter().position(|k| *k == key) {
            Some(_) if self.visible.len() == 1 => false,
            Some(index) => {
                self.visible.remove(index);
                self.focus = self.focus.min(self.visible.len() - 1);
                true
            }
            None => {
                // Keep the canonical column order
                let rank = |k: &ColumnKey| ColumnKey::ALL.iter().position(|c| c == k);
                let at = self
                    .visible
                    .iter()
                    .position(|k| rank(k) > rank(&key))
                    .unwrap_or(self.visible.len());
                self.visible.insert(at, key);
                true
            }
        }
    }

    /// Widen or narrow the focused column.
    pub fn resize_focused(&mut self, delta: i16) {
        let key = self.focused();
        let width = self.width(key) as i32 + delta as i32;
        let width = width.clamp(MIN_COLUMN_WIDTH as i32, u16::MAX as i32) as u16;
        self.widths.insert(key, width);
    }
}
