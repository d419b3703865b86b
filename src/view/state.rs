//! Sort, filter and visibility state of the grid.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Column the server sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Natural playlist order
    #[default]
    Order,
    Title,
    Artist,
    Album,
    AlbumArtist,
    Year,
    Duration,
    /// Seeded random order
    Random,
}

impl SortColumn {
    pub const ALL: [SortColumn; 8] = [
        Self::Order,
        Self::Title,
        Self::Artist,
        Self::Album,
        Self::AlbumArtist,
        Self::Year,
        Self::Duration,
        Self::Random,
    ];

    /// Query parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Title => "title",
            Self::Artist => "artist",
            Self::Album => "album",
            Self::AlbumArtist => "album_artist",
            Self::Year => "year",
            Self::Duration => "duration",
            Self::Random => "random",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Order => "#",
            Self::Title => "Title",
            Self::Artist => "Artist",
            Self::Album => "Album",
            Self::AlbumArtist => "Album Artist",
            Self::Year => "Year",
            Self::Duration => "Time",
            Self::Random => "Shuffle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

/// Query parameters that shape which entries the server returns and in what
/// order. A random seed is present exactly when sorting randomly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    sort_column: SortColumn,
    pub sort_direction: SortDirection,
    pub filter: String,
    random_seed: Option<u32>,
    pub show_hidden: bool,
}

impl ViewState {
    /// Non-random sort.
    pub fn sorted(column: SortColumn, direction: SortDirection) -> Self {
        let mut view = Self {
            sort_direction: direction,
            ..Self::default()
        };
        view.set_sort(column, rand_seed);
        view
    }

    /// Random order with a fixed seed.
    pub fn shuffled(seed: u32, direction: SortDirection) -> Self {
        Self {
            sort_column: SortColumn::Random,
            sort_direction: direction,
            random_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn sort_column(&self) -> SortColumn {
        self.sort_column
    }

    pub fn random_seed(&self) -> Option<u32> {
        self.random_seed
    }

    pub fn is_natural_order(&self) -> bool {
        self.sort_column == SortColumn::Order
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.trim().is_empty()
    }

    /// Change the sort column. Switching to random keeps an existing seed or
    /// draws one from `new_seed`; any other column drops the seed.
    pub fn set_sort(&mut self, column: SortColumn, new_seed: impl FnOnce() -> u32) {
        self.sort_column = column;
        if column == SortColumn::Random {
            if self.random_seed.is_none() {
                self.random_seed = Some(new_seed());
            }
        } else {
            self.random_seed = None;
        }
    }

    /// Switch to random order with a fresh seed.
    pub fn reshuffle(&mut self, seed: u32) {
        self.sort_column = SortColumn::Random;
        self.random_seed = Some(seed);
    }
}

/// Draw a new random-order seed.
pub fn rand_seed() -> u32 {
    rand::thread_rng().gen_range(1..=999_999_999)
}
