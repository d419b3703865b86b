//! Resolve the initial view from the location, durable storage and defaults.

use tracing::debug;

use super::location::Location;
use super::state::{SortColumn, SortDirection, ViewState};
use crate::collection::CollectionId;
use crate::storage::{DurableStore, StorageKey};

pub const PARAM_SORT: &str = "sort";
pub const PARAM_DIR: &str = "dir";
pub const PARAM_FILTER: &str = "filter";
pub const PARAM_SEED: &str = "seed";

/// Raw persisted view values for one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredView {
    pub sort: Option<String>,
    pub dir: Option<String>,
    pub filter: Option<String>,
    pub seed: Option<String>,
    pub show_hidden: Option<String>,
}

impl StoredView {
    pub fn load(storage: &DurableStore, collection_id: CollectionId) -> Self {
        let get = |key| storage.get(collection_id, key).map(str::to_string);
        Self {
            sort: get(StorageKey::SortColumn),
            dir: get(StorageKey::SortDirection),
            filter: get(StorageKey::Filter),
            seed: get(StorageKey::RandomSeed),
            show_hidden: get(StorageKey::ShowHidden),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub view: ViewState,
    /// Location rewritten to carry the resolved view
    pub location: Location,
    pub location_changed: bool,
    /// Values to persist; `None` removes the key
    pub writes: Vec<(StorageKey, Option<String>)>,
}

impl Resolution {
    pub fn persist(&self, storage: &mut DurableStore, collection_id: CollectionId) {
        apply_writes(storage, collection_id, &self.writes);
    }
}

/// Resolve each view field from the location, then storage, then the
/// default. Invalid values at any tier are skipped. Never fails.
pub fn resolve(
    location: &Location,
    stored: &StoredView,
    new_seed: impl FnOnce() -> u32,
) -> Resolution {
    let sort_column = location
        .get(PARAM_SORT)
        .and_then(SortColumn::parse)
        .or_else(|| stored.sort.as_deref().and_then(SortColumn::parse))
        .unwrap_or_default();
    let sort_direction = location
        .get(PARAM_DIR)
        .and_then(SortDirection::parse)
        .or_else(|| stored.dir.as_deref().and_then(SortDirection::parse))
        .unwrap_or_default();
    let filter = location
        .get(PARAM_FILTER)
        .map(str::to_string)
        .or_else(|| stored.filter.clone())
        .unwrap_or_default();
    let show_hidden = stored
        .show_hidden
        .as_deref()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    let mut view = if sort_column == SortColumn::Random {
        let seed = location
            .get(PARAM_SEED)
            .and_then(parse_seed)
            .or_else(|| stored.seed.as_deref().and_then(parse_seed))
            .unwrap_or_else(|| {
                let seed = new_seed();
                debug!("Generated random order seed {}", seed);
                seed
            });
        ViewState::shuffled(seed, sort_direction)
    } else {
        let mut view = ViewState::default();
        view.set_sort(sort_column, || 0);
        view.sort_direction = sort_direction;
        view
    };
    view.filter = filter;
    view.show_hidden = show_hidden;

    let mut rewritten = location.clone();
    write_location(&mut rewritten, &view);
    let location_changed = rewritten != *location;

    Resolution {
        writes: view_writes(&view),
        view,
        location: rewritten,
        location_changed,
    }
}

/// Carry `view` in the location parameters, leaving unrelated ones alone.
pub fn write_location(location: &mut Location, view: &ViewState) {
    location.set(PARAM_SORT, view.sort_column().as_str());
    location.set(PARAM_DIR, view.sort_direction.as_str());
    if view.filter.is_empty() {
        location.remove(PARAM_FILTER);
    } else {
        location.set(PARAM_FILTER, view.filter.clone());
    }
    match view.random_seed() {
        Some(seed) => location.set(PARAM_SEED, seed.to_string()),
        None => location.remove(PARAM_SEED),
    }
}

/// Storage values describing `view`.
pub fn view_writes(view: &ViewState) -> Vec<(StorageKey, Option<String>)> {
    vec![
        (StorageKey::SortColumn, Some(view.sort_column().as_str().to_string())),
        (StorageKey::SortDirection, Some(view.sort_direction.as_str().to_string())),
        (StorageKey::Filter, Some(view.filter.clone())),
        (StorageKey::RandomSeed, view.random_seed().map(|s| s.to_string())),
        (StorageKey::ShowHidden, Some(view.show_hidden.to_string())),
    ]
}

pub fn apply_writes(
    storage: &mut DurableStore,
    collection_id: CollectionId,
    writes: &[(StorageKey, Option<String>)],
) {
    for (key, value) in writes {
        match value {
            Some(value) => storage.set(collection_id, *key, value.clone()),
            None => storage.remove(collection_id, *key),
        }
    }
}

fn parse_seed(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|&seed| seed > 0)
}
