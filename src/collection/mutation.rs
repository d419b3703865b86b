//! Optimistic edits with snapshot-based undo/redo and rollback.
//!
//! Every operation snapshots the live array onto the history, applies the
//! change locally and hands back the remote half as a [`PendingMutation`].
//! The caller sends it through the bridge and reports the outcome with
//! [`MutationEngine::settle`]; a failure restores the snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::entry::{CollectionEntry, EntryId, EntryItem, Slot};
use super::history::{History, Snapshot};
use super::store::WindowedCollectionStore;
use crate::client::models::ApiEntry;
use crate::view::{SortDirection, ViewState};

pub type MutationId = u64;

/// Reasons an edit is refused before anything changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Nothing selected")]
    NothingSelected,
    #[error("Entry {0} is not loaded yet")]
    UnknownEntry(EntryId),
    #[error("Reordering is only possible in playlist order")]
    NotNaturalOrder,
    #[error("Clear the filter before reordering")]
    FilterActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Remove,
    Reorder,
    Hide,
    Unhide,
    EditNotes,
    Replace,
}

impl MutationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add => "add entries",
            Self::Remove => "remove entries",
            Self::Reorder => "move entries",
            Self::Hide => "hide entries",
            Self::Unhide => "unhide entries",
            Self::EditNotes => "save notes",
            Self::Replace => "replace entry",
        }
    }

    /// Whether success is worth telling the user about.
    pub fn confirms_success(&self) -> bool {
        matches!(self, Self::EditNotes | Self::Replace)
    }
}

/// Server-side half of an optimistic edit.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteMutation {
    Add {
        entries: Vec<ApiEntry>,
    },
    Remove {
        entries: Vec<ApiEntry>,
    },
    Reorder {
        entries: Vec<ApiEntry>,
        destination: usize,
    },
    SetHidden {
        entry_ids: Vec<EntryId>,
        hidden: bool,
    },
    UpdateNotes {
        entry_id: EntryId,
        notes: String,
    },
    Replace {
        entry_id: EntryId,
        entry: ApiEntry,
    },
}

impl RemoteMutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Add { .. } => MutationKind::Add,
            Self::Remove { .. } => MutationKind::Remove,
            Self::Reorder { .. } => MutationKind::Reorder,
            Self::SetHidden { hidden: true, .. } => MutationKind::Hide,
            Self::SetHidden { hidden: false, .. } => MutationKind::Unhide,
            Self::UpdateNotes { .. } => MutationKind::EditNotes,
            Self::Replace { .. } => MutationKind::Replace,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub id: MutationId,
    pub remote: RemoteMutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Confirmed(MutationKind),
    RolledBack(MutationKind),
    /// The mutation predates a reset; nothing to roll back
    Forgotten,
}

#[derive(Debug)]
struct Unsettled {
    snapshot: Arc<Snapshot>,
    kind: MutationKind,
}

#[derive(Debug)]
pub struct MutationEngine {
    history: History,
    pending: HashMap<MutationId, Unsettled>,
    next_id: MutationId,
    next_local_id: EntryId,
}

impl MutationEngine {
    pub fn new(history_limit: usize) -> Self {
        Self {
            history: History::new(history_limit),
            pending: HashMap::new(),
            next_id: 0,
            next_local_id: 0,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Append entries at the end of natural order. They carry temporary
    /// negative ids until the collection is reloaded.
    pub fn add(
        &mut self,
        store: &mut WindowedCollectionStore,
        items: Vec<EntryItem>,
    ) -> Result<PendingMutation, MutationError> {
        if items.is_empty() {
            return Err(MutationError::NothingSelected);
        }

        let snapshot = self.record(store);
        let view = store.view().clone();
        let first_order = store
            .slots()
            .iter()
            .map(Slot::order)
            .max()
            .map_or(0, |max| max + 1);
        let entries: Vec<CollectionEntry> = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| CollectionEntry {
                id: self.allocate_local_id(),
                order: first_order + i,
                notes: String::new(),
                hidden: false,
                hidden_at: None,
                item,
            })
            .collect();
        let ids: Vec<EntryId> = entries.iter().map(|e| e.id).collect();

        let added = store.edit(|slots| {
            let new_slots = entries.into_iter().map(Slot::from);
            if view.is_natural_order() && view.sort_direction == SortDirection::Desc {
                slots.splice(0..0, new_slots.rev());
            } else {
                slots.extend(new_slots);
            }
            renumber(slots, &view, &[]);
            api_entries_for(slots, &ids)
        });

        Ok(self.register(snapshot, RemoteMutation::Add { entries: added }))
    }

    pub fn remove(
        &mut self,
        store: &mut WindowedCollectionStore,
        ids: &[EntryId],
    ) -> Result<PendingMutation, MutationError> {
        let indices = resolve_targets(store, ids)?;
        let snapshot = self.record(store);
        let view = store.view().clone();

        let removed = store.edit(|slots| {
            let removed = extract(slots, &indices);
            let mut orders: Vec<usize> = removed.iter().map(Slot::order).collect();
            orders.sort_unstable();
            renumber(slots, &view, &orders);
            removed
        });
        let entries = removed
            .iter()
            .filter_map(Slot::entry)
            .map(CollectionEntry::to_api)
            .collect();

        Ok(self.register(snapshot, RemoteMutation::Remove { entries }))
    }

    /// Move entries so the first lands at `destination` in the array with the
    /// moved entries taken out. Relative order among them is kept.
    pub fn reorder(
        &mut self,
        store: &mut WindowedCollectionStore,
        ids: &[EntryId],
        destination: usize,
    ) -> Result<PendingMutation, MutationError> {
        let view = store.view().clone();
        if !view.is_natural_order() {
            return Err(MutationError::NotNaturalOrder);
        }
        if view.has_filter() {
            return Err(MutationError::FilterActive);
        }
        let indices = resolve_targets(store, ids)?;
        let snapshot = self.record(store);

        let (entries, destination) = store.edit(|slots| {
            let moved = extract(slots, &indices);
            let count = moved.len();
            let at = destination.min(slots.len());
            slots.splice(at..at, moved);
            renumber(slots, &view, &[]);

            let entries: Vec<ApiEntry> = slots[at..at + count]
                .iter()
                .filter_map(Slot::entry)
                .map(CollectionEntry::to_api)
                .collect();
            let destination = entries.iter().map(|e| e.order).min().unwrap_or(at);
            (entries, destination)
        });

        Ok(self.register(
            snapshot,
            RemoteMutation::Reorder {
                entries,
                destination,
            },
        ))
    }

    /// Hide or unhide entries. Hiding while hidden entries are not shown
    /// takes them out of the view; natural order is left alone.
    pub fn set_hidden(
        &mut self,
        store: &mut WindowedCollectionStore,
        ids: &[EntryId],
        hidden: bool,
        now: DateTime<Utc>,
    ) -> Result<PendingMutation, MutationError> {
        let indices = resolve_targets(store, ids)?;
        let snapshot = self.record(store);
        let drops_rows = hidden && !store.view().show_hidden;
        let entry_ids: Vec<EntryId> = indices
            .iter()
            .filter_map(|&i| store.slots()[i].id())
            .collect();

        store.edit(|slots| {
            if drops_rows {
                extract(slots, &indices);
            } else {
                for &index in &indices {
                    if let Some(entry) = slots[index].entry_mut() {
                        entry.set_hidden(hidden, now);
                    }
                }
            }
        });

        Ok(self.register(snapshot, RemoteMutation::SetHidden { entry_ids, hidden }))
    }

    pub fn edit_notes(
        &mut self,
        store: &mut WindowedCollectionStore,
        id: EntryId,
        notes: String,
    ) -> Result<PendingMutation, MutationError> {
        let indices = resolve_targets(store, &[id])?;
        let snapshot = self.record(store);

        store.edit(|slots| {
            if let Some(entry) = slots[indices[0]].entry_mut() {
                entry.notes = notes.clone();
            }
        });

        Ok(self.register(snapshot, RemoteMutation::UpdateNotes { entry_id: id, notes }))
    }

    /// Swap what an entry points at, keeping its id, position and notes.
    pub fn replace(
        &mut self,
        store: &mut WindowedCollectionStore,
        id: EntryId,
        item: EntryItem,
    ) -> Result<PendingMutation, MutationError> {
        let indices = resolve_targets(store, &[id])?;
        let snapshot = self.record(store);

        let entry = store.edit(|slots| {
            slots[indices[0]].entry_mut().map(|entry| {
                entry.item = item;
                entry.to_api()
            })
        });
        let entry = entry.ok_or(MutationError::UnknownEntry(id))?;

        Ok(self.register(snapshot, RemoteMutation::Replace { entry_id: id, entry }))
    }

    /// Report the remote outcome of a mutation.
    pub fn settle(
        &mut self,
        store: &mut WindowedCollectionStore,
        id: MutationId,
        result: Result<(), String>,
    ) -> Settlement {
        let Some(unsettled) = self.pending.remove(&id) else {
            if let Err(e) = result {
                warn!("Mutation {} failed after a reset: {}", id, e);
            }
            return Settlement::Forgotten;
        };

        match result {
            Ok(()) => {
                debug!("Mutation {} ({}) confirmed", id, unsettled.kind.label());
                Settlement::Confirmed(unsettled.kind)
            }
            Err(e) => {
                warn!(
                    "Failed to {}: {}; rolling back",
                    unsettled.kind.label(),
                    e
                );
                store.restore(&unsettled.snapshot);
                self.history.discard(&unsettled.snapshot);
                Settlement::RolledBack(unsettled.kind)
            }
        }
    }

    /// Restore the state before the most recent mutation. Local only.
    pub fn undo(&mut self, store: &mut WindowedCollectionStore) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        match self.history.undo(store.snapshot()) {
            Some(previous) => {
                store.restore(&previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self, store: &mut WindowedCollectionStore) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        match self.history.redo(store.snapshot()) {
            Some(next) => {
                store.restore(&next);
                true
            }
            None => false,
        }
    }

    /// Forget history and unsettled snapshots after the array was replaced
    /// wholesale (view reset, collection switch).
    pub fn reset(&mut self) {
        self.history.clear();
        self.pending.clear();
    }

    fn record(&mut self, store: &WindowedCollectionStore) -> Arc<Snapshot> {
        let snapshot = Arc::new(store.snapshot());
        self.history.push(snapshot.clone());
        snapshot
    }

    fn register(&mut self, snapshot: Arc<Snapshot>, remote: RemoteMutation) -> PendingMutation {
        self.next_id += 1;
        let kind = remote.kind();
        debug!("Mutation {} ({}) applied locally", self.next_id, kind.label());
        self.pending
            .insert(self.next_id, Unsettled { snapshot, kind });
        PendingMutation {
            id: self.next_id,
            remote,
        }
    }

    fn allocate_local_id(&mut self) -> EntryId {
        self.next_local_id -= 1;
        self.next_local_id
    }
}

/// Sorted, deduplicated indices of loaded entries with the given ids.
fn resolve_targets(
    store: &WindowedCollectionStore,
    ids: &[EntryId],
) -> Result<Vec<usize>, MutationError> {
    if ids.is_empty() {
        return Err(MutationError::NothingSelected);
    }
    let mut indices = ids
        .iter()
        .map(|&id| {
            store
                .index_of(id)
                .filter(|&i| store.slots()[i].is_loaded())
                .ok_or(MutationError::UnknownEntry(id))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

/// Take the slots at sorted `indices` out of `slots`, in array order.
fn extract(slots: &mut Vec<Slot>, indices: &[usize]) -> Vec<Slot> {
    let mut removed = Vec::with_capacity(indices.len());
    let mut kept = Vec::with_capacity(slots.len().saturating_sub(indices.len()));
    let mut targets = indices.iter().copied().peekable();
    for (index, slot) in std::mem::take(slots).into_iter().enumerate() {
        if targets.peek() == Some(&index) {
            targets.next();
            removed.push(slot);
        } else {
            kept.push(slot);
        }
    }
    *slots = kept;
    removed
}

/// Restore dense natural ranks after rows were added, removed or moved.
///
/// In natural order the rank follows the position. Under other sorts loaded
/// entries shift down past each removed rank, and placeholders take their
/// position until they are fetched.
fn renumber(slots: &mut [Slot], view: &ViewState, removed_orders: &[usize]) {
    let len = slots.len();
    if view.is_natural_order() {
        for (index, slot) in slots.iter_mut().enumerate() {
            let order = match view.sort_direction {
                SortDirection::Asc => index,
                SortDirection::Desc => len - 1 - index,
            };
            slot.set_order(order);
        }
        return;
    }

    for (index, slot) in slots.iter_mut().enumerate() {
        match slot {
            Slot::Loaded(entry) => {
                entry.order -= removed_orders.partition_point(|&r| r < entry.order);
            }
            Slot::Placeholder(placeholder) => placeholder.order = index,
        }
    }
}

fn api_entries_for(slots: &[Slot], ids: &[EntryId]) -> Vec<ApiEntry> {
    slots
        .iter()
        .filter_map(Slot::entry)
        .filter(|e| ids.contains(&e.id))
        .map(CollectionEntry::to_api)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::entry::TrackDetails;
    use crate::collection::store::tests::api_entries;
    use crate::collection::store::{FetchMode, RangeOutcome, StoreConfig};
    use crate::view::SortColumn;

    fn loaded_store(total: usize, view: ViewState) -> WindowedCollectionStore {
        let mut store = WindowedCollectionStore::new(StoreConfig::default());
        let count = store.initialize(1, view);
        if let Some(first) = store.finish_count(count.tag, Ok(total)) {
            store.apply_range(&first, api_entries(0..total));
        }
        store
    }

    fn ids(store: &WindowedCollectionStore) -> Vec<EntryId> {
        store.slots().iter().filter_map(Slot::id).collect()
    }

    fn orders(store: &WindowedCollectionStore) -> Vec<usize> {
        store.slots().iter().map(Slot::order).collect()
    }

    fn assert_dense(store: &WindowedCollectionStore) {
        let mut sorted = orders(store);
        sorted.sort_unstable();
        assert_eq!(sorted, (0..store.total()).collect::<Vec<_>>());
    }

    fn requested(title: &str) -> EntryItem {
        EntryItem::Requested(TrackDetails {
            title: title.to_string(),
            ..TrackDetails::default()
        })
    }

    #[test]
    fn test_remove_renumbers_and_shrinks_total() {
        let mut store = loaded_store(10, ViewState::default());
        let mut engine = MutationEngine::new(50);

        let pending = engine.remove(&mut store, &[5, 2]).unwrap();

        assert_eq!(store.total(), 8);
        assert_eq!(ids(&store), vec![0, 1, 3, 4, 6, 7, 8, 9]);
        assert_eq!(orders(&store), (0..8).collect::<Vec<_>>());
        match pending.remote {
            RemoteMutation::Remove { entries } => {
                let removed: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
                assert_eq!(removed, vec![2, 5]);
            }
            other => panic!("unexpected remote mutation {:?}", other),
        }
    }

    #[test]
    fn test_failed_remove_rolls_back_entries_and_total() {
        let mut store = loaded_store(10, ViewState::default());
        let before = store.slots().to_vec();
        let mut engine = MutationEngine::new(50);

        let pending = engine.remove(&mut store, &[1, 4, 7]).unwrap();
        assert_eq!(store.total(), 7);

        let outcome = engine.settle(&mut store, pending.id, Err(String::from("500")));
        assert_eq!(outcome, Settlement::RolledBack(MutationKind::Remove));
        assert_eq!(store.total(), 10);
        assert_eq!(store.slots(), before.as_slice());
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_add_appends_with_temporary_ids() {
        let mut store = loaded_store(4, ViewState::default());
        let mut engine = MutationEngine::new(50);

        let pending = engine
            .add(&mut store, vec![requested("One"), requested("Two")])
            .unwrap();

        assert_eq!(store.total(), 6);
        assert_eq!(ids(&store), vec![0, 1, 2, 3, -1, -2]);
        assert_dense(&store);
        match pending.remote {
            RemoteMutation::Add { entries } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].order, 4);
                assert_eq!(entries[1].order, 5);
            }
            other => panic!("unexpected remote mutation {:?}", other),
        }
    }

    #[test]
    fn test_add_in_descending_natural_order_goes_on_top() {
        let view = ViewState::sorted(SortColumn::Order, SortDirection::Desc);
        let mut store = loaded_store(3, view);
        let mut engine = MutationEngine::new(50);

        engine.add(&mut store, vec![requested("New")]).unwrap();
        assert_eq!(store.slots()[0].id(), Some(-1));
        assert_eq!(store.slots()[0].order(), 3);
        assert_dense(&store);
    }

    #[test]
    fn test_reorder_moves_block_and_keeps_order_dense() {
        let mut store = loaded_store(8, ViewState::default());
        let mut engine = MutationEngine::new(50);

        let pending = engine.reorder(&mut store, &[1, 2], 4).unwrap();

        assert_eq!(ids(&store), vec![0, 3, 4, 5, 1, 2, 6, 7]);
        assert_eq!(orders(&store), (0..8).collect::<Vec<_>>());
        match pending.remote {
            RemoteMutation::Reorder {
                entries,
                destination,
            } => {
                assert_eq!(destination, 4);
                let moved: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
                assert_eq!(moved, vec![1, 2]);
            }
            other => panic!("unexpected remote mutation {:?}", other),
        }
    }

    #[test]
    fn test_reorder_refused_outside_natural_unfiltered_order() {
        let mut engine = MutationEngine::new(50);

        let mut sorted = loaded_store(5, ViewState::sorted(SortColumn::Title, SortDirection::Asc));
        assert_eq!(
            engine.reorder(&mut sorted, &[1], 3),
            Err(MutationError::NotNaturalOrder)
        );

        let mut view = ViewState::default();
        view.filter = String::from("track");
        let mut filtered = loaded_store(5, view);
        let before = filtered.slots().to_vec();
        assert_eq!(
            engine.reorder(&mut filtered, &[1], 3),
            Err(MutationError::FilterActive)
        );
        assert_eq!(filtered.slots(), before.as_slice());
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_remove_under_other_sort_shifts_loaded_ranks() {
        let mut store = WindowedCollectionStore::new(StoreConfig::default());
        let count = store.initialize(1, ViewState::sorted(SortColumn::Artist, SortDirection::Asc));
        let first = store.finish_count(count.tag, Ok(5)).unwrap();
        let rows = [3, 0, 4, 1, 2]
            .into_iter()
            .enumerate()
            .map(|(i, order)| {
                CollectionEntry::requested(i as EntryId, order, None, format!("Row {}", i)).to_api()
            })
            .collect();
        store.apply_range(&first, rows);

        let mut engine = MutationEngine::new(50);
        engine.remove(&mut store, &[3]).unwrap();

        assert_eq!(orders(&store), vec![2, 0, 3, 1]);
        assert_dense(&store);
    }

    #[test]
    fn test_hide_without_show_hidden_removes_rows() {
        let mut store = loaded_store(6, ViewState::default());
        let mut engine = MutationEngine::new(50);

        engine
            .set_hidden(&mut store, &[1, 3], true, Utc::now())
            .unwrap();

        assert_eq!(store.total(), 4);
        assert_eq!(ids(&store), vec![0, 2, 4, 5]);
        assert_eq!(orders(&store), vec![0, 2, 4, 5]);
    }

    #[test]
    fn test_hide_with_show_hidden_flags_in_place() {
        let mut view = ViewState::default();
        view.show_hidden = true;
        let mut store = loaded_store(6, view);
        let mut engine = MutationEngine::new(50);
        let now = Utc::now();

        let pending = engine.set_hidden(&mut store, &[1, 3], true, now).unwrap();
        assert_eq!(store.total(), 6);
        let entry = store.entry(3).unwrap();
        assert!(entry.hidden);
        assert_eq!(entry.hidden_at, Some(now));
        assert_eq!(
            pending.remote,
            RemoteMutation::SetHidden {
                entry_ids: vec![1, 3],
                hidden: true
            }
        );

        let pending = engine.set_hidden(&mut store, &[3], false, now).unwrap();
        assert_eq!(pending.remote.kind(), MutationKind::Unhide);
        assert!(!store.entry(3).unwrap().hidden);
        assert_eq!(store.entry(3).unwrap().hidden_at, None);
    }

    #[test]
    fn test_reorder_after_hiding_in_place_counts_hidden_rows() {
        let mut view = ViewState::default();
        view.show_hidden = true;
        let mut store = loaded_store(6, view);
        let mut engine = MutationEngine::new(50);

        engine.set_hidden(&mut store, &[2], true, Utc::now()).unwrap();
        let pending = engine.reorder(&mut store, &[4], 1).unwrap();

        assert_eq!(ids(&store), vec![0, 4, 1, 2, 3, 5]);
        assert_eq!(orders(&store), (0..6).collect::<Vec<_>>());
        let hidden = store.entry(2).unwrap();
        assert!(hidden.hidden);
        assert_eq!(hidden.order, 3);
        match pending.remote {
            RemoteMutation::Reorder {
                entries,
                destination,
            } => {
                assert_eq!(destination, 1);
                let moved: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
                assert_eq!(moved, vec![4]);
            }
            other => panic!("unexpected remote mutation {:?}", other),
        }
    }

    #[test]
    fn test_notes_survive_a_page_requested_before_the_edit() {
        let mut store = WindowedCollectionStore::new(StoreConfig::default());
        let count = store.initialize(1, ViewState::default());
        let first = store.finish_count(count.tag, Ok(300)).unwrap();
        store.apply_range(&first, api_entries(0..100));

        let mut page = store.report_visible_range(75, 85).unwrap();
        page.mode = FetchMode::Centered;
        page.offset = 75;
        page.limit = 100;

        let mut engine = MutationEngine::new(50);
        let pending = engine
            .edit_notes(&mut store, 80, String::from("keep me"))
            .unwrap();
        assert_eq!(
            store.apply_range(&page, api_entries(75..175)),
            RangeOutcome::Stale
        );
        assert_eq!(
            engine.settle(&mut store, pending.id, Ok(())),
            Settlement::Confirmed(MutationKind::EditNotes)
        );
        assert_eq!(store.entry(80).unwrap().notes, "keep me");

        // The released guard lets the next report fetch the page again
        assert!(store.report_visible_range(75, 85).is_some());
    }

    #[test]
    fn test_undo_redo_walks_history() {
        let mut store = loaded_store(10, ViewState::default());
        let original = store.slots().to_vec();
        let mut engine = MutationEngine::new(50);

        engine.remove(&mut store, &[0]).unwrap();
        engine.reorder(&mut store, &[5], 0).unwrap();
        engine.add(&mut store, vec![requested("Extra")]).unwrap();
        let after = store.slots().to_vec();

        for _ in 0..3 {
            assert!(engine.undo(&mut store));
        }
        assert!(!engine.undo(&mut store));
        assert_eq!(store.slots(), original.as_slice());

        for _ in 0..3 {
            assert!(engine.redo(&mut store));
        }
        assert!(!engine.redo(&mut store));
        assert_eq!(store.slots(), after.as_slice());
    }

    #[test]
    fn test_new_mutation_after_undo_drops_redo() {
        let mut store = loaded_store(5, ViewState::default());
        let mut engine = MutationEngine::new(50);

        engine.remove(&mut store, &[0]).unwrap();
        engine.remove(&mut store, &[1]).unwrap();
        assert!(engine.undo(&mut store));
        assert!(engine.can_redo());

        engine.remove(&mut store, &[4]).unwrap();
        assert!(!engine.can_redo());
        assert!(!engine.redo(&mut store));
        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn test_notes_confirmation_and_unknown_entries() {
        let mut store = loaded_store(3, ViewState::default());
        let mut engine = MutationEngine::new(50);

        let pending = engine
            .edit_notes(&mut store, 2, String::from("play loud"))
            .unwrap();
        assert_eq!(store.entry(2).unwrap().notes, "play loud");
        assert_eq!(
            engine.settle(&mut store, pending.id, Ok(())),
            Settlement::Confirmed(MutationKind::EditNotes)
        );
        assert!(MutationKind::EditNotes.confirms_success());

        assert_eq!(
            engine.edit_notes(&mut store, 99, String::new()),
            Err(MutationError::UnknownEntry(99))
        );
        assert_eq!(engine.remove(&mut store, &[]), Err(MutationError::NothingSelected));
    }

    #[test]
    fn test_replace_keeps_identity() {
        let mut store = loaded_store(3, ViewState::default());
        let mut engine = MutationEngine::new(50);

        let pending = engine
            .replace(&mut store, 1, requested("Matched"))
            .unwrap();
        let entry = store.entry(1).unwrap();
        assert_eq!(entry.order, 1);
        assert_eq!(entry.item.title(), "Matched");
        assert!(matches!(
            pending.remote,
            RemoteMutation::Replace { entry_id: 1, .. }
        ));
    }

    #[test]
    fn test_failure_after_reset_is_not_rolled_back() {
        let mut store = loaded_store(5, ViewState::default());
        let mut engine = MutationEngine::new(50);

        let pending = engine.remove(&mut store, &[0]).unwrap();
        engine.reset();
        assert!(!engine.can_undo());

        assert_eq!(
            engine.settle(&mut store, pending.id, Err(String::from("timeout"))),
            Settlement::Forgotten
        );
        assert_eq!(store.total(), 4);
    }
}
