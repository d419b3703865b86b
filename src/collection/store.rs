//! Sparse, windowed copy of a server-backed playlist.
//!
//! The store never holds the whole collection. It keeps one slot per
//! server-side position (length always equals the reported total), decides
//! which page to request next from the rows the grid reports as visible, and
//! merges fetched pages without dropping rows it already has.

use std::ops::Range;

use tracing::{debug, info, warn};

use super::entry::{CollectionEntry, CollectionId, EntryId, Slot};
use super::history::Snapshot;
use crate::client::models::ApiEntry;
use crate::view::ViewState;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_VIEW_BUFFER: usize = 10;
pub const DEFAULT_END_MARGIN: usize = 20;

/// Fetch window tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub page_size: usize,
    /// Rows around the visible range that must be loaded
    pub view_buffer: usize,
    /// Distance to the sequential frontier that triggers the next page
    pub end_margin: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            view_buffer: DEFAULT_VIEW_BUFFER,
            end_margin: DEFAULT_END_MARGIN,
        }
    }
}

/// Identifies a request so that late responses can be recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTag {
    pub collection_id: CollectionId,
    pub generation: u64,
    pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Next page after the sequential frontier, written in place
    Sequential,
    /// Page centered on a row, merged into a rebuilt array
    Centered,
}

/// Why a range fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    Initial,
    GapInView,
    ForwardJump,
    BackwardJump,
    EndOfLoaded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountRequest {
    pub tag: RequestTag,
    pub view: ViewState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeRequest {
    pub tag: RequestTag,
    pub view: ViewState,
    pub offset: usize,
    pub limit: usize,
    pub mode: FetchMode,
    pub trigger: FetchTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Counting,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    Applied { first_load: bool },
    Stale,
}

#[derive(Debug)]
pub struct WindowedCollectionStore {
    config: StoreConfig,
    collection_id: Option<CollectionId>,
    view: ViewState,
    slots: Vec<Slot>,
    /// Pages fetched sequentially from the top
    pages_loaded: usize,
    in_flight: Option<RequestTag>,
    generation: u64,
    sequence: u64,
    state: LoadState,
    has_loaded: bool,
}

impl WindowedCollectionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: StoreConfig {
                page_size: config.page_size.max(1),
                ..config
            },
            collection_id: None,
            view: ViewState::default(),
            slots: Vec::new(),
            pages_loaded: 0,
            in_flight: None,
            generation: 0,
            sequence: 0,
            state: LoadState::Idle,
            has_loaded: false,
        }
    }

    pub fn collection_id(&self) -> Option<CollectionId> {
        self.collection_id
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading_more(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_loaded()).count()
    }

    /// Length of the contiguous run of loaded rows at the top.
    pub fn loaded_prefix(&self) -> usize {
        self.slots.iter().take_while(|s| s.is_loaded()).count()
    }

    /// First row not covered by sequential page fetches.
    pub fn sequential_frontier(&self) -> usize {
        (self.pages_loaded * self.config.page_size).min(self.total())
    }

    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.slots.iter().position(|s| s.id() == Some(id))
    }

    pub fn entry(&self, id: EntryId) -> Option<&CollectionEntry> {
        self.slots.iter().filter_map(Slot::entry).find(|e| e.id == id)
    }

    /// Start over for `collection_id` under `view`. Everything in flight for
    /// the previous collection or view becomes stale.
    pub fn initialize(&mut self, collection_id: CollectionId, view: ViewState) -> CountRequest {
        info!("Loading collection {} ({:?})", collection_id, view);
        self.collection_id = Some(collection_id);
        self.view = view;
        self.generation += 1;
        self.in_flight = None;
        self.slots.clear();
        self.pages_loaded = 0;
        self.has_loaded = false;
        self.state = LoadState::Counting;

        CountRequest {
            tag: self.next_tag(collection_id),
            view: self.view.clone(),
        }
    }

    /// Re-run the count for the current collection and view.
    pub fn retry(&mut self) -> Option<CountRequest> {
        let collection_id = self.collection_id?;
        Some(self.initialize(collection_id, self.view.clone()))
    }

    /// Apply a count result. On success the placeholder array is allocated
    /// and the first page is requested.
    pub fn finish_count(
        &mut self,
        tag: RequestTag,
        result: Result<usize, String>,
    ) -> Option<RangeRequest> {
        if !self.is_current(tag) || self.state != LoadState::Counting {
            debug!("Discarding stale count response {:?}", tag);
            return None;
        }

        match result {
            Ok(total) => {
                info!("Collection has {} entries", total);
                self.slots = (0..total).map(Slot::placeholder).collect();
                self.pages_loaded = 0;
                self.state = LoadState::Ready;
                if total == 0 {
                    self.has_loaded = true;
                    return None;
                }
                self.sequential_request(FetchTrigger::Initial)
            }
            Err(e) => {
                warn!("Failed to count entries: {}", e);
                self.state = LoadState::Failed(e);
                None
            }
        }
    }

    /// Report the rows the grid is drawing. Returns at most one fetch to
    /// issue; nothing while another fetch is outstanding.
    pub fn report_visible_range(&mut self, start: usize, stop: usize) -> Option<RangeRequest> {
        if self.state != LoadState::Ready || self.in_flight.is_some() || self.slots.is_empty() {
            return None;
        }

        let total = self.total();
        let page = self.config.page_size;
        let stop = stop.min(total - 1);
        let start = start.min(stop);

        let frontier = self.sequential_frontier();
        let next_page = frontier..(frontier + page).min(total);

        let expanded = start.saturating_sub(self.config.view_buffer)
            ..(stop + self.config.view_buffer + 1).min(total);
        if self.has_gap(expanded.clone()) {
            // Rows missing only from the next sequential page come in order
            if self.gaps_within(expanded.clone(), &next_page) {
                return self.sequential_request(FetchTrigger::EndOfLoaded);
            }
            let midpoint = (expanded.start + expanded.end - 1) / 2;
            return Some(self.centered_request(midpoint, FetchTrigger::GapInView));
        }

        if start >= page
            && start > self.loaded_prefix()
            && self.has_gap(self.centered_window(start))
        {
            return Some(self.centered_request(start, FetchTrigger::ForwardJump));
        }

        if start < page && !self.slots[0].is_loaded() && self.has_gap(self.centered_window(start)) {
            return Some(self.centered_request(start, FetchTrigger::BackwardJump));
        }

        if stop + self.config.end_margin >= frontier && self.has_gap(frontier..total) {
            return self.sequential_request(FetchTrigger::EndOfLoaded);
        }

        None
    }

    /// Merge a fetched page.
    pub fn apply_range(&mut self, request: &RangeRequest, entries: Vec<ApiEntry>) -> RangeOutcome {
        if self.in_flight == Some(request.tag) {
            self.in_flight = None;
        }
        if !self.is_current(request.tag) {
            debug!("Discarding stale range response at offset {}", request.offset);
            return RangeOutcome::Stale;
        }

        let batch: Vec<Slot> = entries
            .into_iter()
            .map(|api| Slot::from(CollectionEntry::from_api(api)))
            .collect();
        debug!(
            "Merging {} rows at offset {} ({:?})",
            batch.len(),
            request.offset,
            request.mode
        );

        match request.mode {
            FetchMode::Sequential => {
                Self::write_batch(&mut self.slots, request.offset, batch);
                if request.offset == self.pages_loaded * self.config.page_size {
                    self.pages_loaded += 1;
                }
            }
            FetchMode::Centered => {
                let total = self.total();
                let mut merged: Vec<Slot> = (0..total).map(Slot::placeholder).collect();
                for (index, slot) in std::mem::take(&mut self.slots).into_iter().enumerate() {
                    if slot.is_loaded() {
                        merged[index] = slot;
                    }
                }
                Self::write_batch(&mut merged, request.offset, batch);
                self.slots = merged;
            }
        }
        self.advance_frontier();

        let first_load = !self.has_loaded;
        self.has_loaded = true;
        RangeOutcome::Applied { first_load }
    }

    /// Record a failed page fetch. Placeholders stay; the next visibility
    /// report retries.
    pub fn fail_range(&mut self, request: &RangeRequest, error: &str) {
        if self.in_flight == Some(request.tag) {
            self.in_flight = None;
        }
        if self.is_current(request.tag) {
            warn!(
                "Failed to fetch rows {}..{}: {}",
                request.offset,
                request.offset + request.limit,
                error
            );
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.slots.clone())
    }

    /// Replace the live array with a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        debug!("Restoring {} rows from history", snapshot.total());
        self.slots = snapshot.slots().to_vec();
        self.invalidate_in_flight();
    }

    /// Edit the live array in place. The total follows the array length.
    /// Pages already in flight were read before the edit and become stale.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut Vec<Slot>) -> R) -> R {
        let result = edit(&mut self.slots);
        self.invalidate_in_flight();
        result
    }

    fn invalidate_in_flight(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    fn is_current(&self, tag: RequestTag) -> bool {
        self.collection_id == Some(tag.collection_id) && self.generation == tag.generation
    }

    fn next_tag(&mut self, collection_id: CollectionId) -> RequestTag {
        self.sequence += 1;
        RequestTag {
            collection_id,
            generation: self.generation,
            sequence: self.sequence,
        }
    }

    fn has_gap(&self, range: Range<usize>) -> bool {
        self.slots[range].iter().any(|s| !s.is_loaded())
    }

    /// Whether every unloaded row of `range` falls inside `within`.
    fn gaps_within(&self, range: Range<usize>, within: &Range<usize>) -> bool {
        range
            .filter(|&i| !self.slots[i].is_loaded())
            .all(|i| within.contains(&i))
    }

    /// Move the frontier past pages that other fetches already filled.
    fn advance_frontier(&mut self) {
        let page = self.config.page_size;
        loop {
            let frontier = self.pages_loaded * page;
            if frontier >= self.total() {
                break;
            }
            let end = (frontier + page).min(self.total());
            if self.has_gap(frontier..end) {
                break;
            }
            self.pages_loaded += 1;
        }
    }

    /// Page-sized window centered on `midpoint`, clamped to the array.
    fn centered_window(&self, midpoint: usize) -> Range<usize> {
        let total = self.total();
        let page = self.config.page_size;
        let mut offset = midpoint.saturating_sub(page / 2);
        if offset + page > total {
            offset = total.saturating_sub(page);
        }
        offset..(offset + page).min(total)
    }

    fn centered_request(&mut self, midpoint: usize, trigger: FetchTrigger) -> RangeRequest {
        let window = self.centered_window(midpoint);
        debug!("{:?}: centered fetch of rows {:?}", trigger, window);
        self.issue(window.start, window.len(), FetchMode::Centered, trigger)
    }

    fn sequential_request(&mut self, trigger: FetchTrigger) -> Option<RangeRequest> {
        let offset = self.pages_loaded * self.config.page_size;
        if offset >= self.total() {
            return None;
        }
        let limit = self.config.page_size.min(self.total() - offset);
        debug!("{:?}: sequential fetch at offset {}", trigger, offset);
        Some(self.issue(offset, limit, FetchMode::Sequential, trigger))
    }

    fn issue(
        &mut self,
        offset: usize,
        limit: usize,
        mode: FetchMode,
        trigger: FetchTrigger,
    ) -> RangeRequest {
        let collection_id = self.collection_id.unwrap_or_default();
        let tag = self.next_tag(collection_id);
        self.in_flight = Some(tag);
        RangeRequest {
            tag,
            view: self.view.clone(),
            offset,
            limit,
            mode,
            trigger,
        }
    }

    /// Write `batch` at `offset`, never past the end and never replacing a
    /// loaded row with a placeholder.
    fn write_batch(slots: &mut [Slot], offset: usize, batch: Vec<Slot>) {
        for (index, slot) in (offset..slots.len()).zip(batch) {
            if slot.is_loaded() || !slots[index].is_loaded() {
                slots[index] = slot;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::view::{SortColumn, SortDirection};

    pub(crate) fn api_entries(range: Range<usize>) -> Vec<ApiEntry> {
        range
            .map(|i| {
                CollectionEntry::requested(i as EntryId, i, None, format!("Track {}", i)).to_api()
            })
            .collect()
    }

    fn counted(total: usize, page_size: usize) -> (WindowedCollectionStore, Option<RangeRequest>) {
        let mut store = WindowedCollectionStore::new(StoreConfig {
            page_size,
            ..StoreConfig::default()
        });
        let count = store.initialize(1, ViewState::default());
        let first = store.finish_count(count.tag, Ok(total));
        (store, first)
    }

    fn load(store: &mut WindowedCollectionStore, request: &RangeRequest) {
        let rows = api_entries(request.offset..request.offset + request.limit);
        assert!(matches!(
            store.apply_range(request, rows),
            RangeOutcome::Applied { .. }
        ));
    }

    fn loaded_indices(store: &WindowedCollectionStore) -> Vec<usize> {
        (0..store.total())
            .filter(|&i| store.slots()[i].is_loaded())
            .collect()
    }

    #[test]
    fn test_count_allocates_placeholders_and_requests_first_page() {
        let (store, first) = counted(250, 100);
        let first = first.unwrap();

        assert_eq!(store.total(), 250);
        assert_eq!(store.loaded_count(), 0);
        assert_eq!(first.offset, 0);
        assert_eq!(first.limit, 100);
        assert_eq!(first.mode, FetchMode::Sequential);
        assert_eq!(first.trigger, FetchTrigger::Initial);
        assert!(store.is_loading_more());
    }

    #[test]
    fn test_count_failure_is_persistent_until_retry() {
        let mut store = WindowedCollectionStore::new(StoreConfig::default());
        let count = store.initialize(3, ViewState::default());
        assert!(store
            .finish_count(count.tag, Err(String::from("boom")))
            .is_none());
        assert_eq!(store.load_state(), &LoadState::Failed(String::from("boom")));
        assert!(store.report_visible_range(0, 10).is_none());

        let retry = store.retry().unwrap();
        assert_eq!(store.load_state(), &LoadState::Counting);
        assert!(store.finish_count(retry.tag, Ok(5)).is_some());
    }

    #[test]
    fn test_empty_collection_issues_no_fetch() {
        let (mut store, first) = counted(0, 100);
        assert!(first.is_none());
        assert!(store.report_visible_range(0, 20).is_none());
    }

    #[test]
    fn test_no_fetch_while_one_is_in_flight() {
        let (mut store, first) = counted(1000, 100);
        assert!(first.is_some());
        assert!(store.report_visible_range(500, 520).is_none());
    }

    #[test]
    fn test_gap_in_view_triggers_centered_fetch() {
        let (mut store, first) = counted(1000, 100);
        load(&mut store, &first.unwrap());

        let request = store.report_visible_range(500, 520).unwrap();
        assert_eq!(request.trigger, FetchTrigger::GapInView);
        assert_eq!(request.mode, FetchMode::Centered);
        // midpoint of 490..=530 is 510
        assert_eq!(request.offset, 460);
        assert_eq!(request.limit, 100);
    }

    #[test]
    fn test_end_of_loaded_fetches_next_sequential_page() {
        let (mut store, first) = counted(1000, 100);
        load(&mut store, &first.unwrap());

        // Visible rows and their buffer are loaded; the frontier is near
        assert!(store.report_visible_range(40, 60).is_none());
        let request = store.report_visible_range(75, 85).unwrap();
        assert_eq!(request.trigger, FetchTrigger::EndOfLoaded);
        assert_eq!(request.mode, FetchMode::Sequential);
        assert_eq!(request.offset, 100);

        load(&mut store, &request);
        assert_eq!(store.sequential_frontier(), 200);
        assert_eq!(store.loaded_prefix(), 200);
    }

    #[test]
    fn test_jump_to_end_after_four_pages_fetches_offset_400() {
        let (mut store, first) = counted(500, 100);
        load(&mut store, &first.unwrap());
        for stop in [85, 185, 285] {
            let request = store.report_visible_range(stop - 10, stop).unwrap();
            assert_eq!(request.mode, FetchMode::Sequential);
            load(&mut store, &request);
        }
        assert_eq!(store.sequential_frontier(), 400);

        let request = store.report_visible_range(490, 499).unwrap();
        assert_eq!(request.trigger, FetchTrigger::EndOfLoaded);
        assert_eq!(request.mode, FetchMode::Sequential);
        assert_eq!(request.offset, 400);
        assert_eq!(request.limit, 100);

        load(&mut store, &request);
        assert_eq!(store.sequential_frontier(), 500);
        assert_eq!(store.loaded_count(), 500);
        assert!(store.report_visible_range(490, 499).is_none());
    }

    #[test]
    fn test_frontier_skips_pages_filled_by_centered_fetches() {
        let (mut store, first) = counted(300, 100);
        load(&mut store, &first.unwrap());

        let tail = store.report_visible_range(250, 260).unwrap();
        assert_eq!(tail.mode, FetchMode::Centered);
        assert_eq!(tail.offset, 200);
        load(&mut store, &tail);
        assert_eq!(store.sequential_frontier(), 100);

        let middle = store.report_visible_range(150, 160).unwrap();
        assert_eq!(middle.mode, FetchMode::Sequential);
        assert_eq!(middle.offset, 100);
        load(&mut store, &middle);

        // The tail page was already there, so nothing is left to fetch
        assert_eq!(store.sequential_frontier(), 300);
        assert!(store.report_visible_range(280, 299).is_none());
    }

    #[test]
    fn test_no_end_of_loaded_fetch_once_every_row_is_loaded() {
        let (mut store, first) = counted(150, 100);
        let first = first.unwrap();
        let mut whole = first.clone();
        whole.limit = 150;
        load(&mut store, &whole);
        assert_eq!(store.loaded_count(), 150);

        assert!(store.report_visible_range(130, 149).is_none());
        assert!(!store.is_loading_more());
    }

    #[test]
    fn test_centered_merge_keeps_previously_loaded_ranges() {
        let (mut store, first) = counted(100, 20);
        let first = first.unwrap();
        store.apply_range(&first, api_entries(0..10));

        let mut far = store.report_visible_range(55, 55).unwrap();
        assert_eq!(far.mode, FetchMode::Centered);
        far.offset = 50;
        store.apply_range(&far, api_entries(50..60));
        assert_eq!(
            loaded_indices(&store),
            (0..10).chain(50..60).collect::<Vec<_>>()
        );

        // Rows 20..40 are visible, gap midpoint 30
        let middle = store.report_visible_range(25, 35).unwrap();
        assert_eq!(middle.trigger, FetchTrigger::GapInView);
        assert_eq!(middle.offset, 20);
        assert_eq!(middle.limit, 20);
        load(&mut store, &middle);

        assert_eq!(
            loaded_indices(&store),
            (0..10).chain(20..40).chain(50..60).collect::<Vec<_>>()
        );
        assert_eq!(store.total(), 100);
    }

    #[test]
    fn test_batch_never_extends_past_total() {
        let (mut store, first) = counted(30, 100);
        let first = first.unwrap();
        assert_eq!(first.limit, 30);

        store.apply_range(&first, api_entries(0..45));
        assert_eq!(store.total(), 30);
        assert_eq!(store.loaded_count(), 30);
    }

    #[test]
    fn test_forward_jump_beyond_loaded_prefix() {
        let (mut store, first) = counted(10_000, 100);
        load(&mut store, &first.unwrap());

        // Pretend the rows around 5000 are loaded already, but not the
        // page centered on the jump target.
        let mut around = store.report_visible_range(5000, 5010).unwrap();
        around.offset = 4995;
        around.limit = 25;
        load(&mut store, &around);

        let request = store.report_visible_range(5005, 5009).unwrap();
        assert_eq!(request.trigger, FetchTrigger::ForwardJump);
        assert_eq!(request.offset, 4955);
    }

    #[test]
    fn test_backward_jump_when_top_is_unloaded() {
        let (mut store, first) = counted(1000, 100);
        let first = first.unwrap();
        store.fail_range(&first, "timeout");

        let mut middle = store.report_visible_range(20, 25).unwrap();
        // Simulate a merge that only covered the visible rows
        middle.offset = 5;
        middle.limit = 40;
        load(&mut store, &middle);
        assert!(!store.slots()[0].is_loaded());

        let request = store.report_visible_range(20, 25).unwrap();
        assert_eq!(request.trigger, FetchTrigger::BackwardJump);
        assert_eq!(request.offset, 0);
    }

    #[test]
    fn test_failed_fetch_releases_guard_and_keeps_placeholders() {
        let (mut store, first) = counted(300, 100);
        let first = first.unwrap();
        store.fail_range(&first, "connection reset");

        assert!(!store.is_loading_more());
        assert_eq!(store.loaded_count(), 0);
        let retry = store.report_visible_range(0, 20).unwrap();
        assert_eq!(retry.offset, 0);
    }

    #[test]
    fn test_stale_responses_are_discarded() {
        let (mut store, first) = counted(300, 100);
        let first = first.unwrap();

        // The view changed while the first page was in flight
        let view = ViewState::sorted(SortColumn::Title, SortDirection::Desc);
        let count = store.initialize(1, view);
        assert_eq!(store.apply_range(&first, api_entries(0..100)), RangeOutcome::Stale);

        let next = store.finish_count(count.tag, Ok(300)).unwrap();
        assert_eq!(next.view.sort_column(), SortColumn::Title);

        // A response for another collection is discarded too
        let mut foreign = next.clone();
        foreign.tag.collection_id = 2;
        assert_eq!(store.apply_range(&foreign, api_entries(0..100)), RangeOutcome::Stale);
        assert_eq!(store.loaded_count(), 0);
        assert!(store.is_loading_more());

        assert_eq!(
            store.apply_range(&next, api_entries(0..100)),
            RangeOutcome::Applied { first_load: true }
        );
    }

    #[test]
    fn test_untitled_rows_load_and_are_not_refetched() {
        let (mut store, first) = counted(20, 20);
        let first = first.unwrap();
        let mut rows = api_entries(0..20);
        rows[3].details.title = None;
        rows[4].details.title = Some(String::new());
        store.apply_range(&first, rows);

        assert!(store.slots()[3].is_loaded());
        assert!(store.slots()[4].is_loaded());
        assert_eq!(store.loaded_count(), 20);
        assert!(store.report_visible_range(0, 10).is_none());
    }

    #[test]
    fn test_edit_makes_pages_in_flight_stale() {
        let (mut store, first) = counted(300, 100);
        load(&mut store, &first.unwrap());
        let request = store.report_visible_range(75, 85).unwrap();

        store.edit(|slots| {
            if let Some(entry) = slots[80].entry_mut() {
                entry.notes = String::from("edited");
            }
        });
        assert!(!store.is_loading_more());
        assert_eq!(
            store.apply_range(&request, api_entries(100..200)),
            RangeOutcome::Stale
        );
        assert_eq!(store.slots()[80].entry().unwrap().notes, "edited");
    }

    #[test]
    fn test_length_matches_total_through_edits() {
        let (mut store, first) = counted(50, 20);
        load(&mut store, &first.unwrap());

        store.edit(|slots| {
            slots.truncate(45);
        });
        assert_eq!(store.total(), 45);
        assert_eq!(store.slots().len(), store.total());

        let snapshot = store.snapshot();
        store.edit(|slots| slots.push(Slot::placeholder(45)));
        assert_eq!(store.total(), 46);
        store.restore(&snapshot);
        assert_eq!(store.total(), 45);
    }
}
