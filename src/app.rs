//! Main application state and logic.

use std::time::{Duration, Instant};

use chrono::Utc;
use color_eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::Action;
use crate::client::{send_mutation, PersistenceBridge};
use crate::collection::{
    CollectionId, CountRequest, EntryItem, LoadState, MutationEngine, MutationError, MutationKind,
    PendingMutation, RangeOutcome, RangeRequest, Settlement, TrackDetails,
    WindowedCollectionStore,
};
use crate::config::Config;
use crate::debounce::Debounced;
use crate::storage::{DurableStore, StorageKey};
use crate::ui::{parse_request, BatchAction, GridState, PromptKind, PromptState};
use crate::view::resolver::{apply_writes, view_writes, write_location};
use crate::view::{
    rand_seed, resolve, ColumnKey, ColumnLayout, Location, ScrollPersistence, SortColumn,
    SortDirection, StoredView, ViewState,
};

/// How long status notices stay on screen.
const NOTICE_DURATION: Duration = Duration::from_secs(4);

/// Transient status line message.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    until: Instant,
}

/// Main application state.
pub struct App<B: PersistenceBridge> {
    /// Whether the app should quit
    pub should_quit: bool,

    /// Configuration
    pub config: Config,

    /// Playlist backend
    bridge: B,

    /// Playlist being shown
    pub collection_id: CollectionId,

    /// Shareable location of the current view
    pub location: Location,

    /// Durable client-side state
    pub storage: DurableStore,

    /// Sparse playlist rows
    pub store: WindowedCollectionStore,

    /// Optimistic edits and undo history
    pub mutations: MutationEngine,

    /// Scroll offset persistence
    pub scroll: ScrollPersistence,

    /// Visible columns and widths
    pub columns: ColumnLayout,

    /// Grid selection and viewport
    pub grid: GridState,

    /// Prompt line
    pub prompt: PromptState,

    /// Filter text waiting to be applied
    filter_input: Debounced<String>,

    /// Status line notice
    pub notice: Option<Notice>,

    /// Help overlay visible
    pub show_help: bool,

    /// Error message to display
    pub error_message: Option<String>,

    /// Action sender for async operations
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl<B: PersistenceBridge> App<B> {
    /// Create a new application instance.
    pub fn new(
        config: Config,
        bridge: B,
        storage: DurableStore,
        location: Location,
        collection_id: CollectionId,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            should_quit: false,
            store: WindowedCollectionStore::new(config.grid.store_config()),
            mutations: MutationEngine::new(config.grid.history_limit),
            scroll: ScrollPersistence::new(
                config.persistence.scroll_debounce(),
                config.persistence.restore_suppress(),
            ),
            filter_input: Debounced::new(config.persistence.filter_debounce()),
            config,
            bridge,
            collection_id,
            location,
            storage,
            columns: ColumnLayout::default(),
            grid: GridState::new(),
            prompt: PromptState::new(),
            notice: None,
            show_help: false,
            error_message: None,
            action_tx,
        }
    }

    /// Resolve the view for the current collection and start loading it.
    pub fn mount(&mut self) {
        let stored = StoredView::load(&self.storage, self.collection_id);
        let resolution = resolve(&self.location, &stored, rand_seed);
        resolution.persist(&mut self.storage, self.collection_id);
        if resolution.location_changed {
            info!("Location is now {}", resolution.location);
        }
        self.location = resolution.location;

        self.columns = ColumnLayout::load(&self.storage, self.collection_id);
        let stored_offset = self
            .storage
            .get(self.collection_id, StorageKey::ScrollOffset)
            .and_then(|v| v.parse::<usize>().ok());
        self.scroll.mount(stored_offset);
        self.grid.reset();
        self.mutations.reset();

        self.load(resolution.view);
    }

    /// Whether typed filter text is waiting to be applied.
    pub fn filter_pending(&self) -> bool {
        self.filter_input.is_pending()
    }

    /// Called after every frame with the rows that were drawn.
    pub fn after_render(&mut self) {
        let total = self.store.total();
        if let Some((start, stop)) = self.grid.visible_range(total) {
            if let Some(request) = self.store.report_visible_range(start, stop) {
                self.spawn_range(request);
            }
        }

        if *self.store.load_state() == LoadState::Ready && total > 0 {
            self.scroll.record(self.grid.offset, Instant::now());
        }
    }

    /// Handle an action and update state.
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.scroll.unmount();
                self.should_quit = true;
            }

            Action::Tick => self.on_tick(Instant::now()),

            Action::Resize(_, _) => {
                // The grid measures itself on the next render
            }

            // Navigation
            Action::NavigateUp => self.grid.select_previous(),
            Action::NavigateDown => self.grid.select_next(self.store.total()),
            Action::JumpToTop => self.grid.jump_to_top(),
            Action::JumpToBottom => self.grid.jump_to_bottom(self.store.total()),
            Action::ScrollHalfPageDown => self.grid.scroll_half_page_down(self.store.total()),
            Action::ScrollHalfPageUp => self.grid.scroll_half_page_up(),
            Action::MouseScroll(delta) => self.grid.scroll_by(delta as isize, self.store.total()),

            // Columns
            Action::FocusColumn(delta) => self.columns.move_focus(delta),
            Action::ResizeColumn(delta) => {
                self.columns.resize_focused(delta);
                self.columns.persist(&mut self.storage, self.collection_id);
            }
            Action::ToggleColumn(index) => {
                if let Some(key) = ColumnKey::ALL.get(index) {
                    if self.columns.toggle(*key) {
                        self.columns.persist(&mut self.storage, self.collection_id);
                    } else {
                        self.notify("At least one column must stay visible");
                    }
                }
            }

            // View
            Action::SortByFocusedColumn => {
                let focused = self.columns.focused();
                match focused.sort_column() {
                    Some(column) if column == self.store.view().sort_column() => {
                        self.change_view(|view| {
                            view.sort_direction = view.sort_direction.toggled()
                        });
                    }
                    Some(column) => self.change_view(|view| {
                        view.set_sort(column, rand_seed);
                        view.sort_direction = SortDirection::Asc;
                    }),
                    None => self.notify(format!("Cannot sort by {}", focused.label())),
                }
            }
            Action::ToggleSortDirection => {
                self.change_view(|view| view.sort_direction = view.sort_direction.toggled());
            }
            Action::Shuffle => self.change_view(|view| view.reshuffle(rand_seed())),
            Action::NaturalOrder => {
                self.change_view(|view| view.set_sort(SortColumn::Order, rand_seed));
            }
            Action::ToggleShowHidden => {
                self.change_view(|view| view.show_hidden = !view.show_hidden);
            }

            // Prompt
            Action::OpenPrompt(kind) => {
                let initial = match &kind {
                    PromptKind::Filter => self.store.view().filter.clone(),
                    PromptKind::Notes(id) => self
                        .store
                        .entry(*id)
                        .map(|e| e.notes.clone())
                        .unwrap_or_default(),
                    PromptKind::Replace(id) => self
                        .store
                        .entry(*id)
                        .map(|e| match e.item.artist() {
                            Some(artist) => format!("{} - {}", artist, e.item.title()),
                            None => e.item.title().to_string(),
                        })
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                self.prompt.open(kind, initial);
            }
            Action::PromptInput(c) => {
                self.prompt.push(c);
                self.schedule_filter();
            }
            Action::PromptBackspace => {
                self.prompt.backspace();
                self.schedule_filter();
            }
            Action::PromptSubmit => self.submit_prompt()?,
            Action::PromptCancel => {
                if let Some((PromptKind::Filter, _)) = self.prompt.close() {
                    self.filter_input.cancel();
                }
            }

            // Editing
            Action::ToggleMark => {
                if let Some(id) = self.grid.selected_entry(&self.store).map(|e| e.id) {
                    self.grid.toggle_mark(id);
                    self.grid.select_next(self.store.total());
                }
            }
            Action::ClearMarks => self.grid.marked.clear(),
            Action::RemoveSelected => {
                let ids = self.grid.targets(&self.store);
                if ids.len() > 1 {
                    self.prompt.open(PromptKind::Confirm(BatchAction::Remove(ids)), "");
                } else {
                    let result = self.mutations.remove(&mut self.store, &ids);
                    self.submit_mutation(result);
                }
            }
            Action::ToggleHiddenSelected => {
                let ids = self.grid.targets(&self.store);
                let all_hidden = !ids.is_empty()
                    && ids
                        .iter()
                        .all(|id| self.store.entry(*id).is_some_and(|e| e.hidden));
                if !all_hidden && ids.len() > 1 {
                    self.prompt.open(PromptKind::Confirm(BatchAction::Hide(ids)), "");
                } else {
                    let result = self
                        .mutations
                        .set_hidden(&mut self.store, &ids, !all_hidden, Utc::now());
                    self.submit_mutation(result);
                }
            }
            Action::MoveSelected(delta) => self.move_selected(delta),
            Action::AddRequested { artist, title } => {
                let item = EntryItem::Requested(TrackDetails {
                    title,
                    artist,
                    ..TrackDetails::default()
                });
                let result = self.mutations.add(&mut self.store, vec![item]);
                if result.is_ok() && self.store.view().sort_direction != SortDirection::Desc {
                    self.grid.jump_to_bottom(self.store.total());
                }
                self.submit_mutation(result);
            }
            Action::EditNotes(id, notes) => {
                let result = self.mutations.edit_notes(&mut self.store, id, notes);
                self.submit_mutation(result);
            }
            Action::ReplaceEntry(id, item) => {
                let result = self.mutations.replace(&mut self.store, id, item);
                self.submit_mutation(result);
            }
            Action::Undo => {
                if self.mutations.undo(&mut self.store) {
                    self.grid.clamp(self.store.total());
                    self.notify("Undone");
                } else {
                    self.notify("Nothing to undo");
                }
            }
            Action::Redo => {
                if self.mutations.redo(&mut self.store) {
                    self.grid.clamp(self.store.total());
                    self.notify("Redone");
                } else {
                    self.notify("Nothing to redo");
                }
            }

            // Loading
            Action::Retry => {
                if matches!(self.store.load_state(), LoadState::Failed(_)) {
                    if let Some(request) = self.store.retry() {
                        self.spawn_count(request);
                    }
                }
            }
            Action::OpenCollection(id) => self.open_collection(id),

            // Bridge responses
            Action::CountLoaded { tag, result } => {
                if let Some(request) = self.store.finish_count(tag, result) {
                    self.spawn_range(request);
                }
            }
            Action::RangeLoaded { request, result } => match result {
                Ok(entries) => {
                    if let RangeOutcome::Applied { first_load: true } =
                        self.store.apply_range(&request, entries)
                    {
                        if let Some(offset) = self.scroll.take_restore(Instant::now()) {
                            self.grid.scroll_to(offset, self.store.total());
                        }
                    }
                }
                Err(e) => self.store.fail_range(&request, &e),
            },
            Action::MutationSettled { id, result } => {
                let error = result.as_ref().err().cloned();
                match self.mutations.settle(&mut self.store, id, result) {
                    Settlement::Confirmed(kind) if kind.confirms_success() => {
                        self.notify(match kind {
                            MutationKind::EditNotes => "Notes saved",
                            _ => "Entry replaced",
                        });
                    }
                    Settlement::Confirmed(_) => {}
                    Settlement::RolledBack(kind) => {
                        self.grid.clamp(self.store.total());
                        self.notify_error(format!(
                            "Failed to {}: {}",
                            kind.label(),
                            error.unwrap_or_default()
                        ));
                    }
                    Settlement::Forgotten => {
                        // Nothing left to roll back to, so the grid may disagree with the server
                        if let Some(e) = error {
                            self.error_message = Some(format!(
                                "An earlier change was not saved: {}\n\n\
                                 Reopen the playlist to see the server's state.",
                                e
                            ));
                        }
                    }
                }
            }

            // Overlays
            Action::ShowHelp => self.show_help = true,
            Action::HideHelp => self.show_help = false,

            // Errors
            Action::ClearError => {
                self.error_message = None;
            }

            Action::None => {}
        }
        Ok(())
    }

    fn on_tick(&mut self, now: Instant) {
        if let Some(filter) = self.filter_input.poll(now) {
            self.change_view(|view| view.filter = filter.trim().to_string());
        }
        if let Some(offset) = self.scroll.poll_save(now) {
            debug!("Saving scroll offset {}", offset);
            self.storage
                .set(self.collection_id, StorageKey::ScrollOffset, offset.to_string());
        }
        if self.notice.as_ref().is_some_and(|n| now >= n.until) {
            self.notice = None;
        }
    }

    /// Switch to another playlist.
    fn open_collection(&mut self, id: CollectionId) {
        info!("Opening playlist {}", id);
        self.scroll.unmount();
        self.filter_input.cancel();
        self.prompt.close();
        self.collection_id = id;
        self.location = Location::new(format!("/playlist/{}", id));
        self.mount();
    }

    /// Apply a user-driven view change: persist it, rewrite the location and
    /// reload from the top.
    fn change_view(&mut self, change: impl FnOnce(&mut ViewState)) {
        let mut view = self.store.view().clone();
        change(&mut view);
        if view == *self.store.view() {
            return;
        }

        apply_writes(&mut self.storage, self.collection_id, &view_writes(&view));
        write_location(&mut self.location, &view);
        self.mutations.reset();
        self.grid.reset();
        self.load(view);
    }

    fn load(&mut self, view: ViewState) {
        let request = self.store.initialize(self.collection_id, view);
        self.spawn_count(request);
    }

    fn schedule_filter(&mut self) {
        if self.prompt.kind == Some(PromptKind::Filter) {
            self.filter_input
                .schedule(self.prompt.input.clone(), Instant::now());
        }
    }

    fn submit_prompt(&mut self) -> Result<()> {
        let Some((kind, input)) = self.prompt.close() else {
            return Ok(());
        };

        match kind {
            PromptKind::Filter => {
                self.filter_input.cancel();
                self.change_view(|view| view.filter = input.trim().to_string());
            }
            PromptKind::Notes(id) => self.action_tx.send(Action::EditNotes(id, input))?,
            PromptKind::AddRequest => {
                if let Some((artist, title)) = parse_request(&input) {
                    self.action_tx.send(Action::AddRequested { artist, title })?;
                }
            }
            PromptKind::Replace(id) => {
                if let Some((artist, title)) = parse_request(&input) {
                    let item = EntryItem::Requested(TrackDetails {
                        title,
                        artist,
                        ..TrackDetails::default()
                    });
                    self.action_tx.send(Action::ReplaceEntry(id, item))?;
                }
            }
            PromptKind::OpenCollection => match input.trim().parse::<CollectionId>() {
                Ok(id) => self.action_tx.send(Action::OpenCollection(id))?,
                Err(_) => self.notify_error(format!("Not a playlist id: {}", input.trim())),
            },
            PromptKind::Confirm(BatchAction::Remove(ids)) => {
                let result = self.mutations.remove(&mut self.store, &ids);
                self.submit_mutation(result);
            }
            PromptKind::Confirm(BatchAction::Hide(ids)) => {
                let result = self
                    .mutations
                    .set_hidden(&mut self.store, &ids, true, Utc::now());
                self.submit_mutation(result);
            }
        }
        Ok(())
    }

    /// Move the targeted entries one or more rows up or down.
    fn move_selected(&mut self, delta: isize) {
        let ids = self.grid.targets(&self.store);
        let Some(first) = ids.iter().filter_map(|id| self.store.index_of(*id)).min() else {
            return;
        };
        let destination = if delta < 0 {
            first.saturating_sub(delta.unsigned_abs())
        } else {
            first + delta as usize
        };

        let result = self.mutations.reorder(&mut self.store, &ids, destination);
        if result.is_ok() {
            if let Some(index) = self.store.index_of(ids[0]) {
                self.grid.selected = index;
            }
        }
        self.submit_mutation(result);
    }

    fn submit_mutation(&mut self, result: Result<PendingMutation, MutationError>) {
        match result {
            Ok(pending) => {
                self.grid.marked.clear();
                self.grid.clamp(self.store.total());
                self.spawn_mutation(pending);
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
            until: Instant::now() + NOTICE_DURATION,
        });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::warn!("{}", text);
        self.notice = Some(Notice {
            text,
            is_error: true,
            until: Instant::now() + NOTICE_DURATION,
        });
    }

    fn spawn_count(&self, request: CountRequest) {
        let bridge = self.bridge.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = bridge
                .get_count(request.tag.collection_id, &request.view)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::CountLoaded {
                tag: request.tag,
                result,
            });
        });
    }

    fn spawn_range(&self, request: RangeRequest) {
        let bridge = self.bridge.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = bridge
                .get_range(
                    request.tag.collection_id,
                    &request.view,
                    request.offset,
                    request.limit,
                )
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::RangeLoaded { request, result });
        });
    }

    fn spawn_mutation(&self, pending: PendingMutation) {
        let bridge = self.bridge.clone();
        let tx = self.action_tx.clone();
        let collection_id = self.collection_id;
        tokio::spawn(async move {
            let result = send_mutation(&bridge, collection_id, &pending.remote)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Action::MutationSettled {
                id: pending.id,
                result,
            });
        });
    }
}
