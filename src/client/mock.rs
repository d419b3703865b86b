//! In-memory bridge for controller tests.

use std::sync::{Arc, Mutex};

use super::bridge::{BridgeError, PersistenceBridge};
use super::models::ApiEntry;
use crate::collection::{CollectionEntry, CollectionId, EntryId};
use crate::view::ViewState;

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Count {
        collection_id: CollectionId,
        view: ViewState,
    },
    Range {
        collection_id: CollectionId,
        view: ViewState,
        offset: usize,
        limit: usize,
    },
    Add(Vec<EntryId>),
    Remove(Vec<EntryId>),
    Reorder(Vec<EntryId>, usize),
    SetHidden(Vec<EntryId>, bool),
    Notes(EntryId, String),
    Replace(EntryId),
}

#[derive(Debug, Default)]
struct MockState {
    entries: Vec<ApiEntry>,
    fail_counts: bool,
    fail_mutations: bool,
    calls: Vec<MockCall>,
}

/// Serves a fixed entry list and records every call.
#[derive(Debug, Clone, Default)]
pub struct MockBridge {
    state: Arc<Mutex<MockState>>,
}

impl MockBridge {
    pub fn with_entries(total: usize) -> Self {
        let entries = (0..total)
            .map(|i| {
                CollectionEntry::requested(i as EntryId, i, None, format!("Track {}", i)).to_api()
            })
            .collect();
        let bridge = Self::default();
        bridge.state.lock().unwrap().entries = entries;
        bridge
    }

    pub fn fail_counts(&self, fail: bool) {
        self.state.lock().unwrap().fail_counts = fail;
    }

    pub fn fail_mutations(&self, fail: bool) {
        self.state.lock().unwrap().fail_mutations = fail;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: MockCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn mutation_result(&self) -> Result<(), BridgeError> {
        if self.state.lock().unwrap().fail_mutations {
            return Err(BridgeError::Server {
                status: 500,
                message: String::from("storage unavailable"),
            });
        }
        Ok(())
    }
}

fn ids(entries: &[ApiEntry]) -> Vec<EntryId> {
    entries.iter().map(|e| e.id).collect()
}

impl PersistenceBridge for MockBridge {
    async fn get_count(
        &self,
        collection_id: CollectionId,
        view: &ViewState,
    ) -> Result<usize, BridgeError> {
        self.record(MockCall::Count {
            collection_id,
            view: view.clone(),
        });
        let state = self.state.lock().unwrap();
        if state.fail_counts {
            return Err(BridgeError::InvalidResponse(String::from("count unavailable")));
        }
        Ok(state.entries.len())
    }

    async fn get_range(
        &self,
        collection_id: CollectionId,
        view: &ViewState,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ApiEntry>, BridgeError> {
        self.record(MockCall::Range {
            collection_id,
            view: view.clone(),
            offset,
            limit,
        });
        let state = self.state.lock().unwrap();
        let end = (offset + limit).min(state.entries.len());
        Ok(state.entries.get(offset..end).unwrap_or_default().to_vec())
    }

    async fn add_entries(
        &self,
        _collection_id: CollectionId,
        entries: &[ApiEntry],
    ) -> Result<(), BridgeError> {
        self.record(MockCall::Add(ids(entries)));
        self.mutation_result()
    }

    async fn remove_entries(
        &self,
        _collection_id: CollectionId,
        entries: &[ApiEntry],
    ) -> Result<(), BridgeError> {
        self.record(MockCall::Remove(ids(entries)));
        self.mutation_result()
    }

    async fn reorder_entries(
        &self,
        _collection_id: CollectionId,
        entries: &[ApiEntry],
        destination: usize,
    ) -> Result<(), BridgeError> {
        self.record(MockCall::Reorder(ids(entries), destination));
        self.mutation_result()
    }

    async fn set_hidden(
        &self,
        _collection_id: CollectionId,
        entry_ids: &[EntryId],
        hidden: bool,
    ) -> Result<(), BridgeError> {
        self.record(MockCall::SetHidden(entry_ids.to_vec(), hidden));
        self.mutation_result()
    }

    async fn update_notes(
        &self,
        _collection_id: CollectionId,
        entry_id: EntryId,
        notes: &str,
    ) -> Result<(), BridgeError> {
        self.record(MockCall::Notes(entry_id, notes.to_string()));
        self.mutation_result()
    }

    async fn replace_entry(
        &self,
        _collection_id: CollectionId,
        entry_id: EntryId,
        _entry: &ApiEntry,
    ) -> Result<(), BridgeError> {
        self.record(MockCall::Replace(entry_id));
        self.mutation_result()
    }
}
