//! Contract between the grid and whatever stores the playlist.

use std::future::Future;

use thiserror::Error;

use super::models::ApiEntry;
use crate::collection::{CollectionId, EntryId, RemoteMutation};
use crate::view::ViewState;

/// Backend errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Playlist persistence backend.
///
/// Range queries carry the whole view (filter, sort, direction, random seed,
/// hidden visibility) so the backend can page through the same ordering the
/// count was taken under.
pub trait PersistenceBridge: Clone + Send + Sync + 'static {
    fn get_count(
        &self,
        collection_id: CollectionId,
        view: &ViewState,
    ) -> impl Future<Output = Result<usize, BridgeError>> + Send;

    fn get_range(
        &self,
        collection_id: CollectionId,
        view: &ViewState,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ApiEntry>, BridgeError>> + Send;

    fn add_entries(
        &self,
        collection_id: CollectionId,
        entries: &[ApiEntry],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn remove_entries(
        &self,
        collection_id: CollectionId,
        entries: &[ApiEntry],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn reorder_entries(
        &self,
        collection_id: CollectionId,
        entries: &[ApiEntry],
        destination: usize,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn set_hidden(
        &self,
        collection_id: CollectionId,
        entry_ids: &[EntryId],
        hidden: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn update_notes(
        &self,
        collection_id: CollectionId,
        entry_id: EntryId,
        notes: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn replace_entry(
        &self,
        collection_id: CollectionId,
        entry_id: EntryId,
        entry: &ApiEntry,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}

/// Send the remote half of an optimistic edit.
pub async fn send_mutation<B: PersistenceBridge>(
    bridge: &B,
    collection_id: CollectionId,
    remote: &RemoteMutation,
) -> Result<(), BridgeError> {
    match remote {
        RemoteMutation::Add { entries } => bridge.add_entries(collection_id, entries).await,
        RemoteMutation::Remove { entries } => bridge.remove_entries(collection_id, entries).await,
        RemoteMutation::Reorder {
            entries,
            destination,
        } => {
            bridge
                .reorder_entries(collection_id, entries, *destination)
                .await
        }
        RemoteMutation::SetHidden { entry_ids, hidden } => {
            bridge.set_hidden(collection_id, entry_ids, *hidden).await
        }
        RemoteMutation::UpdateNotes { entry_id, notes } => {
            bridge.update_notes(collection_id, *entry_id, notes).await
        }
        RemoteMutation::Replace { entry_id, entry } => {
            bridge.replace_entry(collection_id, *entry_id, entry).await
        }
    }
}
