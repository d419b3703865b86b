//! Client-side model of a server-backed playlist.

pub mod entry;
pub mod history;
pub mod mutation;
pub mod store;

pub use entry::{CollectionEntry, CollectionId, EntryId, EntryItem, EntryType, Slot, TrackDetails};
pub use history::DEFAULT_HISTORY_LIMIT;
pub use mutation::{
    MutationEngine, MutationError, MutationId, MutationKind, PendingMutation, RemoteMutation,
    Settlement,
};
pub use store::{
    CountRequest, LoadState, RangeOutcome, RangeRequest, RequestTag, StoreConfig,
    WindowedCollectionStore,
};
