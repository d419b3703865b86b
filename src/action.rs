//! Application actions/events that drive state changes.

use crate::client::models::ApiEntry;
use crate::collection::{CollectionId, EntryId, EntryItem, MutationId, RangeRequest, RequestTag};
use crate::ui::PromptKind;

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Action {
    // Application lifecycle
    Quit,
    Tick,
    Resize(u16, u16),

    // Navigation
    NavigateUp,
    NavigateDown,
    JumpToTop,
    JumpToBottom,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    MouseScroll(i16), // positive = down, negative = up

    // Columns
    FocusColumn(isize),
    ResizeColumn(i16),
    ToggleColumn(usize),

    // View
    SortByFocusedColumn,
    ToggleSortDirection,
    Shuffle,
    NaturalOrder,
    ToggleShowHidden,

    // Prompt
    OpenPrompt(PromptKind),
    PromptInput(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,

    // Editing
    ToggleMark,
    ClearMarks,
    RemoveSelected,
    ToggleHiddenSelected,
    MoveSelected(isize), // up (-1) or down (+1)
    AddRequested {
        artist: Option<String>,
        title: String,
    },
    EditNotes(EntryId, String),
    ReplaceEntry(EntryId, EntryItem),
    Undo,
    Redo,

    // Loading
    Retry,
    OpenCollection(CollectionId),

    // Bridge responses
    CountLoaded {
        tag: RequestTag,
        result: Result<usize, String>,
    },
    RangeLoaded {
        request: RangeRequest,
        result: Result<Vec<ApiEntry>, String>,
    },
    MutationSettled {
        id: MutationId,
        result: Result<(), String>,
    },

    // Overlays
    ShowHelp,
    HideHelp,

    // Errors
    ClearError,

    // No-op
    None,
}
