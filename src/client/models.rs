//! Playlist server wire models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::{EntryId, EntryType};

// ============================================================================
// Entries
// ============================================================================

/// A playlist entry as the server sends and accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEntry {
    pub id: EntryId,
    pub order: usize,
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_hidden: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: ApiDetails,
}

/// Union of every variant's detail fields. Which ones are meaningful depends
/// on `entry_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musicbrainz_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Star rating (0-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_url: Option<String>,
    /// Album track listing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<ApiTrackRef>,
    /// Referenced playlist for nested playlist entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_count: Option<usize>,
}

/// Track reference nested in an album entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiTrackRef {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_file_id: Option<EntryId>,
}

// ============================================================================
// Responses
// ============================================================================

/// Response for the entry count endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub total: usize,
}

/// Response for the entry range endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RangeResponse {
    #[serde(default)]
    pub entries: Vec<ApiEntry>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(alias = "detail", alias = "message")]
    pub error: String,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct EntriesBody<'a> {
    pub entries: &'a [ApiEntry],
}

#[derive(Debug, Clone, Serialize)]
pub struct ReorderBody<'a> {
    pub entries: &'a [ApiEntry],
    pub new_position: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HideBody<'a> {
    pub entry_ids: &'a [EntryId],
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotesBody<'a> {
    pub notes: &'a str,
}
