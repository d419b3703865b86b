//! Collection entries and the sparse slots that hold them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::models::{ApiDetails, ApiEntry, ApiTrackRef};

/// Server-assigned entry identifier. Client-synthesized entries use negative ids.
pub type EntryId = i64;

/// Playlist identifier.
pub type CollectionId = i64;

/// Entry type tag as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    MusicFile,
    Lastfm,
    Requested,
    RequestedAlbum,
    Album,
    NestedPlaylist,
}

impl EntryType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MusicFile => "file",
            Self::Lastfm => "last.fm",
            Self::Requested => "request",
            Self::RequestedAlbum => "album req",
            Self::Album => "album",
            Self::NestedPlaylist => "playlist",
        }
    }
}

/// Details shared by every track-shaped variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDetails {
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub year: Option<i32>,
    pub duration_secs: Option<u32>,
    pub genres: Vec<String>,
    pub path: Option<String>,
    pub size: Option<u64>,
    pub spotify_uri: Option<String>,
    pub youtube_url: Option<String>,
    pub musicbrainz_id: Option<String>,
    pub lastfm_url: Option<String>,
    pub rating: Option<u8>,
    pub art_url: Option<String>,
}

/// Track reference inside an album entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRef {
    pub title: String,
    pub artist: Option<String>,
    pub duration_secs: Option<u32>,
    pub music_file_id: Option<EntryId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumDetails {
    pub title: String,
    pub artist: Option<String>,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub art_url: Option<String>,
    pub spotify_uri: Option<String>,
    pub musicbrainz_id: Option<String>,
    pub tracks: Vec<TrackRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NestedPlaylistDetails {
    pub title: String,
    /// Absent when the target playlist was deleted server-side
    pub playlist_id: Option<CollectionId>,
    pub entry_count: Option<usize>,
}

/// What an entry points at.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryItem {
    MusicFile(TrackDetails),
    Lastfm(TrackDetails),
    Requested(TrackDetails),
    RequestedAlbum(AlbumDetails),
    Album(AlbumDetails),
    NestedPlaylist(NestedPlaylistDetails),
}

impl EntryItem {
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::MusicFile(_) => EntryType::MusicFile,
            Self::Lastfm(_) => EntryType::Lastfm,
            Self::Requested(_) => EntryType::Requested,
            Self::RequestedAlbum(_) => EntryType::RequestedAlbum,
            Self::Album(_) => EntryType::Album,
            Self::NestedPlaylist(_) => EntryType::NestedPlaylist,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => &t.title,
            Self::RequestedAlbum(a) | Self::Album(a) => &a.title,
            Self::NestedPlaylist(p) => &p.title,
        }
    }

    pub fn artist(&self) -> Option<&str> {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => t.artist.as_deref(),
            Self::RequestedAlbum(a) | Self::Album(a) => a.artist.as_deref(),
            Self::NestedPlaylist(_) => None,
        }
    }

    /// Album name; albums report their own title.
    pub fn album(&self) -> Option<&str> {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => t.album.as_deref(),
            Self::RequestedAlbum(a) | Self::Album(a) => Some(&a.title),
            Self::NestedPlaylist(_) => None,
        }
    }

    pub fn album_artist(&self) -> Option<&str> {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => t.album_artist.as_deref(),
            Self::RequestedAlbum(a) | Self::Album(a) => a.artist.as_deref(),
            Self::NestedPlaylist(_) => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => t.year,
            Self::RequestedAlbum(a) | Self::Album(a) => a.year,
            Self::NestedPlaylist(_) => None,
        }
    }

    /// Duration in seconds. Albums sum their known track lengths.
    pub fn duration_secs(&self) -> Option<u32> {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => t.duration_secs,
            Self::RequestedAlbum(a) | Self::Album(a) => {
                let known: Vec<u32> = a.tracks.iter().filter_map(|t| t.duration_secs).collect();
                (!known.is_empty()).then(|| known.iter().sum())
            }
            Self::NestedPlaylist(_) => None,
        }
    }

    pub fn genres(&self) -> &[String] {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => &t.genres,
            Self::RequestedAlbum(a) | Self::Album(a) => &a.genres,
            Self::NestedPlaylist(_) => &[],
        }
    }

    fn to_api_details(&self) -> ApiDetails {
        match self {
            Self::MusicFile(t) | Self::Lastfm(t) | Self::Requested(t) => ApiDetails {
                title: Some(t.title.clone()),
                artist: t.artist.clone(),
                album: t.album.clone(),
                album_artist: t.album_artist.clone(),
                year: t.year,
                length: t.duration_secs,
                genres: t.genres.clone(),
                path: t.path.clone(),
                size: t.size,
                spotify_uri: t.spotify_uri.clone(),
                youtube_url: t.youtube_url.clone(),
                musicbrainz_id: t.musicbrainz_id.clone(),
                url: t.lastfm_url.clone(),
                rating: t.rating,
                art_url: t.art_url.clone(),
                ..ApiDetails::default()
            },
            Self::RequestedAlbum(a) | Self::Album(a) => ApiDetails {
                title: Some(a.title.clone()),
                artist: a.artist.clone(),
                year: a.year,
                genres: a.genres.clone(),
                art_url: a.art_url.clone(),
                spotify_uri: a.spotify_uri.clone(),
                musicbrainz_id: a.musicbrainz_id.clone(),
                tracks: a
                    .tracks
                    .iter()
                    .map(|t| ApiTrackRef {
                        title: t.title.clone(),
                        artist: t.artist.clone(),
                        length: t.duration_secs,
                        music_file_id: t.music_file_id,
                    })
                    .collect(),
                ..ApiDetails::default()
            },
            Self::NestedPlaylist(p) => ApiDetails {
                title: Some(p.title.clone()),
                playlist_id: p.playlist_id,
                entry_count: p.entry_count,
                ..ApiDetails::default()
            },
        }
    }

    /// Build the variant for `entry_type` from wire details. A missing title
    /// decodes as an empty one so the row still counts as loaded.
    fn from_api_details(entry_type: EntryType, mut details: ApiDetails) -> Self {
        let title = details.title.take().unwrap_or_default();

        let track = |title: String, d: ApiDetails| TrackDetails {
            title,
            artist: d.artist,
            album: d.album,
            album_artist: d.album_artist,
            year: d.year,
            duration_secs: d.length,
            genres: d.genres,
            path: d.path,
            size: d.size,
            spotify_uri: d.spotify_uri,
            youtube_url: d.youtube_url,
            musicbrainz_id: d.musicbrainz_id,
            lastfm_url: d.url,
            rating: d.rating,
            art_url: d.art_url,
        };
        let album = |title: String, d: ApiDetails| AlbumDetails {
            title,
            artist: d.artist,
            year: d.year,
            genres: d.genres,
            art_url: d.art_url,
            spotify_uri: d.spotify_uri,
            musicbrainz_id: d.musicbrainz_id,
            tracks: d
                .tracks
                .into_iter()
                .map(|t| TrackRef {
                    title: t.title,
                    artist: t.artist,
                    duration_secs: t.length,
                    music_file_id: t.music_file_id,
                })
                .collect(),
        };

        match entry_type {
            EntryType::MusicFile => Self::MusicFile(track(title, details)),
            EntryType::Lastfm => Self::Lastfm(track(title, details)),
            EntryType::Requested => Self::Requested(track(title, details)),
            EntryType::RequestedAlbum => Self::RequestedAlbum(album(title, details)),
            EntryType::Album => Self::Album(album(title, details)),
            EntryType::NestedPlaylist => Self::NestedPlaylist(NestedPlaylistDetails {
                title,
                playlist_id: details.playlist_id,
                entry_count: details.entry_count,
            }),
        }
    }
}

/// A fully detailed playlist entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    pub id: EntryId,
    /// Dense zero-based rank in natural order
    pub order: usize,
    pub notes: String,
    pub hidden: bool,
    pub hidden_at: Option<DateTime<Utc>>,
    pub item: EntryItem,
}

impl CollectionEntry {
    /// A manual "requested" track entry.
    pub fn requested(id: EntryId, order: usize, artist: Option<String>, title: String) -> Self {
        Self {
            id,
            order,
            notes: String::new(),
            hidden: false,
            hidden_at: None,
            item: EntryItem::Requested(TrackDetails {
                title,
                artist,
                ..TrackDetails::default()
            }),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        self.item.entry_type()
    }

    pub fn set_hidden(&mut self, hidden: bool, now: DateTime<Utc>) {
        self.hidden = hidden;
        self.hidden_at = hidden.then_some(now);
    }

    /// Get a display-friendly duration string (e.g., "3:45").
    pub fn duration_string(&self) -> String {
        match self.item.duration_secs() {
            Some(secs) => format!("{}:{:02}", secs / 60, secs % 60),
            None => String::from("--:--"),
        }
    }

    pub fn to_api(&self) -> ApiEntry {
        ApiEntry {
            id: self.id,
            order: self.order,
            entry_type: self.entry_type(),
            notes: (!self.notes.is_empty()).then(|| self.notes.clone()),
            is_hidden: self.hidden,
            date_hidden: self.hidden_at,
            details: self.item.to_api_details(),
        }
    }

    /// Decode a wire entry. Every row the server returns decodes as loaded.
    pub fn from_api(api: ApiEntry) -> Self {
        let ApiEntry {
            id,
            order,
            entry_type,
            notes,
            is_hidden,
            date_hidden,
            details,
        } = api;

        if details.title.as_deref().map_or(true, str::is_empty) {
            tracing::debug!("Entry {} arrived without a title", id);
        }

        Self {
            id,
            order,
            notes: notes.unwrap_or_default(),
            hidden: is_hidden,
            hidden_at: date_hidden,
            item: EntryItem::from_api_details(entry_type, details),
        }
    }
}

/// Stand-in for a position whose details have not been fetched yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPlaceholder {
    pub order: usize,
}

/// One position of the sparse collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Placeholder(EntryPlaceholder),
    Loaded(Box<CollectionEntry>),
}

impl Slot {
    /// Placeholder for an unfetched position.
    pub fn placeholder(index: usize) -> Self {
        Self::Placeholder(EntryPlaceholder { order: index })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn entry(&self) -> Option<&CollectionEntry> {
        match self {
            Self::Loaded(entry) => Some(entry),
            Self::Placeholder(_) => None,
        }
    }

    pub fn entry_mut(&mut self) -> Option<&mut CollectionEntry> {
        match self {
            Self::Loaded(entry) => Some(entry),
            Self::Placeholder(_) => None,
        }
    }

    pub fn id(&self) -> Option<EntryId> {
        match self {
            Self::Loaded(entry) => Some(entry.id),
            Self::Placeholder(_) => None,
        }
    }

    pub fn order(&self) -> usize {
        match self {
            Self::Loaded(entry) => entry.order,
            Self::Placeholder(p) => p.order,
        }
    }

    pub fn set_order(&mut self, order: usize) {
        match self {
            Self::Loaded(entry) => entry.order = order,
            Self::Placeholder(p) => p.order = order,
        }
    }
}

impl From<CollectionEntry> for Slot {
    fn from(entry: CollectionEntry) -> Self {
        Self::Loaded(Box::new(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music_file() -> CollectionEntry {
        CollectionEntry {
            id: 42,
            order: 7,
            notes: String::from("opener"),
            hidden: false,
            hidden_at: None,
            item: EntryItem::MusicFile(TrackDetails {
                title: String::from("Roygbiv"),
                artist: Some(String::from("Boards of Canada")),
                album: Some(String::from("Music Has the Right to Children")),
                album_artist: Some(String::from("Boards of Canada")),
                year: Some(1998),
                duration_secs: Some(151),
                genres: vec![String::from("IDM"), String::from("Ambient")],
                path: Some(String::from("/music/boc/roygbiv.flac")),
                size: Some(18_220_000),
                spotify_uri: Some(String::from("spotify:track:abc")),
                youtube_url: None,
                musicbrainz_id: Some(String::from("mbid-1")),
                lastfm_url: None,
                rating: Some(5),
                art_url: Some(String::from("https://art.example/boc.jpg")),
            }),
        }
    }

    #[test]
    fn test_api_round_trip_preserves_track_details() {
        let entry = music_file();
        assert_eq!(CollectionEntry::from_api(entry.to_api()), entry);
    }

    #[test]
    fn test_api_round_trip_preserves_album_tracks_and_hidden_state() {
        let now = Utc::now();
        let mut entry = CollectionEntry {
            id: 5,
            order: 0,
            notes: String::new(),
            hidden: false,
            hidden_at: None,
            item: EntryItem::Album(AlbumDetails {
                title: String::from("Selected Ambient Works 85-92"),
                artist: Some(String::from("Aphex Twin")),
                year: Some(1992),
                tracks: vec![
                    TrackRef {
                        title: String::from("Xtal"),
                        artist: None,
                        duration_secs: Some(291),
                        music_file_id: Some(900),
                    },
                    TrackRef {
                        title: String::from("Tha"),
                        artist: None,
                        duration_secs: Some(547),
                        music_file_id: None,
                    },
                ],
                ..AlbumDetails::default()
            }),
        };
        entry.set_hidden(true, now);

        let api = entry.to_api();
        assert_eq!(api.entry_type, EntryType::Album);
        assert_eq!(api.details.tracks.len(), 2);

        assert_eq!(CollectionEntry::from_api(api), entry);
        assert_eq!(entry.item.duration_secs(), Some(838));
    }

    #[test]
    fn test_missing_title_still_decodes_the_entry() {
        let mut api = music_file().to_api();
        api.details.title = None;

        let entry = CollectionEntry::from_api(api.clone());
        assert_eq!(entry.id, 42);
        assert_eq!(entry.order, 7);
        assert_eq!(entry.item.title(), "");
        assert_eq!(entry.item.artist(), Some("Boards of Canada"));

        api.details.title = Some(String::new());
        assert_eq!(CollectionEntry::from_api(api).entry_type(), EntryType::MusicFile);
    }

    #[test]
    fn test_nested_playlist_without_target_still_decodes() {
        let entry = CollectionEntry {
            id: 3,
            order: 1,
            notes: String::new(),
            hidden: false,
            hidden_at: None,
            item: EntryItem::NestedPlaylist(NestedPlaylistDetails {
                title: String::from("Warmup"),
                playlist_id: Some(12),
                entry_count: Some(40),
            }),
        };
        let mut api = entry.to_api();
        assert_eq!(CollectionEntry::from_api(api.clone()), entry);

        api.details.playlist_id = None;
        let decoded = CollectionEntry::from_api(api);
        assert_eq!(decoded.entry_type(), EntryType::NestedPlaylist);
        assert_eq!(decoded.item.title(), "Warmup");
    }

    #[test]
    fn test_requested_entry_and_duration_string() {
        let entry = CollectionEntry::requested(
            -1,
            3,
            Some(String::from("Burial")),
            String::from("Archangel"),
        );
        assert_eq!(entry.entry_type(), EntryType::Requested);
        assert_eq!(entry.item.artist(), Some("Burial"));
        assert_eq!(entry.duration_string(), "--:--");
        assert_eq!(music_file().duration_string(), "2:31");
    }
}
