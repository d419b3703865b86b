//! Application configuration management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::collection::store::{DEFAULT_END_MARGIN, DEFAULT_PAGE_SIZE, DEFAULT_VIEW_BUFFER};
use crate::collection::{CollectionId, StoreConfig, DEFAULT_HISTORY_LIMIT};
use crate::storage::DEFAULT_EXPIRY_DAYS;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Grid paging and history
    #[serde(default)]
    pub grid: GridConfig,

    /// Client-side state persistence
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Server connection configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server URL (e.g., "https://music.example.com")
    #[serde(default)]
    pub url: String,

    /// Bearer token (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Playlist opened at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionId>,
}

/// Grid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Rows per fetch
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Rows around the viewport that must be loaded
    #[serde(default = "default_view_buffer")]
    pub view_buffer: usize,

    /// Prefetch distance before the end of sequentially loaded rows
    #[serde(default = "default_end_margin")]
    pub end_margin: usize,

    /// Undo depth
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// State file (defaults to the platform data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    /// Days a stored value stays valid after its last write
    #[serde(default = "default_expiry_days")]
    pub expiry_days: i64,

    #[serde(default = "default_scroll_debounce_ms")]
    pub scroll_debounce_ms: u64,

    /// Saves ignored for this long after restoring a scroll position
    #[serde(default = "default_restore_suppress_ms")]
    pub restore_suppress_ms: u64,

    #[serde(default = "default_filter_debounce_ms")]
    pub filter_debounce_ms: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_view_buffer() -> usize {
    DEFAULT_VIEW_BUFFER
}

fn default_end_margin() -> usize {
    DEFAULT_END_MARGIN
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_expiry_days() -> i64 {
    DEFAULT_EXPIRY_DAYS
}

fn default_scroll_debounce_ms() -> u64 {
    1000
}

fn default_restore_suppress_ms() -> u64 {
    750
}

fn default_filter_debounce_ms() -> u64 {
    300
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            view_buffer: default_view_buffer(),
            end_margin: default_end_margin(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            state_file: None,
            expiry_days: default_expiry_days(),
            scroll_debounce_ms: default_scroll_debounce_ms(),
            restore_suppress_ms: default_restore_suppress_ms(),
            filter_debounce_ms: default_filter_debounce_ms(),
        }
    }
}

impl GridConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            page_size: self.page_size,
            view_buffer: self.view_buffer,
            end_margin: self.end_margin,
        }
    }
}

impl PersistenceConfig {
    pub fn scroll_debounce(&self) -> Duration {
        Duration::from_millis(self.scroll_debounce_ms)
    }

    pub fn restore_suppress(&self) -> Duration {
        Duration::from_millis(self.restore_suppress_ms)
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("playlist-grid").join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.clamp();

        Ok(config)
    }

    /// Keep tuning values within workable ranges.
    fn clamp(&mut self) {
        self.grid.page_size = self.grid.page_size.clamp(10, 1000);
        self.grid.view_buffer = self.grid.view_buffer.min(self.grid.page_size / 2);
        self.grid.end_margin = self.grid.end_margin.min(self.grid.page_size);
        self.grid.history_limit = self.grid.history_limit.clamp(1, 500);
        self.persistence.expiry_days = self.persistence.expiry_days.clamp(1, 365);
    }

    /// Check if the configuration is valid for connecting.
    pub fn is_valid(&self) -> bool {
        // URL must be non-empty and start with http:// or https://
        let valid_url = !self.server.url.is_empty()
            && (self.server.url.starts_with("http://") || self.server.url.starts_with("https://"));

        valid_url && self.server.collection.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.grid.page_size, 100);
        assert_eq!(config.grid.history_limit, 50);
        assert_eq!(config.persistence.expiry_days, 30);
        assert!(!config.is_valid());
    }

    #[test]
    fn test_partial_file_is_filled_and_clamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
url = "https://music.example.com"
collection = 12

[grid]
page_size = 5
view_buffer = 40
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.is_valid());
        assert_eq!(config.grid.page_size, 10);
        assert_eq!(config.grid.view_buffer, 5);
        assert_eq!(config.grid.end_margin, 10);
        assert_eq!(config.persistence.filter_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[grid\npage_size = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
