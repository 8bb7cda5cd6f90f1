//! Configuration schema for pdf-preview
//!
//! Configuration is stored at `~/.config/pdf-preview/config.toml`

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Document cache settings
    pub cache: CacheConfig,

    /// Document read settings
    pub document: DocumentConfig,

    /// Save handshake settings
    pub save: SaveConfig,

    /// Viewer defaults forwarded to the render surface
    pub viewer: ViewerConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Document cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of documents held in memory
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 5 }
    }
}

/// Document read configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Apply the size guard before reading (web/remote hosts)
    pub restricted: bool,

    /// Size limit in MB when `restricted` is set
    pub max_restricted_size_mb: u64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            restricted: false,
            max_restricted_size_mb: 100,
        }
    }
}

/// Save handshake configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Seconds to wait for the render surface to answer a save request
    pub timeout_secs: u64,
}

impl SaveConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Viewer defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// page-width, page-fit, page-height, auto, or a percentage like "125%"
    pub default_zoom_level: String,

    /// none, odd or even
    pub default_spread_mode: String,

    /// When to show the document tab bar
    pub tab_bar: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_zoom_level: "page-width".to_string(),
            default_spread_mode: "none".to_string(),
            tab_bar: "never".to_string(),
        }
    }
}
