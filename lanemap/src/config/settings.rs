//! Settings structs for each `[section]` of the INI file.

use crate::cache::{CacheConfig, DEFAULT_BASE_ZOOM, DEFAULT_CAPACITY};

/// Default public Overpass endpoint.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default Overpass request timeout in seconds.
pub const DEFAULT_OVERPASS_TIMEOUT_SECS: u64 = 60;

/// Default directory for log files.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "lanemap.log";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    /// Map-data endpoint settings
    pub overpass: OverpassSettings,
    /// Tile cache settings
    pub cache: CacheSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Cache configuration described by the `[cache]` section.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            base_zoom: self.cache.base_zoom,
            capacity: self.cache.capacity,
        }
    }
}

/// `[overpass]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverpassSettings {
    /// Interpreter endpoint URL
    pub url: String,
    /// Request and server-side query timeout in seconds
    pub timeout: u64,
}

impl Default for OverpassSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_OVERPASS_URL.to_string(),
            timeout: DEFAULT_OVERPASS_TIMEOUT_SECS,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Zoom at which road graphs are built
    pub base_zoom: u8,
    /// Number of base tiles kept
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            base_zoom: DEFAULT_BASE_ZOOM,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: String,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: DEFAULT_LOG_DIRECTORY.to_string(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}
