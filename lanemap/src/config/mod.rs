//! User configuration loaded from `~/.lanemap/config.ini`.
//!
//! Settings structs live in [`settings`], INI parsing in [`parser`] and
//! serialization in [`writer`]. Missing keys keep their defaults.

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFile, ConfigFileError};
pub use settings::{
    CacheSettings, LoggingSettings, OverpassSettings, DEFAULT_LOG_DIRECTORY, DEFAULT_LOG_FILE,
    DEFAULT_OVERPASS_TIMEOUT_SECS, DEFAULT_OVERPASS_URL,
};
