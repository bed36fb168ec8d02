//! Shared setup for commands: configuration and logging.

use std::path::{Path, PathBuf};

use lanemap::config::{config_file_path, ConfigFile};
use lanemap::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Loads the configuration and keeps logging alive for a command.
pub struct CliRunner {
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
    config_path: PathBuf,
}

impl CliRunner {
    /// Loads configuration from `config_path` (or the default location) and
    /// initializes logging as it describes.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let (config, config_path) = load_config(config_path)?;

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            config_path,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("LaneMap v{}", lanemap::VERSION);
        info!(
            config = %self.config_path.display(),
            "LaneMap CLI: {} command", command
        );
    }
}

/// Loads configuration without touching logging.
pub fn load_config(config_path: Option<PathBuf>) -> Result<(ConfigFile, PathBuf), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);
    let config = ConfigFile::load_from(&path)?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[cache]\nbase_zoom = 15\n").unwrap();

        let (config, loaded_from) = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.cache.base_zoom, 15);
        assert_eq!(loaded_from, path);
    }

    #[test]
    fn test_load_config_invalid_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[cache]\ncapacity = lots\n").unwrap();

        assert!(matches!(load_config(Some(path)), Err(CliError::Config(_))));
    }
}
