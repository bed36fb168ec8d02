//! Config command - print the effective configuration.

use std::path::PathBuf;

use lanemap::config::ConfigFile;

use crate::error::CliError;
use crate::runner::load_config;

/// Run the config command.
pub fn run(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let (config, path) = load_config(config_path)?;

    let origin = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Configuration file: {}{}", path.display(), origin);
    println!();
    print!("{}", describe(&config));
    Ok(())
}

/// One `section.key = value` line per setting.
fn describe(config: &ConfigFile) -> String {
    let rows = [
        ("overpass.url", config.overpass.url.clone()),
        ("overpass.timeout", config.overpass.timeout.to_string()),
        ("cache.base_zoom", config.cache.base_zoom.to_string()),
        ("cache.capacity", config.cache.capacity.to_string()),
        ("logging.directory", config.logging.directory.clone()),
        ("logging.file", config.logging.file.clone()),
    ];

    rows.iter()
        .map(|(key, value)| format!("{:<18} = {}\n", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_every_key() {
        let text = describe(&ConfigFile::default());
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("cache.base_zoom    = 16"));
        assert!(text.contains("overpass.url       = https://overpass-api.de/api/interpreter"));
    }
}
