//! Serialization of `ConfigFile` into a commented INI string.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[overpass]
; Overpass API interpreter endpoint used to fetch road data
url = {}
; Request timeout in seconds, also sent as the Overpass query timeout
timeout = {}

[cache]
; Zoom level at which road data is fetched and shared with deeper tiles
base_zoom = {}
; Number of base tiles kept in memory
capacity = {}

[logging]
; Directory for log files (relative paths resolve against the working directory)
directory = {}
file = {}
"#,
        config.overpass.url,
        config.overpass.timeout,
        config.cache.base_zoom,
        config.cache.capacity,
        config.logging.directory,
        config.logging.file,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_every_key() {
        let content = to_config_string(&ConfigFile::default());
        for key in [
            "url = https://overpass-api.de/api/interpreter",
            "timeout = 60",
            "base_zoom = 16",
            "capacity = 16",
            "directory = logs",
            "file = lanemap.log",
        ] {
            assert!(content.contains(key), "missing {key}");
        }
    }
}
