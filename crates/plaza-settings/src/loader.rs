//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`PlazaSettings::default()`]
//! 2. If `~/.plaza/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `PLAZA_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::PlazaSettings;

/// Resolve the path to the settings file (`~/.plaza/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".plaza").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<PlazaSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<PlazaSettings> {
    let defaults = serde_json::to_value(PlazaSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: PlazaSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and fall within the given range; invalid values are
/// silently ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut PlazaSettings) {
    if let Some(v) = read_env_string("PLAZA_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("PLAZA_PORT") {
        settings.server.port = v;
    }
    if let Some(v) = read_env_u64("PLAZA_PAGE_SIZE", 1, 100) {
        settings.server.page_size = v;
    }
    if let Some(v) = read_env_u64("PLAZA_HEARTBEAT_INTERVAL_SECS", 1, 600) {
        settings.server.heartbeat_interval_secs = v;
    }
    if let Some(v) = read_env_u64("PLAZA_HEARTBEAT_TIMEOUT_SECS", 1, 3600) {
        settings.server.heartbeat_timeout_secs = v;
    }
    if let Some(v) = read_env_u64("PLAZA_DELIVERY_TIMEOUT_SECS", 1, 600) {
        settings.hub.delivery_timeout_secs = v;
    }
    if let Some(v) = read_env_u64("PLAZA_MAX_IN_FLIGHT", 1, 10_000) {
        #[allow(clippy::cast_possible_truncation)]
        {
            settings.hub.max_in_flight_per_connection = v as usize;
        }
    }
    if let Some(v) = read_env_string("PLAZA_TOKEN_SECRET") {
        settings.auth.token_secret = v;
    }
    if let Some(v) = read_env_string("PLAZA_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u16(name: &str) -> Option<u16> {
    std::env::var(name).ok()?.parse().ok()
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let value: u64 = std::env::var(name).ok()?.parse().ok()?;
    (min..=max).contains(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server":{"port":9000},"hub":{"deliveryTimeoutSecs":3}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.hub.delivery_timeout_secs, 3);
        // untouched keys keep defaults
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.hub.control_queue_capacity, 256);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn deep_merge_rules() {
        let target = json!({"a": {"x": 1, "y": 2}, "b": [1, 2], "c": 3});
        let source = json!({"a": {"y": 20}, "b": [9], "d": 4, "c": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"]["x"], 1);
        assert_eq!(merged["a"]["y"], 20);
        assert_eq!(merged["b"], json!([9]));
        assert_eq!(merged["c"], 3, "null in source preserves target");
        assert_eq!(merged["d"], 4);
    }

    #[test]
    fn out_of_range_env_value_ignored() {
        let mut settings = PlazaSettings::default();
        // Range checks are pure functions of the parsed value; exercise the
        // helper directly rather than mutating process env in tests.
        assert_eq!(read_env_u64("PLAZA_NO_SUCH_VAR", 1, 10), None);
        apply_env_overrides(&mut settings);
    }
}
