//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`ReefSettings::default()`]
//! 2. If the settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::ReefSettings;

/// Resolve the path to the settings file (`~/.reefwatch/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".reefwatch").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<ReefSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<ReefSettings> {
    let defaults = serde_json::to_value(ReefSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: ReefSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
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
/// Integers must parse and fall within the documented range; invalid values
/// are silently ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut ReefSettings) {
    if let Some(v) = read_env_string("REEF_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("REEF_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = read_env_u64("REEF_HEARTBEAT_INTERVAL_SECS", 1, 3_600) {
        settings.server.heartbeat_interval_secs = v;
    }
    if let Some(v) = read_env_u64("REEF_HEARTBEAT_TIMEOUT_SECS", 1, 3_600) {
        settings.server.heartbeat_timeout_secs = v;
    }
    if let Some(v) = read_env_u64("REEF_EPOCH_DURATION_MS", 10, 3_600_000) {
        settings.training.epoch_duration_ms = v;
    }
    if let Some(v) = read_env_u64("REEF_VALIDATION_PAUSE_MS", 0, 3_600_000) {
        settings.training.validation_pause_ms = v;
    }
    if let Some(v) = read_env_bool("REEF_FEED_ENABLED") {
        settings.feed.enabled = v;
    }
    if let Some(v) = read_env_string("REEF_DB_PATH") {
        settings.database.path = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| parse_bool(&v))
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u16_range(&v, min, max))
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|v| parse_u64_range(&v, min, max))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.server.port, ReefSettings::default().server.port);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"server":{"port":7777},"training":{"epochDurationMs":500}}"#)
            .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.port, 7777);
        assert_eq!(settings.training.epoch_duration_ms, 500);
        // untouched values keep defaults
        assert_eq!(settings.server.heartbeat_interval_secs, 15);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not valid").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn deep_merge_recurses_into_objects() {
        let target = json!({"a": {"x": 1, "y": 2}, "b": 3});
        let source = json!({"a": {"y": 20}});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"a": {"x": 1, "y": 20}, "b": 3}));
    }

    #[test]
    fn deep_merge_skips_nulls() {
        let target = json!({"a": 1});
        let source = json!({"a": null, "b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn deep_merge_replaces_arrays() {
        let target = json!({"a": [1, 2, 3]});
        let source = json!({"a": [9]});
        let merged = deep_merge(target, source);
        assert_eq!(merged, json!({"a": [9]}));
    }

    #[test]
    fn parse_bool_accepts_variants() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_u16_range_enforces_bounds() {
        assert_eq!(parse_u16_range("8080", 1, 65535), Some(8080));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("abc", 1, 65535), None);
    }

    #[test]
    fn parse_u64_range_enforces_bounds() {
        assert_eq!(parse_u64_range("500", 10, 1000), Some(500));
        assert_eq!(parse_u64_range("5", 10, 1000), None);
        assert_eq!(parse_u64_range("2000", 10, 1000), None);
    }
}
