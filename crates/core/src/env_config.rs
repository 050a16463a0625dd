//! Environment variable parsing with warn-level logging for invalid values.

use std::path::PathBuf;

use crate::constants::{DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_POOL_SIZE};

/// Store file location override.
pub const ENV_DB_PATH: &str = "STORYVAULT_DB_PATH";
/// r2d2 pool size override.
pub const ENV_DB_POOL_SIZE: &str = "STORYVAULT_DB_POOL_SIZE";
/// SQLite busy timeout override, in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "STORYVAULT_BUSY_TIMEOUT_MS";

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Connection settings for a story store, resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub pool_size: u32,
    pub busy_timeout_ms: u32,
}

impl StoreSettings {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            pool_size: env_parse_with_default(ENV_DB_POOL_SIZE, DEFAULT_POOL_SIZE).max(1),
            busy_timeout_ms: env_parse_with_default(ENV_BUSY_TIMEOUT_MS, DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { pool_size: DEFAULT_POOL_SIZE, busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS }
    }
}

/// Default store file: `$STORYVAULT_DB_PATH`, else `<data_local_dir>/storyvault/story.db`.
#[must_use]
pub fn default_db_path(data_local_dir: Option<PathBuf>) -> PathBuf {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    data_local_dir.unwrap_or_else(|| PathBuf::from(".")).join("storyvault").join("story.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(var: &str, value: &str) {
        // SAFETY: each test uses its own variable name.
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        // SAFETY: each test uses its own variable name.
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "TEST_STORYVAULT_PARSE_VALID_41871";
        set(var_name, "42");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "TEST_STORYVAULT_PARSE_INVALID_41872";
        set(var_name, "banana");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "TEST_STORYVAULT_PARSE_MISSING_41873";
        unset(var_name);
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_default_db_path_falls_back_to_data_dir() {
        let path = default_db_path(Some(PathBuf::from("/tmp/data")));
        if std::env::var(ENV_DB_PATH).is_err() {
            assert_eq!(path, PathBuf::from("/tmp/data/storyvault/story.db"));
        }
    }

    #[test]
    fn test_store_settings_default() {
        let settings = StoreSettings::default();
        assert_eq!(settings.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(settings.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }
}
