use std::path::{Path, PathBuf};

/// Host used when neither flags nor a config file name one
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Versioned REST prefix of the Tower API
pub const API_PREFIX: &str = "api/v2/";

/// Collection endpoint for credential types, relative to [`API_PREFIX`]
pub const CREDENTIAL_TYPES_ENDPOINT: &str = "credential_types/";

/// Health endpoint, relative to [`API_PREFIX`]
pub const PING_ENDPOINT: &str = "ping/";

/// Get the current user's home directory
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory. Other paths are returned as-is.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Parse the boolean spellings accepted for `verify_ssl` in config files,
/// flags and `TOWER_VERIFY_SSL`
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
